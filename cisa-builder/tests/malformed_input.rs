//! Tests for malformed parameters and misused layouts
//!
//! Every failure is a typed error and leaves the output program untouched.

use cisa_builder::*;
use cisa_spec::{BranchCond, CondIsaError, Instruction, IsaConfig, Program, Register};

fn sample_program() -> Program {
    let mut program = Program::new();
    build_frame_align(&FrameAlignParams { result_flag_addr: 0x10, sq_id: 1 }, &mut program).unwrap();
    program
}

// ============================================================================
// Parameter Range Tests
// ============================================================================

#[test]
fn test_condition_copy_too_long() {
    let mut program = sample_program();
    let before = program.clone();
    let params = ConditionCopyParams { count: 512, ..Default::default() };

    let err = build_condition_copy(&params, &mut program).unwrap_err();
    assert!(matches!(err, BuilderError::InvalidParameter { name: "count", value: 512, .. }));
    assert_eq!(program, before);
}

#[test]
fn test_condition_copy_longest() {
    let params = ConditionCopyParams { count: 511, ..Default::default() };
    build_condition_copy(&params, &mut Program::new()).unwrap();
}

#[test]
fn test_batch_dequeue_stride() {
    let params = BatchDequeueParams { cache_stride: 0x1000, ..Default::default() };
    let err = build_batch_dequeue(&params, &mut Program::new()).unwrap_err();
    assert!(matches!(err, BuilderError::InvalidParameter { name: "cache_stride", value: 0x1000, .. }));
}

#[test]
fn test_prepare_out_queue_count() {
    let params = PrepareOutParams { output_queue_count: 4096, ..Default::default() };
    let err = build_prepare_out(&params, &mut Program::new()).unwrap_err();
    assert!(matches!(err, BuilderError::InvalidParameter { name: "output_queue_count", .. }));
}

#[test]
fn test_adspc_fields() {
    let params = AdspcParams { cqe_size: 0x2000, ..Default::default() };
    let err = build_adspc(&params, &mut Program::new()).unwrap_err();
    assert!(matches!(err, BuilderError::InvalidParameter { name: "cqe_size", .. }));
}

#[test]
fn test_adspc_partial_entries() {
    for cqe_size in [0, 4, 12, 0xFFC] {
        let params = AdspcParams { head_tail_mask: 0xFF, cqe_size, ..Default::default() };
        let mut program = sample_program();
        let err = build_adspc(&params, &mut program).unwrap_err();
        assert!(matches!(err, BuilderError::InvalidParameter { name: "cqe_size", value, .. } if value == cqe_size));
        assert_eq!(program, sample_program());
    }

    let params = AdspcParams { head_tail_mask: 0xFF, cqe_size: 0xFF8, ..Default::default() };
    assert!(build_adspc(&params, &mut Program::new()).is_ok());
}

#[test]
fn test_rdma_pi_init() {
    let params = RdmaSink1Params { pi_init: 0x1000, ..Default::default() };
    let err = build_rdma_sink1(&params, &mut Program::new()).unwrap_err();
    assert!(matches!(err, BuilderError::InvalidParameter { name: "pi_init", .. }));
}

#[test]
fn test_stream_ids() {
    let mut program = sample_program();
    let before = program.clone();

    let err = build_stream_reset(&StreamResetParams { sq_id: 0x800, ..Default::default() }, &mut program).unwrap_err();
    assert!(matches!(err, BuilderError::Encoding(CondIsaError::ImmediateOutOfRange { .. })));
    let err = build_frame_align(&FrameAlignParams { sq_id: 0xFFFF, ..Default::default() }, &mut program).unwrap_err();
    assert!(matches!(err, BuilderError::Encoding(CondIsaError::ImmediateOutOfRange { .. })));
    assert_eq!(program, before);
}

#[test]
fn test_model_execute_offsets() {
    for params in [
        ModelExecuteParams { sq_head_offset: 0x1000, ..Default::default() },
        ModelExecuteParams { sq_tail_offset: 0x1000, ..Default::default() },
        ModelExecuteParams { sq_enable_offset: 0x1000, ..Default::default() },
    ] {
        let err = build_model_execute(&params, &mut Program::new()).unwrap_err();
        assert!(matches!(err, BuilderError::InvalidParameter { value: 0x1000, .. }));
    }
}

#[test]
fn test_invalid_context() {
    for config in [
        IsaConfig { near_jump_reach: 16, ..IsaConfig::DEFAULT },
        IsaConfig { fsm_poll_delay: 8192, ..IsaConfig::DEFAULT },
        IsaConfig { rtsq_id_mask: 0x1000, ..IsaConfig::DEFAULT },
        IsaConfig { jump_pc_bits: 4, ..IsaConfig::DEFAULT },
    ] {
        assert!(BuildContext::new(config).is_err());
    }
}

// ============================================================================
// Encoder Misuse Tests
// ============================================================================

#[test]
fn test_zero_destination() {
    let err = encode(&Instruction::Lhwi { rd: Register::R0, imm: 1 }).unwrap_err();
    assert!(matches!(err, CondIsaError::ZeroDestination { .. }));
    assert!(err.is_misuse());
}

#[test]
fn test_gqm_status_register() {
    let err = encode(&Instruction::Gqm { rd: Register::R10, rs1: Register::R1, rs2: Register::R2 }).unwrap_err();
    assert!(matches!(err, CondIsaError::GqmStatusRegister(Register::R10)));
}

#[test]
fn test_immediate_widths() {
    assert!(encode(&Instruction::Lhwi { rd: Register::R1, imm: 0x8000 }).is_err());
    assert!(encode(&Instruction::Llwi { rd: Register::R1, imm: 1 << 49 }).is_err());
    assert!(encode(&Instruction::Loop { rs1: Register::R1, delay: 8192, offset: -1 }).is_err());
    assert!(encode(&Instruction::Branch {
        rs1: Register::R1,
        rs2: Register::R2,
        cond: BranchCond::Eq,
        offset: 16
    })
    .is_err());
}

// ============================================================================
// Layout Misuse Tests
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Target {
    Exit,
}

fn layout() -> Layout<Target> {
    Layout::new("test", IsaConfig::DEFAULT)
}

#[test]
fn test_undefined_label() {
    let mut l = layout();
    l.jump(Target::Exit, Register::R1);
    l.emit(Instruction::Nop);
    assert!(matches!(l.encode(), Err(BuilderError::UndefinedLabel(_))));
}

#[test]
fn test_duplicate_label() {
    let mut l = layout();
    l.label(Target::Exit);
    l.emit(Instruction::Nop);
    l.label(Target::Exit);
    l.emit(Instruction::Nop);
    assert!(matches!(l.encode(), Err(BuilderError::DuplicateLabel(_))));
}

#[test]
fn test_split_immediate_pair() {
    let mut l = layout();
    l.emit(Instruction::Lhwi { rd: Register::R1, imm: 1 });
    l.emit(Instruction::Nop);
    l.emit(Instruction::Llwi { rd: Register::R1, imm: 1 });

    let mut program = sample_program();
    let before = program.clone();
    let err = l.write_program(&mut program).unwrap_err();
    assert!(matches!(err, BuilderError::Encoding(CondIsaError::UnpairedHighImmediate(0))));
    assert_eq!(program, before);
}

#[test]
fn test_mismatched_pair() {
    let mut l = layout();
    l.emit(Instruction::Lhwi { rd: Register::R1, imm: 1 });
    l.emit(Instruction::Llwi { rd: Register::R2, imm: 1 });
    assert!(matches!(
        l.encode(),
        Err(BuilderError::Encoding(CondIsaError::PairRegisterMismatch { high: Register::R1, low: Register::R2, .. }))
    ));
}

// ============================================================================
// Properties
// ============================================================================

mod properties {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn prop_oversized_stride_rejected(stride in 0x1000u64..u64::MAX) {
            let params = BatchDequeueParams { cache_stride: stride, ..Default::default() };
            let mut program = sample_program();
            let before = program.clone();
            let is_invalid = matches!(
                build_batch_dequeue(&params, &mut program),
                Err(BuilderError::InvalidParameter { name: "cache_stride", .. })
            );
            prop_assert!(is_invalid);
            prop_assert_eq!(program, before);
        }

        #[test]
        fn prop_oversized_copy_rejected(count in 512u32..) {
            let params = ConditionCopyParams { count, ..Default::default() };
            let mut program = Program::new();
            prop_assert!(build_condition_copy(&params, &mut program).is_err());
            prop_assert!(program.is_empty());
        }

        #[test]
        fn prop_wide_immediates_rejected(imm in (1u64 << 49)..) {
            let instr = Instruction::Llwi { rd: Register::R1, imm };
            prop_assert!(encode(&instr).is_err());
        }

        #[test]
        fn prop_any_u64_loads(value in any::<u64>()) {
            let mut l: Layout<()> = Layout::new("load", IsaConfig::DEFAULT);
            l.load_imm64(Register::R3, value);
            l.emit(Instruction::Nop);
            let words = l.encode().unwrap();
            prop_assert_eq!(words.len(), 4);
        }
    }
}
