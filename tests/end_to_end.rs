//! End-to-end tests: build a program, then decode and check it
//!
//! Run with `RUST_LOG=debug` to see every emitted word.

use cisa_builder::{
    build_condition_copy, build_enqueue, build_mbuf_free, build_zero_copy, ConditionCopyParams, EnqueueParams,
    Layout, MbufFreeParams, MbufFreeLabel, ZeroCopyParams, RELAY_WORDS,
};
use cisa_builder::builders::{BuildContext, ProgramBuilder};
use cisa_disassembler::analysis::successors;
use cisa_disassembler::{check_program, decode_program, disassemble, disassemble_bytes, Slot};
use cisa_spec::{BranchCond, Csr, CsrMode, Instruction, IsaConfig, Program, Register};
use std::collections::BTreeSet;
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn slots(program: &Program) -> Vec<Slot> {
    decode_program(program.words()).unwrap()
}

// ============================================================================
// Golden scenarios
// ============================================================================

#[test]
fn test_mbuf_free_loop() {
    init_tracing();
    let params = MbufFreeParams { pool_register_addr: 0x2000, handle_array_addr: 0x3000, pool_index_max: 4 };
    let mut program = Program::new();
    build_mbuf_free(&params, &mut program).unwrap();
    let slots = slots(&program);

    assert!(slots.iter().any(|s| s.instr == Instruction::Llwi { rd: Register::R3, imm: 4 }));

    let table = params.layout(&BuildContext::default()).unwrap().resolve().unwrap();
    let start = table.slot(MbufFreeLabel::Loop).unwrap();
    let body: Vec<Instruction> = slots
        .iter()
        .filter(|s| s.index >= start)
        .take_while(|s| !s.instr.is_jump())
        .map(|s| s.instr)
        .collect();

    let count = |f: fn(&Instruction) -> bool| body.iter().filter(|i| f(i)).count();
    assert_eq!(count(|i| matches!(i, Instruction::Load { .. })), 1);
    assert_eq!(count(|i| matches!(i, Instruction::Store { .. })), 1);
    assert_eq!(count(|i| matches!(i, Instruction::Csr { mode: CsrMode::ReadClear, csr: Csr::AxiUser, .. })), 1);
    assert_eq!(count(|i| matches!(i, Instruction::Csr { mode: CsrMode::ReadSet, csr: Csr::AxiUser, .. })), 1);
}

#[test]
fn test_enqueue_errors_are_guarded() {
    init_tracing();
    let params = EnqueueParams {
        overwrite_status_addr: 0x1000,
        handle_array_addr: 0x2000,
        enqueue_reg_addr: 0x3000,
        free_reg_addr: 0x4000,
        queue_count: 2,
    };
    let mut program = Program::new();
    build_enqueue(&params, &mut program).unwrap();
    let slots = slots(&program);

    // walk from the entry without crossing any conditional branch
    let mut seen = BTreeSet::new();
    let mut stack = vec![0usize];
    while let Some(pos) = stack.pop() {
        if !seen.insert(pos) {
            continue;
        }
        let slot = slots[pos];
        assert_ne!(slot.instr, Instruction::Error, "unguarded error exit at {}", slot.index);
        let conditional = matches!(slot.instr, Instruction::Branch { rs1, rs2, .. } if rs1 != rs2);
        if conditional {
            continue;
        }
        for target in successors(&slots, pos).iter() {
            if let Some(next) = slots.iter().position(|s| s.index == target) {
                stack.push(next);
            }
        }
    }

    let errors = slots.iter().filter(|s| s.instr == Instruction::Error).count();
    assert_eq!(errors, 2);
}

#[test]
fn test_zero_copy_store_order() {
    init_tracing();
    let build = |is_low_first| {
        let params = ZeroCopyParams {
            block_size_addr: 0x100,
            handle_addr: 0x200,
            pool_base_addr: 0x300,
            offset_addr: 0x400,
            dest_addr: 0x500,
            count: 8,
            is_low_first,
        };
        let mut program = Program::new();
        build_zero_copy(&params, &mut program).unwrap();
        program
    };
    let low = build(true);
    let high = build(false);
    assert_eq!(low.len(), high.len());

    let differ: Vec<usize> = (0..low.len()).filter(|&i| low.words()[i] != high.words()[i]).collect();
    assert_eq!(differ.len(), 2);

    let offsets = |program: &Program| -> Vec<u16> {
        slots(program)
            .into_iter()
            .filter(|s| differ.contains(&s.index))
            .map(|s| match s.instr {
                Instruction::Store { offset, .. } => offset,
                other => panic!("expected a store, got {other}"),
            })
            .collect()
    };
    assert_eq!(offsets(&low), vec![0, 4]);
    assert_eq!(offsets(&high), vec![4, 0]);
}

#[test]
fn test_condition_copy_pairs() {
    init_tracing();
    let params = ConditionCopyParams { condition_addr: 0x10, src_addr: 0x1000, dst_addr: 0x2000, count: 3 };
    let mut program = Program::new();
    build_condition_copy(&params, &mut program).unwrap();
    let instrs: Vec<Instruction> = slots(&program).into_iter().map(|s| s.instr).collect();

    let first = instrs.iter().position(|i| matches!(i, Instruction::Load { rs1: Register::R4, .. })).unwrap();
    for pair in 0..3 {
        let offset = pair as u16 * 8;
        assert!(matches!(instrs[first + 2 * pair], Instruction::Load { rd: Register::R5, offset: o, .. } if o == offset));
        assert!(matches!(instrs[first + 2 * pair + 1], Instruction::Store { rs2: Register::R5, offset: o, .. } if o == offset));
    }
    // flag clear right after the copy
    assert!(matches!(instrs[first + 6], Instruction::Store { rs1: Register::R1, rs2: Register::R0, .. }));
    let loads = instrs.iter().filter(|i| matches!(i, Instruction::Load { .. })).count();
    assert_eq!(loads, 4);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Skip {
    End,
}

fn skip_over(fillers: usize) -> Vec<u32> {
    let mut l: Layout<Skip> = Layout::new("skip", IsaConfig::DEFAULT);
    l.branch(Register::R1, Register::R0, BranchCond::Ne, Skip::End, Register::R5);
    for _ in 0..fillers {
        l.emit(Instruction::OpImm { rd: Register::R2, rs1: Register::R2, imm: 1, op: cisa_spec::ImmOp::Addi });
    }
    l.label(Skip::End);
    l.emit(Instruction::Nop);
    l.encode().unwrap()
}

#[test]
fn test_far_target_adds_only_the_relay() {
    init_tracing();
    let near = skip_over(10);
    let far = skip_over(20);
    assert_eq!(far.len(), near.len() + 10 + RELAY_WORDS);

    let far_slots = decode_program(&far).unwrap();
    assert!(matches!(far_slots[0].instr, Instruction::Lhwi { rd: Register::R5, .. }));
    assert!(matches!(far_slots[1].instr, Instruction::Llwi { rd: Register::R5, .. }));
    assert!(matches!(far_slots[2].instr, Instruction::Csr { csr: Csr::JumpPc, rs1: Register::R5, .. }));
    assert!(decode_program(&near).unwrap().iter().all(|s| !matches!(s.instr, Instruction::Lhwi { .. })));

    // the branch keeps its fields apart from the offset
    const OFFSET_FIELD: u32 = 0x1F << 7;
    assert_eq!(far[RELAY_WORDS] & !OFFSET_FIELD, near[0] & !OFFSET_FIELD);
    assert_eq!(&far[RELAY_WORDS + 1..RELAY_WORDS + 11], &near[1..11]);
    assert_eq!(far.last(), near.last());

    assert_eq!(successors(&far_slots, 3).target, Some(far.len() - 1));
}

// ============================================================================
// Build -> bytes -> listing
// ============================================================================

#[test]
fn test_image_round_trip() {
    init_tracing();
    let params = ZeroCopyParams { count: 2, ..Default::default() };
    let mut program = Program::new();
    build_zero_copy(&params, &mut program).unwrap();

    let bytes = program.to_bytes();
    assert_eq!(bytes.len(), program.byte_len());
    assert_eq!(Program::from_bytes("zero_copy", &bytes).unwrap(), program);

    let mut buf = vec![0u8; bytes.len()];
    assert_eq!(program.write_into(&mut buf).unwrap(), bytes.len());
    assert_eq!(buf, bytes);

    assert_eq!(disassemble_bytes("zero_copy", &bytes).unwrap(), disassemble(&program).unwrap());
    assert_eq!(Program::from_bincode(&program.to_bincode().unwrap()).unwrap(), program);
}

#[test]
fn test_listing_of_checked_program() {
    init_tracing();
    let params = ConditionCopyParams { condition_addr: 0x10, src_addr: 0x1000, dst_addr: 0x2000, count: 40 };
    let mut program = Program::new();
    build_condition_copy(&params, &mut program).unwrap();

    let report = check_program(&program).unwrap();
    assert!(report.is_clean(), "{:?}", report.findings);

    let asm = disassemble(&program).unwrap();
    assert!(asm.contains("; condition_copy"));
    assert!(asm.contains("csrrw     jump_pc, r6"));
}
