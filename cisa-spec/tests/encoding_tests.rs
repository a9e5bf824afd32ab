//! Field-level encoding tests for edge cases not covered in unit tests

use cisa_spec::encoding::*;
use cisa_spec::Opcode;
use proptest::prelude::*;

// ============================================================================
// Jump Offset Edge Cases
// ============================================================================

#[test]
fn test_jump_offset_extremes() {
    assert_eq!(extract_jump_offset(encode_btype(0, 1, 2, 15)), 15);
    assert_eq!(extract_jump_offset(encode_btype(0, 1, 2, -15)), -15);
    assert_eq!(extract_jump_offset(encode_btype(0, 1, 2, 0)), 0);
}

#[test]
fn test_jump_field_does_not_touch_func3() {
    let inst = encode_btype(7, 0, 0, -15);
    assert_eq!(extract_funct3(inst), 7);
    assert_eq!(extract_rd(inst), 15);
}

// ============================================================================
// Immediate Field Edge Cases
// ============================================================================

#[test]
fn test_imm12_extremes() {
    let inst = encode_itype(Opcode::OpImm, 1, 0, 1, IMM12_MASK);
    assert_eq!(extract_imm12(inst), 0xFFF);
    assert_eq!(extract_rs1(inst), 1);
}

#[test]
fn test_lhwi_extremes() {
    let inst = encode_lhwi(10, 0, LHWI_IMM_MASK);
    assert_eq!(extract_lhwi_imm(inst), 0x7FFF);
    assert_eq!(extract_rd(inst), 10);
    assert_eq!(extract_opcode(inst), Opcode::Lwi.to_u8() as u32);
}

#[test]
fn test_split_u64_extremes() {
    assert_eq!(split_u64(u64::MAX), (0x7FFF, (1 << 49) - 1));
    assert_eq!(split_u64(1 << 49), (1, 0));
    assert_eq!(split_u64(0x1_0000_0001), (0, 0x1_0000_0001));
}

#[test]
fn test_loop_delay_extremes() {
    let inst = encode_loop(0, 10, LOOP_DELAY_MASK, 15);
    assert_eq!(extract_loop_delay(inst), 8191);
    assert_eq!(extract_rs1(inst), 10);
    assert_eq!(extract_jump_offset(inst), 15);
}

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    #[test]
    fn prop_split_join_u64(value in any::<u64>()) {
        let (hi, lo) = split_u64(value);
        prop_assert!(hi as u32 <= LHWI_IMM_MASK);
        prop_assert_eq!(join_u64(hi, lo), value);
    }

    #[test]
    fn prop_store_imm_roundtrip(imm in 0u32..=IMM12_MASK, rs1 in 0u32..=10, rs2 in 0u32..=10) {
        let inst = encode_stype(3, rs1, rs2, imm);
        prop_assert_eq!(extract_store_imm(inst), imm);
        prop_assert_eq!(extract_rs1(inst), rs1);
        prop_assert_eq!(extract_rs2(inst), rs2);
    }

    #[test]
    fn prop_wide_value_roundtrip(value in 0u64..(1u64 << 49), rd in 0u32..=10) {
        let inst = encode_wide(Opcode::LoadImm, rd, 3, (value >> 32) as u32);
        prop_assert_eq!(extract_wide_value(inst, value as u32), value);
        prop_assert_eq!(extract_rd(inst), rd);
    }

    #[test]
    fn prop_jump_offset_roundtrip(offset in -15i32..=15, delay in 0u32..=LOOP_DELAY_MASK) {
        prop_assert_eq!(extract_jump_offset(encode_loop(0, 1, delay, offset)), offset);
        prop_assert_eq!(extract_loop_delay(encode_loop(0, 1, delay, offset)), delay);
    }
}
