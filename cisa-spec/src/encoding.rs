//! # Instruction Encoding Constants and Helpers
//!
//! Centralized bit positions, masks and raw field packers for the
//! conditional micro-ISA. The packers here mask their inputs; range
//! checking happens in the encoder before anything reaches them.
//!
//! ## Head Word Layout (32-bit)
//!
//! ```text
//! common : opcode[6:0] rd[10:7] func3[14:12] rs1[18:15] rs2[23:20]
//! I      : imm12[31:20]
//! S      : imm[4:0] -> [11:7], imm[11:5] -> [31:25]
//! SHIFT  : shamt[25:20] shiftfn[31:26]
//! R      : func7[31:25]
//! LHWI   : imm15[31:17]
//! LLWI   : imm[48:32] -> [31:15], extension word = imm[31:0]
//! BRANCH : offset magnitude[10:7], bit 11 set = backward
//! LOOP   : as BRANCH, delay13[31:19]
//! SYSTEM : csr[31:20]
//! STREAM : sqId[30:20]
//! ```
//!
//! Bits 11, 19 and 24 are reserved where they are not part of a field
//! and are always zero.

use crate::Opcode;

// ============================================================================
// Bit Position Constants
// ============================================================================

/// Opcode field: bits 0-6 (7 bits)
pub const OPCODE_SHIFT: u32 = 0;

/// Destination register field: bits 7-10 (4 bits)
pub const RD_SHIFT: u32 = 7;

/// func3 field: bits 12-14
pub const FUNCT3_SHIFT: u32 = 12;

/// Source register 1 field: bits 15-18 (4 bits)
pub const RS1_SHIFT: u32 = 15;

/// Source register 2 field: bits 20-23 (4 bits)
pub const RS2_SHIFT: u32 = 20;

/// I-type immediate: bits 20-31
pub const IMM12_SHIFT: u32 = 20;

/// S-type immediate, upper part: bits 25-31
pub const STORE_IMM_HI_SHIFT: u32 = 25;

/// R-type func7: bits 25-31
pub const FUNCT7_SHIFT: u32 = 25;

/// Shift amount: bits 20-25
pub const SHAMT_SHIFT: u32 = 20;

/// Shift function: bits 26-31
pub const SHIFT_FN_SHIFT: u32 = 26;

/// LHWI immediate: bits 17-31
pub const LHWI_IMM_SHIFT: u32 = 17;

/// LLWI / LOAD_IMM upper immediate: bits 15-31
pub const WIDE_IMM_SHIFT: u32 = 15;

/// Jump offset magnitude: bits 7-10
pub const JUMP_OFFSET_SHIFT: u32 = 7;

/// Jump direction: bit 11 (1 = backward)
pub const JUMP_BACKWARD_BIT: u32 = 11;

/// Loop delay: bits 19-31
pub const LOOP_DELAY_SHIFT: u32 = 19;

/// CSR id: bits 20-31
pub const CSR_SHIFT: u32 = 20;

/// Stream id: bits 20-30
pub const SQ_ID_SHIFT: u32 = 20;

// ============================================================================
// Field Masks
// ============================================================================

/// Opcode mask (7 bits)
pub const OPCODE_MASK: u32 = 0x7F;

/// Register field mask (4 bits)
pub const REGISTER_MASK: u32 = 0xF;

/// func3 mask (3 bits)
pub const FUNCT3_MASK: u32 = 0x7;

/// func7 mask (7 bits)
pub const FUNCT7_MASK: u32 = 0x7F;

/// I/S-type immediate mask (12 bits)
pub const IMM12_MASK: u32 = 0xFFF;

/// S-type low immediate mask (5 bits)
pub const STORE_IMM_LO_MASK: u32 = 0x1F;

/// Shift amount mask (6 bits)
pub const SHAMT_MASK: u32 = 0x3F;

/// Shift function mask (6 bits)
pub const SHIFT_FN_MASK: u32 = 0x3F;

/// LHWI immediate mask (15 bits)
pub const LHWI_IMM_MASK: u32 = 0x7FFF;

/// LLWI / LOAD_IMM head-word immediate mask (17 bits)
pub const WIDE_IMM_MASK: u32 = 0x1FFFF;

/// Jump offset magnitude mask (4 bits)
pub const JUMP_OFFSET_MASK: u32 = 0xF;

/// Loop delay mask (13 bits)
pub const LOOP_DELAY_MASK: u32 = 0x1FFF;

/// CSR id mask (12 bits)
pub const CSR_MASK: u32 = 0xFFF;

/// Stream id mask (11 bits)
pub const SQ_ID_MASK: u32 = 0x7FF;

// ============================================================================
// Immediate Splitting
// ============================================================================

/// Bits of a 64-bit value held by LHWI
pub const LHWI_BITS: u32 = 15;

/// Bits of a 64-bit value held by LLWI
pub const LLWI_BITS: u32 = 49;

/// Bits of an absolute LOAD_IMM address
pub const LOAD_IMM_ADDR_BITS: u32 = 49;

/// Largest magnitude an inline jump offset can hold
pub const MAX_JUMP_MAGNITUDE: i32 = JUMP_OFFSET_MASK as i32;

/// The all-zero error sentinel
pub const ERROR_WORD: u32 = 0x0000_0000;

/// ADDI r0, r0, 0
pub const NOP_WORD: u32 = Opcode::OpImm.to_u8() as u32;

/// Split a 64-bit value into its LHWI (bits 63:49) and LLWI (bits 48:0) parts.
#[inline]
pub const fn split_u64(value: u64) -> (u16, u64) {
    ((value >> LLWI_BITS) as u16, value & ((1u64 << LLWI_BITS) - 1))
}

/// Inverse of [`split_u64`].
#[inline]
pub const fn join_u64(high: u16, low: u64) -> u64 {
    ((high as u64) << LLWI_BITS) | (low & ((1u64 << LLWI_BITS) - 1))
}

/// Check that `value` fits in an unsigned field of `bits` bits.
#[inline]
pub const fn fits_unsigned(value: u64, bits: u32) -> bool {
    bits >= 64 || value >> bits == 0
}

// ============================================================================
// Field Extraction Functions
// ============================================================================

/// Extract opcode from instruction (bits 0-6)
#[inline]
pub const fn extract_opcode(inst: u32) -> u32 {
    (inst >> OPCODE_SHIFT) & OPCODE_MASK
}

/// Extract destination register from instruction (bits 7-10)
#[inline]
pub const fn extract_rd(inst: u32) -> u32 {
    (inst >> RD_SHIFT) & REGISTER_MASK
}

/// Extract func3 (bits 12-14)
#[inline]
pub const fn extract_funct3(inst: u32) -> u32 {
    (inst >> FUNCT3_SHIFT) & FUNCT3_MASK
}

/// Extract source register 1 (bits 15-18)
#[inline]
pub const fn extract_rs1(inst: u32) -> u32 {
    (inst >> RS1_SHIFT) & REGISTER_MASK
}

/// Extract source register 2 (bits 20-23)
#[inline]
pub const fn extract_rs2(inst: u32) -> u32 {
    (inst >> RS2_SHIFT) & REGISTER_MASK
}

/// Extract I-type immediate (bits 20-31)
#[inline]
pub const fn extract_imm12(inst: u32) -> u32 {
    (inst >> IMM12_SHIFT) & IMM12_MASK
}

/// Extract S-type immediate from its two parts
#[inline]
pub const fn extract_store_imm(inst: u32) -> u32 {
    ((inst >> RD_SHIFT) & STORE_IMM_LO_MASK) | (((inst >> STORE_IMM_HI_SHIFT) & FUNCT7_MASK) << 5)
}

/// Extract func7 (bits 25-31)
#[inline]
pub const fn extract_funct7(inst: u32) -> u32 {
    (inst >> FUNCT7_SHIFT) & FUNCT7_MASK
}

/// Extract shift amount (bits 20-25)
#[inline]
pub const fn extract_shamt(inst: u32) -> u32 {
    (inst >> SHAMT_SHIFT) & SHAMT_MASK
}

/// Extract shift function (bits 26-31)
#[inline]
pub const fn extract_shift_fn(inst: u32) -> u32 {
    (inst >> SHIFT_FN_SHIFT) & SHIFT_FN_MASK
}

/// Extract LHWI immediate (bits 17-31)
#[inline]
pub const fn extract_lhwi_imm(inst: u32) -> u32 {
    (inst >> LHWI_IMM_SHIFT) & LHWI_IMM_MASK
}

/// Extract the 17-bit head-word part of an LLWI / LOAD_IMM immediate
#[inline]
pub const fn extract_wide_imm(inst: u32) -> u32 {
    (inst >> WIDE_IMM_SHIFT) & WIDE_IMM_MASK
}

/// Extract the signed word offset of a branch or loop
#[inline]
pub const fn extract_jump_offset(inst: u32) -> i32 {
    let magnitude = ((inst >> JUMP_OFFSET_SHIFT) & JUMP_OFFSET_MASK) as i32;
    if (inst >> JUMP_BACKWARD_BIT) & 1 == 1 {
        -magnitude
    } else {
        magnitude
    }
}

/// Extract loop delay (bits 19-31)
#[inline]
pub const fn extract_loop_delay(inst: u32) -> u32 {
    (inst >> LOOP_DELAY_SHIFT) & LOOP_DELAY_MASK
}

/// Extract CSR id (bits 20-31)
#[inline]
pub const fn extract_csr(inst: u32) -> u32 {
    (inst >> CSR_SHIFT) & CSR_MASK
}

/// Extract stream id (bits 20-30)
#[inline]
pub const fn extract_sq_id(inst: u32) -> u32 {
    (inst >> SQ_ID_SHIFT) & SQ_ID_MASK
}

/// Reassemble a 49-bit immediate from a head word and its extension word
#[inline]
pub const fn extract_wide_value(inst: u32, ext: u32) -> u64 {
    ((extract_wide_imm(inst) as u64) << 32) | ext as u64
}

// ============================================================================
// Instruction Encoding Functions
// ============================================================================

/// Encode the fields every format shares
#[inline]
pub const fn encode_common(opcode: Opcode, rd: u32, funct3: u32, rs1: u32, rs2: u32) -> u32 {
    ((opcode.to_u8() as u32) << OPCODE_SHIFT)
        | ((rd & REGISTER_MASK) << RD_SHIFT)
        | ((funct3 & FUNCT3_MASK) << FUNCT3_SHIFT)
        | ((rs1 & REGISTER_MASK) << RS1_SHIFT)
        | ((rs2 & REGISTER_MASK) << RS2_SHIFT)
}

/// Encode I-type instruction
#[inline]
pub const fn encode_itype(opcode: Opcode, rd: u32, funct3: u32, rs1: u32, imm: u32) -> u32 {
    encode_common(opcode, rd, funct3, rs1, 0) | ((imm & IMM12_MASK) << IMM12_SHIFT)
}

/// Encode S-type instruction (stores)
#[inline]
pub const fn encode_stype(funct3: u32, rs1: u32, rs2: u32, imm: u32) -> u32 {
    encode_common(Opcode::Store, imm & STORE_IMM_LO_MASK, funct3, rs1, rs2)
        | (((imm >> 5) & FUNCT7_MASK) << STORE_IMM_HI_SHIFT)
}

/// Encode R-type instruction
#[inline]
pub const fn encode_rtype(rd: u32, funct3: u32, rs1: u32, rs2: u32, funct7: u32) -> u32 {
    encode_common(Opcode::Op, rd, funct3, rs1, rs2) | ((funct7 & FUNCT7_MASK) << FUNCT7_SHIFT)
}

/// Encode an immediate shift
#[inline]
pub const fn encode_shift(rd: u32, funct3: u32, rs1: u32, shamt: u32, shift_fn: u32) -> u32 {
    encode_common(Opcode::OpImm, rd, funct3, rs1, 0)
        | ((shamt & SHAMT_MASK) << SHAMT_SHIFT)
        | ((shift_fn & SHIFT_FN_MASK) << SHIFT_FN_SHIFT)
}

/// Encode LHWI head word
#[inline]
pub const fn encode_lhwi(rd: u32, funct3: u32, imm: u32) -> u32 {
    encode_common(Opcode::Lwi, rd, funct3, 0, 0) | ((imm & LHWI_IMM_MASK) << LHWI_IMM_SHIFT)
}

/// Encode the head word of a 49-bit immediate carrier (LLWI, LOAD_IMM)
#[inline]
pub const fn encode_wide(opcode: Opcode, rd: u32, funct3: u32, imm_hi: u32) -> u32 {
    encode_common(opcode, rd, funct3, 0, 0) | ((imm_hi & WIDE_IMM_MASK) << WIDE_IMM_SHIFT)
}

/// Encode a signed word offset into the jump field (bits 7-11)
#[inline]
pub const fn encode_jump_field(offset: i32) -> u32 {
    let magnitude = (offset.unsigned_abs() & JUMP_OFFSET_MASK) << JUMP_OFFSET_SHIFT;
    if offset < 0 {
        magnitude | (1 << JUMP_BACKWARD_BIT)
    } else {
        magnitude
    }
}

/// Encode B-type instruction (branches)
#[inline]
pub const fn encode_btype(funct3: u32, rs1: u32, rs2: u32, offset: i32) -> u32 {
    encode_common(Opcode::Branch, 0, funct3, rs1, rs2) | encode_jump_field(offset)
}

/// Encode LOOP instruction
#[inline]
pub const fn encode_loop(funct3: u32, rs1: u32, delay: u32, offset: i32) -> u32 {
    encode_common(Opcode::Loop, 0, funct3, rs1, 0)
        | encode_jump_field(offset)
        | ((delay & LOOP_DELAY_MASK) << LOOP_DELAY_SHIFT)
}

/// Encode SYSTEM (CSR) instruction
#[inline]
pub const fn encode_system(rd: u32, funct3: u32, rs1: u32, csr: u32) -> u32 {
    encode_common(Opcode::System, rd, funct3, rs1, 0) | ((csr & CSR_MASK) << CSR_SHIFT)
}

/// Encode an immediate-form stream control instruction
#[inline]
pub const fn encode_stream_imm(rd: u32, funct3: u32, sq_id: u32) -> u32 {
    encode_common(Opcode::Stream, rd, funct3, 0, 0) | ((sq_id & SQ_ID_MASK) << SQ_ID_SHIFT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nop_word() {
        assert_eq!(NOP_WORD, 0x0000_0013);
        assert_eq!(encode_itype(Opcode::OpImm, 0, 0, 0, 0), NOP_WORD);
    }

    #[test]
    fn test_extract_registers() {
        let inst = encode_common(Opcode::Op, 5, 3, 10, 9);
        assert_eq!(extract_opcode(inst), 0x33);
        assert_eq!(extract_rd(inst), 5);
        assert_eq!(extract_funct3(inst), 3);
        assert_eq!(extract_rs1(inst), 10);
        assert_eq!(extract_rs2(inst), 9);
    }

    #[test]
    fn test_reserved_bits_clear() {
        let inst = encode_common(Opcode::Op, 0xF, 7, 0xF, 0xF);
        assert_eq!(inst & (1 << 11), 0);
        assert_eq!(inst & (1 << 19), 0);
        assert_eq!(inst & (1 << 24), 0);
    }

    #[test]
    fn test_store_immediate_split() {
        let inst = encode_stype(2, 1, 4, 0xABC);
        assert_eq!(extract_store_imm(inst), 0xABC);
        assert_eq!(extract_rd(inst), 0xABC & 0xF);
        assert_eq!(extract_rs1(inst), 1);
        assert_eq!(extract_rs2(inst), 4);
    }

    #[test]
    fn test_jump_field() {
        for offset in -15..=15 {
            let inst = encode_btype(0, 1, 2, offset);
            assert_eq!(extract_jump_offset(inst), offset);
        }
        assert_eq!(encode_jump_field(-1) & (1 << JUMP_BACKWARD_BIT), 1 << JUMP_BACKWARD_BIT);
        assert_eq!(encode_jump_field(1) & (1 << JUMP_BACKWARD_BIT), 0);
    }

    #[test]
    fn test_loop_fields() {
        let inst = encode_loop(0, 6, 1100, -3);
        assert_eq!(extract_loop_delay(inst), 1100);
        assert_eq!(extract_jump_offset(inst), -3);
        assert_eq!(extract_rs1(inst), 6);
    }

    #[test]
    fn test_wide_immediate() {
        let (hi, lo) = split_u64(0x1234_5678_9ABC_DEF0);
        assert_eq!(join_u64(hi, lo), 0x1234_5678_9ABC_DEF0);
        let inst = encode_wide(Opcode::Lwi, 1, 1, (lo >> 32) as u32);
        assert_eq!(extract_wide_value(inst, lo as u32), lo);
    }

    #[test]
    fn test_shift_fields() {
        let inst = encode_shift(6, 5, 5, 61, 0x10);
        assert_eq!(extract_shamt(inst), 61);
        assert_eq!(extract_shift_fn(inst), 0x10);
    }

    #[test]
    fn test_system_and_stream() {
        let csr = encode_system(1, 1, 4, 0x801);
        assert_eq!(extract_csr(csr), 0x801);
        let stream = encode_stream_imm(2, 2, 2047);
        assert_eq!(extract_sq_id(stream), 2047);
        assert_eq!(stream >> 31, 0);
    }

    #[test]
    fn test_fits_unsigned() {
        assert!(fits_unsigned(0xFFF, 12));
        assert!(!fits_unsigned(0x1000, 12));
        assert!(fits_unsigned(u64::MAX, 64));
    }
}
