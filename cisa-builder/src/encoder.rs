//! Instruction encoding to 32-bit words
//!
//! Every encoder checks its operands against the field they land in and
//! fails instead of truncating. Two-word instructions (LLWI, LOAD_IMM,
//! GOTO_I) push their extension word right after the head word.

use cisa_spec::encoding::{
    encode_btype, encode_common, encode_itype, encode_lhwi, encode_loop, encode_rtype,
    encode_shift, encode_stream_imm, encode_stype, encode_system, encode_wide, fits_unsigned,
    LHWI_BITS, LLWI_BITS, LOAD_IMM_ADDR_BITS, LOOP_DELAY_MASK, MAX_JUMP_MAGNITUDE, NOP_WORD,
    ERROR_WORD, SHAMT_MASK, SQ_ID_MASK,
};
use cisa_spec::funct::{stream, FUNCT3_FUNC_CALL, FUNCT3_GQM, FUNCT3_LHWI, FUNCT3_LLWI, FUNCT3_LOOP};
use cisa_spec::{CondIsaError, Instruction, Opcode, Register, Result, StreamOp};

const IMM12_BITS: u32 = 12;

/// Encode one instruction into a fresh word vector
pub fn encode(instr: &Instruction) -> Result<Vec<u32>> {
    let mut words = Vec::with_capacity(instr.word_count());
    encode_into(instr, &mut words)?;
    Ok(words)
}

/// Encode one instruction, appending its words to `out`
///
/// Nothing is appended when the instruction is rejected.
pub fn encode_into(instr: &Instruction, out: &mut Vec<u32>) -> Result<()> {
    check_destinations(instr)?;

    match *instr {
        // ========== Load word immediate ==========
        Instruction::Lhwi { rd, imm } => {
            check_imm("lhwi imm", imm as u64, LHWI_BITS)?;
            out.push(encode_lhwi(reg(rd), FUNCT3_LHWI, imm as u32));
        }
        Instruction::Llwi { rd, imm } => {
            check_imm("llwi imm", imm, LLWI_BITS)?;
            out.push(encode_wide(Opcode::Lwi, reg(rd), FUNCT3_LLWI, (imm >> 32) as u32));
            out.push(imm as u32);
        }

        // ========== Memory ==========
        Instruction::Load { rd, rs1, offset, width } => {
            check_imm("load offset", offset as u64, IMM12_BITS)?;
            out.push(encode_itype(Opcode::Load, reg(rd), width.funct3(), reg(rs1), offset as u32));
        }
        Instruction::LoadImm { rd, addr, width } => {
            check_imm("load address", addr, LOAD_IMM_ADDR_BITS)?;
            out.push(encode_wide(Opcode::LoadImm, reg(rd), width.funct3(), (addr >> 32) as u32));
            out.push(addr as u32);
        }
        Instruction::Store { rs1, rs2, offset, width } => {
            check_imm("store offset", offset as u64, IMM12_BITS)?;
            out.push(encode_stype(width.funct3(), reg(rs1), reg(rs2), offset as u32));
        }

        // ========== ALU ==========
        Instruction::OpImm { rd, rs1, imm, op } => {
            check_imm("imm12", imm as u64, IMM12_BITS)?;
            out.push(encode_itype(Opcode::OpImm, reg(rd), op.funct3(), reg(rs1), imm as u32));
        }
        Instruction::ShiftImm { rd, rs1, shamt, op } => {
            if shamt as u32 > SHAMT_MASK {
                return Err(CondIsaError::ImmediateOutOfRange {
                    field: "shamt",
                    value: shamt as u64,
                    bits: 6,
                });
            }
            out.push(encode_shift(reg(rd), op.funct3(), reg(rs1), shamt as u32, op.shift_fn()));
        }
        Instruction::Op { rd, rs1, rs2, op } => {
            let (funct3, funct7) = op.fields();
            out.push(encode_rtype(reg(rd), funct3, reg(rs1), reg(rs2), funct7));
        }

        // ========== Control flow ==========
        Instruction::Branch { rs1, rs2, cond, offset } => {
            check_offset(offset)?;
            out.push(encode_btype(cond.funct3(), reg(rs1), reg(rs2), offset as i32));
        }
        Instruction::Loop { rs1, delay, offset } => {
            check_offset(offset)?;
            if delay as u32 > LOOP_DELAY_MASK {
                return Err(CondIsaError::ImmediateOutOfRange {
                    field: "loop delay",
                    value: delay as u64,
                    bits: 13,
                });
            }
            out.push(encode_loop(FUNCT3_LOOP, reg(rs1), delay as u32, offset as i32));
        }
        Instruction::FuncCall { rs1, rs2 } => {
            out.push(encode_common(Opcode::FuncCall, 0, FUNCT3_FUNC_CALL, reg(rs1), reg(rs2)));
        }

        // ========== Device ==========
        Instruction::Csr { rd, rs1, csr, mode } => {
            // no destination is field 0, which the device does not treat as a write
            let rd = rd.map_or(0, reg);
            out.push(encode_system(rd, mode.funct3(), reg(rs1), csr.id()));
        }
        Instruction::Stream { rd, op } => encode_stream(rd, op, out)?,
        Instruction::Gqm { rd, rs1, rs2 } => {
            out.push(encode_common(Opcode::Gqm, reg(rd), FUNCT3_GQM, reg(rs1), reg(rs2)));
        }

        // ========== Terminals ==========
        Instruction::Error => out.push(ERROR_WORD),
        Instruction::Nop => out.push(NOP_WORD),
    }

    Ok(())
}

fn encode_stream(rd: Register, op: StreamOp, out: &mut Vec<u32>) -> Result<()> {
    match op {
        StreamOp::ActivateI { sq_id } => {
            out.push(encode_stream_imm(reg(rd), stream::ACTIVE_I, check_sq_id(sq_id)?));
        }
        StreamOp::DeactivateI { sq_id } => {
            out.push(encode_stream_imm(reg(rd), stream::DEACTIVE_I, check_sq_id(sq_id)?));
        }
        StreamOp::GotoI { sq_id, head } => {
            out.push(encode_stream_imm(reg(rd), stream::GOTO_I, check_sq_id(sq_id)?));
            out.push(head);
        }
        StreamOp::ActivateR { rs1 } => {
            out.push(encode_common(Opcode::Stream, reg(rd), stream::ACTIVE_R, reg(rs1), 0));
        }
        StreamOp::DeactivateR { rs1 } => {
            out.push(encode_common(Opcode::Stream, reg(rd), stream::DEACTIVE_R, reg(rs1), 0));
        }
        StreamOp::GotoR { rs1 } => {
            out.push(encode_common(Opcode::Stream, reg(rd), stream::GOTO_R, reg(rs1), 0));
        }
    }
    Ok(())
}

/// Reject r0 as a written register, and GQM status registers with no successor
fn check_destinations(instr: &Instruction) -> Result<()> {
    if let Some(rd) = instr.rd() {
        if rd.is_zero() {
            return Err(CondIsaError::ZeroDestination { mnemonic: instr.mnemonic() });
        }
    }
    if let Instruction::Gqm { rd, .. } = instr {
        if rd.next().is_none() {
            return Err(CondIsaError::GqmStatusRegister(*rd));
        }
    }
    Ok(())
}

fn check_imm(field: &'static str, value: u64, bits: u32) -> Result<()> {
    if fits_unsigned(value, bits) {
        Ok(())
    } else {
        Err(CondIsaError::ImmediateOutOfRange { field, value, bits })
    }
}

fn check_offset(offset: i8) -> Result<()> {
    if (offset as i32).abs() > MAX_JUMP_MAGNITUDE {
        return Err(CondIsaError::JumpOffsetOutOfRange(offset as i64));
    }
    Ok(())
}

fn check_sq_id(sq_id: u16) -> Result<u32> {
    if sq_id as u32 > SQ_ID_MASK {
        return Err(CondIsaError::ImmediateOutOfRange {
            field: "sq_id",
            value: sq_id as u64,
            bits: 11,
        });
    }
    Ok(sq_id as u32)
}

#[inline]
fn reg(r: Register) -> u32 {
    r.index() as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use cisa_spec::encoding::{
        extract_funct3, extract_imm12, extract_jump_offset, extract_opcode, extract_rd,
        extract_rs1, extract_rs2, extract_store_imm, extract_wide_value,
    };
    use cisa_spec::{BranchCond, Csr, CsrMode, ImmOp, LoadWidth, ShiftOp, StoreWidth};

    #[test]
    fn test_encode_nop_and_error() {
        assert_eq!(encode(&Instruction::Nop).unwrap(), vec![0x0000_0013]);
        assert_eq!(encode(&Instruction::Error).unwrap(), vec![0]);
    }

    #[test]
    fn test_encode_load() {
        // LDR r4, 8(r2)
        let words = encode(&Instruction::Load {
            rd: Register::R4,
            rs1: Register::R2,
            offset: 8,
            width: LoadWidth::Double,
        })
        .unwrap();

        assert_eq!(words.len(), 1);
        assert_eq!(extract_opcode(words[0]), 0x03);
        assert_eq!(extract_rd(words[0]), 4);
        assert_eq!(extract_funct3(words[0]), 3);
        assert_eq!(extract_rs1(words[0]), 2);
        assert_eq!(extract_imm12(words[0]), 8);
    }

    #[test]
    fn test_encode_store_splits_offset() {
        // SW r4 -> 0x7E5(r1)
        let words = encode(&Instruction::Store {
            rs1: Register::R1,
            rs2: Register::R4,
            offset: 0x7E5,
            width: StoreWidth::Word,
        })
        .unwrap();

        assert_eq!(extract_opcode(words[0]), 0x23);
        assert_eq!((words[0] >> 7) & 0x1F, 0x05);
        assert_eq!(words[0] >> 25, 0x3F);
        assert_eq!(extract_store_imm(words[0]), 0x7E5);
        assert_eq!(extract_rs1(words[0]), 1);
        assert_eq!(extract_rs2(words[0]), 4);
    }

    #[test]
    fn test_encode_llwi_extension_word() {
        let words = encode(&Instruction::Llwi { rd: Register::R8, imm: 0x1_0000_0001 }).unwrap();
        assert_eq!(words.len(), 2);
        assert_eq!(words[1], 1);
        assert_eq!(extract_wide_value(words[0], words[1]), 0x1_0000_0001);
    }

    #[test]
    fn test_encode_branch_direction() {
        let back = encode(&Instruction::Branch {
            rs1: Register::R6,
            rs2: Register::R3,
            cond: BranchCond::Lt,
            offset: -7,
        })
        .unwrap();
        assert_eq!(extract_jump_offset(back[0]), -7);
        assert_eq!((back[0] >> 11) & 1, 1);

        let fwd = encode(&Instruction::Branch {
            rs1: Register::R0,
            rs2: Register::R0,
            cond: BranchCond::Eq,
            offset: 15,
        })
        .unwrap();
        assert_eq!(extract_jump_offset(fwd[0]), 15);
    }

    #[test]
    fn test_encode_csr_without_destination() {
        let words = encode(&Instruction::Csr {
            rd: None,
            rs1: Register::R8,
            csr: Csr::AxiUser,
            mode: CsrMode::ReadClear,
        })
        .unwrap();
        assert_eq!(extract_rd(words[0]), 0);
        assert_eq!(extract_funct3(words[0]), 3);
        assert_eq!(words[0] >> 20, 0x800);
    }

    #[test]
    fn test_reject_zero_destination() {
        let err = encode(&Instruction::OpImm {
            rd: Register::R0,
            rs1: Register::R1,
            imm: 1,
            op: ImmOp::Addi,
        })
        .unwrap_err();
        assert!(matches!(err, CondIsaError::ZeroDestination { mnemonic: "addi" }));

        let err = encode(&Instruction::Csr {
            rd: Some(Register::R0),
            rs1: Register::R1,
            csr: Csr::JumpPc,
            mode: CsrMode::ReadWrite,
        })
        .unwrap_err();
        assert!(matches!(err, CondIsaError::ZeroDestination { .. }));
    }

    #[test]
    fn test_reject_out_of_range_fields() {
        let imm = Instruction::OpImm { rd: Register::R1, rs1: Register::R0, imm: 0x1000, op: ImmOp::Addi };
        assert!(matches!(encode(&imm), Err(CondIsaError::ImmediateOutOfRange { bits: 12, .. })));

        let shift = Instruction::ShiftImm { rd: Register::R1, rs1: Register::R1, shamt: 64, op: ShiftOp::Slli };
        assert!(encode(&shift).is_err());

        let delay = Instruction::Loop { rs1: Register::R1, delay: 8192, offset: -1 };
        assert!(encode(&delay).is_err());

        let far = Instruction::Branch { rs1: Register::R1, rs2: Register::R0, cond: BranchCond::Ne, offset: 16 };
        assert!(matches!(encode(&far), Err(CondIsaError::JumpOffsetOutOfRange(16))));

        let lhwi = Instruction::Lhwi { rd: Register::R1, imm: 0x8000 };
        assert!(encode(&lhwi).is_err());

        let llwi = Instruction::Llwi { rd: Register::R1, imm: 1 << 49 };
        assert!(encode(&llwi).is_err());

        let goto = Instruction::Stream { rd: Register::R2, op: StreamOp::GotoI { sq_id: 2048, head: 0 } };
        assert!(encode(&goto).is_err());
    }

    #[test]
    fn test_reject_gqm_r10() {
        let err = encode(&Instruction::Gqm { rd: Register::R10, rs1: Register::R1, rs2: Register::R3 }).unwrap_err();
        assert!(matches!(err, CondIsaError::GqmStatusRegister(Register::R10)));
        assert!(encode(&Instruction::Gqm { rd: Register::R6, rs1: Register::R1, rs2: Register::R3 }).is_ok());
    }

    #[test]
    fn test_rejected_instruction_appends_nothing() {
        let mut out = vec![0xDEAD_BEEF];
        let bad = Instruction::Llwi { rd: Register::R0, imm: 5 };
        assert!(encode_into(&bad, &mut out).is_err());
        assert_eq!(out, vec![0xDEAD_BEEF]);
    }

    #[test]
    fn test_goto_i_extension_word() {
        let words = encode(&Instruction::Stream {
            rd: Register::R2,
            op: StreamOp::GotoI { sq_id: 0x7FF, head: 0 },
        })
        .unwrap();
        assert_eq!(words.len(), 2);
        assert_eq!(extract_funct3(words[0]), 2);
        assert_eq!((words[0] >> 20) & 0x7FF, 0x7FF);
        assert_eq!(words[1], 0);
    }
}
