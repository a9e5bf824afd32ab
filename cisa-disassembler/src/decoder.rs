//! Instruction decoder
//!
//! The inverse of the builder's encoder. A head word is decoded on its own;
//! LLWI, LOAD_IMM and GOTO_I also consume the word after it.

use crate::error::{DisassemblerError, Result};
use cisa_spec::encoding::{
    extract_csr, extract_funct3, extract_funct7, extract_imm12, extract_jump_offset, extract_lhwi_imm,
    extract_loop_delay, extract_opcode, extract_rd, extract_rs1, extract_rs2, extract_shamt, extract_shift_fn,
    extract_sq_id, extract_store_imm, extract_wide_value, ERROR_WORD, NOP_WORD,
};
use cisa_spec::funct::{stream, FUNCT3_LHWI, FUNCT3_LLWI};
use cisa_spec::{
    BranchCond, Csr, CsrMode, ImmOp, Instruction, LoadImmWidth, LoadWidth, Opcode, RegOp, Register, ShiftOp,
    StoreWidth, StreamOp,
};

/// One decoded instruction and the word index of its head word
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slot {
    pub index: usize,
    pub instr: Instruction,
}

impl Slot {
    /// Index of the word after this instruction
    pub fn next(&self) -> usize {
        self.index + self.instr.word_count()
    }
}

/// Check whether `word` is the head of a two-word instruction
pub fn needs_extension(word: u32) -> bool {
    let funct3 = extract_funct3(word);
    match Opcode::from_u8(extract_opcode(word) as u8) {
        Some(Opcode::Lwi) => funct3 == FUNCT3_LLWI,
        Some(Opcode::LoadImm) => true,
        Some(Opcode::Stream) => funct3 == stream::GOTO_I,
        _ => false,
    }
}

/// Decode a single-word instruction
pub fn decode(word: u32) -> Result<Instruction> {
    if needs_extension(word) {
        return Err(DisassemblerError::TruncatedInstruction(0));
    }
    decode_with(word, 0)
}

/// Decode the instruction whose head word is `words[index]`
pub fn decode_at(words: &[u32], index: usize) -> Result<Slot> {
    let word = words[index];
    let ext = if needs_extension(word) {
        *words.get(index + 1).ok_or(DisassemblerError::TruncatedInstruction(index))?
    } else {
        0
    };
    Ok(Slot { index, instr: decode_with(word, ext)? })
}

/// Decode a whole word stream into slots
pub fn decode_program(words: &[u32]) -> Result<Vec<Slot>> {
    let mut slots = Vec::with_capacity(words.len());
    let mut index = 0;
    while index < words.len() {
        let slot = decode_at(words, index)?;
        index = slot.next();
        slots.push(slot);
    }
    Ok(slots)
}

fn decode_with(word: u32, ext: u32) -> Result<Instruction> {
    if word == ERROR_WORD {
        return Ok(Instruction::Error);
    }
    if word == NOP_WORD {
        return Ok(Instruction::Nop);
    }

    let opcode = extract_opcode(word) as u8;
    let funct3 = extract_funct3(word);
    let invalid = || DisassemblerError::InvalidEncoding(word);

    match Opcode::from_u8(opcode).ok_or(DisassemblerError::UnknownOpcode(opcode))? {
        Opcode::Lwi => match funct3 {
            FUNCT3_LHWI => Ok(Instruction::Lhwi { rd: rd(word)?, imm: extract_lhwi_imm(word) as u16 }),
            FUNCT3_LLWI => Ok(Instruction::Llwi { rd: rd(word)?, imm: extract_wide_value(word, ext) }),
            _ => Err(invalid()),
        },
        Opcode::Load => Ok(Instruction::Load {
            rd: rd(word)?,
            rs1: rs1(word)?,
            offset: extract_imm12(word) as u16,
            width: LoadWidth::from_funct3(funct3).ok_or_else(invalid)?,
        }),
        Opcode::LoadImm => Ok(Instruction::LoadImm {
            rd: rd(word)?,
            addr: extract_wide_value(word, ext),
            width: LoadImmWidth::from_funct3(funct3).ok_or_else(invalid)?,
        }),
        Opcode::Store => Ok(Instruction::Store {
            rs1: rs1(word)?,
            rs2: rs2(word)?,
            offset: extract_store_imm(word) as u16,
            width: StoreWidth::from_funct3(funct3).ok_or_else(invalid)?,
        }),
        Opcode::OpImm => decode_op_imm(word),
        Opcode::Op => Ok(Instruction::Op {
            rd: rd(word)?,
            rs1: rs1(word)?,
            rs2: rs2(word)?,
            op: RegOp::from_fields(funct3, extract_funct7(word)).ok_or_else(invalid)?,
        }),
        Opcode::Branch => Ok(Instruction::Branch {
            rs1: rs1(word)?,
            rs2: rs2(word)?,
            cond: BranchCond::from_funct3(funct3).ok_or_else(invalid)?,
            offset: extract_jump_offset(word) as i8,
        }),
        Opcode::Loop => Ok(Instruction::Loop {
            rs1: rs1(word)?,
            delay: extract_loop_delay(word) as u16,
            offset: extract_jump_offset(word) as i8,
        }),
        Opcode::FuncCall => Ok(Instruction::FuncCall { rs1: rs1(word)?, rs2: rs2(word)? }),
        Opcode::System => {
            let rd = match extract_rd(word) {
                0 => None,
                _ => Some(rd(word)?),
            };
            Ok(Instruction::Csr {
                rd,
                rs1: rs1(word)?,
                csr: Csr::from_id(extract_csr(word)).ok_or_else(invalid)?,
                mode: CsrMode::from_funct3(funct3).ok_or_else(invalid)?,
            })
        }
        Opcode::Stream => {
            let sq_id = extract_sq_id(word) as u16;
            let op = match funct3 {
                stream::ACTIVE_I => StreamOp::ActivateI { sq_id },
                stream::DEACTIVE_I => StreamOp::DeactivateI { sq_id },
                stream::GOTO_I => StreamOp::GotoI { sq_id, head: ext },
                stream::ACTIVE_R => StreamOp::ActivateR { rs1: rs1(word)? },
                stream::DEACTIVE_R => StreamOp::DeactivateR { rs1: rs1(word)? },
                stream::GOTO_R => StreamOp::GotoR { rs1: rs1(word)? },
                _ => return Err(invalid()),
            };
            Ok(Instruction::Stream { rd: rd(word)?, op })
        }
        Opcode::Gqm => Ok(Instruction::Gqm { rd: rd(word)?, rs1: rs1(word)?, rs2: rs2(word)? }),
    }
}

fn decode_op_imm(word: u32) -> Result<Instruction> {
    let funct3 = extract_funct3(word);
    if let Some(op) = ShiftOp::from_fields(funct3, extract_shift_fn(word)) {
        return Ok(Instruction::ShiftImm {
            rd: rd(word)?,
            rs1: rs1(word)?,
            shamt: extract_shamt(word) as u8,
            op,
        });
    }
    let op = ImmOp::from_funct3(funct3).ok_or(DisassemblerError::InvalidEncoding(word))?;
    Ok(Instruction::OpImm { rd: rd(word)?, rs1: rs1(word)?, imm: extract_imm12(word) as u16, op })
}

fn register(word: u32, field: u32) -> Result<Register> {
    Register::from_index(field as usize).ok_or(DisassemblerError::InvalidEncoding(word))
}

fn rd(word: u32) -> Result<Register> {
    register(word, extract_rd(word))
}

fn rs1(word: u32) -> Result<Register> {
    register(word, extract_rs1(word))
}

fn rs2(word: u32) -> Result<Register> {
    register(word, extract_rs2(word))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminals() {
        assert_eq!(decode(0).unwrap(), Instruction::Error);
        assert_eq!(decode(0x13).unwrap(), Instruction::Nop);
    }

    #[test]
    fn test_decode_shift() {
        // slli r3, r2, 3
        let word = 0x13 | (3 << 7) | (1 << 12) | (2 << 15) | (3 << 20);
        assert_eq!(
            decode(word).unwrap(),
            Instruction::ShiftImm { rd: Register::R3, rs1: Register::R2, shamt: 3, op: ShiftOp::Slli }
        );
    }

    #[test]
    fn test_decode_llwi_needs_extension() {
        let head = 0x0B | (1 << 7) | (1 << 12) | (0x1 << 15);
        assert!(needs_extension(head));
        assert!(matches!(decode(head), Err(DisassemblerError::TruncatedInstruction(_))));
        assert!(matches!(decode_at(&[head], 0), Err(DisassemblerError::TruncatedInstruction(0))));

        let slot = decode_at(&[head, 0x2000], 0).unwrap();
        assert_eq!(slot.instr, Instruction::Llwi { rd: Register::R1, imm: 0x1_0000_2000 });
        assert_eq!(slot.next(), 2);
    }

    #[test]
    fn test_csr_without_destination() {
        // csrrw jump_pc, r5
        let word = 0x73 | (1 << 12) | (5 << 15) | (0x803 << 20);
        assert_eq!(
            decode(word).unwrap(),
            Instruction::Csr { rd: None, rs1: Register::R5, csr: Csr::JumpPc, mode: CsrMode::ReadWrite }
        );
    }

    #[test]
    fn test_invalid_fields() {
        assert!(matches!(decode(0x7F), Err(DisassemblerError::UnknownOpcode(0x7F))));
        // register field 11
        assert!(matches!(decode(0x33 | (11 << 7)), Err(DisassemblerError::InvalidEncoding(_))));
        // unknown CSR
        assert!(matches!(decode(0x73 | (1 << 12) | (0x123 << 20)), Err(DisassemblerError::InvalidEncoding(_))));
        // branch func3 2
        assert!(matches!(decode(0x63 | (2 << 12)), Err(DisassemblerError::InvalidEncoding(_))));
    }

    #[test]
    fn test_decode_program_skips_extensions() {
        // lhwi r1, 0; llwi r1, 5; nop
        let words = [0x0B | (1 << 7), 0x0B | (1 << 7) | (1 << 12), 5, 0x13];
        let slots = decode_program(&words).unwrap();
        assert_eq!(slots.len(), 3);
        assert_eq!(slots[1].instr, Instruction::Llwi { rd: Register::R1, imm: 5 });
        assert_eq!(slots[2].index, 3);
    }
}
