//! Instruction formatting for listings

use cisa_spec::{Instruction, Register, StreamOp};

/// Width the mnemonic column is padded to
const MNEMONIC_WIDTH: usize = 10;

/// Format an instruction as listing text
pub fn format(instr: &Instruction) -> String {
    let operands = match instr {
        // ========== Load word immediate ==========
        Instruction::Lhwi { rd, imm } => format!("{}, {:#x}", reg(*rd), imm),
        Instruction::Llwi { rd, imm } => format!("{}, {:#x}", reg(*rd), imm),

        // ========== Memory ==========
        Instruction::Load { rd, rs1, offset, .. } => format!("{}, {}({})", reg(*rd), offset, reg(*rs1)),
        Instruction::LoadImm { rd, addr, .. } => format!("{}, [{:#x}]", reg(*rd), addr),
        Instruction::Store { rs1, rs2, offset, .. } => format!("{}, {}({})", reg(*rs2), offset, reg(*rs1)),

        // ========== ALU ==========
        Instruction::OpImm { rd, rs1, imm, .. } => format!("{}, {}, {}", reg(*rd), reg(*rs1), imm),
        Instruction::ShiftImm { rd, rs1, shamt, .. } => format!("{}, {}, {}", reg(*rd), reg(*rs1), shamt),
        Instruction::Op { rd, rs1, rs2, .. } => format!("{}, {}, {}", reg(*rd), reg(*rs1), reg(*rs2)),

        // ========== Control flow ==========
        Instruction::Branch { rs1, rs2, offset, .. } => format!("{}, {}, {:+}", reg(*rs1), reg(*rs2), offset),
        Instruction::Loop { rs1, delay, offset } => format!("{}, {}, {:+}", reg(*rs1), delay, offset),
        Instruction::FuncCall { rs1, rs2 } => format!("{}, {}", reg(*rs1), reg(*rs2)),

        // ========== Device ==========
        Instruction::Csr { rd: Some(rd), rs1, csr, .. } => format!("{}, {}, {}", reg(*rd), csr, reg(*rs1)),
        Instruction::Csr { rd: None, rs1, csr, .. } => format!("{}, {}", csr, reg(*rs1)),
        Instruction::Stream { rd, op } => match op {
            StreamOp::ActivateI { sq_id } | StreamOp::DeactivateI { sq_id } => {
                format!("{}, sq{}", reg(*rd), sq_id)
            }
            StreamOp::GotoI { sq_id, head } => format!("{}, sq{}, {:#x}", reg(*rd), sq_id, head),
            StreamOp::ActivateR { rs1 } | StreamOp::DeactivateR { rs1 } | StreamOp::GotoR { rs1 } => {
                format!("{}, {}", reg(*rd), reg(*rs1))
            }
        },
        Instruction::Gqm { rd, rs1, rs2 } => format!("{}, {}, {}", reg(*rd), reg(*rs1), reg(*rs2)),

        // ========== Terminals ==========
        Instruction::Error | Instruction::Nop => return instr.mnemonic().to_string(),
    };
    format!("{:<width$}{}", instr.mnemonic(), operands, width = MNEMONIC_WIDTH)
}

/// One listing line for a head word
pub fn format_line(index: usize, word: u32, text: &str) -> String {
    format!("0x{:04X}:  {:08X}  {}", index, word, text)
}

/// One listing line for an extension word
pub fn format_ext(index: usize, word: u32) -> String {
    format_line(index, word, ".ext")
}

fn reg(reg: Register) -> &'static str {
    reg.name()
}
