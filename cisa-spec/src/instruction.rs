//! Conditional micro-ISA instruction set
//!
//! Every instruction is one 32-bit head word. LLWI, LOAD_IMM and GOTO_I
//! carry one extension word right after the head word.
//!
//! ## Instruction Formats
//! - common: [opcode:7][rd:4][-:1][func3:3][rs1:4][-:1][rs2:4][-:1][hi:7]
//! - I:      [opcode:7][rd:4][-:1][func3:3][rs1:4][-:1][imm12:12]
//! - S:      [opcode:7][imm[4:0]:5][func3:3][rs1:4][-:1][rs2:4][-:1][imm[11:5]:7]
//! - B:      [opcode:7][off:4][dir:1][func3:3][rs1:4][-:1][rs2:4][-:8]
//! - LOOP:   [opcode:7][off:4][dir:1][func3:3][rs1:4][delay13:13]
//! - LWI:    [opcode:7][rd:4][-:1][func3:3][imm:17] (+ ext word for LLWI)

use crate::csr::Csr;
use crate::funct::{BranchCond, CsrMode, ImmOp, LoadImmWidth, LoadWidth, RegOp, ShiftOp, StoreWidth};
use crate::register::Register;
use serde::{Deserialize, Serialize};

/// Stream control operation, with its immediate or register operand
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StreamOp {
    ActivateI { sq_id: u16 },
    DeactivateI { sq_id: u16 },
    /// Redirect stream `sq_id` to word `head`; `head` is the extension word
    GotoI { sq_id: u16, head: u32 },
    ActivateR { rs1: Register },
    DeactivateR { rs1: Register },
    GotoR { rs1: Register },
}

impl StreamOp {
    pub fn mnemonic(&self) -> &'static str {
        match self {
            StreamOp::ActivateI { .. } => "active.i",
            StreamOp::DeactivateI { .. } => "deactive.i",
            StreamOp::GotoI { .. } => "goto.i",
            StreamOp::ActivateR { .. } => "active.r",
            StreamOp::DeactivateR { .. } => "deactive.r",
            StreamOp::GotoR { .. } => "goto.r",
        }
    }
}

/// Conditional micro-ISA instruction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Instruction {
    // ========== Load word immediate ==========
    /// LHWI: rd[63:49] = imm15. Always directly followed by LLWI on the same rd.
    Lhwi { rd: Register, imm: u16 },

    /// LLWI: rd[48:0] = imm49
    Llwi { rd: Register, imm: u64 },

    // ========== Memory ==========
    /// LOAD: rd = mem[rs1 + offset]
    Load { rd: Register, rs1: Register, offset: u16, width: LoadWidth },

    /// LOAD_IMM: rd = mem[addr]
    LoadImm { rd: Register, addr: u64, width: LoadImmWidth },

    /// STORE: mem[rs1 + offset] = rs2
    Store { rs1: Register, rs2: Register, offset: u16, width: StoreWidth },

    // ========== ALU ==========
    /// OP_IMM: rd = rs1 op imm12
    OpImm { rd: Register, rs1: Register, imm: u16, op: ImmOp },

    /// OP_IMM shifts: rd = rs1 op shamt
    ShiftImm { rd: Register, rs1: Register, shamt: u8, op: ShiftOp },

    /// OP: rd = rs1 op rs2
    Op { rd: Register, rs1: Register, rs2: Register, op: RegOp },

    // ========== Control flow ==========
    /// BRANCH: if rs1 cond rs2, pc += offset (words)
    Branch { rs1: Register, rs2: Register, cond: BranchCond, offset: i8 },

    /// LOOP: if rs1 != 0, wait `delay` cycles and pc += offset (words)
    Loop { rs1: Register, delay: u16, offset: i8 },

    /// FUNC_CALL
    FuncCall { rs1: Register, rs2: Register },

    // ========== Device ==========
    /// SYSTEM: rd = csr; csr = mode(csr, rs1). `None` discards the old value.
    Csr { rd: Option<Register>, rs1: Register, csr: Csr, mode: CsrMode },

    /// STREAM: stream control, status to rd
    Stream { rd: Register, op: StreamOp },

    /// GQM: queue manager command rs1 on queue rs2; status to rd, value to rd+1
    Gqm { rd: Register, rs1: Register, rs2: Register },

    // ========== Terminals ==========
    /// The all-zero word; stops the program with an error
    Error,

    /// ADDI r0, r0, 0; ends the program
    Nop,
}

impl Instruction {
    /// Get instruction mnemonic
    pub fn mnemonic(&self) -> &'static str {
        match self {
            Instruction::Lhwi { .. } => "lhwi",
            Instruction::Llwi { .. } => "llwi",
            Instruction::Load { width, .. } => width.mnemonic(),
            Instruction::LoadImm { width, .. } => width.mnemonic(),
            Instruction::Store { width, .. } => width.mnemonic(),
            Instruction::OpImm { op, .. } => op.mnemonic(),
            Instruction::ShiftImm { op, .. } => op.mnemonic(),
            Instruction::Op { op, .. } => op.mnemonic(),
            Instruction::Branch { cond, .. } => cond.mnemonic(),
            Instruction::Loop { .. } => "loop",
            Instruction::FuncCall { .. } => "call",
            Instruction::Csr { mode, .. } => mode.mnemonic(),
            Instruction::Stream { op, .. } => op.mnemonic(),
            Instruction::Gqm { .. } => "gqm",
            Instruction::Error => "error",
            Instruction::Nop => "nop",
        }
    }

    /// Number of 32-bit words this instruction occupies
    pub fn word_count(&self) -> usize {
        match self {
            Instruction::Llwi { .. }
            | Instruction::LoadImm { .. }
            | Instruction::Stream { op: StreamOp::GotoI { .. }, .. } => 2,
            _ => 1,
        }
    }

    /// Check if this is a branch or loop
    pub fn is_jump(&self) -> bool {
        matches!(self, Instruction::Branch { .. } | Instruction::Loop { .. })
    }

    /// Inline word offset of a branch or loop
    pub fn jump_offset(&self) -> Option<i8> {
        match self {
            Instruction::Branch { offset, .. } | Instruction::Loop { offset, .. } => Some(*offset),
            _ => None,
        }
    }

    /// Check if this instruction ends the program
    pub fn is_terminal(&self) -> bool {
        matches!(self, Instruction::Error | Instruction::Nop)
    }

    /// Get destination register if present
    pub fn rd(&self) -> Option<Register> {
        match self {
            Instruction::Lhwi { rd, .. }
            | Instruction::Llwi { rd, .. }
            | Instruction::Load { rd, .. }
            | Instruction::LoadImm { rd, .. }
            | Instruction::OpImm { rd, .. }
            | Instruction::ShiftImm { rd, .. }
            | Instruction::Op { rd, .. }
            | Instruction::Stream { rd, .. }
            | Instruction::Gqm { rd, .. } => Some(*rd),
            Instruction::Csr { rd, .. } => *rd,
            _ => None,
        }
    }

    /// Every register this instruction writes. GQM writes rd and rd + 1.
    pub fn destinations(&self) -> Vec<Register> {
        match self {
            Instruction::Gqm { rd, .. } => std::iter::once(*rd).chain(rd.next()).collect(),
            other => other.rd().into_iter().collect(),
        }
    }
}

impl std::fmt::Display for Instruction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let m = self.mnemonic();
        match self {
            Instruction::Lhwi { rd, imm } => write!(f, "{m} {rd}, {imm:#x}"),
            Instruction::Llwi { rd, imm } => write!(f, "{m} {rd}, {imm:#x}"),
            Instruction::Load { rd, rs1, offset, .. } => write!(f, "{m} {rd}, {offset}({rs1})"),
            Instruction::LoadImm { rd, addr, .. } => write!(f, "{m} {rd}, {addr:#x}"),
            Instruction::Store { rs1, rs2, offset, .. } => {
                write!(f, "{m} {rs2}, {offset}({rs1})")
            }
            Instruction::OpImm { rd, rs1, imm, .. } => write!(f, "{m} {rd}, {rs1}, {imm}"),
            Instruction::ShiftImm { rd, rs1, shamt, .. } => write!(f, "{m} {rd}, {rs1}, {shamt}"),
            Instruction::Op { rd, rs1, rs2, .. } => write!(f, "{m} {rd}, {rs1}, {rs2}"),
            Instruction::Branch { rs1, rs2, offset, .. } => {
                write!(f, "{m} {rs1}, {rs2}, {offset:+}")
            }
            Instruction::Loop { rs1, delay, offset } => write!(f, "{m} {rs1}, {delay}, {offset:+}"),
            Instruction::FuncCall { rs1, rs2 } => write!(f, "{m} {rs1}, {rs2}"),
            Instruction::Csr { rd: Some(rd), rs1, csr, .. } => write!(f, "{m} {rd}, {csr}, {rs1}"),
            Instruction::Csr { rd: None, rs1, csr, .. } => write!(f, "{m} {csr}, {rs1}"),
            Instruction::Stream { rd, op } => match op {
                StreamOp::ActivateI { sq_id } | StreamOp::DeactivateI { sq_id } => {
                    write!(f, "{m} {rd}, {sq_id}")
                }
                StreamOp::GotoI { sq_id, head } => write!(f, "{m} {rd}, {sq_id}, {head:#x}"),
                StreamOp::ActivateR { rs1 }
                | StreamOp::DeactivateR { rs1 }
                | StreamOp::GotoR { rs1 } => write!(f, "{m} {rd}, {rs1}"),
            },
            Instruction::Gqm { rd, rs1, rs2 } => write!(f, "{m} {rd}, {rs1}, {rs2}"),
            Instruction::Error | Instruction::Nop => f.write_str(m),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_word_count() {
        assert_eq!(Instruction::Lhwi { rd: Register::R1, imm: 0 }.word_count(), 1);
        assert_eq!(Instruction::Llwi { rd: Register::R1, imm: 0 }.word_count(), 2);
        let goto = Instruction::Stream {
            rd: Register::R2,
            op: StreamOp::GotoI { sq_id: 3, head: 0 },
        };
        assert_eq!(goto.word_count(), 2);
        let goto_r = Instruction::Stream {
            rd: Register::R2,
            op: StreamOp::GotoR { rs1: Register::R3 },
        };
        assert_eq!(goto_r.word_count(), 1);
    }

    #[test]
    fn test_csr_without_destination() {
        let csr = Instruction::Csr {
            rd: None,
            rs1: Register::R1,
            csr: Csr::JumpPc,
            mode: CsrMode::ReadWrite,
        };
        assert_eq!(csr.rd(), None);
        assert_eq!(csr.to_string(), "csrrw jump_pc, r1");
    }

    #[test]
    fn test_gqm_writes_pair() {
        let gqm = Instruction::Gqm { rd: Register::R6, rs1: Register::R1, rs2: Register::R3 };
        assert_eq!(gqm.destinations(), vec![Register::R6, Register::R7]);
    }

    #[test]
    fn test_display() {
        let ld = Instruction::Load {
            rd: Register::R4,
            rs1: Register::R2,
            offset: 8,
            width: LoadWidth::Double,
        };
        assert_eq!(ld.to_string(), "ldr r4, 8(r2)");
        let b = Instruction::Branch {
            rs1: Register::R6,
            rs2: Register::R3,
            cond: BranchCond::Lt,
            offset: -7,
        };
        assert_eq!(b.to_string(), "blt r6, r3, -7");
        assert_eq!(Instruction::Nop.to_string(), "nop");
    }

    #[test]
    fn test_terminals() {
        assert!(Instruction::Nop.is_terminal());
        assert!(Instruction::Error.is_terminal());
        assert!(!Instruction::FuncCall { rs1: Register::R1, rs2: Register::R2 }.is_terminal());
    }
}
