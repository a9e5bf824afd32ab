//! # Conditional micro-ISA opcode definitions
//!
//! Opcodes occupy the low 7 bits of every head word. Values follow the
//! RISC-V major-opcode map where the operation exists there:
//! - 0x03 / 0x07: Load (register base / absolute address)
//! - 0x0B: Load word immediate (LHWI, LLWI)
//! - 0x13 / 0x33: Immediate and register ALU ops
//! - 0x23: Store
//! - 0x2B / 0x63: Loop and branch
//! - 0x5B: Stream control
//! - 0x6B: Function call
//! - 0x73: System (CSR access)
//! - 0x7B: Queue manager (GQM)
//!
//! The all-zero word is not an opcode; it is the error sentinel.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Instruction opcode (7 bits)
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Opcode {
    /// LOAD: rd = mem[rs1 + imm]
    Load = 0x03,
    /// LOAD_IMM: rd = mem[addr49], address carried in an extension word
    LoadImm = 0x07,
    /// LWI: load one half of a 64-bit immediate (LHWI / LLWI)
    Lwi = 0x0B,
    /// OP_IMM: rd = rs1 op imm
    OpImm = 0x13,
    /// STORE: mem[rs1 + imm] = rs2
    Store = 0x23,
    /// LOOP: while rs1 != 0 wait delay cycles and jump
    Loop = 0x2B,
    /// OP: rd = rs1 op rs2
    Op = 0x33,
    /// STREAM: activate, deactivate or redirect a hardware sub-queue
    Stream = 0x5B,
    /// BRANCH: if rs1 cmp rs2 jump
    Branch = 0x63,
    /// FUNC_CALL: call into another program
    FuncCall = 0x6B,
    /// SYSTEM: CSR read/modify/write
    System = 0x73,
    /// GQM: queue manager push/pop
    Gqm = 0x7B,
}

impl Opcode {
    /// Opcode width in bits
    pub const BITS: usize = 7;

    /// Opcode mask (0x7F for 7 bits)
    pub const MASK: u32 = 0x7F;

    /// Every opcode, in ascending value order
    pub const ALL: [Opcode; 12] = [
        Opcode::Load,
        Opcode::LoadImm,
        Opcode::Lwi,
        Opcode::OpImm,
        Opcode::Store,
        Opcode::Loop,
        Opcode::Op,
        Opcode::Stream,
        Opcode::Branch,
        Opcode::FuncCall,
        Opcode::System,
        Opcode::Gqm,
    ];

    /// Try to convert from u8
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0x03 => Some(Opcode::Load),
            0x07 => Some(Opcode::LoadImm),
            0x0B => Some(Opcode::Lwi),
            0x13 => Some(Opcode::OpImm),
            0x23 => Some(Opcode::Store),
            0x2B => Some(Opcode::Loop),
            0x33 => Some(Opcode::Op),
            0x5B => Some(Opcode::Stream),
            0x63 => Some(Opcode::Branch),
            0x6B => Some(Opcode::FuncCall),
            0x73 => Some(Opcode::System),
            0x7B => Some(Opcode::Gqm),
            _ => None,
        }
    }

    /// Convert to u8
    #[inline]
    pub const fn to_u8(self) -> u8 {
        self as u8
    }

    /// Extract opcode from a 32-bit head word
    #[inline]
    pub fn from_instruction(instruction: u32) -> Option<Self> {
        Self::from_u8((instruction & Self::MASK) as u8)
    }

    /// Check if this opcode transfers control to a word offset
    #[inline]
    pub const fn is_jump(self) -> bool {
        matches!(self, Opcode::Branch | Opcode::Loop)
    }

    /// Check if this opcode reads or writes device memory
    #[inline]
    pub const fn is_memory(self) -> bool {
        matches!(self, Opcode::Load | Opcode::LoadImm | Opcode::Store)
    }

    pub const fn name(self) -> &'static str {
        match self {
            Opcode::Load => "LOAD",
            Opcode::LoadImm => "LOAD_IMM",
            Opcode::Lwi => "LWI",
            Opcode::OpImm => "OP_IMM",
            Opcode::Store => "STORE",
            Opcode::Loop => "LOOP",
            Opcode::Op => "OP",
            Opcode::Stream => "STREAM",
            Opcode::Branch => "BRANCH",
            Opcode::FuncCall => "FUNC_CALL",
            Opcode::System => "SYSTEM",
            Opcode::Gqm => "GQM",
        }
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
