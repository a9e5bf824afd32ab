//! # Function codes
//!
//! Each opcode is refined by a 3-bit `func3` field and, for register ALU
//! ops and immediate shifts, by a `func7` / shift-function field. Values
//! follow RISC-V wherever the operation exists there.

use serde::{Deserialize, Serialize};

// ============================================================================
// Loads and stores
// ============================================================================

/// Access width of a register-based load (LOAD opcode)
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LoadWidth {
    Byte = 0,
    Half = 1,
    Word = 2,
    /// LDR, the only width current programs use
    Double = 3,
}

impl LoadWidth {
    pub fn from_funct3(bits: u32) -> Option<Self> {
        match bits {
            0 => Some(Self::Byte),
            1 => Some(Self::Half),
            2 => Some(Self::Word),
            3 => Some(Self::Double),
            _ => None,
        }
    }

    #[inline]
    pub const fn funct3(self) -> u32 {
        self as u32
    }

    pub const fn mnemonic(self) -> &'static str {
        match self {
            Self::Byte => "lb",
            Self::Half => "lh",
            Self::Word => "lw",
            Self::Double => "ldr",
        }
    }
}

/// Access width of an absolute-address load (LOAD_IMM opcode)
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LoadImmWidth {
    Ld = 3,
    Lbu = 4,
    Lhu = 5,
    Lwu = 6,
}

impl LoadImmWidth {
    pub fn from_funct3(bits: u32) -> Option<Self> {
        match bits {
            3 => Some(Self::Ld),
            4 => Some(Self::Lbu),
            5 => Some(Self::Lhu),
            6 => Some(Self::Lwu),
            _ => None,
        }
    }

    #[inline]
    pub const fn funct3(self) -> u32 {
        self as u32
    }

    pub const fn mnemonic(self) -> &'static str {
        match self {
            Self::Ld => "ld.i",
            Self::Lbu => "lbu.i",
            Self::Lhu => "lhu.i",
            Self::Lwu => "lwu.i",
        }
    }
}

/// Access width of a store
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StoreWidth {
    Byte = 0,
    Half = 1,
    Word = 2,
    Double = 3,
}

impl StoreWidth {
    pub fn from_funct3(bits: u32) -> Option<Self> {
        match bits {
            0 => Some(Self::Byte),
            1 => Some(Self::Half),
            2 => Some(Self::Word),
            3 => Some(Self::Double),
            _ => None,
        }
    }

    #[inline]
    pub const fn funct3(self) -> u32 {
        self as u32
    }

    pub const fn mnemonic(self) -> &'static str {
        match self {
            Self::Byte => "sb",
            Self::Half => "sh",
            Self::Word => "sw",
            Self::Double => "sd",
        }
    }
}

// ============================================================================
// Load word immediate
// ============================================================================

/// func3 of LHWI (high 15 bits of a 64-bit value)
pub const FUNCT3_LHWI: u32 = 0;
/// func3 of LLWI (low 49 bits of a 64-bit value)
pub const FUNCT3_LLWI: u32 = 1;

// ============================================================================
// ALU
// ============================================================================

/// Immediate ALU operation (OP_IMM opcode, excluding shifts)
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ImmOp {
    Addi = 0,
    Slti = 2,
    Sltiu = 3,
    Xori = 4,
    Ori = 6,
    Andi = 7,
}

impl ImmOp {
    pub fn from_funct3(bits: u32) -> Option<Self> {
        match bits {
            0 => Some(Self::Addi),
            2 => Some(Self::Slti),
            3 => Some(Self::Sltiu),
            4 => Some(Self::Xori),
            6 => Some(Self::Ori),
            7 => Some(Self::Andi),
            _ => None,
        }
    }

    #[inline]
    pub const fn funct3(self) -> u32 {
        self as u32
    }

    pub const fn mnemonic(self) -> &'static str {
        match self {
            Self::Addi => "addi",
            Self::Slti => "slti",
            Self::Sltiu => "sltiu",
            Self::Xori => "xori",
            Self::Ori => "ori",
            Self::Andi => "andi",
        }
    }
}

/// Immediate shift (OP_IMM opcode, func3 1 and 5)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShiftOp {
    Slli,
    Srli,
    Srai,
}

/// Shift function for logical shifts
pub const SHIFT_FN_LOGICAL: u32 = 0x00;
/// Shift function for the arithmetic right shift
pub const SHIFT_FN_ARITH: u32 = 0x10;

impl ShiftOp {
    pub fn from_fields(funct3: u32, shift_fn: u32) -> Option<Self> {
        match (funct3, shift_fn) {
            (1, SHIFT_FN_LOGICAL) => Some(Self::Slli),
            (5, SHIFT_FN_LOGICAL) => Some(Self::Srli),
            (5, SHIFT_FN_ARITH) => Some(Self::Srai),
            _ => None,
        }
    }

    pub const fn funct3(self) -> u32 {
        match self {
            Self::Slli => 1,
            Self::Srli | Self::Srai => 5,
        }
    }

    pub const fn shift_fn(self) -> u32 {
        match self {
            Self::Slli | Self::Srli => SHIFT_FN_LOGICAL,
            Self::Srai => SHIFT_FN_ARITH,
        }
    }

    pub const fn mnemonic(self) -> &'static str {
        match self {
            Self::Slli => "slli",
            Self::Srli => "srli",
            Self::Srai => "srai",
        }
    }
}

/// Register ALU operation (OP opcode)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RegOp {
    Add,
    Sub,
    And,
    Or,
    Xor,
    Sll,
    Srl,
    Sra,
    Slt,
    Sltu,
    Mul,
}

pub const FUNCT7_BASE: u32 = 0x00;
pub const FUNCT7_ALT: u32 = 0x20;
pub const FUNCT7_MULDIV: u32 = 0x01;

impl RegOp {
    pub const ALL: [RegOp; 11] = [
        RegOp::Add,
        RegOp::Sub,
        RegOp::And,
        RegOp::Or,
        RegOp::Xor,
        RegOp::Sll,
        RegOp::Srl,
        RegOp::Sra,
        RegOp::Slt,
        RegOp::Sltu,
        RegOp::Mul,
    ];

    /// (func3, func7)
    pub const fn fields(self) -> (u32, u32) {
        match self {
            Self::Add => (0, FUNCT7_BASE),
            Self::Sub => (0, FUNCT7_ALT),
            Self::Sll => (1, FUNCT7_BASE),
            Self::Slt => (2, FUNCT7_BASE),
            Self::Sltu => (3, FUNCT7_BASE),
            Self::Xor => (4, FUNCT7_BASE),
            Self::Srl => (5, FUNCT7_BASE),
            Self::Sra => (5, FUNCT7_ALT),
            Self::Or => (6, FUNCT7_BASE),
            Self::And => (7, FUNCT7_BASE),
            Self::Mul => (0, FUNCT7_MULDIV),
        }
    }

    pub fn from_fields(funct3: u32, funct7: u32) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.fields() == (funct3, funct7))
    }

    pub const fn mnemonic(self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Sub => "sub",
            Self::And => "and",
            Self::Or => "or",
            Self::Xor => "xor",
            Self::Sll => "sll",
            Self::Srl => "srl",
            Self::Sra => "sra",
            Self::Slt => "slt",
            Self::Sltu => "sltu",
            Self::Mul => "mul",
        }
    }
}

// ============================================================================
// Control flow
// ============================================================================

/// Branch comparison
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BranchCond {
    Eq = 0,
    Ne = 1,
    Lt = 4,
    Ge = 5,
    Ltu = 6,
    Geu = 7,
}

impl BranchCond {
    pub fn from_funct3(bits: u32) -> Option<Self> {
        match bits {
            0 => Some(Self::Eq),
            1 => Some(Self::Ne),
            4 => Some(Self::Lt),
            5 => Some(Self::Ge),
            6 => Some(Self::Ltu),
            7 => Some(Self::Geu),
            _ => None,
        }
    }

    #[inline]
    pub const fn funct3(self) -> u32 {
        self as u32
    }

    /// The comparison taken when this one is not.
    pub const fn negate(self) -> Self {
        match self {
            Self::Eq => Self::Ne,
            Self::Ne => Self::Eq,
            Self::Lt => Self::Ge,
            Self::Ge => Self::Lt,
            Self::Ltu => Self::Geu,
            Self::Geu => Self::Ltu,
        }
    }

    /// Evaluate the comparison on two register values.
    pub const fn holds(self, lhs: u64, rhs: u64) -> bool {
        match self {
            Self::Eq => lhs == rhs,
            Self::Ne => lhs != rhs,
            Self::Lt => (lhs as i64) < (rhs as i64),
            Self::Ge => (lhs as i64) >= (rhs as i64),
            Self::Ltu => lhs < rhs,
            Self::Geu => lhs >= rhs,
        }
    }

    pub const fn mnemonic(self) -> &'static str {
        match self {
            Self::Eq => "beq",
            Self::Ne => "bne",
            Self::Lt => "blt",
            Self::Ge => "bge",
            Self::Ltu => "bltu",
            Self::Geu => "bgeu",
        }
    }
}

/// func3 of LOOP
pub const FUNCT3_LOOP: u32 = 0;
/// func3 of FUNC_CALL
pub const FUNCT3_FUNC_CALL: u32 = 0;
/// func3 of GQM
pub const FUNCT3_GQM: u32 = 0;

// ============================================================================
// System and stream control
// ============================================================================

/// CSR access mode (SYSTEM opcode)
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CsrMode {
    /// CSRRW
    ReadWrite = 1,
    /// CSRRS
    ReadSet = 2,
    /// CSRRC
    ReadClear = 3,
}

impl CsrMode {
    pub fn from_funct3(bits: u32) -> Option<Self> {
        match bits {
            1 => Some(Self::ReadWrite),
            2 => Some(Self::ReadSet),
            3 => Some(Self::ReadClear),
            _ => None,
        }
    }

    #[inline]
    pub const fn funct3(self) -> u32 {
        self as u32
    }

    pub const fn mnemonic(self) -> &'static str {
        match self {
            Self::ReadWrite => "csrrw",
            Self::ReadSet => "csrrs",
            Self::ReadClear => "csrrc",
        }
    }
}

/// Stream control func3 values
pub mod stream {
    pub const ACTIVE_I: u32 = 0;
    pub const DEACTIVE_I: u32 = 1;
    pub const GOTO_I: u32 = 2;
    pub const ACTIVE_R: u32 = 4;
    pub const DEACTIVE_R: u32 = 5;
    pub const GOTO_R: u32 = 6;
}
