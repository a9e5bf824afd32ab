//! # Control and status registers
//!
//! The co-processor exposes a small set of CSRs through the SYSTEM opcode.
//! CSR ids occupy the 12-bit `csr` field of the head word.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Width of the CSR id field
pub const CSR_ID_BITS: u32 = 12;

/// Named CSR
#[repr(u16)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Csr {
    /// AXI user bits; selects virtual or physical addressing
    AxiUser = 0x800,
    /// Status word the device reports when a program stops on an error
    CsqStatus = 0x801,
    /// Execution info
    ExeInfo = 0x802,
    /// Absolute jump target used by the next branch or loop
    JumpPc = 0x803,
}

impl Csr {
    pub const ALL: [Csr; 4] = [Csr::AxiUser, Csr::CsqStatus, Csr::ExeInfo, Csr::JumpPc];

    pub fn from_id(id: u32) -> Option<Self> {
        match id {
            0x800 => Some(Self::AxiUser),
            0x801 => Some(Self::CsqStatus),
            0x802 => Some(Self::ExeInfo),
            0x803 => Some(Self::JumpPc),
            _ => None,
        }
    }

    #[inline]
    pub const fn id(self) -> u32 {
        self as u32
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::AxiUser => "axi_user",
            Self::CsqStatus => "csq_status",
            Self::ExeInfo => "exe_info",
            Self::JumpPc => "jump_pc",
        }
    }
}

impl fmt::Display for Csr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Diagnostic code written to `CSQ_STATUS` right before an error sentinel
#[repr(u16)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DiagCode {
    GqmEmpty = 0x5A5A,
    MbufInvalid = 0x5B5B,
    MbufAllocFail = 0x5C5C,
    QueueNotEnable = 0x6A6A,
    OverwriteNotEnable = 0x6B6B,
    InvalidCondition = 0x7A7B,
    CqEmpty = 0x7C7C,
    SqFsmBusy = 0x8A8A,
    SqAddrInvalid = 0x8B8B,
    SqNotDrained = 0x8C8C,
}

impl DiagCode {
    pub const ALL: [DiagCode; 10] = [
        DiagCode::GqmEmpty,
        DiagCode::MbufInvalid,
        DiagCode::MbufAllocFail,
        DiagCode::QueueNotEnable,
        DiagCode::OverwriteNotEnable,
        DiagCode::InvalidCondition,
        DiagCode::CqEmpty,
        DiagCode::SqFsmBusy,
        DiagCode::SqAddrInvalid,
        DiagCode::SqNotDrained,
    ];

    #[inline]
    pub const fn value(self) -> u64 {
        self as u64
    }

    pub fn from_value(value: u64) -> Option<Self> {
        Self::ALL.into_iter().find(|code| code.value() == value)
    }
}
