//! # Error Types for the conditional micro-ISA

use crate::config::ConfigError;
use crate::register::Register;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CondIsaError {
    // Configuration errors
    #[error("Invalid configuration: {0}")]
    InvalidConfig(#[from] ConfigError),

    // Operand errors
    #[error("Invalid register index: {0} (valid range: 0-10)")]
    InvalidRegister(u8),

    #[error("{mnemonic} cannot write r0")]
    ZeroDestination { mnemonic: &'static str },

    #[error("{field} value {value:#x} does not fit in {bits} bits")]
    ImmediateOutOfRange { field: &'static str, value: u64, bits: u32 },

    #[error("Jump offset {0} exceeds the inline range of ±15 words")]
    JumpOffsetOutOfRange(i64),

    #[error("GQM status register {0} has no successor for the popped value")]
    GqmStatusRegister(Register),

    // Pairing errors
    #[error("LLWI at word {0} is not preceded by LHWI")]
    UnpairedLowImmediate(usize),

    #[error("LHWI at word {0} is not followed by LLWI")]
    UnpairedHighImmediate(usize),

    #[error("LHWI/LLWI pair at word {word} targets {high} and {low}")]
    PairRegisterMismatch { word: usize, high: Register, low: Register },

    // Program format errors
    #[error("Invalid instruction encoding: {0:#010x}")]
    InvalidEncoding(u32),

    #[error("Invalid opcode: {0:#04x}")]
    InvalidOpcode(u8),

    #[error("Invalid program size: {0} bytes is not a whole number of words")]
    InvalidProgramSize(usize),

    #[error("Output buffer too small: need {needed} bytes, have {available}")]
    BufferTooSmall { needed: usize, available: usize },

    #[error("Program snapshot error: {0}")]
    Snapshot(#[from] bincode::Error),
}

impl CondIsaError {
    /// Check if this error comes from misusing the encoder, as opposed to
    /// reading malformed program bytes
    pub fn is_misuse(&self) -> bool {
        matches!(
            self,
            CondIsaError::InvalidRegister(_)
                | CondIsaError::ZeroDestination { .. }
                | CondIsaError::ImmediateOutOfRange { .. }
                | CondIsaError::JumpOffsetOutOfRange(_)
                | CondIsaError::GqmStatusRegister(_)
                | CondIsaError::UnpairedLowImmediate(_)
                | CondIsaError::UnpairedHighImmediate(_)
                | CondIsaError::PairRegisterMismatch { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, CondIsaError>;
