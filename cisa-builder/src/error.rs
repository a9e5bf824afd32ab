//! Builder errors

use cisa_spec::CondIsaError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BuilderError {
    #[error(transparent)]
    Encoding(#[from] CondIsaError),

    #[error("Undefined label: {0}")]
    UndefinedLabel(String),

    #[error("Duplicate label: {0}")]
    DuplicateLabel(String),

    #[error("Jump target word {target} exceeds the JUMP_PC limit {max}")]
    JumpTargetOutOfRange { target: usize, max: u64 },

    #[error("Invalid parameter {name}: {value:#x} ({reason})")]
    InvalidParameter {
        name: &'static str,
        value: u64,
        reason: &'static str,
    },
}

impl BuilderError {
    /// Shorthand for a parameter that does not fit the field it is encoded into
    pub(crate) fn field_overflow(name: &'static str, value: u64, bits: u32) -> Self {
        let reason = match bits {
            11 => "must fit in 11 bits",
            12 => "must fit in 12 bits",
            16 => "must fit in 16 bits",
            _ => "out of range",
        };
        BuilderError::InvalidParameter { name, value, reason }
    }
}

pub type Result<T> = std::result::Result<T, BuilderError>;
