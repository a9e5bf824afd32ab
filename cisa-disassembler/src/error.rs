//! Disassembler errors

use cisa_spec::CondIsaError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DisassemblerError {
    #[error("Invalid instruction encoding: 0x{0:08X}")]
    InvalidEncoding(u32),

    #[error("Unknown opcode: 0x{0:02X}")]
    UnknownOpcode(u8),

    #[error("Instruction at word {0} is missing its extension word")]
    TruncatedInstruction(usize),

    #[error(transparent)]
    Spec(#[from] CondIsaError),
}

pub type Result<T> = std::result::Result<T, DisassemblerError>;
