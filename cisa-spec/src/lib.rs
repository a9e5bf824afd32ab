//! # Conditional micro-ISA specification
//!
//! Fixed-width instruction set executed by the queue-management
//! co-processor of an accelerator. The host encodes short, statically
//! shaped programs; the device's queue engine runs them on its own.
//!
//! ## Key Features
//! - 32-bit words, 7-bit opcodes, 4-bit register fields
//! - 11 registers (r0 hard-wired to zero)
//! - 64-bit immediates loaded by an adjacent LHWI/LLWI pair
//! - Inline jumps of ±15 words, longer jumps relayed through the JUMP_PC CSR
//! - Device errors reported through CSQ_STATUS before the all-zero sentinel

pub mod config;
pub mod csr;
pub mod encoding;
pub mod error;
pub mod funct;
pub mod instruction;
pub mod opcode;
pub mod program;
pub mod register;

pub use config::{ConfigError, IsaConfig};
pub use csr::{Csr, DiagCode};
pub use error::{CondIsaError, Result};
pub use funct::{BranchCond, CsrMode, ImmOp, LoadImmWidth, LoadWidth, RegOp, ShiftOp, StoreWidth};
pub use instruction::{Instruction, StreamOp};
pub use opcode::Opcode;
pub use program::Program;
pub use register::{Register, NUM_REGISTERS};

/// ISA version: 2.1 = 0x00020001
pub const ISA_VERSION: u32 = 0x0002_0001;
