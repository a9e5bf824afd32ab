//! # Conditional micro-ISA disassembler
//!
//! Decodes program words back into [`Instruction`](cisa_spec::Instruction)s,
//! renders listings and checks control flow.
//!
//! ## Example
//!
//! ```rust
//! use cisa_builder::{build_frame_align, FrameAlignParams};
//! use cisa_disassembler::{check_program, disassemble};
//! use cisa_spec::Program;
//!
//! let mut program = Program::new();
//! let params = FrameAlignParams { result_flag_addr: 0x8000, sq_id: 3 };
//! build_frame_align(&params, &mut program).unwrap();
//!
//! println!("{}", disassemble(&program).unwrap());
//! assert!(check_program(&program).unwrap().is_clean());
//! ```

pub mod analysis;
pub mod decoder;
pub mod disassembler;
pub mod error;
pub mod formatter;

pub use analysis::{check, check_program, Finding, Report};
pub use decoder::{decode, decode_at, decode_program, Slot};
pub use disassembler::{disassemble, disassemble_bytes};
pub use error::{DisassemblerError, Result};
pub use formatter::format;
