//! Conditional micro-ISA program builders
//!
//! Turn a parameter struct into a ready-to-run device program.
//!
//! ## Example
//!
//! ```rust
//! use cisa_builder::{build_frame_align, FrameAlignParams};
//! use cisa_spec::Program;
//!
//! let params = FrameAlignParams { result_flag_addr: 0x8000, sq_id: 3 };
//! let mut program = Program::new();
//! build_frame_align(&params, &mut program).unwrap();
//! assert_eq!(program.words().last(), Some(&0x13));
//! ```

pub mod behavior;
pub mod builders;
pub mod device;
pub mod encoder;
pub mod error;
pub mod fragments;
pub mod layout;
pub mod ops;
pub mod params;

pub use behavior::{build, build_in, Behavior, BehaviorParams};
pub use builders::*;
pub use encoder::{encode, encode_into};
pub use error::{BuilderError, Result};
pub use layout::{JumpKind, LabelKey, Layout, SlotTable, RELAY_WORDS};
pub use params::*;
