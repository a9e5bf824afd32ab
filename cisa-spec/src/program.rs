//! # Program container
//!
//! A program is the ordered list of 32-bit words one builder call produces.
//! On the wire it is those words in little-endian byte order, nothing else.

use crate::error::{CondIsaError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Bytes per instruction word
pub const WORD_BYTES: usize = 4;

/// An encoded program
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Program {
    name: String,
    words: Vec<u32>,
}

impl Program {
    /// Create an empty, unnamed program buffer
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a program from raw words
    pub fn from_words(name: impl Into<String>, words: Vec<u32>) -> Self {
        Self { name: name.into(), words }
    }

    /// Name of the behavior that produced this program
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn words(&self) -> &[u32] {
        &self.words
    }

    /// Number of 32-bit words
    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Size in bytes
    pub fn byte_len(&self) -> usize {
        self.words.len() * WORD_BYTES
    }

    /// Clear the program and give it a new name
    pub fn reset(&mut self, name: impl Into<String>) {
        self.name = name.into();
        self.words.clear();
    }

    pub fn push(&mut self, word: u32) {
        self.words.push(word);
    }

    /// Serialize to little-endian bytes
    pub fn to_bytes(&self) -> Vec<u8> {
        self.words.iter().flat_map(|w| w.to_le_bytes()).collect()
    }

    /// Write the little-endian bytes into a caller buffer, returning the
    /// number of bytes written
    pub fn write_into(&self, buf: &mut [u8]) -> Result<usize> {
        let needed = self.byte_len();
        if buf.len() < needed {
            return Err(CondIsaError::BufferTooSmall { needed, available: buf.len() });
        }
        for (chunk, word) in buf.chunks_exact_mut(WORD_BYTES).zip(&self.words) {
            chunk.copy_from_slice(&word.to_le_bytes());
        }
        Ok(needed)
    }

    /// Deserialize from little-endian bytes
    pub fn from_bytes(name: impl Into<String>, bytes: &[u8]) -> Result<Self> {
        if bytes.len() % WORD_BYTES != 0 {
            return Err(CondIsaError::InvalidProgramSize(bytes.len()));
        }
        let words = bytes
            .chunks_exact(WORD_BYTES)
            .map(|c| u32::from_le_bytes([c[0], c[1], c[2], c[3]]))
            .collect();
        Ok(Self::from_words(name, words))
    }

    /// Snapshot encoding (name and words)
    pub fn to_bincode(&self) -> Result<Vec<u8>> {
        Ok(bincode::serialize(self)?)
    }

    pub fn from_bincode(bytes: &[u8]) -> Result<Self> {
        Ok(bincode::deserialize(bytes)?)
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} words, {} bytes)", self.name, self.len(), self.byte_len())
    }
}
