//! # ISA configuration
//!
//! Device parameters the builders depend on but that are not part of the
//! instruction encoding itself.

use crate::encoding::{LOOP_DELAY_MASK, MAX_JUMP_MAGNITUDE};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Builder-facing ISA configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IsaConfig {
    /// Largest inline jump distance in words (1-15)
    pub near_jump_reach: u8,
    /// Cycles a LOOP waits between stream FSM polls (0-8191)
    pub fsm_poll_delay: u16,
    /// Mask applied to run-time stream ids (fits in 12 bits)
    pub rtsq_id_mask: u16,
    /// Width of the JUMP_PC CSR in bits (5-32)
    pub jump_pc_bits: u8,
}

impl IsaConfig {
    /// Default configuration
    /// - Near jump reach: 15 words
    /// - FSM poll delay: 1100 cycles
    /// - Run-time stream id mask: 0x7FF
    /// - JUMP_PC width: 20 bits
    pub const DEFAULT: Self = Self {
        near_jump_reach: 15,
        fsm_poll_delay: 1100,
        rtsq_id_mask: 0x7FF,
        jump_pc_bits: 20,
    };

    /// Create a new configuration with validation
    pub const fn new(
        near_jump_reach: u8,
        fsm_poll_delay: u16,
        rtsq_id_mask: u16,
        jump_pc_bits: u8,
    ) -> Result<Self, ConfigError> {
        let config = Self {
            near_jump_reach,
            fsm_poll_delay,
            rtsq_id_mask,
            jump_pc_bits,
        };

        if near_jump_reach < 1 || near_jump_reach as i32 > MAX_JUMP_MAGNITUDE {
            return Err(ConfigError::InvalidNearReach);
        }
        if fsm_poll_delay as u32 > LOOP_DELAY_MASK {
            return Err(ConfigError::InvalidPollDelay);
        }
        if rtsq_id_mask > 0xFFF {
            return Err(ConfigError::InvalidSqIdMask);
        }
        // the relay splits the target into target >> 4 and target & 0xF
        if jump_pc_bits < 5 || jump_pc_bits > 32 {
            return Err(ConfigError::InvalidJumpPcBits);
        }

        Ok(config)
    }

    /// Largest word index a far jump can reach
    #[inline]
    pub const fn max_jump_target(&self) -> u64 {
        (1u64 << self.jump_pc_bits) - 1
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        Self::new(
            self.near_jump_reach,
            self.fsm_poll_delay,
            self.rtsq_id_mask,
            self.jump_pc_bits,
        )
        .map(|_| ())
    }
}

impl Default for IsaConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Display for IsaConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "IsaConfig {{ near reach: ±{} words, fsm poll: {} cycles, sq id mask: {:#x}, jump_pc: {} bits }}",
            self.near_jump_reach, self.fsm_poll_delay, self.rtsq_id_mask, self.jump_pc_bits,
        )
    }
}

/// Configuration error types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// Near jump reach must be in range [1, 15]
    InvalidNearReach,
    /// Poll delay must fit the 13-bit LOOP delay field
    InvalidPollDelay,
    /// Stream id mask must fit a 12-bit immediate
    InvalidSqIdMask,
    /// JUMP_PC width must be in range [5, 32]
    InvalidJumpPcBits,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidNearReach => {
                write!(f, "near_jump_reach must be in range [1, 15]")
            }
            ConfigError::InvalidPollDelay => {
                write!(f, "fsm_poll_delay must be at most 8191")
            }
            ConfigError::InvalidSqIdMask => {
                write!(f, "rtsq_id_mask must fit in 12 bits")
            }
            ConfigError::InvalidJumpPcBits => {
                write!(f, "jump_pc_bits must be in range [5, 32]")
            }
        }
    }
}

impl std::error::Error for ConfigError {}
