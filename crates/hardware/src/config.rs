//! Configuration system for the memory-hierarchy simulator.
//!
//! This module defines all configuration structures used to parameterize a run:
//! 1. **Defaults:** Baseline hardware constants (cache geometry, bus widths, latencies).
//! 2. **Structures:** Hierarchical config for the cache levels and main memory.
//! 3. **Validation:** Power-of-two and range checks that produce `InvalidArgs` errors.
//!
//! The CLI only chooses the level count and block sizes on top of
//! `SimConfig::default()`; a JSON document deserialized into [`SimConfig`] can
//! override any latency, bus width, or capacity for experiments.

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::common::addr::is_pow2;
use crate::common::constants::{MAX_L1_BLOCK_BYTES, MIN_BLOCK_BYTES};
use crate::common::error::{SimError, SimResult};
use crate::mem::l2::NUM_WAYS;

/// Default configuration constants for the simulated hardware.
mod defaults {
    /// L1 cache capacity in bytes (4 KiB).
    pub const L1_SIZE: usize = 4 * 1024;

    /// Width of the CPU-to-L1 bus in bits.
    pub const L1_BUS_WIDTH: u64 = 32;

    /// L1 hit time in clock cycles.
    pub const L1_HIT_TIME: u64 = 1;

    /// Cost of each additional L1 bus beat in clock cycles.
    pub const L1_BUS_ACCESS_TIME: u64 = 1;

    /// Default L1 block size in bytes.
    pub const L1_BLOCK: usize = 4;

    /// L2 cache capacity in bytes (32 KiB across both ways).
    pub const L2_SIZE: usize = 32 * 1024;

    /// Width of the L1-to-L2 bus in bits.
    pub const L2_BUS_WIDTH: u64 = 256;

    /// L2 hit time in clock cycles.
    pub const L2_HIT_TIME: u64 = 4;

    /// Cost of each additional L2 bus beat in clock cycles.
    pub const L2_BUS_ACCESS_TIME: u64 = 1;

    /// Default L2 block size in bytes.
    pub const L2_BLOCK: usize = 8;

    /// Main memory capacity in bytes (16 MiB, the full 24-bit space).
    pub const MAIN_MEM_SIZE: usize = 16 * 1024 * 1024;

    /// Main memory access time in clock cycles.
    pub const MAIN_MEM_ACCESS_TIME: u64 = 100;

    /// Width of the memory bus in bits.
    pub const MAIN_MEM_BUS_WIDTH: u64 = 64;

    /// Cost of each additional memory bus beat in clock cycles.
    pub const MAIN_MEM_BUS_ACCESS_TIME: u64 = 1;
}

/// Geometry and timing of one cache level.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct CacheLevelConfig {
    /// Total capacity in bytes (all ways combined).
    pub size_bytes: usize,

    /// Block (line) size in bytes.
    pub block_bytes: usize,

    /// Width of the bus to the previous (closer to the CPU) level, in bits.
    pub bus_width_bits: u64,

    /// Hit time in clock cycles, charged on the first bus beat.
    pub hit_time: u64,

    /// Cost of each additional bus beat in clock cycles.
    pub bus_access_time: u64,
}

impl CacheLevelConfig {
    /// The default L1 configuration: 4 KiB, 32-bit bus, 1 cc hit.
    pub fn l1_default() -> Self {
        Self {
            size_bytes: defaults::L1_SIZE,
            block_bytes: defaults::L1_BLOCK,
            bus_width_bits: defaults::L1_BUS_WIDTH,
            hit_time: defaults::L1_HIT_TIME,
            bus_access_time: defaults::L1_BUS_ACCESS_TIME,
        }
    }

    /// The default L2 configuration: 32 KiB, 256-bit bus, 4 cc hit.
    pub fn l2_default() -> Self {
        Self {
            size_bytes: defaults::L2_SIZE,
            block_bytes: defaults::L2_BLOCK,
            bus_width_bits: defaults::L2_BUS_WIDTH,
            hit_time: defaults::L2_HIT_TIME,
            bus_access_time: defaults::L2_BUS_ACCESS_TIME,
        }
    }
}

/// Main memory capacity and timing.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct MainMemoryConfig {
    /// Backing-store size in bytes. Defaults to the full 16 MiB address
    /// space; smaller sizes are useful for debug runs.
    #[serde(default = "MainMemoryConfig::default_size")]
    pub size_bytes: usize,

    /// Fixed access time in clock cycles.
    #[serde(default = "MainMemoryConfig::default_access_time")]
    pub access_time: u64,

    /// Width of the memory bus in bits.
    #[serde(default = "MainMemoryConfig::default_bus_width")]
    pub bus_width_bits: u64,

    /// Cost of each additional bus beat in clock cycles.
    #[serde(default = "MainMemoryConfig::default_bus_access_time")]
    pub bus_access_time: u64,
}

impl MainMemoryConfig {
    fn default_size() -> usize {
        defaults::MAIN_MEM_SIZE
    }

    fn default_access_time() -> u64 {
        defaults::MAIN_MEM_ACCESS_TIME
    }

    fn default_bus_width() -> u64 {
        defaults::MAIN_MEM_BUS_WIDTH
    }

    fn default_bus_access_time() -> u64 {
        defaults::MAIN_MEM_BUS_ACCESS_TIME
    }
}

impl Default for MainMemoryConfig {
    fn default() -> Self {
        Self {
            size_bytes: defaults::MAIN_MEM_SIZE,
            access_time: defaults::MAIN_MEM_ACCESS_TIME,
            bus_width_bits: defaults::MAIN_MEM_BUS_WIDTH,
            bus_access_time: defaults::MAIN_MEM_BUS_ACCESS_TIME,
        }
    }
}

/// Root configuration for one simulation run.
///
/// # Examples
///
/// Choosing block sizes on top of the defaults, the way the CLI does:
///
/// ```
/// use memsim_core::config::SimConfig;
///
/// let config = SimConfig::with_blocks(2, 32, 64);
/// assert!(config.validate().is_ok());
/// assert_eq!(config.l1.block_bytes, 32);
/// assert_eq!(config.l2.block_bytes, 64);
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct SimConfig {
    /// Number of cache levels (1 or 2).
    #[serde(default = "SimConfig::default_levels")]
    pub levels: u8,

    /// L1 cache geometry and timing.
    #[serde(default = "CacheLevelConfig::l1_default")]
    pub l1: CacheLevelConfig,

    /// L2 cache geometry and timing. Ignored when `levels` is 1.
    #[serde(default = "CacheLevelConfig::l2_default")]
    pub l2: CacheLevelConfig,

    /// Main memory capacity and timing.
    #[serde(default)]
    pub memory: MainMemoryConfig,

    /// When true, the trace driver rejects addresses that are not
    /// 4-byte aligned.
    #[serde(default = "SimConfig::default_strict_align")]
    pub strict_align: bool,
}

impl SimConfig {
    fn default_levels() -> u8 {
        1
    }

    fn default_strict_align() -> bool {
        true
    }

    /// Builds a configuration with the given level count and block sizes,
    /// leaving every other parameter at its hardware default.
    pub fn with_blocks(levels: u8, b1: usize, b2: usize) -> Self {
        Self {
            levels,
            l1: CacheLevelConfig {
                block_bytes: b1,
                ..CacheLevelConfig::l1_default()
            },
            l2: CacheLevelConfig {
                block_bytes: b2,
                ..CacheLevelConfig::l2_default()
            },
            ..Self::default()
        }
    }

    /// Loads a configuration from a JSON document. Omitted sections and
    /// fields with defaults fall back to the hardware defaults.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Io`] when the file cannot be read and
    /// [`SimError::InvalidArgs`] when the JSON does not describe a
    /// configuration.
    pub fn from_json_file(path: &Path) -> SimResult<Self> {
        let text = fs::read_to_string(path).map_err(|e| SimError::io(path, e))?;
        serde_json::from_str(&text)
            .map_err(|e| SimError::InvalidArgs(format!("{}: {e}", path.display())))
    }

    /// Checks the configuration against the simulated hardware model.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::InvalidArgs`] when the level count is not 1 or 2,
    /// a block size is not a power of two or out of range, or a block size
    /// does not divide its cache capacity.
    pub fn validate(&self) -> SimResult<()> {
        if self.levels != 1 && self.levels != 2 {
            return Err(SimError::InvalidArgs(format!(
                "levels must be 1 or 2, got {}",
                self.levels
            )));
        }

        let b1 = self.l1.block_bytes;
        if !is_pow2(b1) || !(MIN_BLOCK_BYTES..=MAX_L1_BLOCK_BYTES).contains(&b1) {
            return Err(SimError::InvalidArgs(format!(
                "L1 block size must be a power of two in [{MIN_BLOCK_BYTES}, {MAX_L1_BLOCK_BYTES}], got {b1}"
            )));
        }
        if !is_pow2(self.l1.size_bytes) || self.l1.size_bytes % b1 != 0 {
            return Err(SimError::InvalidArgs(format!(
                "L1 capacity {} is not a power of two divisible by its block size",
                self.l1.size_bytes
            )));
        }

        if self.levels == 2 {
            let b2 = self.l2.block_bytes;
            if !is_pow2(b2) || b2 < MIN_BLOCK_BYTES {
                return Err(SimError::InvalidArgs(format!(
                    "L2 block size must be a power of two >= {MIN_BLOCK_BYTES}, got {b2}"
                )));
            }
            if !is_pow2(self.l2.size_bytes) || self.l2.size_bytes / NUM_WAYS < b2 {
                return Err(SimError::InvalidArgs(format!(
                    "L2 capacity {} cannot hold {NUM_WAYS} ways of {b2}-byte blocks",
                    self.l2.size_bytes
                )));
            }
            // An L1 block is fetched from a single L2 block.
            if b2 < b1 {
                return Err(SimError::InvalidArgs(format!(
                    "L2 block size {b2} is smaller than the L1 block size {b1}"
                )));
            }
        }

        if !is_pow2(self.memory.size_bytes) {
            return Err(SimError::InvalidArgs(format!(
                "main memory size must be a power of two, got {}",
                self.memory.size_bytes
            )));
        }

        Ok(())
    }
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            levels: 1,
            l1: CacheLevelConfig::l1_default(),
            l2: CacheLevelConfig::l2_default(),
            memory: MainMemoryConfig::default(),
            strict_align: true,
        }
    }
}
