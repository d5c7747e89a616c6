//! Main memory.
//!
//! The end of the hierarchy chain: a flat byte-addressed store that serves
//! every access after a fixed access time plus bus-transfer cycles. No disk
//! sits behind it, so `is_present` is always true and `load`/`store` reduce
//! to the raw `read`/`write` primitives.

use crate::common::error::{SimError, SimResult};
use crate::config::MainMemoryConfig;
use crate::mem::{LevelCounters, MemoryLevel, transfer_cycles};

/// Flat backing store initialized from a memory image.
pub struct MainMemory {
    mem: Vec<u8>,
    counters: LevelCounters,
    access_time: u64,
    bus_width_bits: u64,
    bus_access_time: u64,
}

impl MainMemory {
    /// Creates main memory from an initial image, zero-padded to the
    /// configured capacity.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Addressing`] when the image is larger than the
    /// configured capacity.
    pub fn new(config: &MainMemoryConfig, mut image: Vec<u8>) -> SimResult<Self> {
        if image.len() > config.size_bytes {
            return Err(SimError::Addressing {
                addr: config.size_bytes as u32,
                reason: format!(
                    "memory image has {} bytes but main memory holds {}",
                    image.len(),
                    config.size_bytes
                ),
            });
        }
        image.resize(config.size_bytes, 0);
        Ok(Self {
            mem: image,
            counters: LevelCounters::default(),
            access_time: config.access_time,
            bus_width_bits: config.bus_width_bits,
            bus_access_time: config.bus_access_time,
        })
    }

    /// Capacity in bytes.
    pub fn len(&self) -> usize {
        self.mem.len()
    }

    /// Whether the store has zero capacity.
    pub fn is_empty(&self) -> bool {
        self.mem.is_empty()
    }

    fn check_range(&self, addr: u32, len: usize) -> SimResult<()> {
        if addr as usize + len > self.mem.len() {
            return Err(SimError::Addressing {
                addr,
                reason: format!("{len}-byte access past the end of main memory"),
            });
        }
        Ok(())
    }

    fn access_cycles(&self, data_bytes: usize) -> u64 {
        transfer_cycles(
            self.access_time,
            self.bus_width_bits,
            self.bus_access_time,
            data_bytes,
        )
    }
}

impl MemoryLevel for MainMemory {
    /// Always true: every address is backed here.
    fn is_present(&self, _addr: u32) -> bool {
        true
    }

    fn block_size(&self) -> SimResult<usize> {
        Err(SimError::ContractViolation(
            "main memory has no block granularity",
        ))
    }

    fn read(&mut self, addr: u32, data_size: usize) -> SimResult<(Vec<u8>, u64)> {
        self.check_range(addr, data_size)?;
        let start = addr as usize;
        let data = self.mem[start..start + data_size].to_vec();
        Ok((data, self.access_cycles(data_size)))
    }

    fn write(&mut self, addr: u32, _mark_dirty: bool, data: &[u8]) -> SimResult<u64> {
        self.check_range(addr, data.len())?;
        let start = addr as usize;
        self.mem[start..start + data.len()].copy_from_slice(data);
        Ok(self.access_cycles(data.len()))
    }

    fn flush_if_needed(&mut self, _addr: u32) -> SimResult<u64> {
        Err(SimError::ContractViolation(
            "main memory has nothing to flush to",
        ))
    }

    fn next_level(&self) -> Option<&dyn MemoryLevel> {
        None
    }

    fn next_level_mut(&mut self) -> Option<&mut dyn MemoryLevel> {
        None
    }

    fn counters(&self) -> LevelCounters {
        self.counters
    }

    fn counters_mut(&mut self) -> &mut LevelCounters {
        &mut self.counters
    }

    fn dump_images(&self) -> Vec<Vec<u8>> {
        vec![self.mem.clone()]
    }
}
