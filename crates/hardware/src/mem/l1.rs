//! Direct-mapped L1 cache.
//!
//! Write-back, write-allocate, one block per index. The data store is a flat
//! byte vector with one block-sized window per slot; block state lives in the
//! packed tag memory. Cycle costs model the 32-bit bus to the CPU.

use tracing::debug;

use crate::common::addr::AddressLayout;
use crate::common::error::{SimError, SimResult};
use crate::config::CacheLevelConfig;
use crate::mem::tag::TagStore;
use crate::mem::{LevelCounters, MemoryLevel, transfer_cycles};

/// Direct-mapped write-back cache, first level of the hierarchy.
pub struct L1Cache {
    layout: AddressLayout,
    block_bytes: usize,
    data: Vec<u8>,
    tags: TagStore,
    counters: LevelCounters,
    hit_time: u64,
    bus_width_bits: u64,
    bus_access_time: u64,
    next: Box<dyn MemoryLevel>,
}

impl L1Cache {
    /// Creates an empty cache in front of `next`. All data bytes start as 0
    /// and every slot starts invalid.
    pub fn new(config: &CacheLevelConfig, next: Box<dyn MemoryLevel>) -> Self {
        let num_blocks = config.size_bytes / config.block_bytes;
        let layout = AddressLayout::new(config.block_bytes, num_blocks);
        Self {
            layout,
            block_bytes: config.block_bytes,
            data: vec![0; config.size_bytes],
            tags: TagStore::new(num_blocks, layout.tag_bits()),
            counters: LevelCounters::default(),
            hit_time: config.hit_time,
            bus_width_bits: config.bus_width_bits,
            bus_access_time: config.bus_access_time,
            next,
        }
    }

    fn bus_cycles(&self, data_bytes: usize) -> u64 {
        transfer_cycles(
            self.hit_time,
            self.bus_width_bits,
            self.bus_access_time,
            data_bytes,
        )
    }

    /// Byte range of `data_size` bytes at `addr` inside the data store.
    fn data_range(&self, addr: u32, data_size: usize) -> SimResult<std::ops::Range<usize>> {
        let offset = self.layout.offset(addr);
        if offset + data_size > self.block_bytes {
            return Err(SimError::ContractViolation(
                "access crosses an L1 block boundary",
            ));
        }
        let start = self.layout.index(addr) * self.block_bytes + offset;
        Ok(start..start + data_size)
    }
}

impl MemoryLevel for L1Cache {
    fn is_present(&self, addr: u32) -> bool {
        let slot = self.layout.index(addr);
        self.tags.valid(slot) && self.tags.tag(slot) == self.layout.tag(addr)
    }

    fn block_size(&self) -> SimResult<usize> {
        Ok(self.block_bytes)
    }

    fn read(&mut self, addr: u32, data_size: usize) -> SimResult<(Vec<u8>, u64)> {
        if !self.is_present(addr) {
            return Err(SimError::ContractViolation("read of an absent L1 block"));
        }
        let range = self.data_range(addr, data_size)?;
        Ok((self.data[range].to_vec(), self.bus_cycles(data_size)))
    }

    fn write(&mut self, addr: u32, mark_dirty: bool, data: &[u8]) -> SimResult<u64> {
        let range = self.data_range(addr, data.len())?;
        self.data[range].copy_from_slice(data);

        let slot = self.layout.index(addr);
        let tag = self.layout.tag(addr);
        // A write over the resident block keeps its dirty state; a refill
        // replaces the entry outright.
        let same_block = self.tags.valid(slot) && self.tags.tag(slot) == tag;
        let dirty = mark_dirty || (same_block && self.tags.dirty(slot));
        self.tags.fill(slot, tag, dirty);

        Ok(self.bus_cycles(data.len()))
    }

    fn flush_if_needed(&mut self, addr: u32) -> SimResult<u64> {
        let slot = self.layout.index(addr);
        if !(self.tags.valid(slot) && self.tags.dirty(slot)) {
            return Ok(0);
        }

        let victim_addr = self.layout.rebuild(self.tags.tag(slot), slot);
        let start = slot * self.block_bytes;
        let victim = self.data[start..start + self.block_bytes].to_vec();
        debug!("L1 write-back of dirty block {victim_addr:#08x}");

        let cycles = self.next.store(victim_addr, &victim)?;
        self.tags.clear_dirty(slot);
        Ok(cycles)
    }

    fn next_level(&self) -> Option<&dyn MemoryLevel> {
        Some(self.next.as_ref())
    }

    fn next_level_mut(&mut self) -> Option<&mut dyn MemoryLevel> {
        Some(self.next.as_mut())
    }

    fn counters(&self) -> LevelCounters {
        self.counters
    }

    fn counters_mut(&mut self) -> &mut LevelCounters {
        &mut self.counters
    }

    fn dump_images(&self) -> Vec<Vec<u8>> {
        let mut images = vec![self.data.clone()];
        images.extend(self.next.dump_images());
        images
    }
}
