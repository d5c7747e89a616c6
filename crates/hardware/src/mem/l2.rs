//! 2-way set-associative L2 cache.
//!
//! Write-back, write-allocate, LRU replacement. Storage is a flat byte vector
//! indexed `(set * NUM_WAYS + way) * block`; with two ways the LRU state is a
//! single victim-way bit per set. Cycle costs model the 256-bit bus to L1.

use tracing::debug;

use crate::common::addr::AddressLayout;
use crate::common::error::{SimError, SimResult};
use crate::config::CacheLevelConfig;
use crate::mem::tag::TagStore;
use crate::mem::{LevelCounters, MemoryLevel, transfer_cycles};

/// Associativity of the L2 cache. The single-bit LRU encoding below
/// depends on there being exactly two ways.
pub const NUM_WAYS: usize = 2;

/// Two-way set-associative write-back cache, second level of the hierarchy.
pub struct L2Cache {
    layout: AddressLayout,
    block_bytes: usize,
    num_sets: usize,
    data: Vec<u8>,
    tags: TagStore,
    /// Per set, the way to victimize on the next fill.
    lru: Vec<u8>,
    counters: LevelCounters,
    hit_time: u64,
    bus_width_bits: u64,
    bus_access_time: u64,
    next: Box<dyn MemoryLevel>,
}

impl L2Cache {
    /// Creates an empty cache in front of `next`. Every set starts with
    /// both ways invalid and way 0 as the next victim.
    pub fn new(config: &CacheLevelConfig, next: Box<dyn MemoryLevel>) -> Self {
        let num_sets = config.size_bytes / (NUM_WAYS * config.block_bytes);
        let layout = AddressLayout::new(config.block_bytes, num_sets);
        Self {
            layout,
            block_bytes: config.block_bytes,
            num_sets,
            data: vec![0; config.size_bytes],
            tags: TagStore::new(num_sets * NUM_WAYS, layout.tag_bits()),
            lru: vec![0; num_sets],
            counters: LevelCounters::default(),
            hit_time: config.hit_time,
            bus_width_bits: config.bus_width_bits,
            bus_access_time: config.bus_access_time,
            next,
        }
    }

    /// Number of sets.
    pub fn num_sets(&self) -> usize {
        self.num_sets
    }

    /// The way of `addr`'s set holding its block, if resident.
    fn present_in_way(&self, addr: u32) -> Option<usize> {
        let set = self.layout.index(addr);
        let tag = self.layout.tag(addr);
        (0..NUM_WAYS).find(|&way| {
            let slot = set * NUM_WAYS + way;
            self.tags.valid(slot) && self.tags.tag(slot) == tag
        })
    }

    /// Records an access to `way`: when it was the designated victim, the
    /// other way becomes the next victim.
    fn touch(&mut self, set: usize, way: usize) {
        if self.lru[set] as usize == way {
            self.lru[set] = (1 - way) as u8;
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

    fn line_start(&self, set: usize, way: usize) -> usize {
        (set * NUM_WAYS + way) * self.block_bytes
    }

    /// Byte range of `data_size` bytes at `addr` within `way`'s line.
    fn data_range(
        &self,
        addr: u32,
        way: usize,
        data_size: usize,
    ) -> SimResult<std::ops::Range<usize>> {
        let offset = self.layout.offset(addr);
        if offset + data_size > self.block_bytes {
            return Err(SimError::ContractViolation(
                "access crosses an L2 block boundary",
            ));
        }
        let start = self.line_start(self.layout.index(addr), way) + offset;
        Ok(start..start + data_size)
    }

    /// Flat image of one way: each set's line, in set-index order.
    pub fn way_image(&self, way: usize) -> Vec<u8> {
        let mut image = Vec::with_capacity(self.num_sets * self.block_bytes);
        for set in 0..self.num_sets {
            let start = self.line_start(set, way);
            image.extend_from_slice(&self.data[start..start + self.block_bytes]);
        }
        image
    }
}

impl MemoryLevel for L2Cache {
    fn is_present(&self, addr: u32) -> bool {
        self.present_in_way(addr).is_some()
    }

    fn block_size(&self) -> SimResult<usize> {
        Ok(self.block_bytes)
    }

    fn read(&mut self, addr: u32, data_size: usize) -> SimResult<(Vec<u8>, u64)> {
        let way = self
            .present_in_way(addr)
            .ok_or(SimError::ContractViolation("read of an absent L2 block"))?;
        let range = self.data_range(addr, way, data_size)?;
        let data = self.data[range].to_vec();
        self.touch(self.layout.index(addr), way);
        Ok((data, self.bus_cycles(data_size)))
    }

    fn write(&mut self, addr: u32, mark_dirty: bool, data: &[u8]) -> SimResult<u64> {
        let set = self.layout.index(addr);
        // A dirty write targets the resident block (a write hit or the
        // overlay right after a fill); a clean write is the fill itself and
        // goes to the victim way.
        let way = if mark_dirty {
            self.present_in_way(addr)
                .ok_or(SimError::ContractViolation("dirty write to an absent L2 block"))?
        } else {
            self.lru[set] as usize
        };

        let range = self.data_range(addr, way, data.len())?;
        self.data[range].copy_from_slice(data);
        self.tags
            .fill(set * NUM_WAYS + way, self.layout.tag(addr), mark_dirty);
        self.touch(set, way);

        Ok(self.bus_cycles(data.len()))
    }

    fn flush_if_needed(&mut self, addr: u32) -> SimResult<u64> {
        let set = self.layout.index(addr);
        let victim_way = self.lru[set] as usize;
        let slot = set * NUM_WAYS + victim_way;
        if !(self.tags.valid(slot) && self.tags.dirty(slot)) {
            return Ok(0);
        }

        let victim_addr = self.layout.rebuild(self.tags.tag(slot), set);
        // Read the victim's bytes straight out of the way storage; routing
        // through read() would flip the LRU bit mid-eviction.
        let start = self.line_start(set, victim_way);
        let victim = self.data[start..start + self.block_bytes].to_vec();
        debug!("L2 write-back of dirty block {victim_addr:#08x} from way {victim_way}");

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
        let mut images = vec![self.way_image(0), self.way_image(1)];
        images.extend(self.next.dump_images());
        images
    }
}
