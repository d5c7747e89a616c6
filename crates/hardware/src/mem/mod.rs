//! The memory hierarchy.
//!
//! This module implements the three memory levels and the protocol between them:
//! 1. **Capability Set:** Every level exposes presence lookup, block-size query,
//!    raw `read`/`write` primitives, and dirty-victim write-back.
//! 2. **Shared State Machine:** `load` and `store` are provided methods on the
//!    [`MemoryLevel`] trait; they implement the common miss-handling sequence
//!    (fetch from the next level, flush the victim, fill, serve) once, on top of
//!    the per-level storage primitives.
//! 3. **Cycle Model:** Bus transfers are charged by the level that drives the
//!    bus; the fill after a refill is a local array store and is free.
//!
//! Levels own their storage exclusively and hold a boxed reference to the next
//! (lower) level; main memory is the end of the chain. The hierarchy is built
//! bottom-up and is mutated only by the access currently in flight.

/// Direct-mapped L1 cache.
pub mod l1;
/// 2-way set-associative L2 cache with LRU replacement.
pub mod l2;
/// Flat main-memory backing store.
pub mod main_memory;
/// Bit-packed per-slot tag entries.
pub mod tag;

pub use l1::L1Cache;
pub use l2::L2Cache;
pub use main_memory::MainMemory;

use tracing::debug;

use crate::common::error::{SimError, SimResult};

/// Per-level hit/miss counters.
///
/// Counters are updated at the level where a request arrives, never at the
/// level that serves the resulting refill.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LevelCounters {
    /// Loads served locally.
    pub read_hits: u64,
    /// Loads that had to fetch from the next level.
    pub read_misses: u64,
    /// Stores that updated a resident block.
    pub write_hits: u64,
    /// Stores that had to allocate first.
    pub write_misses: u64,
}

impl LevelCounters {
    /// Total hits at this level.
    pub fn hits(&self) -> u64 {
        self.read_hits + self.write_hits
    }

    /// Total misses at this level.
    pub fn misses(&self) -> u64 {
        self.read_misses + self.write_misses
    }

    /// Total requests that reached this level.
    pub fn accesses(&self) -> u64 {
        self.hits() + self.misses()
    }

    /// Local miss rate, 0 when the level saw no accesses.
    pub fn miss_rate(&self) -> f64 {
        if self.accesses() == 0 {
            0.0
        } else {
            self.misses() as f64 / self.accesses() as f64
        }
    }
}

/// Cycles needed to move `data_bytes` across a bus.
///
/// The first beat costs `first_beat` cycles (the level's hit or access time);
/// every further beat needed to fit the payload onto a `bus_width_bits`-wide
/// bus costs `bus_access_time`. Address bits ride along with the first beat
/// and are not charged separately.
pub fn transfer_cycles(
    first_beat: u64,
    bus_width_bits: u64,
    bus_access_time: u64,
    data_bytes: usize,
) -> u64 {
    let data_bits = 8 * data_bytes as u64;
    first_beat + data_bits.div_ceil(bus_width_bits).saturating_sub(1) * bus_access_time
}

/// One level of the memory hierarchy.
///
/// The required methods are the storage primitives each level specializes;
/// the provided `load`/`store` implement the shared hit/miss state machine.
pub trait MemoryLevel {
    /// Whether the block holding `addr` is resident at this level.
    fn is_present(&self, addr: u32) -> bool;

    /// Block size of this level in bytes.
    ///
    /// # Errors
    ///
    /// Main memory has no block granularity; invoking this on it is a
    /// [`SimError::ContractViolation`].
    fn block_size(&self) -> SimResult<usize>;

    /// Reads `data_size` bytes at `addr` from local storage.
    ///
    /// Precondition: the address is present. The previous level may request
    /// fewer bytes than this level's block size. Returns the bytes and the
    /// cycles to move them to the requester.
    fn read(&mut self, addr: u32, data_size: usize) -> SimResult<(Vec<u8>, u64)>;

    /// Writes `data` at `addr` into local storage, marking the slot valid
    /// and, when `mark_dirty` is set, dirty. Returns the bus cycles charged
    /// to the writer.
    fn write(&mut self, addr: u32, mark_dirty: bool, data: &[u8]) -> SimResult<u64>;

    /// Writes back the dirty victim occupying the slot that `addr`'s block
    /// is about to fill, if there is one, and clears its dirty bit.
    /// Returns the write-back cycles, 0 when no flush occurred.
    fn flush_if_needed(&mut self, addr: u32) -> SimResult<u64>;

    /// The next (lower) level, absent at the end of the chain.
    fn next_level(&self) -> Option<&dyn MemoryLevel>;

    /// Mutable access to the next level.
    fn next_level_mut(&mut self) -> Option<&mut dyn MemoryLevel>;

    /// This level's hit/miss counters.
    fn counters(&self) -> LevelCounters;

    /// Mutable access to this level's counters.
    fn counters_mut(&mut self) -> &mut LevelCounters;

    /// Flat byte images of this level's storage followed by those of every
    /// level below it, in dump order (L1, then L2 way 0, way 1, then main
    /// memory).
    fn dump_images(&self) -> Vec<Vec<u8>>;

    /// Loads `data_size` bytes at `addr`, delegating to the next level on a
    /// miss and filling this level per the write-allocate policy.
    fn load(&mut self, addr: u32, data_size: usize) -> SimResult<(Vec<u8>, u64)> {
        if self.is_present(addr) {
            self.counters_mut().read_hits += 1;
            return self.read(addr, data_size);
        }
        self.counters_mut().read_misses += 1;

        let block = self.block_size()?;
        let base = addr - (addr % block as u32);
        debug!("read miss at {addr:#08x}, refilling {block}-byte block at {base:#08x}");

        // Fetch the whole block from the next level; its cycles cover the
        // transfer onto our incoming bus.
        let next = self
            .next_level_mut()
            .ok_or(SimError::ContractViolation("miss at the last memory level"))?;
        let (fetched, mut cycles) = next.load(base, block)?;
        if fetched.len() < block {
            return Err(SimError::ContractViolation(
                "next level returned a short block",
            ));
        }

        // The victim must be written back before the slot is overwritten,
        // while its bytes are still readable.
        cycles += self.flush_if_needed(addr)?;

        // Filling the slot is a local store, not a bus transaction.
        let _ = self.write(base, false, &fetched[..block])?;

        // Serving the requester charges this level's bus once.
        let (data, read_cycles) = self.read(addr, data_size)?;
        cycles += read_cycles;

        Ok((data, cycles))
    }

    /// Stores `data` at `addr`, allocating the block from the next level
    /// first on a miss.
    fn store(&mut self, addr: u32, data: &[u8]) -> SimResult<u64> {
        if self.is_present(addr) {
            self.counters_mut().write_hits += 1;
            return self.write(addr, true, data);
        }
        self.counters_mut().write_misses += 1;

        let block = self.block_size()?;
        let base = addr - (addr % block as u32);
        debug!("write miss at {addr:#08x}, allocating {block}-byte block at {base:#08x}");

        let next = self
            .next_level_mut()
            .ok_or(SimError::ContractViolation("miss at the last memory level"))?;
        let (fetched, mut cycles) = next.load(base, block)?;
        if fetched.len() < block {
            return Err(SimError::ContractViolation(
                "next level returned a short block",
            ));
        }

        cycles += self.flush_if_needed(addr)?;

        // Fill clean first; the overlay below is what dirties the block.
        let _ = self.write(base, false, &fetched[..block])?;

        // Overlaying the stored bytes pays the bus transfer from the
        // previous level.
        cycles += self.write(addr, true, data)?;

        Ok(cycles)
    }
}
