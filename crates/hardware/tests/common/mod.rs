//! Shared test fixtures.
//!
//! Real runs use the full 16 MiB address space; tests substitute a 16 KiB
//! debug memory so every fixture allocates kilobytes, not megabytes. Cache
//! geometry defaults stay at the hardware values unless a test shrinks them
//! to make set conflicts easy to construct.

use memsim_core::config::{CacheLevelConfig, MainMemoryConfig, SimConfig};
use memsim_core::mem::{L1Cache, L2Cache, MainMemory};

/// Debug-sized main memory capacity.
pub const TEST_MEM_BYTES: usize = 16 * 1024;

/// Main-memory config shrunk to the debug capacity.
pub fn test_memory_config() -> MainMemoryConfig {
    MainMemoryConfig {
        size_bytes: TEST_MEM_BYTES,
        ..Default::default()
    }
}

/// A full simulation config with debug-sized main memory.
pub fn test_sim_config(levels: u8, b1: usize, b2: usize) -> SimConfig {
    let mut config = SimConfig::with_blocks(levels, b1, b2);
    config.memory = test_memory_config();
    config
}

/// Deterministic non-repeating-ish byte pattern. The prime modulus keeps
/// the pattern from aligning with any power-of-two block size.
pub fn patterned_image(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i % 251) as u8).collect()
}

/// Main memory preloaded with `image`, padded to the debug capacity.
pub fn main_memory_with(image: Vec<u8>) -> MainMemory {
    MainMemory::new(&test_memory_config(), image).unwrap()
}

/// An L1 with the default 4 KiB geometry and the given block size, backed
/// directly by debug-sized main memory holding `image`.
pub fn l1_over_memory(block_bytes: usize, image: Vec<u8>) -> L1Cache {
    let config = CacheLevelConfig {
        block_bytes,
        ..CacheLevelConfig::l1_default()
    };
    L1Cache::new(&config, Box::new(main_memory_with(image)))
}

/// A small, deterministic L2 for conflict tests: 256 bytes, 16-byte
/// blocks, 2 ways. With these parameters:
///   - num_sets = 256 / (2 * 16) = 8
///   - same-set stride = 8 * 16 = 128 bytes
/// Timing keeps the hardware defaults (4 cc hit, 256-bit bus).
pub fn small_l2_config() -> CacheLevelConfig {
    CacheLevelConfig {
        size_bytes: 256,
        block_bytes: 16,
        ..CacheLevelConfig::l2_default()
    }
}

/// A small L2 (see [`small_l2_config`]) backed directly by debug-sized
/// main memory holding `image`.
pub fn l2_over_memory(image: Vec<u8>) -> L2Cache {
    L2Cache::new(&small_l2_config(), Box::new(main_memory_with(image)))
}

/// A full two-level hierarchy with default cache geometry, the given block
/// sizes, and debug-sized main memory holding `image`.
pub fn two_level_hierarchy(b1: usize, b2: usize, image: Vec<u8>) -> L1Cache {
    let l1 = CacheLevelConfig {
        block_bytes: b1,
        ..CacheLevelConfig::l1_default()
    };
    let l2 = CacheLevelConfig {
        block_bytes: b2,
        ..CacheLevelConfig::l2_default()
    };
    let l2_cache = L2Cache::new(&l2, Box::new(main_memory_with(image)));
    L1Cache::new(&l1, Box::new(l2_cache))
}
