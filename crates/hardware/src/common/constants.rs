//! Global System Constants.
//!
//! This module defines system-wide constants used across the simulator:
//! 1. **Address Model:** Width of the physical address space seen by the CPU.
//! 2. **CPU Interface:** Word size and alignment of CPU memory operations.

/// Width of the CPU address space in bits. Every trace address fits in
/// this many bits; tag, index and offset fields partition it per level.
pub const ADDRESS_BITS: u32 = 24;

/// Size of a CPU word in bytes. Loads and stores issued by the trace
/// driver always move exactly one word.
pub const CPU_DATA_SIZE: usize = 4;

/// Required alignment of CPU addresses in bytes (strict mode).
pub const WORD_ALIGNMENT: u32 = 4;

/// Smallest legal cache block size in bytes (one CPU word).
pub const MIN_BLOCK_BYTES: usize = 4;

/// Largest legal L1 cache block size in bytes.
pub const MAX_L1_BLOCK_BYTES: usize = 128;
