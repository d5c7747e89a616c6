//! Simulation: trace decoding, image loading, dumping, and the driver.

/// Memory image loading (one hex byte per line).
pub mod loader;
/// Byte-per-line hex dump writer.
pub mod output;
/// Top-level simulator and run orchestration.
pub mod simulator;
/// CPU trace decoding.
pub mod trace;

pub use simulator::{RunSummary, SimFiles, Simulator, run_simulation};
