//! Simulation statistics collection and reporting.
//!
//! This module aggregates the run-level counters into the final report:
//! 1. **Cycle Accounting:** Total cycles, memory-only cycles, and the count
//!    of memory instructions executed.
//! 2. **Per-Level Counters:** L1 and (optionally) L2 hit/miss counts.
//! 3. **Derived Metrics:** Local and global miss rates and AMAT.
//! 4. **Report:** The twelve-line stats file in its exact output format.

use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use crate::common::error::{SimError, SimResult};
use crate::mem::LevelCounters;

/// Aggregate statistics for one simulation run.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimStats {
    /// Total cycles elapsed, including per-instruction extra cycles.
    pub cycles: u64,
    /// Cycles spent in memory operations only.
    pub mem_cycles: u64,
    /// Number of load/store instructions executed.
    pub mem_instructions: u64,
    /// L1 hit/miss counters.
    pub l1: LevelCounters,
    /// L2 hit/miss counters; absent in a single-level hierarchy.
    pub l2: Option<LevelCounters>,
}

impl SimStats {
    /// L1 local miss rate; 0 when no accesses reached L1.
    pub fn l1_miss_rate(&self) -> f64 {
        self.l1.miss_rate()
    }

    /// Global miss rate: the L1 rate alone in a single-level hierarchy,
    /// otherwise the product of the L1 and L2 local rates. Falls back to 0
    /// when L2 exists but saw no accesses.
    pub fn global_miss_rate(&self) -> f64 {
        match self.l2 {
            None => self.l1_miss_rate(),
            Some(l2) if l2.accesses() == 0 => 0.0,
            Some(l2) => self.l1_miss_rate() * l2.miss_rate(),
        }
    }

    /// Average memory access time in cycles; defined as 0 for an empty trace.
    pub fn amat(&self) -> f64 {
        if self.mem_instructions == 0 {
            0.0
        } else {
            self.mem_cycles as f64 / self.mem_instructions as f64
        }
    }

    /// Renders the twelve-line report: total cycles, the eight L1/L2
    /// counters, both miss rates, and AMAT. L2 lines are zeros in a
    /// single-level run; the last line has no trailing newline.
    pub fn render_report(&self) -> String {
        let l2 = self.l2.unwrap_or_default();
        let mut out = String::new();
        let _ = writeln!(out, "{}", self.cycles);
        let _ = writeln!(out, "{}", self.l1.read_hits);
        let _ = writeln!(out, "{}", self.l1.write_hits);
        let _ = writeln!(out, "{}", self.l1.read_misses);
        let _ = writeln!(out, "{}", self.l1.write_misses);
        let _ = writeln!(out, "{}", l2.read_hits);
        let _ = writeln!(out, "{}", l2.write_hits);
        let _ = writeln!(out, "{}", l2.read_misses);
        let _ = writeln!(out, "{}", l2.write_misses);
        let _ = writeln!(out, "{:.4}", self.l1_miss_rate());
        let _ = writeln!(out, "{:.4}", self.global_miss_rate());
        let _ = write!(out, "{:.4}", self.amat());
        out
    }

    /// Writes the report to `path`.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Io`] when the file cannot be written.
    pub fn write_report(&self, path: &Path) -> SimResult<()> {
        fs::write(path, self.render_report()).map_err(|e| SimError::io(path, e))
    }
}
