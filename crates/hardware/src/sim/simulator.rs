//! Trace-driven simulation.
//!
//! The simulator owns the head of the memory hierarchy and replays a CPU
//! trace over it, one instruction at a time. It performs:
//! 1. **Construction:** Builds the hierarchy bottom-up (main memory first)
//!    from a validated configuration and an initial memory image.
//! 2. **Execution:** Applies each trace instruction in file order, accounting
//!    extra cycles and memory cycles; every access completes fully, including
//!    cascaded fills and write-backs, before the next begins.
//! 3. **Reporting:** Dumps the final state of every level and the statistics
//!    report.
//!
//! Given identical inputs, every counter, cycle total, and output byte is
//! reproducible.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use tracing::info;

use crate::common::constants::{CPU_DATA_SIZE, WORD_ALIGNMENT};
use crate::common::error::{SimError, SimResult};
use crate::config::SimConfig;
use crate::mem::{L1Cache, L2Cache, MainMemory, MemoryLevel};
use crate::sim::trace::{OpKind, TraceEntry, parse_line};
use crate::sim::{loader, output};
use crate::stats::SimStats;

/// The seven file paths of one simulation run.
#[derive(Debug, Clone)]
pub struct SimFiles {
    /// CPU trace input.
    pub trace: PathBuf,
    /// Initial main-memory image input.
    pub memin: PathBuf,
    /// Final main-memory dump output.
    pub memout: PathBuf,
    /// Final L1 data dump output.
    pub l1: PathBuf,
    /// Final L2 way-0 dump output; written only in a two-level run.
    pub l2way0: PathBuf,
    /// Final L2 way-1 dump output; written only in a two-level run.
    pub l2way1: PathBuf,
    /// Statistics report output.
    pub stats: PathBuf,
}

/// The metrics a caller sweeping configurations cares about.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunSummary {
    /// L1 local miss rate.
    pub l1_miss_rate: f64,
    /// Total cycles the run took.
    pub total_cycles: u64,
    /// Average memory access time in cycles.
    pub amat: f64,
}

/// A memory hierarchy plus the cycle bookkeeping of one run.
pub struct Simulator {
    head: Box<dyn MemoryLevel>,
    levels: u8,
    mem_bytes: usize,
    strict_align: bool,
    cycles: u64,
    mem_cycles: u64,
    mem_instructions: u64,
}

impl Simulator {
    /// Builds the hierarchy bottom-up from `config` and the initial memory
    /// image.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::InvalidArgs`] for an invalid configuration and
    /// [`SimError::Addressing`] for an oversized image.
    pub fn new(config: &SimConfig, image: Vec<u8>) -> SimResult<Self> {
        config.validate()?;
        let mem_bytes = config.memory.size_bytes;
        let main_mem = MainMemory::new(&config.memory, image)?;

        let head: Box<dyn MemoryLevel> = if config.levels == 2 {
            let l2 = L2Cache::new(&config.l2, Box::new(main_mem));
            Box::new(L1Cache::new(&config.l1, Box::new(l2)))
        } else {
            Box::new(L1Cache::new(&config.l1, Box::new(main_mem)))
        };

        Ok(Self {
            head,
            levels: config.levels,
            mem_bytes,
            strict_align: config.strict_align,
            cycles: 0,
            mem_cycles: 0,
            mem_instructions: 0,
        })
    }

    fn check_address(&self, addr: u32) -> SimResult<()> {
        if self.strict_align && addr % WORD_ALIGNMENT != 0 {
            return Err(SimError::Addressing {
                addr,
                reason: format!("not aligned to {WORD_ALIGNMENT} bytes"),
            });
        }
        if addr as usize + CPU_DATA_SIZE > self.mem_bytes {
            return Err(SimError::Addressing {
                addr,
                reason: "outside main memory".to_string(),
            });
        }
        Ok(())
    }

    /// Executes one trace instruction against the hierarchy.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Addressing`] for a rejected address; storage
    /// errors propagate from the hierarchy.
    pub fn execute(&mut self, entry: &TraceEntry) -> SimResult<()> {
        self.cycles += entry.extra_cycles;
        self.check_address(entry.addr)?;

        let cycles = match entry.kind {
            OpKind::Load => self.head.load(entry.addr, CPU_DATA_SIZE)?.1,
            OpKind::Store(data) => self.head.store(entry.addr, &data)?,
        };

        self.cycles += cycles;
        self.mem_cycles += cycles;
        self.mem_instructions += 1;
        Ok(())
    }

    /// Replays an entire trace file in order.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Io`] when the trace cannot be read and
    /// [`SimError::MalformedTrace`] for an undecodable line.
    pub fn run_trace(&mut self, path: &Path) -> SimResult<()> {
        let file = File::open(path).map_err(|e| SimError::io(path, e))?;
        let reader = BufReader::new(file);
        for (i, line) in reader.lines().enumerate() {
            let line = line.map_err(|e| SimError::io(path, e))?;
            if let Some(entry) = parse_line(&line, i + 1)? {
                self.execute(&entry)?;
            }
        }
        Ok(())
    }

    /// Statistics of the run so far.
    pub fn stats(&self) -> SimStats {
        let l2 = if self.levels == 2 {
            self.head.next_level().map(|level| level.counters())
        } else {
            None
        };
        SimStats {
            cycles: self.cycles,
            mem_cycles: self.mem_cycles,
            mem_instructions: self.mem_instructions,
            l1: self.head.counters(),
            l2,
        }
    }

    /// Dumps the final state of every level to its output file.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Io`] when an output file cannot be written.
    pub fn dump(&self, files: &SimFiles) -> SimResult<()> {
        let images = self.head.dump_images();
        let targets: Vec<&Path> = if self.levels == 2 {
            vec![&files.l1, &files.l2way0, &files.l2way1, &files.memout]
        } else {
            vec![&files.l1, &files.memout]
        };
        debug_assert_eq!(images.len(), targets.len());
        for (path, image) in targets.into_iter().zip(&images) {
            output::write_byte_dump(path, image)?;
        }
        Ok(())
    }
}

/// Runs one full simulation: load the image, replay the trace, dump the
/// hierarchy, and write the statistics report.
///
/// # Errors
///
/// Any [`SimError`]; partial output files may exist after a failure and
/// their contents are undefined.
pub fn run_simulation(config: &SimConfig, files: &SimFiles) -> SimResult<RunSummary> {
    let image = loader::load_memory_image(&files.memin)?;
    let mut sim = Simulator::new(config, image)?;
    sim.run_trace(&files.trace)?;
    sim.dump(files)?;

    let stats = sim.stats();
    stats.write_report(&files.stats)?;
    info!(
        cycles = stats.cycles,
        instructions = stats.mem_instructions,
        "simulation complete"
    );

    Ok(RunSummary {
        l1_miss_rate: stats.l1_miss_rate(),
        total_cycles: stats.cycles,
        amat: stats.amat(),
    })
}
