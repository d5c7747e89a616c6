//! Block-size sweep tool.
//!
//! Re-runs the same trace across a doubling range of block sizes and writes
//! one CSV row per point (`block_bytes,l1_miss_rate,total_cycles,amat`),
//! ready for plotting. Per-point dump files land in a scratch directory and
//! are overwritten at every point.

use std::error::Error;
use std::fs;
use std::path::PathBuf;
use std::process;

use clap::{Parser, ValueEnum};

use memsim_core::{SimConfig, SimFiles, run_simulation};

/// Which level's block size the sweep varies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum SweepAxis {
    /// Sweep the L1 block size; `--fixed` sets the L2 block size.
    L1,
    /// Sweep the L2 block size; `--fixed` sets the L1 block size.
    L2,
}

#[derive(Parser, Debug)]
#[command(
    name = "memsweep",
    author,
    version,
    about = "Sweep cache block sizes over one trace and emit a CSV of miss rates, cycles, and AMAT"
)]
struct Cli {
    /// CPU trace replayed at every sweep point.
    #[arg(long)]
    trace: PathBuf,

    /// Initial main-memory image.
    #[arg(long)]
    memin: PathBuf,

    /// Number of cache levels (1 or 2).
    #[arg(long, default_value_t = 1)]
    levels: u8,

    /// Which level's block size to sweep.
    #[arg(long, value_enum, default_value = "l1")]
    axis: SweepAxis,

    /// First block size of the sweep, in bytes; doubles each point.
    #[arg(long, default_value_t = 4)]
    start: usize,

    /// Last block size of the sweep, in bytes.
    #[arg(long, default_value_t = 128)]
    end: usize,

    /// Block size of the level that is not being swept.
    #[arg(long, default_value_t = 8)]
    fixed: usize,

    /// CSV report path.
    #[arg(long, default_value = "sweep.csv")]
    output: PathBuf,

    /// Directory for per-point dump files.
    #[arg(long, default_value = "sweep-out")]
    out_dir: PathBuf,
}

fn main() {
    let cli = Cli::parse();
    if cli.axis == SweepAxis::L2 && cli.levels != 2 {
        eprintln!("[!] FATAL: sweeping the L2 block size requires --levels 2");
        process::exit(1);
    }
    if let Err(e) = run(&cli) {
        eprintln!("[!] FATAL: {e}");
        process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<(), Box<dyn Error>> {
    fs::create_dir_all(&cli.out_dir)?;
    let mut writer = csv::Writer::from_path(&cli.output)?;
    writer.write_record(["block_bytes", "l1_miss_rate", "total_cycles", "amat"])?;

    let mut block = cli.start;
    while block <= cli.end {
        let (b1, b2) = match cli.axis {
            SweepAxis::L1 => (block, cli.fixed),
            SweepAxis::L2 => (cli.fixed, block),
        };
        let config = SimConfig::with_blocks(cli.levels, b1, b2);
        let files = SimFiles {
            trace: cli.trace.clone(),
            memin: cli.memin.clone(),
            memout: cli.out_dir.join("memout.txt"),
            l1: cli.out_dir.join("l1.txt"),
            l2way0: cli.out_dir.join("l2way0.txt"),
            l2way1: cli.out_dir.join("l2way1.txt"),
            stats: cli.out_dir.join("stats.txt"),
        };

        eprintln!("block size {block}: running");
        let summary = run_simulation(&config, &files)?;
        writer.write_record([
            block.to_string(),
            format!("{:.4}", summary.l1_miss_rate),
            summary.total_cycles.to_string(),
            format!("{:.4}", summary.amat),
        ])?;

        block *= 2;
    }

    writer.flush()?;
    Ok(())
}
