//! Memory-hierarchy simulator CLI.
//!
//! This binary runs one simulation: it takes the ten positional arguments
//! (level count, block sizes, and the seven file paths), replays the trace
//! over the hierarchy, and writes the dump and statistics files. Set
//! `RUST_LOG=memsim_core=debug` to watch refills and write-backs on stderr.

use std::path::PathBuf;
use std::process;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use memsim_core::{SimConfig, SimFiles, run_simulation};

#[derive(Parser, Debug)]
#[command(
    name = "memsim",
    author,
    version,
    about = "Cycle-accurate two-level memory-hierarchy simulator",
    long_about = "Replays a CPU trace of word loads and stores over a direct-mapped L1, \
an optional 2-way LRU L2, and main memory, then writes the final state of every level \
and a statistics report.\n\nExample:\n  memsim 2 4 8 trace.txt memin.txt memout.txt l1.txt l2way0.txt l2way1.txt stats.txt"
)]
struct Cli {
    /// Number of cache levels (1 or 2).
    levels: u8,

    /// L1 block size in bytes (power of two, 4 to 128).
    b1: usize,

    /// L2 block size in bytes (power of two; ignored when levels is 1).
    b2: usize,

    /// CPU trace input file.
    trace: PathBuf,

    /// Initial main-memory image input file.
    memin: PathBuf,

    /// Final main-memory dump output file.
    memout: PathBuf,

    /// Final L1 data dump output file.
    l1: PathBuf,

    /// L2 way-0 dump output file (written only when levels is 2).
    l2way0: PathBuf,

    /// L2 way-1 dump output file (written only when levels is 2).
    l2way1: PathBuf,

    /// Statistics report output file.
    stats: PathBuf,

    /// Optional JSON configuration override for latencies, bus widths,
    /// capacities, and strict alignment.
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut config = match cli.config.as_deref() {
        Some(path) => match SimConfig::from_json_file(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("[!] FATAL: {e}");
                process::exit(1);
            }
        },
        None => SimConfig::default(),
    };
    config.levels = cli.levels;
    config.l1.block_bytes = cli.b1;
    config.l2.block_bytes = cli.b2;

    let files = SimFiles {
        trace: cli.trace,
        memin: cli.memin,
        memout: cli.memout,
        l1: cli.l1,
        l2way0: cli.l2way0,
        l2way1: cli.l2way1,
        stats: cli.stats,
    };

    match run_simulation(&config, &files) {
        Ok(summary) => {
            println!(
                "simulation complete: {} cycles, L1 miss rate {:.4}, AMAT {:.4}",
                summary.total_cycles, summary.l1_miss_rate, summary.amat
            );
        }
        Err(e) => {
            eprintln!("[!] FATAL: {e}");
            process::exit(1);
        }
    }
}
