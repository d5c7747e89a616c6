//! Simulator error taxonomy.
//!
//! Every failure in the simulator is fatal; nothing is retried. This module defines:
//! 1. **Input Errors:** Invalid arguments, malformed trace lines, malformed memory images.
//! 2. **I/O Errors:** Unreadable inputs and unwritable outputs, tagged with the path.
//! 3. **Contract Violations:** Programmer errors in the memory-level protocol, reported
//!    with a distinct diagnostic.
//! 4. **Addressing Errors:** Accesses outside main memory or misaligned in strict mode.

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Result alias used by all fallible simulator operations.
pub type SimResult<T> = Result<T, SimError>;

/// Fatal simulator errors.
#[derive(Debug, Error)]
pub enum SimError {
    /// Command-line or configuration values outside the supported model.
    #[error("invalid arguments: {0}")]
    InvalidArgs(String),

    /// A trace line that cannot be decoded into an instruction.
    #[error("malformed trace line {line}: {reason}")]
    MalformedTrace {
        /// 1-based line number within the trace file.
        line: usize,
        /// What made the line undecodable.
        reason: String,
    },

    /// A memory-image line that is not a single hex byte.
    #[error("malformed memory image {} line {line}: {reason}", .path.display())]
    MalformedImage {
        /// Path of the offending image file.
        path: PathBuf,
        /// 1-based line number within the image file.
        line: usize,
        /// What made the line undecodable.
        reason: String,
    },

    /// Failure reading an input file or writing an output file.
    #[error("{}: {source}", .path.display())]
    Io {
        /// Path of the file involved.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Memory-level protocol misuse. These indicate a bug in the caller,
    /// not in the inputs.
    #[error("memory-level contract violated: {0}")]
    ContractViolation(&'static str),

    /// An address outside main memory, or misaligned under strict mode.
    #[error("bad address {addr:#08x}: {reason}")]
    Addressing {
        /// The offending 24-bit address.
        addr: u32,
        /// Why the address was rejected.
        reason: String,
    },
}

impl SimError {
    /// Wraps an I/O error with the path it occurred on.
    pub fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}
