//! Memory dump files.
//!
//! Final memory state is written one byte per line as two uppercase hex
//! digits, with no newline after the last byte.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use crate::common::error::{SimError, SimResult};

fn dump<W: Write>(writer: &mut W, bytes: &[u8]) -> io::Result<()> {
    for (i, byte) in bytes.iter().enumerate() {
        if i > 0 {
            writer.write_all(b"\n")?;
        }
        write!(writer, "{byte:02X}")?;
    }
    writer.flush()
}

/// Writes `bytes` to `path` in the byte-per-line dump format.
///
/// # Errors
///
/// Returns [`SimError::Io`] when the file cannot be created or written.
pub fn write_byte_dump(path: &Path, bytes: &[u8]) -> SimResult<()> {
    let file = File::create(path).map_err(|e| SimError::io(path, e))?;
    let mut writer = BufWriter::new(file);
    dump(&mut writer, bytes).map_err(|e| SimError::io(path, e))
}
