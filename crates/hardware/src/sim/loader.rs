//! Memory image loading.
//!
//! A memory image file holds one byte per line as two hex digits; bytes fill
//! main memory sequentially from address 0, and everything the file does not
//! specify stays 0.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::common::error::{SimError, SimResult};

/// Reads a memory image into a byte vector, one byte per line.
///
/// The caller pads the result to the memory capacity; this only parses.
///
/// # Errors
///
/// Returns [`SimError::Io`] when the file cannot be read and
/// [`SimError::MalformedImage`] when a line is not a single hex byte.
pub fn load_memory_image(path: &Path) -> SimResult<Vec<u8>> {
    let file = File::open(path).map_err(|e| SimError::io(path, e))?;
    let reader = BufReader::new(file);

    let mut image = Vec::new();
    for (i, line) in reader.lines().enumerate() {
        let line = line.map_err(|e| SimError::io(path, e))?;
        let text = line.trim();
        if text.is_empty() {
            continue;
        }
        let byte = u8::from_str_radix(text, 16).map_err(|_| SimError::MalformedImage {
            path: path.to_path_buf(),
            line: i + 1,
            reason: format!("'{text}' is not a hex byte"),
        })?;
        image.push(byte);
    }
    Ok(image)
}
