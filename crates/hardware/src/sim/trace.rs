//! CPU trace decoding.
//!
//! A trace line is `<extra_cycles> <L|S> <hex_addr> [<hex_data>]`:
//! 1. `extra_cycles` is a decimal count of cycles spent on non-memory
//!    instructions before this access.
//! 2. `L` is a word load; `S` is a word store and carries a 4-byte data
//!    field written in big-endian hex.
//! 3. Addresses are up to six hex digits (24 bits).
//!
//! Store data is converted to little-endian byte order here, before it
//! enters the hierarchy.

use crate::common::constants::CPU_DATA_SIZE;
use crate::common::error::{SimError, SimResult};

/// What a trace instruction does to memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpKind {
    /// Read one CPU word.
    Load,
    /// Write one CPU word; bytes are in little-endian order.
    Store([u8; CPU_DATA_SIZE]),
}

/// One decoded trace instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TraceEntry {
    /// Cycles to add to the total before the memory access runs.
    pub extra_cycles: u64,
    /// The 24-bit address accessed.
    pub addr: u32,
    /// Load or store, with store data.
    pub kind: OpKind,
}

fn malformed(line: usize, reason: impl Into<String>) -> SimError {
    SimError::MalformedTrace {
        line,
        reason: reason.into(),
    }
}

/// Decodes one trace line. Returns `None` for a blank line.
///
/// # Errors
///
/// Returns [`SimError::MalformedTrace`] when the line has the wrong number
/// of fields, an unknown opcode letter, or undecodable numbers.
pub fn parse_line(text: &str, line: usize) -> SimResult<Option<TraceEntry>> {
    let fields: Vec<&str> = text.split_whitespace().collect();
    if fields.is_empty() {
        return Ok(None);
    }
    if fields.len() < 3 {
        return Err(malformed(line, "expected <cycles> <L|S> <addr> [<data>]"));
    }

    let extra_cycles = fields[0]
        .parse::<u64>()
        .map_err(|_| malformed(line, format!("bad cycle count '{}'", fields[0])))?;

    let addr_text = fields[2];
    if addr_text.len() > 6 {
        return Err(malformed(line, format!("address '{addr_text}' exceeds 24 bits")));
    }
    let addr = u32::from_str_radix(addr_text, 16)
        .map_err(|_| malformed(line, format!("bad hex address '{addr_text}'")))?;

    let kind = match fields[1] {
        "L" => {
            if fields.len() != 3 {
                return Err(malformed(line, "load takes no data field"));
            }
            OpKind::Load
        }
        "S" => {
            if fields.len() != 4 {
                return Err(malformed(line, "store requires a data field"));
            }
            let data_text = fields[3];
            if data_text.len() > 2 * CPU_DATA_SIZE {
                return Err(malformed(line, format!("data '{data_text}' exceeds 32 bits")));
            }
            let value = u32::from_str_radix(data_text, 16)
                .map_err(|_| malformed(line, format!("bad hex data '{data_text}'")))?;
            // Big-endian on the wire, little-endian in memory.
            OpKind::Store(value.to_le_bytes())
        }
        other => return Err(malformed(line, format!("unknown opcode '{other}'"))),
    };

    Ok(Some(TraceEntry {
        extra_cycles,
        addr,
        kind,
    }))
}
