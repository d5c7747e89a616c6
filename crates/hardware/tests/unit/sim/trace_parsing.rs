//! Trace decoding unit tests.
//!
//! Verifies field extraction, the big-endian-to-little-endian store data
//! conversion, and the malformed-line taxonomy.

use pretty_assertions::assert_eq;

use memsim_core::common::error::SimError;
use memsim_core::sim::trace::{OpKind, TraceEntry, parse_line};

#[test]
fn decodes_a_load() {
    let entry = parse_line("0 L 000000", 1).unwrap();
    assert_eq!(
        entry,
        Some(TraceEntry {
            extra_cycles: 0,
            addr: 0,
            kind: OpKind::Load,
        })
    );
}

/// Store data arrives big-endian and is flipped to little-endian bytes.
#[test]
fn decodes_a_store_little_endian() {
    let entry = parse_line("5 S 0001A0 DEADBEEF", 1).unwrap().unwrap();
    assert_eq!(entry.extra_cycles, 5);
    assert_eq!(entry.addr, 0x1A0);
    assert_eq!(entry.kind, OpKind::Store([0xEF, 0xBE, 0xAD, 0xDE]));
}

#[test]
fn short_data_is_zero_extended() {
    let entry = parse_line("0 S 000010 FF", 1).unwrap().unwrap();
    assert_eq!(entry.kind, OpKind::Store([0xFF, 0x00, 0x00, 0x00]));
}

#[test]
fn blank_lines_decode_to_nothing() {
    assert_eq!(parse_line("", 1).unwrap(), None);
    assert_eq!(parse_line("   \t ", 1).unwrap(), None);
}

#[test]
fn tolerates_extra_whitespace_between_fields() {
    let entry = parse_line("  3   L   00FF00 ", 1).unwrap().unwrap();
    assert_eq!(entry.extra_cycles, 3);
    assert_eq!(entry.addr, 0xFF00);
}

fn expect_malformed(text: &str, line: usize) -> (usize, String) {
    match parse_line(text, line) {
        Err(SimError::MalformedTrace { line, reason }) => (line, reason),
        other => panic!("expected MalformedTrace for '{text}', got {other:?}"),
    }
}

#[test]
fn rejects_missing_fields() {
    let (line, _) = expect_malformed("L 000000", 42);
    assert_eq!(line, 42);
}

#[test]
fn rejects_bad_cycle_count() {
    let (_, reason) = expect_malformed("x L 000000", 1);
    assert!(reason.contains("cycle count"));
}

#[test]
fn rejects_unknown_opcode() {
    let (_, reason) = expect_malformed("0 X 000000", 1);
    assert!(reason.contains("opcode"));
}

#[test]
fn rejects_store_without_data() {
    let _ = expect_malformed("0 S 000000", 1);
}

#[test]
fn rejects_load_with_data() {
    let _ = expect_malformed("0 L 000000 DEADBEEF", 1);
}

#[test]
fn rejects_bad_hex_address() {
    let _ = expect_malformed("0 L zzz", 1);
}

#[test]
fn rejects_address_wider_than_24_bits() {
    let _ = expect_malformed("0 L 1234567", 1);
}

#[test]
fn rejects_data_wider_than_32_bits() {
    let _ = expect_malformed("0 S 000000 123456789", 1);
}
