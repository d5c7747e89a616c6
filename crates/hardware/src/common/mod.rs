//! Common types and constants shared across the hierarchy.

/// Address decomposition into (tag, index, offset) fields.
pub mod addr;
/// System-wide constants (address width, CPU word size).
pub mod constants;
/// Fatal error taxonomy and the `SimResult` alias.
pub mod error;
