//! Protocol decoding modules.
//!
//! Each protocol follows a layered structure:
//! - `layout`: byte offsets, ranges, and lookup tables (source of truth)
//! - `reader`: bounds-checked byte access and protocol conventions
//! - `parser`: domain-level decoding (no direct byte indexing)
//! - `error`: explicit, actionable errors
//!
//! Parsers are pure and contain no I/O; the only ambient input is the clock
//! used for the decode trailer.

pub mod abeeway;
pub mod common;
