//! Format-independent helpers shared by protocol readers.
//!
//! All multi-byte values are big-endian (MSB first). Bit positions count from
//! the least significant bit (bit 0).

pub mod lookup;
pub mod reader;

pub use lookup::{MessageLookup, UNKNOWN_DESCRIPTION, message};
pub use reader::{HexError, bit, bits, hex, int32, parse_hex, uint32};
