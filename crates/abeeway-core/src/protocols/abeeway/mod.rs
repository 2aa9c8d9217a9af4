//! Abeeway tracker uplink decoding.
//!
//! A payload starts with a message type byte. Every type except frame pending
//! carries a 12-byte status header whose low `data` nibble selects the
//! position sub-type; activity and configuration messages share type 0x07 and
//! are told apart by byte 5. Unsupported values decode to dedicated variants
//! and are reported through the record's `error` field rather than failing.
//!
//! Reads past the end of the payload fail with `DecodeError::TooShort`;
//! missing bytes are never zero-filled. Offsets, quantization constants, and
//! description catalogs live in `layout`, bounds-checked access in `reader`.

pub mod error;
pub mod layout;
pub mod model;
pub mod parser;
pub mod quantize;
pub mod reader;

pub use error::DecodeError;
pub use parser::{ParsedUplink, decode_uplink, decode_uplink_with_clock, parse_uplink};
