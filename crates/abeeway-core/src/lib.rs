//! Abeeway core library for decoding tracker uplink payloads.
//!
//! The decoder turns a raw LoRaWAN uplink (bytes plus port) into a structured
//! record: status header, message type, type-specific fields, and a debug
//! trailer. Decoding is byte-oriented and side-effect free apart from the
//! injected [`Clock`]; file access is isolated in `source`, and the batch
//! pipeline aggregates many uplinks into a deterministic report.
//!
//! Invariants:
//! - Byte order is big-endian (MSB first) throughout.
//! - Reads past the end of a payload fail with `DecodeError::TooShort`.
//! - Unsupported type, position, and tag values never fail; they surface as
//!   the record's `error` field.
//!
//! Version française (résumé):
//! Cette crate décode les trames montantes des traceurs Abeeway : en-tête
//! d'état, type de message, champs propres au type, bloc de debug. Le
//! décodage est pur hormis l'horloge injectée ; les lectures hors limites
//! échouent explicitement au lieu d'être complétées par des zéros.
//!
//! # Examples
//! ```
//! use abeeway_core::{FixedClock, decode_uplink_with_clock, parse_hex};
//!
//! let payload = parse_hex("03485a8c1008195d4bf2ee8b3c")?;
//! let clock = FixedClock::from_unix_timestamp(1_704_067_200)?;
//! let record = decode_uplink_with_clock(&payload, 18, &clock)?;
//! let json = serde_json::to_value(&record)?;
//! assert_eq!(json["position_type"], "GPS fix");
//! assert_eq!(json["latitude"], 42.5544448);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use serde::Serialize;

mod batch;
mod clock;
pub mod protocols;
mod source;

pub use batch::{BatchError, decode_file, decode_source};
pub use clock::{Clock, FixedClock, SystemClock, format_server_time};
pub use protocols::abeeway::model::{
    ActivityTag, ConfigParam, DebugTrailer, DecodedRecord, DeviceStatus, FirmwareVersion,
    MacRssi, MessageType, PositionKind, PositionReport, StatusHeader, Uplink,
};
pub use protocols::abeeway::quantize::{
    Quantization, QuantizationError, decode_value, round_hundredths, step_size,
};
pub use protocols::abeeway::reader::mac_rssi;
pub use protocols::abeeway::{
    DecodeError, ParsedUplink, decode_uplink, decode_uplink_with_clock, parse_uplink,
};
pub use protocols::common::{
    HexError, MessageLookup, UNKNOWN_DESCRIPTION, bit, bits, hex, int32, message, parse_hex,
    uint32,
};
pub use source::{HexFileSource, SourceError, UplinkEvent, UplinkSource};

/// Current batch report schema version.
pub const REPORT_VERSION: u32 = 1;
/// Default timestamp used before a report is stamped.
pub const DEFAULT_GENERATED_AT: &str = "1970-01-01T00:00:00.000Z";

/// Batch decoding report with entries in input order.
#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    /// Report schema version (not the binary version).
    pub report_version: u32,
    pub tool: ToolInfo,
    /// Time the batch was decoded.
    pub generated_at: String,
    pub input: InputInfo,
    pub summary: BatchSummary,
    pub entries: Vec<BatchEntry>,
}

impl BatchReport {
    /// Whether any uplink failed to decode or decoded with an `error` field.
    pub fn has_problems(&self) -> bool {
        self.summary.failed > 0 || self.summary.with_errors > 0
    }
}

/// Tool metadata embedded in reports.
#[derive(Debug, Clone, Serialize)]
pub struct ToolInfo {
    pub name: String,
    pub version: String,
}

/// Input file metadata embedded in reports.
#[derive(Debug, Clone, Serialize)]
pub struct InputInfo {
    /// Input path as provided to the decoder.
    pub path: String,
    /// Input size in bytes.
    pub bytes: u64,
}

/// Counters over a batch.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchSummary {
    pub uplinks_total: u64,
    pub decoded: u64,
    pub failed: u64,
    /// Decoded records carrying an `error` field.
    pub with_errors: u64,
    /// Decoded records per type label, sorted by label.
    pub by_type: Vec<TypeCount>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TypeCount {
    #[serde(rename = "type")]
    pub kind: String,
    pub count: u64,
}

/// One uplink of a batch.
#[derive(Debug, Clone, Serialize)]
pub struct BatchEntry {
    /// 1-based line number in the input.
    pub line: usize,
    pub port: u32,
    #[serde(flatten)]
    pub outcome: BatchOutcome,
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum BatchOutcome {
    Decoded { record: DecodedRecord },
    Failed { payload: String, failure: String },
}

/// Build a report with base fields filled and no entries.
///
/// # Examples
/// ```
/// use abeeway_core::make_stub_report;
///
/// let report = make_stub_report("uplinks.txt", 123);
/// assert_eq!(report.report_version, abeeway_core::REPORT_VERSION);
/// assert!(report.entries.is_empty());
/// ```
pub fn make_stub_report(input_path: &str, input_bytes: u64) -> BatchReport {
    BatchReport {
        report_version: REPORT_VERSION,
        tool: ToolInfo {
            name: "abeeway".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        },
        generated_at: DEFAULT_GENERATED_AT.to_string(),
        input: InputInfo {
            path: input_path.to_string(),
            bytes: input_bytes,
        },
        summary: BatchSummary::default(),
        entries: vec![],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failed_entry_is_flat() {
        let entry = BatchEntry {
            line: 3,
            port: 18,
            outcome: BatchOutcome::Failed {
                payload: "05".to_string(),
                failure: "payload too short: need 12 bytes, got 1".to_string(),
            },
        };
        let value = serde_json::to_value(&entry).expect("entry json");
        assert_eq!(value["line"], 3);
        assert_eq!(value["payload"], "05");
        assert!(value.get("record").is_none());
    }

    #[test]
    fn stub_report_has_no_problems() {
        let report = make_stub_report("uplinks.txt", 0);
        assert!(!report.has_problems());
        let value = serde_json::to_value(&report).expect("report json");
        assert_eq!(value["tool"]["name"], "abeeway");
        assert_eq!(value["summary"]["uplinks_total"], 0);
    }
}
