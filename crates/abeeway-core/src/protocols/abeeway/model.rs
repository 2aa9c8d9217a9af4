//! Typed uplink model and its JSON rendering.
//!
//! Dispatch happens on three discriminants: the message type byte, the
//! position sub-type nibble, and the activity/configuration tag. Each level
//! is an enum with an `Unknown` variant holding the raw value, so matches are
//! exhaustive and unsupported values are carried into the record.

use std::fmt;

use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

use super::layout;
use crate::protocols::common::MessageLookup;

/// Level 1 discriminant: payload byte 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageType {
    FramePending,
    Position,
    EnergyStatus,
    Heartbeat,
    ActivityOrConfiguration,
    Shutdown,
    Debug,
    Unknown(u8),
}

impl From<u8> for MessageType {
    fn from(value: u8) -> Self {
        match value {
            layout::TYPE_FRAME_PENDING => MessageType::FramePending,
            layout::TYPE_POSITION => MessageType::Position,
            layout::TYPE_ENERGY_STATUS => MessageType::EnergyStatus,
            layout::TYPE_HEARTBEAT => MessageType::Heartbeat,
            layout::TYPE_ACTIVITY_CONFIGURATION => MessageType::ActivityOrConfiguration,
            layout::TYPE_SHUTDOWN => MessageType::Shutdown,
            layout::TYPE_DEBUG => MessageType::Debug,
            other => MessageType::Unknown(other),
        }
    }
}

impl MessageType {
    /// Frame pending messages are the only ones without a status header.
    pub fn has_status_header(self) -> bool {
        self != MessageType::FramePending
    }
}

/// Level 2 discriminant for position messages: the header's data nibble.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PositionKind {
    GpsFix,
    GpsTimeout,
    Obsolete,
    WifiTimeout,
    WifiFailure,
    LpGps(u8),
    BleScan,
    BleFailure,
    WifiBssids,
    Unknown(u8),
}

impl From<u8> for PositionKind {
    fn from(value: u8) -> Self {
        match value {
            0 => PositionKind::GpsFix,
            1 => PositionKind::GpsTimeout,
            2 => PositionKind::Obsolete,
            3 => PositionKind::WifiTimeout,
            4 => PositionKind::WifiFailure,
            5 | 6 => PositionKind::LpGps(value),
            7 => PositionKind::BleScan,
            8 => PositionKind::BleFailure,
            9 => PositionKind::WifiBssids,
            other => PositionKind::Unknown(other),
        }
    }
}

/// Discriminant shared by activity status and configuration messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivityTag {
    Activity,
    Configuration,
    Unknown(u8),
}

impl From<u8> for ActivityTag {
    fn from(value: u8) -> Self {
        match value {
            layout::TAG_ACTIVITY => ActivityTag::Activity,
            layout::TAG_CONFIGURATION => ActivityTag::Configuration,
            other => ActivityTag::Unknown(other),
        }
    }
}

/// Device status flags from header byte 1.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeviceStatus {
    pub mode: MessageLookup,
    pub sos: bool,
    pub tracking: bool,
    pub moving: bool,
    pub periodic: bool,
    pub on_demand: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FirmwareVersion {
    pub major: u8,
    pub minor: u8,
    pub patch: u8,
}

impl fmt::Display for FirmwareVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// Common header carried by every message except frame pending.
///
/// Key names and string formats follow what downstream consumers of the
/// tracker records already parse.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusHeader {
    pub status: DeviceStatus,
    #[serde(rename = "batteryPersentage")]
    pub battery_percentage: u8,
    #[serde(serialize_with = "serialize_measurement")]
    pub temperature: f64,
    pub ack: u8,
    pub data: u8,
    #[serde(rename = "lastResetCause", serialize_with = "serialize_reset_cause")]
    pub last_reset_cause: u8,
    #[serde(rename = "mcuFirmware", serialize_with = "serialize_mcu_firmware")]
    pub mcu_firmware: FirmwareVersion,
    #[serde(rename = "bleFirmware", serialize_with = "serialize_ble_firmware")]
    pub ble_firmware: FirmwareVersion,
}

/// Real-valued field rendered the way the record consumers print numbers:
/// whole values carry no fractional part (`64`, not `64.0`).
#[derive(Debug, Clone, Copy, PartialEq)]
struct Measurement(f64);

/// Largest magnitude below which every whole `f64` is an exact integer.
const MAX_EXACT_INTEGER: f64 = 9_007_199_254_740_992.0;

impl Serialize for Measurement {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let Measurement(value) = *self;
        if value.is_finite() && value.fract() == 0.0 && value.abs() < MAX_EXACT_INTEGER {
            serializer.serialize_i64(value as i64)
        } else {
            serializer.serialize_f64(value)
        }
    }
}

fn serialize_measurement<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    Measurement(*value).serialize(serializer)
}

fn serialize_reset_cause<S: Serializer>(cause: &u8, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(&format_args!("lastResetCause: {cause}"))
}

fn serialize_mcu_firmware<S: Serializer>(
    version: &FirmwareVersion,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_str(&format_args!("fwVersion: {version}"))
}

fn serialize_ble_firmware<S: Serializer>(
    version: &FirmwareVersion,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_str(&format_args!("bleFwVersion{version}"))
}

/// One scanned BLE beacon or Wi-Fi access point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MacRssi {
    pub mac_address: String,
    /// Received signal strength in dBm.
    pub rssi: i32,
}

/// One configuration parameter slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ConfigParam {
    #[serde(rename = "type")]
    pub param_type: u8,
    pub value: u32,
}

/// Position message body, selected by [`PositionKind`].
#[derive(Debug, Clone, PartialEq)]
pub enum PositionReport {
    GpsFix {
        age: f64,
        latitude: f64,
        longitude: f64,
        accuracy: f64,
    },
    GpsTimeout {
        cause: MessageLookup,
        carrier_to_noise: [f64; layout::CARRIER_TO_NOISE_COUNT],
    },
    WifiTimeout {
        battery_voltages: [f64; layout::BATTERY_VOLTAGE_COUNT],
    },
    WifiFailure {
        battery_voltages: [f64; layout::BATTERY_VOLTAGE_COUNT],
        cause: MessageLookup,
    },
    /// Encrypted low-power GPS data; not decodable.
    LpGps { sub_type: u8 },
    BleScan { age: f64, beacons: Vec<MacRssi> },
    BleFailure { cause: MessageLookup },
    WifiBssids { age: f64, stations: Vec<MacRssi> },
    /// Obsolete or unassigned sub-type.
    Unsupported { sub_type: u8 },
}

impl PositionReport {
    pub fn position_type(&self) -> Option<&'static str> {
        match self {
            PositionReport::GpsFix { .. } => Some("GPS fix"),
            PositionReport::GpsTimeout { .. } => Some("GPS timeout"),
            PositionReport::WifiTimeout { .. } => Some("WIFI timeout"),
            PositionReport::WifiFailure { .. } => Some("WIFI failure"),
            PositionReport::LpGps { .. } => Some("LP-GPS data"),
            PositionReport::BleScan { .. } => Some("BLE beacon scan"),
            PositionReport::BleFailure { .. } => Some("BLE beacon failure"),
            PositionReport::WifiBssids { .. } => Some("WIFI BSSIDs"),
            PositionReport::Unsupported { .. } => None,
        }
    }

    pub fn error(&self) -> Option<MessageLookup> {
        match self {
            PositionReport::WifiFailure { cause, .. } | PositionReport::BleFailure { cause } => {
                Some(cause.clone())
            }
            PositionReport::LpGps { sub_type } | PositionReport::Unsupported { sub_type } => Some(
                MessageLookup::unsupported(format!("UNSUPPORTED POSITION TYPE {sub_type}")),
            ),
            _ => None,
        }
    }

    fn serialize_fields<M: SerializeMap>(&self, map: &mut M) -> Result<(), M::Error> {
        if let Some(position_type) = self.position_type() {
            map.serialize_entry("position_type", position_type)?;
        }
        match self {
            PositionReport::GpsFix {
                age,
                latitude,
                longitude,
                accuracy,
            } => {
                map.serialize_entry("age", &Measurement(*age))?;
                map.serialize_entry("latitude", &Measurement(*latitude))?;
                map.serialize_entry("longitude", &Measurement(*longitude))?;
                map.serialize_entry("accuracy", &Measurement(*accuracy))?;
                // Not transmitted by the tracker.
                map.serialize_entry("altitude", &0)?;
            }
            PositionReport::GpsTimeout {
                cause,
                carrier_to_noise,
            } => {
                map.serialize_entry("timeout_cause", cause)?;
                for (i, value) in carrier_to_noise.iter().enumerate() {
                    map.serialize_entry(&format!("cn{i}"), &Measurement(*value))?;
                }
            }
            PositionReport::WifiTimeout { battery_voltages }
            | PositionReport::WifiFailure {
                battery_voltages, ..
            } => {
                for (i, value) in battery_voltages.iter().enumerate() {
                    map.serialize_entry(&format!("v_bat{}", i + 1), &Measurement(*value))?;
                }
            }
            PositionReport::BleScan { age, beacons } => {
                map.serialize_entry("age", &Measurement(*age))?;
                map.serialize_entry("beacons", beacons)?;
            }
            PositionReport::WifiBssids { age, stations } => {
                map.serialize_entry("age", &Measurement(*age))?;
                map.serialize_entry("stations", stations)?;
            }
            PositionReport::LpGps { .. }
            | PositionReport::BleFailure { .. }
            | PositionReport::Unsupported { .. } => {}
        }
        Ok(())
    }
}

/// Decoded message body.
#[derive(Debug, Clone, PartialEq)]
pub enum Uplink {
    FramePending { token: u8 },
    Position(PositionReport),
    EnergyStatus,
    Heartbeat,
    ActivityStatus { activity_counter: u32 },
    Configuration {
        params: [ConfigParam; layout::CONFIG_PARAM_COUNT],
    },
    /// Activity/configuration message with an unassigned tag.
    UnsupportedTag { data: u8, tag: u8 },
    Shutdown,
    Debug,
    Unsupported { message_type: u8 },
}

impl Uplink {
    /// The record's `type` tag, absent for unsupported messages.
    pub fn type_label(&self) -> Option<&'static str> {
        match self {
            Uplink::FramePending { .. } => Some("FRAME PENDING"),
            Uplink::Position(_) => Some("POSITION"),
            Uplink::EnergyStatus => Some("ENERGY STATUS"),
            Uplink::Heartbeat => Some("HEARTBEAT"),
            Uplink::ActivityStatus { .. } => Some("ACTIVITY STATUS"),
            Uplink::Configuration { .. } => Some("CONFIGURATION"),
            Uplink::Shutdown => Some("SHUTDOWN"),
            Uplink::Debug => Some("DEBUG"),
            Uplink::UnsupportedTag { .. } | Uplink::Unsupported { .. } => None,
        }
    }

    /// Stable label for summaries; `UNSUPPORTED` when there is no type tag.
    pub fn kind(&self) -> &'static str {
        self.type_label().unwrap_or("UNSUPPORTED")
    }

    /// The record's `error` field, if any.
    pub fn error(&self) -> Option<MessageLookup> {
        match self {
            Uplink::Position(report) => report.error(),
            Uplink::UnsupportedTag { data, tag } => Some(MessageLookup::unsupported(format!(
                "UNSUPPORTED POSITION TYPE {data}/{tag}"
            ))),
            Uplink::Unsupported { message_type } => Some(MessageLookup::unsupported(format!(
                "UNSUPPORTED MESSAGE TYPE {message_type}"
            ))),
            _ => None,
        }
    }
}

impl Serialize for Uplink {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        if let Some(label) = self.type_label() {
            map.serialize_entry("type", label)?;
        }
        match self {
            Uplink::FramePending { token } => map.serialize_entry("token", token)?,
            Uplink::Position(report) => report.serialize_fields(&mut map)?,
            Uplink::ActivityStatus { activity_counter } => {
                map.serialize_entry("activity_counter", activity_counter)?
            }
            Uplink::Configuration { params } => {
                for (i, param) in params.iter().enumerate() {
                    map.serialize_entry(&format!("param{i}"), param)?;
                }
            }
            Uplink::EnergyStatus
            | Uplink::Heartbeat
            | Uplink::UnsupportedTag { .. }
            | Uplink::Shutdown
            | Uplink::Debug
            | Uplink::Unsupported { .. } => {}
        }
        if let Some(error) = self.error() {
            map.serialize_entry("error", &error)?;
        }
        map.end()
    }
}

/// Trailer appended to every record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DebugTrailer {
    /// Whole payload as lowercase hex.
    pub payload: String,
    pub length: usize,
    pub port: u32,
    /// Decode time, ISO-8601 UTC with milliseconds.
    pub server_time: String,
}

/// Fully decoded uplink as handed back to the caller.
///
/// Serializes to one flat JSON object: header keys, message keys, `debug`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DecodedRecord {
    #[serde(flatten)]
    pub status: Option<StatusHeader>,
    #[serde(flatten)]
    pub uplink: Uplink,
    pub debug: DebugTrailer,
}
