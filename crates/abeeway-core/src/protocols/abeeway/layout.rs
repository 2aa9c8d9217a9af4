use std::ops::Range;

use super::quantize::Quantization;

pub const TYPE_OFFSET: usize = 0;
pub const TOKEN_OFFSET: usize = 1;

pub const STATUS_OFFSET: usize = 1;
pub const BATTERY_OFFSET: usize = 2;
pub const TEMPERATURE_OFFSET: usize = 3;
pub const ACK_DATA_OFFSET: usize = 4;
pub const RESET_CAUSE_OFFSET: usize = 5;
pub const MCU_FIRMWARE_RANGE: Range<usize> = 6..9;
pub const BLE_FIRMWARE_RANGE: Range<usize> = 9..12;
pub const HEADER_LEN: usize = 12;

pub const TYPE_FRAME_PENDING: u8 = 0x00;
pub const TYPE_POSITION: u8 = 0x03;
pub const TYPE_ENERGY_STATUS: u8 = 0x04;
pub const TYPE_HEARTBEAT: u8 = 0x05;
pub const TYPE_ACTIVITY_CONFIGURATION: u8 = 0x07;
pub const TYPE_SHUTDOWN: u8 = 0x09;
pub const TYPE_DEBUG: u8 = 0xff;

// Position payloads
pub const POSITION_AGE_OFFSET: usize = 5;
pub const LATITUDE_RANGE: Range<usize> = 6..9;
pub const LONGITUDE_RANGE: Range<usize> = 9..12;
pub const ACCURACY_OFFSET: usize = 12;
pub const COORDINATE_SCALE: f64 = 1e7;

pub const TIMEOUT_CAUSE_OFFSET: usize = 5;
pub const CARRIER_TO_NOISE_OFFSET: usize = 6;
pub const CARRIER_TO_NOISE_COUNT: usize = 4;

pub const BATTERY_VOLTAGE_OFFSET: usize = 5;
pub const BATTERY_VOLTAGE_COUNT: usize = 6;
pub const WIFI_FAILURE_CAUSE_OFFSET: usize = 11;

pub const BLE_FAILURE_CAUSE_OFFSET: usize = 5;

pub const SCAN_DATA_OFFSET: usize = 6;
pub const MAC_RSSI_GROUP_LEN: usize = 7;
pub const MAC_ADDRESS_LEN: usize = 6;

// Activity / configuration payloads
pub const ACTIVITY_TAG_OFFSET: usize = 5;
pub const ACTIVITY_COUNTER_RANGE: Range<usize> = 6..10;
pub const CONFIG_PARAMS_OFFSET: usize = 6;
pub const CONFIG_PARAM_LEN: usize = 5;
pub const CONFIG_PARAM_COUNT: usize = 5;

pub const TAG_ACTIVITY: u8 = 1;
pub const TAG_CONFIGURATION: u8 = 2;

pub const TEMPERATURE: Quantization = Quantization {
    lo: -44.0,
    hi: 85.0,
    nbits: 8,
    nreserved: 0,
};

pub const AGE: Quantization = Quantization {
    lo: 0.0,
    hi: 2040.0,
    nbits: 8,
    nreserved: 0,
};

pub const ACCURACY: Quantization = Quantization {
    lo: 0.0,
    hi: 1000.0,
    nbits: 8,
    nreserved: 0,
};

pub const CARRIER_TO_NOISE: Quantization = AGE;

pub const BATTERY_VOLTAGE: Quantization = Quantization {
    lo: 2.8,
    hi: 4.2,
    nbits: 8,
    nreserved: 2,
};

pub const DEVICE_MODES: [&str; 6] = [
    "Standby",
    "Motion tracking",
    "Permanent tracking",
    "Motion start/end tracking",
    "Activity tracking",
    "OFF",
];

pub const GPS_TIMEOUT_CAUSES: [&str; 1] = ["User timeout cause"];

pub const WIFI_FAILURE_CAUSES: [&str; 4] = [
    "WIFI connection failure",
    "Scan failure",
    "Antenna unavailable",
    "WIFI not supported on this device",
];

pub const BLE_FAILURE_CAUSES: [&str; 6] = [
    "BLE is not responding",
    "Internal error",
    "Shared antenna not available",
    "Scan already on going",
    "No beacon detected",
    "Hardware incompatibility",
];

pub const CONFIG_MIN_LEN: usize = CONFIG_PARAMS_OFFSET + CONFIG_PARAM_LEN * CONFIG_PARAM_COUNT;
