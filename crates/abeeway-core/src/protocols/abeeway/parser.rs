use log::{debug, trace, warn};

use super::error::DecodeError;
use super::layout;
use super::model::{
    ActivityTag, ConfigParam, DebugTrailer, DecodedRecord, DeviceStatus, MessageType,
    PositionKind, PositionReport, StatusHeader, Uplink,
};
use super::quantize::round_hundredths;
use super::reader::UplinkReader;
use crate::clock::{Clock, SystemClock, format_server_time};
use crate::protocols::common::{bit, bits, hex, message};

/// Status header and message body, without the debug trailer.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedUplink {
    pub status: Option<StatusHeader>,
    pub uplink: Uplink,
}

/// Decode an uplink, stamping the trailer with the current UTC time.
///
/// # Examples
/// ```
/// use abeeway_core::{decode_uplink, parse_hex};
///
/// let payload = parse_hex("05206480150003020701020a")?;
/// let record = decode_uplink(&payload, 18)?;
/// assert_eq!(record.uplink.type_label(), Some("HEARTBEAT"));
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
///
/// # Errors
/// Returns `DecodeError::TooShort` when a field required by the message type
/// lies beyond the end of the payload.
pub fn decode_uplink(payload: &[u8], port: u32) -> Result<DecodedRecord, DecodeError> {
    decode_uplink_with_clock(payload, port, &SystemClock)
}

/// Decode an uplink, reading the trailer timestamp from `clock`.
pub fn decode_uplink_with_clock<C: Clock + ?Sized>(
    payload: &[u8],
    port: u32,
    clock: &C,
) -> Result<DecodedRecord, DecodeError> {
    let ParsedUplink { status, uplink } = parse_uplink(payload)?;
    let debug = DebugTrailer {
        payload: hex(payload, ""),
        length: payload.len(),
        port,
        server_time: format_server_time(clock.now_utc())?,
    };
    Ok(DecodedRecord {
        status,
        uplink,
        debug,
    })
}

/// Decode the status header and the type-specific body.
pub fn parse_uplink(payload: &[u8]) -> Result<ParsedUplink, DecodeError> {
    let reader = UplinkReader::new(payload);
    let message_type = MessageType::from(reader.read_u8(layout::TYPE_OFFSET)?);
    trace!("uplink type {:?}, {} bytes", message_type, payload.len());

    let status = if message_type.has_status_header() {
        Some(parse_status_header(&reader)?)
    } else {
        None
    };
    let data = status.as_ref().map_or(0, |header| header.data);

    let uplink = match message_type {
        MessageType::FramePending => Uplink::FramePending {
            token: reader.read_u8(layout::TOKEN_OFFSET)?,
        },
        MessageType::Position => Uplink::Position(parse_position(&reader, data)?),
        MessageType::EnergyStatus => Uplink::EnergyStatus,
        MessageType::Heartbeat => Uplink::Heartbeat,
        MessageType::ActivityOrConfiguration => parse_activity_or_configuration(&reader, data)?,
        MessageType::Shutdown => Uplink::Shutdown,
        MessageType::Debug => Uplink::Debug,
        MessageType::Unknown(value) => {
            warn!("unsupported message type {value:#04x}");
            Uplink::Unsupported {
                message_type: value,
            }
        }
    };
    debug!("decoded {} uplink", uplink.kind());

    Ok(ParsedUplink { status, uplink })
}

fn parse_status_header(reader: &UplinkReader<'_>) -> Result<StatusHeader, DecodeError> {
    reader.require_len(layout::HEADER_LEN)?;

    let flags = u32::from(reader.read_u8(layout::STATUS_OFFSET)?);
    let status = DeviceStatus {
        mode: message(i64::from(bits(flags, 5, 7)), &layout::DEVICE_MODES),
        sos: bit(flags, 4),
        tracking: bit(flags, 3),
        moving: bit(flags, 2),
        periodic: bit(flags, 1),
        on_demand: bit(flags, 0),
    };

    let ack_data = u32::from(reader.read_u8(layout::ACK_DATA_OFFSET)?);
    let temperature = reader.read_quantized(layout::TEMPERATURE_OFFSET, &layout::TEMPERATURE)?;

    Ok(StatusHeader {
        status,
        battery_percentage: reader.read_u8(layout::BATTERY_OFFSET)?,
        temperature: round_hundredths(temperature),
        ack: bits(ack_data, 4, 7) as u8,
        data: bits(ack_data, 0, 3) as u8,
        last_reset_cause: reader.read_u8(layout::RESET_CAUSE_OFFSET)?,
        mcu_firmware: reader.read_firmware(layout::MCU_FIRMWARE_RANGE)?,
        ble_firmware: reader.read_firmware(layout::BLE_FIRMWARE_RANGE)?,
    })
}

fn parse_position(reader: &UplinkReader<'_>, data: u8) -> Result<PositionReport, DecodeError> {
    let kind = PositionKind::from(data);
    trace!("position sub-type {:?}", kind);

    let report = match kind {
        PositionKind::GpsFix => PositionReport::GpsFix {
            age: reader.read_quantized(layout::POSITION_AGE_OFFSET, &layout::AGE)?,
            latitude: reader.read_coordinate(layout::LATITUDE_RANGE)?,
            longitude: reader.read_coordinate(layout::LONGITUDE_RANGE)?,
            accuracy: reader.read_quantized(layout::ACCURACY_OFFSET, &layout::ACCURACY)?,
        },
        PositionKind::GpsTimeout => {
            let cause = reader.read_u8(layout::TIMEOUT_CAUSE_OFFSET)?;
            let mut carrier_to_noise = [0.0; layout::CARRIER_TO_NOISE_COUNT];
            for (i, value) in carrier_to_noise.iter_mut().enumerate() {
                *value = reader.read_quantized(
                    layout::CARRIER_TO_NOISE_OFFSET + i,
                    &layout::CARRIER_TO_NOISE,
                )?;
            }
            PositionReport::GpsTimeout {
                cause: message(i64::from(cause), &layout::GPS_TIMEOUT_CAUSES),
                carrier_to_noise,
            }
        }
        PositionKind::WifiTimeout => PositionReport::WifiTimeout {
            battery_voltages: read_battery_voltages(reader)?,
        },
        PositionKind::WifiFailure => {
            let battery_voltages = read_battery_voltages(reader)?;
            let cause = reader.read_u8(layout::WIFI_FAILURE_CAUSE_OFFSET)?;
            PositionReport::WifiFailure {
                battery_voltages,
                cause: message(i64::from(cause), &layout::WIFI_FAILURE_CAUSES),
            }
        }
        PositionKind::LpGps(sub_type) => {
            warn!("LP-GPS position data is encrypted, sub-type {sub_type}");
            PositionReport::LpGps { sub_type }
        }
        PositionKind::BleScan => PositionReport::BleScan {
            age: reader.read_quantized(layout::POSITION_AGE_OFFSET, &layout::AGE)?,
            beacons: reader.read_mac_rssi_list(layout::SCAN_DATA_OFFSET)?,
        },
        PositionKind::BleFailure => {
            let cause = reader.read_u8(layout::BLE_FAILURE_CAUSE_OFFSET)?;
            PositionReport::BleFailure {
                cause: message(i64::from(cause), &layout::BLE_FAILURE_CAUSES),
            }
        }
        PositionKind::WifiBssids => PositionReport::WifiBssids {
            age: reader.read_quantized(layout::POSITION_AGE_OFFSET, &layout::AGE)?,
            stations: reader.read_mac_rssi_list(layout::SCAN_DATA_OFFSET)?,
        },
        PositionKind::Obsolete | PositionKind::Unknown(_) => {
            warn!("unsupported position type {data}");
            PositionReport::Unsupported { sub_type: data }
        }
    };
    Ok(report)
}

fn read_battery_voltages(
    reader: &UplinkReader<'_>,
) -> Result<[f64; layout::BATTERY_VOLTAGE_COUNT], DecodeError> {
    let mut voltages = [0.0; layout::BATTERY_VOLTAGE_COUNT];
    for (i, value) in voltages.iter_mut().enumerate() {
        *value =
            reader.read_quantized(layout::BATTERY_VOLTAGE_OFFSET + i, &layout::BATTERY_VOLTAGE)?;
    }
    Ok(voltages)
}

fn parse_activity_or_configuration(
    reader: &UplinkReader<'_>,
    data: u8,
) -> Result<Uplink, DecodeError> {
    let tag = reader.read_u8(layout::ACTIVITY_TAG_OFFSET)?;
    let uplink = match ActivityTag::from(tag) {
        ActivityTag::Activity => Uplink::ActivityStatus {
            activity_counter: reader.read_u32_be(layout::ACTIVITY_COUNTER_RANGE)?,
        },
        ActivityTag::Configuration => {
            reader.require_len(layout::CONFIG_MIN_LEN)?;
            let mut params = [ConfigParam {
                param_type: 0,
                value: 0,
            }; layout::CONFIG_PARAM_COUNT];
            for (i, param) in params.iter_mut().enumerate() {
                let offset = layout::CONFIG_PARAMS_OFFSET + layout::CONFIG_PARAM_LEN * i;
                *param = ConfigParam {
                    param_type: reader.read_u8(offset)?,
                    value: reader.read_u32_be(offset + 1..offset + layout::CONFIG_PARAM_LEN)?,
                };
            }
            Uplink::Configuration { params }
        }
        ActivityTag::Unknown(tag) => {
            warn!("unsupported activity/configuration tag {tag}");
            Uplink::UnsupportedTag { data, tag }
        }
    };
    Ok(uplink)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::protocols::common::parse_hex;

    fn parse(hex: &str) -> ParsedUplink {
        parse_uplink(&parse_hex(hex).unwrap()).unwrap()
    }

    #[test]
    fn heartbeat_header_fields() {
        let parsed = parse("05206480150003020701020a");
        assert_eq!(parsed.uplink, Uplink::Heartbeat);
        let header = parsed.status.unwrap();
        assert_eq!(header.status.mode.code, 1);
        assert_eq!(header.status.mode.description, "Motion tracking");
        assert!(!header.status.sos);
        assert_eq!(header.battery_percentage, 100);
        assert_eq!(header.temperature, 20.75);
        assert_eq!(header.ack, 1);
        assert_eq!(header.data, 5);
        assert_eq!(header.last_reset_cause, 0);
        assert_eq!(header.mcu_firmware.to_string(), "3.2.7");
        assert_eq!(header.ble_firmware.to_string(), "1.2.10");
    }

    #[test]
    fn status_flags_follow_bits() {
        let parsed = parse("05ff6480150003020701020a");
        let status = parsed.status.unwrap().status;
        assert_eq!(status.mode.code, 7);
        assert_eq!(status.mode.description, "UNKNOWN");
        assert!(status.sos && status.tracking && status.moving);
        assert!(status.periodic && status.on_demand);
    }

    #[test]
    fn frame_pending_skips_header() {
        let parsed = parse("00a7");
        assert!(parsed.status.is_none());
        assert_eq!(parsed.uplink, Uplink::FramePending { token: 0xa7 });
    }

    #[test]
    fn gps_fix_coordinates() {
        let parsed = parse("03485a8c1008195d4bf2ee8b3c");
        match parsed.uplink {
            Uplink::Position(PositionReport::GpsFix {
                age,
                latitude,
                longitude,
                accuracy,
            }) => {
                assert_eq!(age, 64.0);
                assert_eq!(latitude, 42.5544448);
                assert_eq!(longitude, -21.9247872);
                assert!((accuracy - 235.2941176470588).abs() < 1e-9);
            }
            other => panic!("unexpected uplink {other:?}"),
        }
    }

    #[test]
    fn gps_fix_missing_accuracy_fails() {
        let err = parse_uplink(&parse_hex("03485a8c1008195d4bf2ee8b").unwrap()).unwrap_err();
        assert!(matches!(
            err,
            DecodeError::TooShort {
                needed: 13,
                actual: 12
            }
        ));
    }

    #[test]
    fn unknown_position_nibble() {
        let parsed = parse("03205a8c1f00010203040506");
        let uplink = parsed.uplink;
        assert_eq!(
            uplink,
            Uplink::Position(PositionReport::Unsupported { sub_type: 15 })
        );
        let value = serde_json::to_value(&uplink).unwrap();
        assert!(value.get("position_type").is_none());
        assert!(value.get("error").is_some());
    }

    #[test]
    fn ble_scan_rejects_partial_group() {
        let err =
            parse_uplink(&parse_hex("03a05a8c1720e3f0a1b2c3d4c5aabb").unwrap()).unwrap_err();
        assert!(matches!(
            err,
            DecodeError::TooShort {
                needed: 20,
                actual: 15
            }
        ));
    }

    #[test]
    fn activity_counter() {
        let parsed = parse("07205a8c10010001e24003020701");
        assert_eq!(
            parsed.uplink,
            Uplink::ActivityStatus {
                activity_counter: 123_456
            }
        );
    }

    #[test]
    fn configuration_requires_all_slots() {
        let err = parse_uplink(&parse_hex("07205a8c1002010000003c0c0000012c").unwrap()).unwrap_err();
        assert!(matches!(
            err,
            DecodeError::TooShort {
                needed: 31,
                actual: 16
            }
        ));
    }

    #[test]
    fn unknown_tag_carries_data_nibble() {
        let parsed = parse("07205a8c1307010203040506");
        assert_eq!(parsed.uplink, Uplink::UnsupportedTag { data: 3, tag: 7 });
    }

    #[test]
    fn short_header_fails_fast() {
        let err = parse_uplink(&[0x05, 0x20, 0x64]).unwrap_err();
        assert!(matches!(
            err,
            DecodeError::TooShort {
                needed: 12,
                actual: 3
            }
        ));
        let err = parse_uplink(&[]).unwrap_err();
        assert!(matches!(
            err,
            DecodeError::TooShort {
                needed: 1,
                actual: 0
            }
        ));
    }

    #[test]
    fn trailer_uses_injected_clock() {
        let clock = FixedClock::from_unix_timestamp(1_704_067_200).unwrap();
        let record = decode_uplink_with_clock(&[0x00, 0x01], 5, &clock).unwrap();
        assert_eq!(record.debug.payload, "0001");
        assert_eq!(record.debug.length, 2);
        assert_eq!(record.debug.port, 5);
        assert_eq!(record.debug.server_time, "2024-01-01T00:00:00.000Z");
    }
}
