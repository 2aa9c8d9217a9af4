use std::ops::Range;

use super::error::DecodeError;
use super::layout;
use super::model::{FirmwareVersion, MacRssi};
use super::quantize::Quantization;
use crate::protocols::common::{hex, int32, uint32};

/// Bounds-checked access to an uplink payload.
///
/// Every read fails with `DecodeError::TooShort` instead of substituting
/// missing bytes.
pub struct UplinkReader<'a> {
    payload: &'a [u8],
}

impl<'a> UplinkReader<'a> {
    pub fn new(payload: &'a [u8]) -> Self {
        Self { payload }
    }

    pub fn require_len(&self, needed: usize) -> Result<(), DecodeError> {
        if self.payload.len() < needed {
            return Err(DecodeError::TooShort {
                needed,
                actual: self.payload.len(),
            });
        }
        Ok(())
    }

    pub fn read_u8(&self, offset: usize) -> Result<u8, DecodeError> {
        self.payload
            .get(offset)
            .copied()
            .ok_or(DecodeError::TooShort {
                needed: offset + 1,
                actual: self.payload.len(),
            })
    }

    pub fn read_slice(&self, range: Range<usize>) -> Result<&'a [u8], DecodeError> {
        self.payload.get(range.clone()).ok_or(DecodeError::TooShort {
            needed: range.end,
            actual: self.payload.len(),
        })
    }

    pub fn read_u32_be(&self, range: Range<usize>) -> Result<u32, DecodeError> {
        let bytes = self.read_slice(range)?;
        let bytes: [u8; 4] = bytes.try_into().map_err(|_| DecodeError::TooShort {
            needed: 4,
            actual: bytes.len(),
        })?;
        Ok(uint32(bytes))
    }

    /// Decode a quantized single-byte field.
    pub fn read_quantized(&self, offset: usize, spec: &Quantization) -> Result<f64, DecodeError> {
        Ok(spec.decode(u32::from(self.read_u8(offset)?)))
    }

    /// Decode a 24-bit signed coordinate sent as the top three bytes of an
    /// int32 whose low byte is always zero, in degrees.
    pub fn read_coordinate(&self, range: Range<usize>) -> Result<f64, DecodeError> {
        let bytes = self.read_slice(range)?;
        let [b0, b1, b2] = <[u8; 3]>::try_from(bytes).map_err(|_| DecodeError::TooShort {
            needed: 3,
            actual: bytes.len(),
        })?;
        Ok(f64::from(int32([b0, b1, b2, 0])) / layout::COORDINATE_SCALE)
    }

    pub fn read_firmware(&self, range: Range<usize>) -> Result<FirmwareVersion, DecodeError> {
        let bytes = self.read_slice(range)?;
        let [major, minor, patch] =
            <[u8; 3]>::try_from(bytes).map_err(|_| DecodeError::TooShort {
                needed: 3,
                actual: bytes.len(),
            })?;
        Ok(FirmwareVersion {
            major,
            minor,
            patch,
        })
    }

    /// Decode consecutive 7-byte `(MAC address, RSSI)` groups from `offset`
    /// to the end of the payload. A trailing partial group is rejected.
    pub fn read_mac_rssi_list(&self, offset: usize) -> Result<Vec<MacRssi>, DecodeError> {
        let mut entries = Vec::new();
        let mut start = offset;
        while start < self.payload.len() {
            let group = self.read_slice(start..start + layout::MAC_RSSI_GROUP_LEN)?;
            let (mac, rssi) = group.split_at(layout::MAC_ADDRESS_LEN);
            entries.push(MacRssi {
                mac_address: hex(mac, ":"),
                rssi: i32::from(rssi[0] as i8),
            });
            start += layout::MAC_RSSI_GROUP_LEN;
        }
        Ok(entries)
    }
}

/// Decode a buffer made only of `(MAC address, RSSI)` groups.
///
/// # Examples
/// ```
/// use abeeway_core::mac_rssi;
///
/// let entries = mac_rssi(&[0xe3, 0xf0, 0xa1, 0xb2, 0xc3, 0xd4, 0xc5]).unwrap();
/// assert_eq!(entries[0].mac_address, "e3:f0:a1:b2:c3:d4");
/// assert_eq!(entries[0].rssi, -59);
/// ```
pub fn mac_rssi(bytes: &[u8]) -> Result<Vec<MacRssi>, DecodeError> {
    UplinkReader::new(bytes).read_mac_rssi_list(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_u8_out_of_bounds() {
        let payload = [0u8; 3];
        let reader = UplinkReader::new(&payload);
        let err = reader.read_u8(3).unwrap_err();
        assert!(matches!(
            err,
            DecodeError::TooShort {
                needed: 4,
                actual: 3
            }
        ));
    }

    #[test]
    fn read_u32_be_msb_first() {
        let payload = [0x07, 0x00, 0x01, 0xe2, 0x40];
        let reader = UplinkReader::new(&payload);
        assert_eq!(reader.read_u32_be(1..5).unwrap(), 123_456);
        assert!(reader.read_u32_be(2..6).is_err());
    }

    #[test]
    fn read_coordinate_signed() {
        let payload = [0x19, 0x5d, 0x4b, 0xf2, 0xee, 0x8b];
        let reader = UplinkReader::new(&payload);
        assert_eq!(reader.read_coordinate(0..3).unwrap(), 42.5544448);
        assert_eq!(reader.read_coordinate(3..6).unwrap(), -21.9247872);
    }

    #[test]
    fn read_firmware_triplet() {
        let payload = [1, 2, 3];
        let reader = UplinkReader::new(&payload);
        let version = reader.read_firmware(0..3).unwrap();
        assert_eq!(version.to_string(), "1.2.3");
    }

    #[test]
    fn mac_rssi_two_groups() {
        let bytes = [
            0xe3, 0xf0, 0xa1, 0xb2, 0xc3, 0xd4, 0xc5, 0xaa, 0xbb, 0xcc, 0xdd, 0xee, 0xff, 0x7f,
        ];
        let entries = mac_rssi(&bytes).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].mac_address, "e3:f0:a1:b2:c3:d4");
        assert_eq!(entries[0].rssi, -59);
        assert_eq!(entries[1].mac_address, "aa:bb:cc:dd:ee:ff");
        assert_eq!(entries[1].rssi, 127);
    }

    #[test]
    fn mac_rssi_empty_and_partial() {
        assert!(mac_rssi(&[]).unwrap().is_empty());
        let err = mac_rssi(&[0u8; 9]).unwrap_err();
        assert!(matches!(
            err,
            DecodeError::TooShort {
                needed: 14,
                actual: 9
            }
        ));
    }

    #[test]
    fn read_quantized_age() {
        let payload = [0x20];
        let reader = UplinkReader::new(&payload);
        assert_eq!(reader.read_quantized(0, &layout::AGE).unwrap(), 256.0);
    }
}
