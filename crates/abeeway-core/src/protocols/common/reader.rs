use ::hex::FromHexError;
use thiserror::Error;

/// Zero-based unsigned value held in the inclusive bit range `lsb..=msb`.
///
/// # Examples
/// ```
/// use abeeway_core::bits;
///
/// assert_eq!(bits(0b1010_0000, 5, 7), 0b101);
/// assert_eq!(bits(0x1b, 0, 3), 0xb);
/// ```
pub fn bits(value: u32, lsb: u32, msb: u32) -> u32 {
    debug_assert!(lsb <= msb && msb <= 31, "invalid bit range {lsb}..={msb}");
    let len = msb - lsb + 1;
    let mask = if len >= 32 { u32::MAX } else { (1u32 << len) - 1 };
    (value >> lsb) & mask
}

/// Whether bit `n` of `value` is set.
pub fn bit(value: u32, n: u32) -> bool {
    value & (1u32 << n) != 0
}

/// Lowercase, zero-padded hex rendering of `bytes` joined by `separator`.
///
/// # Examples
/// ```
/// use abeeway_core::hex;
///
/// assert_eq!(hex(&[0x0a, 0xff], ""), "0aff");
/// assert_eq!(hex(&[0x0a, 0xff], ":"), "0a:ff");
/// ```
pub fn hex(bytes: &[u8], separator: &str) -> String {
    if separator.is_empty() {
        return ::hex::encode(bytes);
    }
    bytes
        .iter()
        .map(|b| ::hex::encode([*b]))
        .collect::<Vec<_>>()
        .join(separator)
}

/// Signed 32-bit integer from four MSB-first bytes.
pub fn int32(bytes: [u8; 4]) -> i32 {
    i32::from_be_bytes(bytes)
}

/// Unsigned 32-bit integer from four MSB-first bytes.
pub fn uint32(bytes: [u8; 4]) -> u32 {
    u32::from_be_bytes(bytes)
}

/// Errors returned when parsing a hex payload string.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HexError {
    #[error("empty hex payload")]
    Empty,
    #[error("odd number of hex digits: {len}")]
    OddLength { len: usize },
    #[error("invalid hex digit {digit:?} at position {position}")]
    InvalidDigit { digit: char, position: usize },
}

/// Parse a hex string (either case, no separators) into bytes.
///
/// # Examples
/// ```
/// use abeeway_core::parse_hex;
///
/// assert_eq!(parse_hex("0aFF").unwrap(), vec![0x0a, 0xff]);
/// assert!(parse_hex("0af").is_err());
/// ```
pub fn parse_hex(input: &str) -> Result<Vec<u8>, HexError> {
    if input.is_empty() {
        return Err(HexError::Empty);
    }
    ::hex::decode(input).map_err(|err| match err {
        FromHexError::InvalidHexCharacter { c, index } => HexError::InvalidDigit {
            digit: c,
            position: index,
        },
        FromHexError::OddLength | FromHexError::InvalidStringLength => {
            HexError::OddLength { len: input.len() }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bits_reassemble_byte() {
        for value in 0u32..=0xff {
            let high = bits(value, 5, 7);
            let mid = bits(value, 1, 4);
            let low = bits(value, 0, 0);
            assert_eq!((high << 5) | (mid << 1) | low, value);
        }
    }

    #[test]
    fn bits_reassemble_word() {
        let value = 0xdead_beefu32;
        let high = bits(value, 16, 31);
        let low = bits(value, 0, 15);
        assert_eq!((high << 16) | low, value);
        assert_eq!(bits(value, 0, 31), value);
    }

    #[test]
    fn bit_reads_single_flags() {
        assert!(bit(0b1_0000, 4));
        assert!(!bit(0b1_0000, 3));
        assert!(bit(0x8000_0000, 31));
    }

    #[test]
    fn hex_pads_and_joins() {
        assert_eq!(hex(&[0x0a, 0xff], ""), "0aff");
        assert_eq!(hex(&[0x0a, 0xff], ":"), "0a:ff");
        assert_eq!(hex(&[], ":"), "");
    }

    #[test]
    fn int32_sign_and_uint32_magnitude() {
        assert_eq!(int32([0xff, 0xff, 0xff, 0xfe]), -2);
        assert_eq!(uint32([0xff, 0xff, 0xff, 0xfe]), 0xffff_fffe);
        assert_eq!(uint32([0x00, 0x01, 0xe2, 0x40]), 123_456);
    }

    #[test]
    fn parse_hex_accepts_mixed_case() {
        assert_eq!(parse_hex("0358d8").unwrap(), vec![0x03, 0x58, 0xd8]);
        assert_eq!(parse_hex("0358D8").unwrap(), vec![0x03, 0x58, 0xd8]);
    }

    #[test]
    fn parse_hex_reports_first_bad_digit() {
        assert_eq!(
            parse_hex("0a0Z"),
            Err(HexError::InvalidDigit {
                digit: 'Z',
                position: 3
            })
        );
        assert_eq!(parse_hex(" 0a"), Err(HexError::OddLength { len: 3 }));
    }

    #[test]
    fn parse_hex_rejects_bad_input() {
        assert_eq!(parse_hex(""), Err(HexError::Empty));
        assert_eq!(parse_hex("abc"), Err(HexError::OddLength { len: 3 }));
        assert_eq!(
            parse_hex("0g"),
            Err(HexError::InvalidDigit {
                digit: 'g',
                position: 1
            })
        );
    }
}
