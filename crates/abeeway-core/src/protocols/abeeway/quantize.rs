//! Uniform quantization used by the tracker for compact real-valued fields.
//!
//! A value in `[lo, hi]` is sent as an `nbits` code. `nreserved` code points
//! are excluded from the usable range; decoding subtracts half of them so the
//! result lands in the middle of its bucket. Arithmetic is carried out in the
//! same order as the firmware reference so results match bit for bit.

use thiserror::Error;

/// Errors returned when building a [`Quantization`] from untrusted values.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum QuantizationError {
    #[error("bit width must be within 1..=32, got {nbits}")]
    InvalidBitWidth { nbits: u32 },
    #[error("{nreserved} reserved codes leave no usable code points in {nbits} bits")]
    NoUsableCodes { nbits: u32, nreserved: u32 },
}

/// Quantization parameters: real range, code width, reserved code count.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quantization {
    pub lo: f64,
    pub hi: f64,
    pub nbits: u32,
    pub nreserved: u32,
}

impl Quantization {
    /// Build a validated specification.
    ///
    /// # Errors
    /// Returns `QuantizationError` when `nbits` is outside `1..=32` or when the
    /// reserved codes consume the whole code space.
    pub fn new(lo: f64, hi: f64, nbits: u32, nreserved: u32) -> Result<Self, QuantizationError> {
        let spec = Self {
            lo,
            hi,
            nbits,
            nreserved,
        };
        spec.validate()?;
        Ok(spec)
    }

    pub fn validate(&self) -> Result<(), QuantizationError> {
        if self.nbits == 0 || self.nbits > 32 {
            return Err(QuantizationError::InvalidBitWidth { nbits: self.nbits });
        }
        if usable_codes(self.nbits, self.nreserved) == 0 {
            return Err(QuantizationError::NoUsableCodes {
                nbits: self.nbits,
                nreserved: self.nreserved,
            });
        }
        Ok(())
    }

    /// Width of one quantization bucket.
    ///
    /// Parameters that fail [`Quantization::validate`] yield a non-finite
    /// width instead of panicking.
    pub fn step_size(&self) -> f64 {
        let usable = usable_codes(self.nbits, self.nreserved) as f64;
        1.0 / (usable / (self.hi - self.lo))
    }

    /// Real value represented by `code`.
    pub fn decode(&self, code: u32) -> f64 {
        (f64::from(code) - f64::from(self.nreserved) / 2.0) * self.step_size() + self.lo
    }
}

/// Code points left once the reserved ones are taken out, zero when none are.
fn usable_codes(nbits: u32, nreserved: u32) -> u64 {
    let max_code = if nbits >= 64 {
        u64::MAX
    } else {
        (1u64 << nbits) - 1
    };
    max_code.saturating_sub(u64::from(nreserved))
}

/// Width of one quantization bucket.
///
/// # Errors
/// Returns `QuantizationError` for parameters rejected by
/// [`Quantization::validate`].
///
/// # Examples
/// ```
/// use abeeway_core::step_size;
///
/// assert_eq!(step_size(0.0, 2040.0, 8, 0)?, 8.0);
/// assert!(step_size(0.0, 1.0, 2, 5).is_err());
/// # Ok::<(), abeeway_core::QuantizationError>(())
/// ```
pub fn step_size(lo: f64, hi: f64, nbits: u32, nreserved: u32) -> Result<f64, QuantizationError> {
    Ok(Quantization::new(lo, hi, nbits, nreserved)?.step_size())
}

/// Real value represented by `code`.
///
/// # Errors
/// Returns `QuantizationError` for parameters rejected by
/// [`Quantization::validate`].
///
/// # Examples
/// ```
/// use abeeway_core::decode_value;
///
/// assert_eq!(decode_value(8, 0.0, 2040.0, 8, 0)?, 64.0);
/// assert_eq!(decode_value(0, -44.0, 85.0, 8, 0)?, -44.0);
/// # Ok::<(), abeeway_core::QuantizationError>(())
/// ```
pub fn decode_value(
    code: u32,
    lo: f64,
    hi: f64,
    nbits: u32,
    nreserved: u32,
) -> Result<f64, QuantizationError> {
    Ok(Quantization::new(lo, hi, nbits, nreserved)?.decode(code))
}

/// Round to two decimals, ties toward positive infinity.
pub fn round_hundredths(value: f64) -> f64 {
    round_half_up(100.0 * value) / 100.0
}

fn round_half_up(value: f64) -> f64 {
    let floor = value.floor();
    if value - floor >= 0.5 {
        floor + 1.0
    } else {
        floor
    }
}
