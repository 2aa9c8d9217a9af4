use thiserror::Error;

/// Errors returned by uplink decoding.
///
/// Unsupported message types, position types, and tags are not errors; they
/// decode to dedicated variants and surface as the record's `error` field.
///
/// # Examples
/// ```
/// use abeeway_core::DecodeError;
///
/// let err = DecodeError::TooShort { needed: 12, actual: 4 };
/// assert!(err.to_string().contains("payload too short"));
/// ```
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("payload too short: need {needed} bytes, got {actual}")]
    TooShort { needed: usize, actual: usize },
    #[error("failed to format server time: {0}")]
    Timestamp(#[from] time::error::Format),
}
