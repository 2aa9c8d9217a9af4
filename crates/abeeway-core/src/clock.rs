//! Wall-clock access for the decode trailer.
//!
//! Decoding is otherwise pure; the timestamp is read through [`Clock`] so
//! callers and tests can pin it.

use time::macros::format_description;
use time::{OffsetDateTime, UtcOffset};

pub trait Clock {
    fn now_utc(&self) -> OffsetDateTime;
}

/// Reads the system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_utc(&self) -> OffsetDateTime {
        OffsetDateTime::now_utc()
    }
}

/// Always returns the same instant.
///
/// # Examples
/// ```
/// use abeeway_core::{Clock, FixedClock};
///
/// let clock = FixedClock::from_unix_timestamp(0)?;
/// assert_eq!(clock.now_utc().unix_timestamp(), 0);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub OffsetDateTime);

impl FixedClock {
    pub fn from_unix_timestamp(seconds: i64) -> Result<Self, time::error::ComponentRange> {
        OffsetDateTime::from_unix_timestamp(seconds).map(Self)
    }
}

impl Clock for FixedClock {
    fn now_utc(&self) -> OffsetDateTime {
        self.0
    }
}

/// Format an instant as `YYYY-MM-DDTHH:MM:SS.mmmZ` in UTC.
pub fn format_server_time(at: OffsetDateTime) -> Result<String, time::error::Format> {
    let format = format_description!(
        "[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond digits:3]Z"
    );
    at.to_offset(UtcOffset::UTC).format(format)
}
