//! Time related utils.

use chrono::Utc;
use std::fmt::Debug;

/// DateTime in UTC.
pub type DateTime = chrono::DateTime<Utc>;

/// Return the current UTC time.
pub fn now() -> DateTime {
    Utc::now()
}

/// Date format: "20220313"
pub fn format_date(t: DateTime) -> String {
    t.format("%Y%m%d").to_string()
}

/// ISO 8601 basic format: "20220313T072004Z"
pub fn format_iso8601(t: DateTime) -> String {
    t.format("%Y%m%dT%H%M%SZ").to_string()
}

/// Clock supplies the signing time.
///
/// Signers read time through this trait instead of the ambient system
/// clock, so that signing stays deterministic under test.
pub trait Clock: Debug + Send + Sync + 'static {
    /// Return the current instant.
    fn now(&self) -> DateTime;
}

/// Clock backed by the system time. The default for production signers.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime {
        now()
    }
}

/// Clock pinned to a single instant.
///
/// # Note
///
/// We should always take current time to sign requests.
/// Only use this clock for testing.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime);

impl Clock for FixedClock {
    fn now(&self) -> DateTime {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn test_time() -> DateTime {
        Utc.with_ymd_and_hms(2022, 3, 13, 7, 20, 4).unwrap()
    }

    #[test]
    fn test_format_date() {
        assert_eq!(format_date(test_time()), "20220313");
    }

    #[test]
    fn test_format_iso8601() {
        assert_eq!(format_iso8601(test_time()), "20220313T072004Z");
    }

    #[test]
    fn test_date_is_iso8601_prefix() {
        let t = now();
        assert_eq!(format_date(t), format_iso8601(t)[..8]);
    }

    #[test]
    fn test_fixed_clock() {
        let clock = FixedClock(test_time());
        assert_eq!(clock.now(), clock.now());
        assert_eq!(clock.now(), test_time());
    }
}
