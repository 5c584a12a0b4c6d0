//! Cache Entry Module
//!
//! Defines the (value, absolute expiry) pair stored behind every key.

use std::time::{SystemTime, UNIX_EPOCH};

use serde_json::Value;

// == Expiry ==
/// Absolute expiry of an entry, fixed when the entry is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expiry {
    /// The entry never expires
    Never,
    /// The entry expires at this Unix timestamp (milliseconds)
    At(u64),
}

impl Expiry {
    /// Computes the expiry for a write happening at `now_ms`.
    ///
    /// A timeout of zero or less means the entry never expires.
    pub fn after_seconds(timeout_secs: i64, now_ms: u64) -> Self {
        if timeout_secs <= 0 {
            return Expiry::Never;
        }
        let ttl_ms = (timeout_secs as u64).saturating_mul(1000);
        Expiry::At(now_ms.saturating_add(ttl_ms))
    }

    /// Returns true once `now_ms` has reached the expiry.
    pub fn is_expired_at(&self, now_ms: u64) -> bool {
        match self {
            Expiry::Never => false,
            Expiry::At(expires) => now_ms >= *expires,
        }
    }
}

// == Timeout ==
/// Timeout requested by a writer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Timeout {
    /// Use the backend's configured default timeout
    #[default]
    Default,
    /// Never expire
    Never,
    /// Expire after this many seconds; zero or less also means never
    Seconds(i64),
}

impl Timeout {
    /// Resolves to a number of seconds against the backend default.
    pub fn resolve(self, default_timeout: i64) -> i64 {
        match self {
            Timeout::Default => default_timeout,
            Timeout::Never => 0,
            Timeout::Seconds(secs) => secs,
        }
    }
}

impl From<Option<i64>> for Timeout {
    fn from(timeout: Option<i64>) -> Self {
        timeout.map_or(Timeout::Default, Timeout::Seconds)
    }
}

// == Cache Entry ==
/// A cached value together with its absolute expiry.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry {
    /// The stored value
    pub value: Value,
    /// When the entry stops being served
    pub expires_at: Expiry,
}

// == Utility Functions ==
/// Returns current Unix timestamp in milliseconds.
///
/// A clock set before the epoch reads as 0.
pub fn current_timestamp_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use std::thread::sleep;
    use std::time::Duration;

    #[test]
    fn test_zero_or_negative_timeout_never_expires() {
        assert_eq!(Expiry::after_seconds(0, 1_000), Expiry::Never);
        assert_eq!(Expiry::after_seconds(-5, 1_000), Expiry::Never);
    }

    #[test]
    fn test_timeout_counts_from_write_time() {
        let now = current_timestamp_ms();
        let expiry = Expiry::after_seconds(10, now);

        assert_eq!(expiry, Expiry::At(now + 10_000));
        assert!(!expiry.is_expired_at(now));
        assert!(!expiry.is_expired_at(now + 9_999));
        assert!(expiry.is_expired_at(now + 10_000));
    }

    #[test]
    fn test_expiry_passes_with_wall_clock() {
        let expiry = Expiry::after_seconds(1, current_timestamp_ms());
        assert!(!expiry.is_expired_at(current_timestamp_ms()));

        sleep(Duration::from_millis(1100));

        assert!(expiry.is_expired_at(current_timestamp_ms()));
    }

    #[test]
    fn test_expiration_boundary_condition() {
        let expiry = Expiry::At(1_000);
        assert!(!expiry.is_expired_at(999));
        assert!(expiry.is_expired_at(1_000), "Entry should be expired at boundary");
        assert!(expiry.is_expired_at(1_001));
    }

    #[test]
    fn test_never_expires_even_far_in_the_future() {
        assert!(!Expiry::Never.is_expired_at(u64::MAX));
    }

    #[test]
    fn test_after_seconds_saturates() {
        assert_eq!(Expiry::after_seconds(i64::MAX, u64::MAX - 1), Expiry::At(u64::MAX));
        assert_eq!(Expiry::after_seconds(2, 1_000), Expiry::At(3_000));
    }

    #[test]
    fn test_timeout_resolve() {
        assert_eq!(Timeout::Default.resolve(300), 300);
        assert_eq!(Timeout::Never.resolve(300), 0);
        assert_eq!(Timeout::Seconds(7).resolve(300), 7);
        assert_eq!(Timeout::from(None), Timeout::Default);
        assert_eq!(Timeout::from(Some(0)), Timeout::Seconds(0));
    }
}
