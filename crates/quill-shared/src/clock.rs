//! Time provider abstraction
//!
//! Token issuance, session expiry and revocation windows all read time through
//! [`Clock`], so tests can drive expiry deterministically with [`ManualClock`].

use chrono::{DateTime, Utc};
use std::fmt::Debug;

#[cfg(any(test, feature = "testing"))]
use std::sync::Mutex;

/// A source of "now".
pub trait Clock: Send + Sync + Debug {
    fn now(&self) -> DateTime<Utc>;
}

/// Production clock using real system time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Test clock that only moves when told to. Enabled by the `testing` feature.
#[cfg(any(test, feature = "testing"))]
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

#[cfg(any(test, feature = "testing"))]
impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    /// Starts at the current wall-clock second (sub-second part dropped, so
    /// values survive a round trip through JWT's integer timestamps).
    pub fn starting_now() -> Self {
        let now = Utc::now();
        let truncated = DateTime::from_timestamp(now.timestamp(), 0).unwrap_or(now);
        Self::new(truncated)
    }

    pub fn advance(&self, by: chrono::Duration) {
        let mut now = self.now.lock().unwrap();
        *now += by;
    }
}

#[cfg(any(test, feature = "testing"))]
impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_manual_clock_holds_still_until_advanced() {
        let clock = ManualClock::starting_now();
        let a = clock.now();
        assert_eq!(a, clock.now());
        clock.advance(Duration::seconds(90));
        assert_eq!(clock.now() - a, Duration::seconds(90));
        assert_eq!(a.timestamp_subsec_nanos(), 0);
    }

    #[test]
    fn test_system_clock_tracks_wall_time() {
        let before = Utc::now();
        let now = SystemClock.now();
        assert!(now >= before);
    }
}
