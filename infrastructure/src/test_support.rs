//! Shared helpers for adapter tests

use chrono::{DateTime, TimeZone, Utc};
use debate_application::Clock;

/// Wall clock driven by tokio's (possibly paused) virtual time.
pub(crate) struct PausedClock {
    base: DateTime<Utc>,
    origin: tokio::time::Instant,
}

impl PausedClock {
    pub fn new() -> Self {
        Self {
            base: Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap(),
            origin: tokio::time::Instant::now(),
        }
    }
}

impl Clock for PausedClock {
    fn now(&self) -> DateTime<Utc> {
        let elapsed = tokio::time::Instant::now() - self.origin;
        self.base + chrono::Duration::from_std(elapsed).unwrap()
    }
}
