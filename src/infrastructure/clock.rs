use crate::domain::payment::TimestampSource;
use chrono::Utc;

/// Wall-clock timestamps in unix seconds.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl TimestampSource for SystemClock {
    fn now(&self) -> u64 {
        // Clocks set before 1970 stamp payments at the epoch.
        u64::try_from(Utc::now().timestamp()).unwrap_or(0)
    }
}

/// Always returns the same instant. Useful for reproducible batches and tests.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub u64);

impl TimestampSource for FixedClock {
    fn now(&self) -> u64 {
        self.0
    }
}
