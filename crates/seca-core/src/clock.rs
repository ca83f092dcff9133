//! Wall-clock source for resource timestamps.

use chrono::{DateTime, Utc};

/// Source of timestamps for `createdAt`, `lastModifiedAt`, and conditions.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// The system UTC clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_clock_is_monotonic_enough() {
        let clock = SystemClock;
        let a = clock.now();
        let b = clock.now();
        assert!(b >= a);
        // Should be after 2024-01-01.
        assert!(a.timestamp() > 1_704_067_200);
    }
}
