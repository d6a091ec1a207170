use core::time::Duration;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::TimeSource;

/// The default [`TimeSource`], backed by [`SystemTime::now`].
///
/// Wall-clock adjustments are visible to the generator. A clock that jumps
/// backwards stalls the timestamp component until real time catches up again
/// (the generator never lets it regress), and a clock set before the UNIX
/// epoch reads as zero.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SystemClock;

impl TimeSource for SystemClock {
    fn now(&self) -> Duration {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or(Duration::ZERO)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SONYFLAKE_EPOCH;

    #[test]
    fn system_clock_is_past_sonyflake_epoch() {
        assert!(SystemClock.now() > Duration::from_secs(SONYFLAKE_EPOCH));
    }
}
