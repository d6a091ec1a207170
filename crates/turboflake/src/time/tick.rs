use core::time::Duration;

use crate::TimeSource;

/// Width of one tick, the unit of the timestamp component.
pub const TICK: Duration = Duration::from_millis(10);

const NANOS_PER_TICK: u128 = TICK.as_nanos();

/// Converts time elapsed since the epoch into whole ticks, rounding down.
///
/// ```
/// use core::time::Duration;
/// use turboflake::to_ticks;
///
/// assert_eq!(to_ticks(Duration::from_millis(29)), 2);
/// assert_eq!(to_ticks(Duration::from_secs(1)), 100);
/// ```
#[inline]
pub const fn to_ticks(elapsed: Duration) -> u64 {
    (elapsed.as_nanos() / NANOS_PER_TICK) as u64
}

/// Converts a tick count back into the time at which that tick starts.
#[inline]
pub const fn from_ticks(ticks: u64) -> Duration {
    Duration::new(ticks / 100, ((ticks % 100) as u32) * 10_000_000)
}

/// Normalizes a wall-clock [`TimeSource`] against a fixed epoch.
///
/// The epoch is fixed at construction. Readings taken before the epoch clamp
/// to zero instead of underflowing, so a badly set system clock stalls the
/// generator rather than corrupting it.
#[derive(Clone, Debug)]
pub struct TickClock<T> {
    time: T,
    epoch: Duration,
}

impl<T> TickClock<T>
where
    T: TimeSource,
{
    /// Wraps `time`, measuring from `epoch` (a duration since the UNIX epoch).
    pub const fn with_epoch(time: T, epoch: Duration) -> Self {
        Self { time, epoch }
    }

    /// The configured epoch as a duration since the UNIX epoch.
    pub const fn epoch(&self) -> Duration {
        self.epoch
    }

    /// Time elapsed since the epoch, clamped to zero.
    #[inline]
    pub fn elapsed(&self) -> Duration {
        self.time.now().saturating_sub(self.epoch)
    }

    /// The current tick.
    #[inline]
    pub fn current_tick(&self) -> u64 {
        to_ticks(self.elapsed())
    }
}
