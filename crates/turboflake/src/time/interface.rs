use core::time::Duration;

/// Sonyflake epoch: Monday, September 1, 2014 00:00:00 UTC (seconds since the
/// UNIX epoch).
pub const SONYFLAKE_EPOCH: u64 = 1_409_529_600;

/// A trait for wall-clock time sources.
///
/// This abstraction allows you to plug in the real system clock or a mocked
/// time source in tests. Unlike a tick counter, the returned value keeps its
/// sub-tick precision: the generator needs it to compute exactly how long a
/// caller has to wait for the next tick.
///
/// # Example
///
/// ```
/// use core::time::Duration;
/// use turboflake::TimeSource;
///
/// struct FixedTime;
/// impl TimeSource for FixedTime {
///     fn now(&self) -> Duration {
///         Duration::from_secs(1_749_081_600)
///     }
/// }
///
/// assert_eq!(FixedTime.now().as_secs(), 1_749_081_600);
/// ```
pub trait TimeSource {
    /// Returns the current wall-clock time as a duration since
    /// 1970-01-01 00:00:00 UTC.
    fn now(&self) -> Duration;
}

impl<T: TimeSource + ?Sized> TimeSource for &T {
    fn now(&self) -> Duration {
        (**self).now()
    }
}

impl<T: TimeSource + ?Sized> TimeSource for std::sync::Arc<T> {
    fn now(&self) -> Duration {
        (**self).now()
    }
}
