use core::{fmt, time::Duration};
use std::sync::Arc;

#[cfg(feature = "futures")]
use crate::futures::ErasedSleep;
use crate::{
    BlockingSleep, LockSonyflakeGenerator, MachineIds, Reservation, Result, SonyflakeBuilder,
    SonyflakeId, SystemClock, TimeSource,
};

/// A shareable Sonyflake ID generator.
///
/// `Sonyflake` is a cheap handle: cloning it shares the same underlying
/// [`LockSonyflakeGenerator`], so clones never mint the same ID. It offers two
/// ways of honoring a required wait:
///
/// - blocking: [`next`](Self::next), [`next_n`](Self::next_n) and
///   [`iter`](Self::iter) sleep the calling thread through the configured
///   [`BlockingSleep`]
/// - suspending (feature `futures`): `next_async`, `next_n_async` and
///   `stream` await the configured [`SleepProvider`]
///
/// Either way the generator state is advanced before the wait begins and the
/// lock is released before it.
///
/// # Example
///
/// ```
/// use turboflake::Sonyflake;
///
/// let sf = Sonyflake::builder()
///     .machine_ids([0x0000, 0x7F7F, 0xFFFF])
///     .epoch_secs(1_749_081_600)
///     .build()
///     .unwrap();
///
/// let a = sf.next().unwrap();
/// let b = sf.next().unwrap();
/// assert!(a < b);
///
/// let batch = sf.next_n(1_000).unwrap();
/// assert!(batch.windows(2).all(|w| w[0] < w[1]));
/// ```
///
/// [`SleepProvider`]: crate::SleepProvider
pub struct Sonyflake<T = SystemClock>
where
    T: TimeSource,
{
    pub(crate) generator: Arc<LockSonyflakeGenerator<T>>,
    pub(crate) blocking: Arc<dyn BlockingSleep>,
    #[cfg(feature = "futures")]
    pub(crate) sleep: Option<Arc<dyn ErasedSleep>>,
}

impl Sonyflake<SystemClock> {
    /// Starts building a generator on the system clock with the default
    /// [`SONYFLAKE_EPOCH`](crate::SONYFLAKE_EPOCH).
    pub fn builder() -> SonyflakeBuilder<SystemClock> {
        SonyflakeBuilder::new()
    }

    /// Creates a blocking generator with default settings.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`](crate::Error::Config) if the machine IDs are
    /// rejected.
    pub fn new<I>(machine_ids: I) -> Result<Self>
    where
        I: IntoIterator,
        I::Item: Into<i64>,
    {
        Self::builder().machine_ids(machine_ids).build()
    }
}

impl<T> Sonyflake<T>
where
    T: TimeSource,
{
    /// The underlying lock-based generator.
    pub fn generator(&self) -> &LockSonyflakeGenerator<T> {
        &self.generator
    }

    /// The machine IDs, sorted ascending.
    pub fn machine_ids(&self) -> &MachineIds {
        self.generator.machine_ids()
    }

    /// The epoch as a duration since the UNIX epoch.
    pub fn epoch(&self) -> Duration {
        self.generator.clock().epoch()
    }

    /// Mints the next ID and returns it with the wait the caller owes,
    /// without waiting.
    ///
    /// # Errors
    ///
    /// Returns [`Error::LockPoisoned`](crate::Error::LockPoisoned) if the lock
    /// is poisoned.
    pub fn try_next_id(&self) -> Result<Reservation<SonyflakeId>> {
        self.generator.try_next_id()
    }

    /// Mints `n` IDs and returns them with the wait the caller owes, without
    /// waiting.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidBatchSize`](crate::Error::InvalidBatchSize) if `n` is
    ///   zero
    /// - [`Error::BatchTooLarge`](crate::Error::BatchTooLarge) if `n` IDs
    ///   cannot be allocated
    /// - [`Error::LockPoisoned`](crate::Error::LockPoisoned) if the lock is
    ///   poisoned
    pub fn try_next_ids(&self, n: usize) -> Result<Reservation<Vec<SonyflakeId>>> {
        self.generator.try_next_ids(n)
    }
}

impl<T> Clone for Sonyflake<T>
where
    T: TimeSource,
{
    fn clone(&self) -> Self {
        Self {
            generator: Arc::clone(&self.generator),
            blocking: Arc::clone(&self.blocking),
            #[cfg(feature = "futures")]
            sleep: self.sleep.clone(),
        }
    }
}

impl<T> fmt::Display for Sonyflake<T>
where
    T: TimeSource,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.generator, f)
    }
}

impl<T> fmt::Debug for Sonyflake<T>
where
    T: TimeSource,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut dbg = f.debug_struct("Sonyflake");
        dbg.field("generator", &self.generator);
        #[cfg(feature = "futures")]
        dbg.field("async", &self.sleep.is_some());
        dbg.finish_non_exhaustive()
    }
}
