use core::time::Duration;
use std::sync::Arc;

#[cfg(feature = "futures")]
use crate::{SleepProvider, futures::ErasedSleep};
use crate::{
    BlockingSleep, ConfigError, LockSonyflakeGenerator, MAX_MACHINE_IDS, MachineIds, Result,
    SONYFLAKE_EPOCH, Sonyflake, SystemClock, ThreadSleep, TickClock, TimeSource,
    id::collect_bounded,
};

/// Configuration for a [`Sonyflake`] generator.
///
/// Validation happens in [`build`](Self::build): a builder with a bad machine
/// ID set or epoch never produces a generator.
///
/// | Setting | Default |
/// |---|---|
/// | machine IDs | none (required) |
/// | epoch | [`SONYFLAKE_EPOCH`] (2014-09-01 00:00:00 UTC) |
/// | clock | [`SystemClock`] |
/// | blocking sleep | [`ThreadSleep`] |
/// | async sleep provider | none (async calls fail with [`Error::MissingSleepProvider`]) |
///
/// [`Error::MissingSleepProvider`]: crate::Error::MissingSleepProvider
pub struct SonyflakeBuilder<T = SystemClock> {
    machine_ids: core::result::Result<Vec<i64>, ConfigError>,
    epoch: core::result::Result<Duration, ConfigError>,
    clock: T,
    blocking: Arc<dyn BlockingSleep>,
    #[cfg(feature = "futures")]
    sleep: Option<Arc<dyn ErasedSleep>>,
}

impl SonyflakeBuilder<SystemClock> {
    /// A builder with default settings and no machine IDs.
    pub fn new() -> Self {
        Self {
            machine_ids: Ok(Vec::new()),
            epoch: Ok(Duration::from_secs(SONYFLAKE_EPOCH)),
            clock: SystemClock,
            blocking: Arc::new(ThreadSleep),
            #[cfg(feature = "futures")]
            sleep: None,
        }
    }
}

impl Default for SonyflakeBuilder<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> SonyflakeBuilder<T>
where
    T: TimeSource,
{
    /// Replaces the machine ID set. Order does not matter.
    ///
    /// At most one value past [`MAX_MACHINE_IDS`] is read; a longer input
    /// makes [`build`](Self::build) fail with
    /// [`ConfigError::TooManyMachineIds`].
    pub fn machine_ids<I>(mut self, machine_ids: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<i64>,
    {
        self.machine_ids = collect_bounded(machine_ids);
        self
    }

    /// Adds one machine ID to the set.
    pub fn machine_id(mut self, machine_id: impl Into<i64>) -> Self {
        self.machine_ids = self.machine_ids.and_then(|mut ids| {
            if ids.len() == MAX_MACHINE_IDS {
                return Err(ConfigError::TooManyMachineIds {
                    count: MAX_MACHINE_IDS + 1,
                });
            }
            ids.push(machine_id.into());
            Ok(ids)
        });
        self
    }

    /// Sets the epoch in whole seconds since the UNIX epoch.
    ///
    /// A negative value makes [`build`](Self::build) fail with
    /// [`ConfigError::InvalidEpoch`].
    pub fn epoch_secs(mut self, secs: i64) -> Self {
        self.epoch = u64::try_from(secs)
            .map(Duration::from_secs)
            .map_err(|_| ConfigError::InvalidEpoch { secs });
        self
    }

    /// Sets the epoch as a duration since the UNIX epoch.
    pub fn epoch(mut self, epoch: Duration) -> Self {
        self.epoch = Ok(epoch);
        self
    }

    /// Replaces the wall-clock source.
    pub fn clock<U>(self, clock: U) -> SonyflakeBuilder<U>
    where
        U: TimeSource,
    {
        SonyflakeBuilder {
            machine_ids: self.machine_ids,
            epoch: self.epoch,
            clock,
            blocking: self.blocking,
            #[cfg(feature = "futures")]
            sleep: self.sleep,
        }
    }

    /// Replaces the strategy the blocking entry points wait with.
    pub fn blocking_sleep(mut self, sleep: impl BlockingSleep + 'static) -> Self {
        self.blocking = Arc::new(sleep);
        self
    }

    /// Sets the delay capability the async entry points suspend on.
    #[cfg_attr(docsrs, doc(cfg(feature = "futures")))]
    #[cfg(feature = "futures")]
    pub fn sleep_provider(mut self, sleep: impl SleepProvider) -> Self {
        self.sleep = Some(Arc::new(sleep));
        self
    }

    /// Validates the configuration and creates the generator.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`](crate::Error::Config) if the machine IDs or
    /// the epoch are rejected.
    pub fn build(self) -> Result<Sonyflake<T>> {
        let machine_ids = MachineIds::new(self.machine_ids?)?;
        let epoch = self.epoch?;

        #[cfg(feature = "tracing")]
        tracing::debug!(
            machine_ids = machine_ids.len(),
            epoch = epoch.as_secs(),
            "built sonyflake generator"
        );

        Ok(Sonyflake {
            generator: Arc::new(LockSonyflakeGenerator::new(
                machine_ids,
                TickClock::with_epoch(self.clock, epoch),
            )),
            blocking: self.blocking,
            #[cfg(feature = "futures")]
            sleep: self.sleep,
        })
    }
}
