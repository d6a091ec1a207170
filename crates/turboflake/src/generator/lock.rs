use core::fmt;

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::{
    Error, MachineIds, Reservation, Result, Sequencer, SonyflakeId, TickClock, TimeSource,
    generator::mutex::{Mutex, MutexGuard},
};

/// A lock-based Sonyflake ID generator suitable for multi-threaded
/// environments.
///
/// Each call reads the clock, advances the [`Sequencer`] and composes the ID
/// inside one short critical section, then releases the lock and hands back a
/// [`Reservation`]. The lock is never held while waiting for real time, so
/// concurrent callers only serialize on O(1) arithmetic. Within a tick, IDs
/// are handed out in the order callers pass through the lock.
///
/// This type never waits itself. [`Sonyflake`] wraps it with blocking and
/// async waiting strategies.
///
/// ## Features
/// - ✅ Thread-safe
/// - ✅ Up to `machine_ids.len() * 256` IDs per 10 ms tick without waiting
/// - ✅ Timestamp component never regresses
///
/// [`Sonyflake`]: crate::Sonyflake
pub struct LockSonyflakeGenerator<T>
where
    T: TimeSource,
{
    state: Mutex<Sequencer>,
    machine_ids: MachineIds,
    clock: TickClock<T>,
}

impl<T> LockSonyflakeGenerator<T>
where
    T: TimeSource,
{
    /// Creates a generator over a validated machine ID set, starting at tick
    /// zero so the first call claims the current tick.
    ///
    /// # Example
    ///
    /// ```
    /// use core::time::Duration;
    /// use turboflake::{LockSonyflakeGenerator, MachineIds, SystemClock, TickClock, SONYFLAKE_EPOCH};
    ///
    /// let generator = LockSonyflakeGenerator::new(
    ///     MachineIds::new([0x0000, 0x7F7F, 0xFFFF]).unwrap(),
    ///     TickClock::with_epoch(SystemClock, Duration::from_secs(SONYFLAKE_EPOCH)),
    /// );
    /// let reservation = generator.try_next_id().unwrap();
    /// assert!(reservation.is_ready());
    /// ```
    pub fn new(machine_ids: MachineIds, clock: TickClock<T>) -> Self {
        Self::from_components(0, 0, machine_ids, clock)
    }

    /// Creates a generator resuming from explicit counter values.
    ///
    /// `combined_sequence` is reduced modulo `machine_ids.len() * 256`.
    pub fn from_components(
        elapsed_time: u64,
        combined_sequence: u32,
        machine_ids: MachineIds,
        clock: TickClock<T>,
    ) -> Self {
        let sequencer = Sequencer::from_components(elapsed_time, combined_sequence, &machine_ids);
        Self {
            state: Mutex::new(sequencer),
            machine_ids,
            clock,
        }
    }

    /// The generator's machine IDs, sorted ascending.
    pub fn machine_ids(&self) -> &MachineIds {
        &self.machine_ids
    }

    /// The generator's clock.
    pub fn clock(&self) -> &TickClock<T> {
        &self.clock
    }

    /// A copy of the current sequencer state.
    ///
    /// # Errors
    ///
    /// Returns [`Error::LockPoisoned`] if the lock is poisoned.
    pub fn snapshot(&self) -> Result<Sequencer> {
        Ok(self.lock()?.clone())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Sequencer>> {
        #[cfg(feature = "parking-lot")]
        {
            Ok(self.state.lock())
        }
        #[cfg(not(feature = "parking-lot"))]
        {
            Ok(self.state.lock()?)
        }
    }

    /// Mints the next ID without waiting.
    ///
    /// Returns the ID together with how long the caller must wait before
    /// using it (zero unless the current tick was exhausted).
    ///
    /// # Errors
    ///
    /// Returns [`Error::LockPoisoned`] if the lock is poisoned.
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self)))]
    pub fn try_next_id(&self) -> Result<Reservation<SonyflakeId>> {
        let reservation = {
            let mut state = self.lock()?;
            let now = self.clock.elapsed();
            state.next(&self.machine_ids, now)
        };

        #[cfg(feature = "tracing")]
        if !reservation.is_ready() {
            tracing::debug!(
                wait_us = reservation.wait.as_micros() as u64,
                timestamp = reservation.value.timestamp(),
                "tick exhausted, claimed next tick"
            );
        }

        Ok(reservation)
    }

    /// Mints `n` IDs under a single lock acquisition, without waiting.
    ///
    /// The IDs are exactly those `n` back-to-back [`Self::try_next_id`] calls
    /// would have produced, with one wait covering the whole batch.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidBatchSize`] if `n` is zero
    /// - [`Error::BatchTooLarge`] if `n` IDs cannot be allocated
    /// - [`Error::LockPoisoned`] if the lock is poisoned
    ///
    /// None of these advance the generator.
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self)))]
    pub fn try_next_ids(&self, n: usize) -> Result<Reservation<Vec<SonyflakeId>>> {
        if n == 0 {
            return Err(Error::InvalidBatchSize);
        }
        // Allocate outside the critical section.
        let ids = Sequencer::batch_buffer(n)?;

        let reservation = {
            let mut state = self.lock()?;
            let now = self.clock.elapsed();
            state.next_n_into(&self.machine_ids, ids, n, now, || self.clock.elapsed())?
        };

        #[cfg(feature = "tracing")]
        if !reservation.is_ready() {
            tracing::debug!(
                n,
                wait_us = reservation.wait.as_micros() as u64,
                "batch ran past the current tick"
            );
        }

        Ok(reservation)
    }
}

impl<T> fmt::Display for LockSonyflakeGenerator<T>
where
    T: TimeSource,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Sonyflake(")?;
        for machine_id in self.machine_ids.iter() {
            write!(f, "{machine_id}, ")?;
        }
        write!(f, "epoch={})", self.clock.epoch().as_secs())
    }
}

impl<T> fmt::Debug for LockSonyflakeGenerator<T>
where
    T: TimeSource,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LockSonyflakeGenerator")
            .field("machine_ids", &self.machine_ids)
            .field("epoch", &self.clock.epoch())
            .finish_non_exhaustive()
    }
}
