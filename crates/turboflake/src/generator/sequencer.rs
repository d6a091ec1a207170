use core::time::Duration;

use crate::{
    Error, MachineIds, Reservation, Result, SONYFLAKE_SEQUENCE_BITS, SonyflakeId, from_ticks,
    to_ticks,
};

const SEQUENCE_MASK: u32 = (1 << SONYFLAKE_SEQUENCE_BITS) - 1;

/// The counter half of a generator: the last claimed tick and the combined
/// sequence.
///
/// The combined sequence counts through every `(machine slot, sequence)` pair
/// of a tick: `combined_sequence >> 8` indexes the (sorted) machine IDs and
/// `combined_sequence & 0xFF` is the intra-tick sequence. Once all
/// `machine_count * 256` pairs of a tick are used, the sequencer claims the
/// next tick even if the wall clock has not reached it and reports how long
/// the caller has to wait for it.
///
/// A `Sequencer` is not synchronized. [`LockSonyflakeGenerator`] pairs one
/// with a mutex and a clock.
///
/// [`LockSonyflakeGenerator`]: crate::LockSonyflakeGenerator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sequencer {
    elapsed_time: u64,
    combined_sequence: u32,
    slots: u32,
}

impl Sequencer {
    /// Creates a sequencer for `machine_ids`, starting at tick zero.
    pub fn new(machine_ids: &MachineIds) -> Self {
        Self::from_components(0, 0, machine_ids)
    }

    /// Creates a sequencer from explicit counter values.
    ///
    /// `combined_sequence` is reduced modulo `machine_ids.len() * 256`.
    pub fn from_components(elapsed_time: u64, combined_sequence: u32, machine_ids: &MachineIds) -> Self {
        // `MachineIds` holds 1..=65536 values, so this is at most 2^24.
        let slots = (machine_ids.len() as u32) << SONYFLAKE_SEQUENCE_BITS;
        Self {
            elapsed_time,
            combined_sequence: combined_sequence % slots,
            slots,
        }
    }

    /// The last tick claimed.
    #[inline]
    pub const fn elapsed_time(&self) -> u64 {
        self.elapsed_time
    }

    /// The combined machine-slot/sequence counter.
    #[inline]
    pub const fn combined_sequence(&self) -> u32 {
        self.combined_sequence
    }

    /// Number of IDs available per tick.
    #[inline]
    pub const fn slots_per_tick(&self) -> u32 {
        self.slots
    }

    /// Moves to the next slot; returns `true` when it wrapped to zero.
    #[inline]
    fn increment(&mut self) -> bool {
        self.combined_sequence += 1;
        if self.combined_sequence == self.slots {
            self.combined_sequence = 0;
            true
        } else {
            false
        }
    }

    /// Applies one state transition against the tick `current`.
    ///
    /// - Fresh tick (`elapsed_time < current`): claim it and restart the
    ///   sequence.
    /// - Otherwise take the next slot; if that wraps, claim the next tick.
    ///
    /// Returns `true` when the transition had to claim a tick the clock has
    /// not reached.
    #[inline]
    pub fn advance(&mut self, current: u64) -> bool {
        if self.elapsed_time < current {
            self.elapsed_time = current;
            self.combined_sequence = 0;
            false
        } else if self.increment() {
            self.elapsed_time += 1;
            true
        } else {
            false
        }
    }

    /// Composes the ID for the current state.
    #[inline]
    pub fn compose(&self, machine_ids: &MachineIds) -> SonyflakeId {
        debug_assert_eq!(machine_ids.len() << SONYFLAKE_SEQUENCE_BITS, self.slots as usize);
        let machine_id = machine_ids[(self.combined_sequence >> SONYFLAKE_SEQUENCE_BITS) as usize];
        let sequence = (self.combined_sequence & SEQUENCE_MASK) as u8;
        SonyflakeId::from_components(self.elapsed_time, machine_id, sequence)
    }

    /// Mints one ID given the time elapsed since the epoch.
    ///
    /// A wait is only reported when this very transition exhausted the tick:
    /// it is the time until the start of the newly claimed tick.
    pub fn next(&mut self, machine_ids: &MachineIds, now: Duration) -> Reservation<SonyflakeId> {
        let exhausted = self.advance(to_ticks(now));
        let id = self.compose(machine_ids);
        let wait = if exhausted {
            from_ticks(self.elapsed_time).saturating_sub(now)
        } else {
            Duration::ZERO
        };
        Reservation { value: id, wait }
    }

    /// Mints `n` IDs as if by `n` back-to-back calls to [`Self::next`] within
    /// one tick, computing a single wait for the whole batch.
    ///
    /// The wait covers the distance between the last tick claimed and the tick
    /// sampled at the start. When the batch spans more than one tick the clock
    /// is sampled again through `resample`, since `now` may be stale by then.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidBatchSize`] if `n` is zero
    /// - [`Error::BatchTooLarge`] if `n` IDs cannot be allocated
    pub fn next_n(
        &mut self,
        machine_ids: &MachineIds,
        n: usize,
        now: Duration,
        resample: impl FnOnce() -> Duration,
    ) -> Result<Reservation<Vec<SonyflakeId>>> {
        self.next_n_into(machine_ids, Vec::new(), n, now, resample)
    }

    /// Like [`Self::next_n`], but appends to `ids`.
    ///
    /// No allocation happens here when `ids` already has room for `n` more
    /// IDs, so callers holding a lock can allocate with
    /// [`batch_buffer`](Self::batch_buffer) before taking it.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidBatchSize`] if `n` is zero
    /// - [`Error::BatchTooLarge`] if `ids` cannot grow by `n`
    pub fn next_n_into(
        &mut self,
        machine_ids: &MachineIds,
        mut ids: Vec<SonyflakeId>,
        n: usize,
        mut now: Duration,
        resample: impl FnOnce() -> Duration,
    ) -> Result<Reservation<Vec<SonyflakeId>>> {
        if n == 0 {
            return Err(Error::InvalidBatchSize);
        }
        ids.try_reserve_exact(n)
            .map_err(|_| Error::BatchTooLarge { n })?;

        let current = to_ticks(now);

        self.advance(current);
        ids.push(self.compose(machine_ids));

        for _ in 1..n {
            if self.increment() {
                self.elapsed_time += 1;
            }
            ids.push(self.compose(machine_ids));
        }

        let diff = self.elapsed_time.saturating_sub(current);
        if diff == 0 {
            return Ok(Reservation::ready(ids));
        }
        if diff > 1 {
            now = resample();
        }

        Ok(Reservation {
            value: ids,
            wait: from_ticks(self.elapsed_time).saturating_sub(now),
        })
    }

    /// An empty buffer with room for a batch of `n` IDs.
    ///
    /// # Errors
    ///
    /// Returns [`Error::BatchTooLarge`] if the allocation fails.
    pub fn batch_buffer(n: usize) -> Result<Vec<SonyflakeId>> {
        let mut ids = Vec::new();
        ids.try_reserve_exact(n)
            .map_err(|_| Error::BatchTooLarge { n })?;
        Ok(ids)
    }
}
