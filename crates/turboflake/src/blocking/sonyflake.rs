use crate::{Reservation, Result, Sonyflake, SonyflakeId, TimeSource};

impl<T> Sonyflake<T>
where
    T: TimeSource,
{
    /// Generates the next ID, blocking the calling thread if the current tick
    /// is exhausted.
    ///
    /// The generator lock is released before the thread blocks, so other
    /// callers keep minting IDs (for later ticks) meanwhile.
    ///
    /// # Errors
    ///
    /// - [`Error::Interrupted`](crate::Error::Interrupted) if the configured
    ///   [`BlockingSleep`](crate::BlockingSleep) was interrupted. The ID's slot
    ///   is consumed regardless. The default [`ThreadSleep`](crate::ThreadSleep)
    ///   resumes after signals and never fails; configure an
    ///   [`InterruptibleSleep`](crate::InterruptibleSleep) through
    ///   [`SonyflakeBuilder::blocking_sleep`](crate::SonyflakeBuilder::blocking_sleep)
    ///   for waits that can be aborted.
    /// - [`Error::LockPoisoned`](crate::Error::LockPoisoned) if the lock is
    ///   poisoned
    pub fn next(&self) -> Result<SonyflakeId> {
        let reservation = self.generator.try_next_id()?;
        self.wait_out(reservation)
    }

    /// Generates `n` IDs in one locked pass, then blocks once for the whole
    /// batch if it ran past the current tick.
    ///
    /// Returns the same IDs as `n` back-to-back calls to [`Self::next`].
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidBatchSize`](crate::Error::InvalidBatchSize) if `n` is
    ///   zero
    /// - [`Error::BatchTooLarge`](crate::Error::BatchTooLarge) if `n` IDs
    ///   cannot be allocated
    /// - [`Error::Interrupted`](crate::Error::Interrupted) if the wait was
    ///   interrupted
    /// - [`Error::LockPoisoned`](crate::Error::LockPoisoned) if the lock is
    ///   poisoned
    pub fn next_n(&self, n: usize) -> Result<Vec<SonyflakeId>> {
        let reservation = self.generator.try_next_ids(n)?;
        self.wait_out(reservation)
    }

    /// An endless blocking iterator over fresh IDs.
    ///
    /// ```
    /// use turboflake::Sonyflake;
    ///
    /// let sf = Sonyflake::new([1, 2, 3]).unwrap();
    /// let ids = sf.iter().take(10).collect::<Result<Vec<_>, _>>().unwrap();
    /// assert_eq!(ids.len(), 10);
    /// ```
    pub fn iter(&self) -> Iter<'_, T> {
        Iter { sonyflake: self }
    }

    fn wait_out<V>(&self, reservation: Reservation<V>) -> Result<V> {
        let (value, wait) = reservation.into_parts();
        if !wait.is_zero() {
            self.blocking.sleep(wait)?;
        }
        Ok(value)
    }
}

/// An endless iterator of IDs from a [`Sonyflake`], created by
/// [`Sonyflake::iter`].
///
/// Each step behaves like [`Sonyflake::next`].
#[derive(Debug)]
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Iter<'a, T>
where
    T: TimeSource,
{
    sonyflake: &'a Sonyflake<T>,
}

impl<T> Iterator for Iter<'_, T>
where
    T: TimeSource,
{
    type Item = Result<SonyflakeId>;

    fn next(&mut self) -> Option<Self::Item> {
        Some(self.sonyflake.next())
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (usize::MAX, None)
    }
}

impl<'a, T> IntoIterator for &'a Sonyflake<T>
where
    T: TimeSource,
{
    type Item = Result<SonyflakeId>;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
