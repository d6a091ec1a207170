use core::time::Duration;
use std::{sync::Arc, time::Instant};

use crate::{
    Error, Result,
    generator::mutex::{Condvar, Mutex, MutexGuard},
};

/// A trait that abstracts over how to block the current thread for a given
/// [`Duration`].
///
/// The blocking entry points of [`Sonyflake`](crate::Sonyflake) call this
/// after the generator lock has been released. An implementation that cannot
/// finish the wait must fail rather than return early, so that an ID is never
/// handed out before its tick has started.
pub trait BlockingSleep: Send + Sync {
    /// Blocks for `dur`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Interrupted`] if the wait was cut short.
    fn sleep(&self, dur: Duration) -> Result<()>;
}

/// An implementation of [`BlockingSleep`] using [`std::thread::sleep`].
///
/// This is the default. It cannot be interrupted: the standard library
/// resumes the sleep after a signal.
#[derive(Clone, Copy, Debug, Default)]
pub struct ThreadSleep;

impl BlockingSleep for ThreadSleep {
    fn sleep(&self, dur: Duration) -> Result<()> {
        std::thread::sleep(dur);
        Ok(())
    }
}

#[derive(Debug, Default)]
struct Shared {
    generation: Mutex<u64>,
    wakeup: Condvar,
}

impl Shared {
    fn lock(&self) -> Result<MutexGuard<'_, u64>> {
        #[cfg(feature = "parking-lot")]
        {
            Ok(self.generation.lock())
        }
        #[cfg(not(feature = "parking-lot"))]
        {
            Ok(self.generation.lock()?)
        }
    }

    fn wait_for<'a>(&self, guard: MutexGuard<'a, u64>, dur: Duration) -> Result<MutexGuard<'a, u64>> {
        #[cfg(feature = "parking-lot")]
        {
            let mut guard = guard;
            self.wakeup.wait_for(&mut guard, dur);
            Ok(guard)
        }
        #[cfg(not(feature = "parking-lot"))]
        {
            let (guard, _) = self.wakeup.wait_timeout(guard, dur)?;
            Ok(guard)
        }
    }
}

/// A [`BlockingSleep`] that can be interrupted from another thread.
///
/// Every wait in progress when [`Interrupter::interrupt`] is called fails with
/// [`Error::Interrupted`]; waits that start afterwards are unaffected. Wire the
/// [`Interrupter`] to whatever should abort blocked callers, such as a signal
/// handler.
///
/// # Example
///
/// ```
/// use core::time::Duration;
/// use turboflake::{BlockingSleep, Error, InterruptibleSleep};
///
/// let sleep = InterruptibleSleep::new();
/// let interrupter = sleep.interrupter();
///
/// std::thread::scope(|s| {
///     let waiter = s.spawn(|| sleep.sleep(Duration::from_secs(60)));
///     while !waiter.is_finished() {
///         interrupter.interrupt();
///         std::thread::sleep(Duration::from_millis(1));
///     }
///     assert_eq!(waiter.join().unwrap(), Err(Error::Interrupted));
/// });
/// ```
#[derive(Clone, Debug, Default)]
pub struct InterruptibleSleep {
    shared: Arc<Shared>,
}

impl InterruptibleSleep {
    /// Creates a sleeper with no pending interrupts.
    pub fn new() -> Self {
        Self::default()
    }

    /// A handle that interrupts this sleeper (and its clones).
    pub fn interrupter(&self) -> Interrupter {
        Interrupter {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl BlockingSleep for InterruptibleSleep {
    fn sleep(&self, dur: Duration) -> Result<()> {
        let deadline = Instant::now() + dur;
        let mut generation = self.shared.lock()?;
        let started = *generation;

        loop {
            if *generation != started {
                #[cfg(feature = "tracing")]
                tracing::debug!("blocking wait interrupted");
                return Err(Error::Interrupted);
            }
            let now = Instant::now();
            if now >= deadline {
                return Ok(());
            }
            generation = self.shared.wait_for(generation, deadline - now)?;
        }
    }
}

/// Interrupts the waits of an [`InterruptibleSleep`].
#[derive(Clone, Debug)]
pub struct Interrupter {
    shared: Arc<Shared>,
}

impl Interrupter {
    /// Fails every wait currently in progress with [`Error::Interrupted`].
    pub fn interrupt(&self) {
        #[cfg(feature = "parking-lot")]
        let mut generation = self.shared.generation.lock();
        // A poisoned counter is still a counter.
        #[cfg(not(feature = "parking-lot"))]
        let mut generation = match self.shared.generation.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *generation = generation.wrapping_add(1);
        drop(generation);
        self.shared.wakeup.notify_all();
    }
}
