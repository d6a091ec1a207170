//! Error types for ID generation.
//!
//! [`ConfigError`] is only produced while building a generator: a generator
//! that fails validation is never constructed. Every other [`Error`] variant
//! aborts the single call that produced it and leaves the generator usable.
//!
//! Generator state is always advanced *before* any wait starts, so a call that
//! fails while waiting has already consumed its slot. Retrying it skips IDs
//! but never repeats one.

/// A result type defaulting to this crate's [`Error`].
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// Rejections raised while validating generator configuration.
#[derive(Clone, Debug, PartialEq, Eq, Hash, thiserror::Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// The machine ID set was empty.
    #[error("At least one machine ID must be provided")]
    NoMachineIds,

    /// More machine IDs than the 16-bit field can address. `count` is a lower
    /// bound when the input had no size hint.
    #[error("Too many machine IDs, maximum is 65536 (got {count})")]
    TooManyMachineIds { count: usize },

    /// A machine ID does not fit in 16 bits.
    #[error("Machine IDs must be in range [0, 65535] (got {value})")]
    MachineIdOutOfRange { value: i64 },

    /// The same machine ID was supplied more than once.
    #[error("Duplicate machine IDs are not allowed (got {value} twice)")]
    DuplicateMachineId { value: u16 },

    /// The epoch lies before the UNIX epoch.
    #[error("Epoch must be a non-negative number of seconds since 1970-01-01 (got {secs})")]
    InvalidEpoch { secs: i64 },
}

/// All errors that `turboflake` can emit.
#[derive(Clone, Debug, PartialEq, Eq, Hash, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// The generator configuration was rejected.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A batch of zero IDs was requested.
    #[error("Batch size must be positive")]
    InvalidBatchSize,

    /// The output buffer for a batch could not be allocated. Nothing was
    /// reserved.
    #[error("Batch of {n} IDs is too large to allocate")]
    BatchTooLarge { n: usize },

    /// An async entry point was used on a generator built without a
    /// [`SleepProvider`](crate::SleepProvider).
    #[error("No sleep provider configured for async generation")]
    MissingSleepProvider,

    /// A blocking wait was interrupted before it elapsed.
    #[error("Wait for the next tick was interrupted")]
    Interrupted,

    /// The sleep provider cancelled a pending wait.
    #[error("Wait for the next tick was cancelled")]
    Cancelled,

    /// The operation failed because the lock was **poisoned**.
    ///
    /// This occurs when a thread panics while holding the lock. With the
    /// `parking-lot` feature mutexes do not poison and this is never
    /// returned by the generator itself.
    #[error("Generator lock poisoned")]
    LockPoisoned,
}

use std::sync::{MutexGuard, PoisonError};
// Convert all poisoned lock errors to a simplified `LockPoisoned`
impl<T> From<PoisonError<MutexGuard<'_, T>>> for Error {
    fn from(_: PoisonError<MutexGuard<'_, T>>) -> Self {
        Self::LockPoisoned
    }
}

impl<T> From<PoisonError<(MutexGuard<'_, T>, std::sync::WaitTimeoutResult)>> for Error {
    fn from(_: PoisonError<(MutexGuard<'_, T>, std::sync::WaitTimeoutResult)>) -> Self {
        Self::LockPoisoned
    }
}
