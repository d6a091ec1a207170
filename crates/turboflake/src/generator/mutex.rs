#[cfg(feature = "parking-lot")]
pub(crate) use parking_lot::{Condvar, Mutex, MutexGuard};
#[cfg(not(feature = "parking-lot"))]
pub(crate) use std::sync::{Condvar, Mutex, MutexGuard};
