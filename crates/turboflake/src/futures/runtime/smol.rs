use core::time::Duration;
use std::time::Instant;

use futures::{FutureExt, future::Map};
use smol::Timer;

use crate::{Result, SleepProvider};

/// An implementation of [`SleepProvider`] using Smol's timer.
///
/// This is the default provider for use in async applications built on Smol.
#[derive(Clone, Copy, Debug, Default)]
pub struct SmolSleep;

impl SleepProvider for SmolSleep {
    type Sleep = Map<Timer, fn(Instant) -> Result<()>>;

    fn sleep_for(&self, dur: Duration) -> Self::Sleep {
        Timer::after(dur).map(elapsed as fn(Instant) -> Result<()>)
    }
}

fn elapsed(_: Instant) -> Result<()> {
    Ok(())
}
