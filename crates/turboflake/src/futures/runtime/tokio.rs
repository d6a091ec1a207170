use core::time::Duration;

use futures::{
    FutureExt,
    future::{BoxFuture, Map},
};
use tokio_util::sync::CancellationToken;

use crate::{Error, Result, SleepProvider};

/// An implementation of [`SleepProvider`] using Tokio's timer.
///
/// This is the default provider for use in async applications built on Tokio.
#[derive(Clone, Copy, Debug, Default)]
pub struct TokioSleep;

impl SleepProvider for TokioSleep {
    type Sleep = Map<tokio::time::Sleep, fn(()) -> Result<()>>;

    fn sleep_for(&self, dur: Duration) -> Self::Sleep {
        tokio::time::sleep(dur).map(Ok as fn(()) -> Result<()>)
    }
}

/// A [`SleepProvider`] whose waits can be cancelled through a
/// [`CancellationToken`].
///
/// Once the token is cancelled, every pending and future wait resolves
/// immediately with [`Error::Cancelled`], failing the generation call that
/// awaited it. IDs reserved by those calls are skipped, never reissued.
///
/// # Example
///
/// ```
/// use tokio_util::sync::CancellationToken;
/// use turboflake::{CancellableSleep, Sonyflake, TokioSleep};
///
/// let token = CancellationToken::new();
/// let sf = Sonyflake::builder()
///     .machine_id(0)
///     .sleep_provider(CancellableSleep::new(TokioSleep, token.clone()))
///     .build()
///     .unwrap();
///
/// // e.g. on shutdown
/// token.cancel();
/// # drop(sf);
/// ```
#[derive(Clone, Debug)]
pub struct CancellableSleep<S = TokioSleep> {
    inner: S,
    token: CancellationToken,
}

impl<S> CancellableSleep<S>
where
    S: SleepProvider,
{
    /// Wraps `inner`, cancelling its waits when `token` is cancelled.
    pub const fn new(inner: S, token: CancellationToken) -> Self {
        Self { inner, token }
    }

    /// The token that cancels this provider's waits.
    pub fn token(&self) -> &CancellationToken {
        &self.token
    }
}

impl<S> SleepProvider for CancellableSleep<S>
where
    S: SleepProvider,
{
    type Sleep = BoxFuture<'static, Result<()>>;

    fn sleep_for(&self, dur: Duration) -> Self::Sleep {
        let token = self.token.clone();
        let sleep = self.inner.sleep_for(dur);
        Box::pin(async move {
            match token.run_until_cancelled(sleep).await {
                Some(res) => res,
                None => {
                    #[cfg(feature = "tracing")]
                    tracing::debug!("async wait cancelled");
                    Err(Error::Cancelled)
                }
            }
        })
    }
}
