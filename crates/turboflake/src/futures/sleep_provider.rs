use core::{future::Future, time::Duration};

use futures::{
    FutureExt,
    future::{BoxFuture, Map},
};

use crate::Result;

/// A trait that abstracts over how to suspend for a given [`Duration`] in
/// async contexts.
///
/// This is the only capability the async entry points need from a runtime,
/// which keeps the generator independent of Tokio, Smol or anything else.
/// The sleep may fail with [`Error::Cancelled`](crate::Error::Cancelled) to
/// abort the generation call that is waiting on it.
///
/// We require `Send` so that the future can be safely moved across threads.
pub trait SleepProvider: Send + Sync + 'static {
    /// The future returned by [`Self::sleep_for`].
    type Sleep: Future<Output = Result<()>> + Send + 'static;

    /// Returns a future that resolves once `dur` has elapsed.
    fn sleep_for(&self, dur: Duration) -> Self::Sleep;
}

/// Adapts a plain `Fn(Duration) -> impl Future<Output = ()>` into a
/// [`SleepProvider`].
///
/// # Example
///
/// ```
/// use turboflake::{SleepFn, Sonyflake};
///
/// let sf = Sonyflake::builder()
///     .machine_id(0)
///     .sleep_provider(SleepFn::new(tokio::time::sleep))
///     .build()
///     .unwrap();
/// # drop(sf);
/// ```
#[derive(Clone, Copy, Debug)]
pub struct SleepFn<F> {
    f: F,
}

impl<F> SleepFn<F> {
    /// Wraps `f`.
    pub const fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F, Fut> SleepProvider for SleepFn<F>
where
    F: Fn(Duration) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    type Sleep = Map<Fut, fn(()) -> Result<()>>;

    fn sleep_for(&self, dur: Duration) -> Self::Sleep {
        (self.f)(dur).map(Ok as fn(()) -> Result<()>)
    }
}

/// Object-safe form of [`SleepProvider`], so a generator can hold any
/// provider without being generic over it.
pub(crate) trait ErasedSleep: Send + Sync {
    fn sleep_boxed(&self, dur: Duration) -> BoxFuture<'static, Result<()>>;
}

impl<S> ErasedSleep for S
where
    S: SleepProvider,
{
    fn sleep_boxed(&self, dur: Duration) -> BoxFuture<'static, Result<()>> {
        Box::pin(self.sleep_for(dur))
    }
}
