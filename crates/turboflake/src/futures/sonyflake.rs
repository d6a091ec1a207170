use core::{
    future::Future,
    pin::Pin,
    task::{Context, Poll},
    time::Duration,
};
use std::sync::Arc;

use futures::future::BoxFuture;
use pin_project_lite::pin_project;

use super::{ErasedSleep, IdStream};
use crate::{Error, Reservation, Result, Sonyflake, SonyflakeId, TimeSource};

impl<T> Sonyflake<T>
where
    T: TimeSource,
{
    /// Whether a [`SleepProvider`](crate::SleepProvider) was configured, i.e.
    /// whether the async entry points are usable.
    pub fn is_async(&self) -> bool {
        self.sleep.is_some()
    }

    fn sleep_provider(&self) -> Result<&Arc<dyn ErasedSleep>> {
        self.sleep.as_ref().ok_or(Error::MissingSleepProvider)
    }

    /// Generates the next ID, suspending the current task if the current tick
    /// is exhausted.
    ///
    /// The ID is reserved when this method is called, not when the future is
    /// first polled. Dropping the future before it completes skips that ID;
    /// it is never handed out again. The provider's sleep is only created on
    /// the first poll, so the future may be built outside the runtime that
    /// drives it.
    ///
    /// # Errors
    ///
    /// The returned future fails with:
    /// - [`Error::MissingSleepProvider`] if no provider was configured, in
    ///   which case nothing is reserved
    /// - [`Error::Cancelled`] if the provider's wait was cancelled
    /// - [`Error::LockPoisoned`] if the lock is poisoned
    ///
    /// # Example
    ///
    /// ```
    /// use turboflake::{Sonyflake, TokioSleep};
    ///
    /// # tokio::runtime::Runtime::new().unwrap().block_on(async {
    /// let sf = Sonyflake::builder()
    ///     .machine_ids([1, 2])
    ///     .sleep_provider(TokioSleep)
    ///     .build()
    ///     .unwrap();
    ///
    /// let a = sf.next_async().await.unwrap();
    /// let b = sf.next_async().await.unwrap();
    /// assert!(a < b);
    /// # });
    /// ```
    pub fn next_async(&self) -> GeneratorFuture<SonyflakeId> {
        match self.sleep_provider() {
            Ok(provider) => GeneratorFuture::new(provider, self.generator.try_next_id()),
            Err(e) => GeneratorFuture::failed(e),
        }
    }

    /// Generates `n` IDs in one locked pass, then suspends once for the whole
    /// batch if it ran past the current tick.
    ///
    /// Like [`Self::next_async`], the IDs are reserved eagerly.
    ///
    /// # Errors
    ///
    /// The returned future fails with:
    /// - [`Error::InvalidBatchSize`] if `n` is zero
    /// - [`Error::BatchTooLarge`] if `n` IDs cannot be allocated
    /// - [`Error::MissingSleepProvider`] if no provider was configured
    /// - [`Error::Cancelled`] if the provider's wait was cancelled
    /// - [`Error::LockPoisoned`] if the lock is poisoned
    pub fn next_n_async(&self, n: usize) -> GeneratorFuture<Vec<SonyflakeId>> {
        match self.sleep_provider() {
            Ok(provider) => GeneratorFuture::new(provider, self.generator.try_next_ids(n)),
            Err(e) => GeneratorFuture::failed(e),
        }
    }

    /// An endless [`Stream`](futures::Stream) of fresh IDs sharing this
    /// generator.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingSleepProvider`] if no provider was configured.
    pub fn stream(&self) -> Result<IdStream<T>> {
        self.sleep_provider()?;
        Ok(IdStream::new(self.clone()))
    }
}

pin_project! {
    /// A future resolving to IDs that were already reserved, once their tick
    /// has started.
    ///
    /// Created by [`Sonyflake::next_async`] and [`Sonyflake::next_n_async`].
    #[must_use = "futures do nothing unless you `.await` or poll them"]
    pub struct GeneratorFuture<V> {
        value: Option<Result<V>>,
        wait: Option<(Arc<dyn ErasedSleep>, Duration)>,
        #[pin]
        sleep: Option<BoxFuture<'static, Result<()>>>,
    }
}

impl<V> GeneratorFuture<V> {
    fn new(provider: &Arc<dyn ErasedSleep>, reservation: Result<Reservation<V>>) -> Self {
        match reservation {
            Ok(Reservation { value, wait }) => Self {
                value: Some(Ok(value)),
                wait: (!wait.is_zero()).then(|| (Arc::clone(provider), wait)),
                sleep: None,
            },
            Err(e) => Self::failed(e),
        }
    }

    fn failed(e: Error) -> Self {
        Self {
            value: Some(Err(e)),
            wait: None,
            sleep: None,
        }
    }
}

impl<V> Future for GeneratorFuture<V> {
    type Output = Result<V>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let mut this = self.project();

        if let Some((provider, wait)) = this.wait.take() {
            this.sleep.set(Some(provider.sleep_boxed(wait)));
        }

        if let Some(sleep) = this.sleep.as_mut().as_pin_mut() {
            match sleep.poll(cx) {
                Poll::Pending => return Poll::Pending,
                Poll::Ready(res) => {
                    this.sleep.set(None);
                    if let Err(e) = res {
                        this.value.take();
                        return Poll::Ready(Err(e));
                    }
                }
            }
        }

        match this.value.take() {
            Some(value) => Poll::Ready(value),
            None => panic!("`GeneratorFuture` polled after completion"),
        }
    }
}

impl<V> core::fmt::Debug for GeneratorFuture<V> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("GeneratorFuture")
            .field("waiting", &(self.wait.is_some() || self.sleep.is_some()))
            .field("done", &self.value.is_none())
            .finish()
    }
}
