use core::{
    fmt,
    pin::Pin,
    task::{Context, Poll},
};

use futures::{Future, Stream};
use pin_project_lite::pin_project;

use super::GeneratorFuture;
use crate::{Result, Sonyflake, SonyflakeId, TimeSource};

pin_project! {
    /// An endless stream of IDs from a [`Sonyflake`], created by
    /// [`Sonyflake::stream`].
    ///
    /// Each item behaves like [`Sonyflake::next_async`]; the next ID is only
    /// reserved once the stream is polled for it. The stream ends after
    /// yielding its first error.
    #[must_use = "streams do nothing unless polled"]
    pub struct IdStream<T>
    where
        T: TimeSource,
    {
        sonyflake: Sonyflake<T>,
        #[pin]
        pending: Option<GeneratorFuture<SonyflakeId>>,
        done: bool,
    }
}

impl<T> IdStream<T>
where
    T: TimeSource,
{
    pub(crate) fn new(sonyflake: Sonyflake<T>) -> Self {
        Self {
            sonyflake,
            pending: None,
            done: false,
        }
    }
}

impl<T> Stream for IdStream<T>
where
    T: TimeSource,
{
    type Item = Result<SonyflakeId>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let mut this = self.project();
        if *this.done {
            return Poll::Ready(None);
        }

        if this.pending.is_none() {
            this.pending.set(Some(this.sonyflake.next_async()));
        }

        let Some(pending) = this.pending.as_mut().as_pin_mut() else {
            return Poll::Ready(None);
        };
        let res = match pending.poll(cx) {
            Poll::Pending => return Poll::Pending,
            Poll::Ready(res) => res,
        };
        this.pending.set(None);
        *this.done = res.is_err();
        Poll::Ready(Some(res))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.done { (0, Some(0)) } else { (usize::MAX, None) }
    }
}

impl<T> fmt::Debug for IdStream<T>
where
    T: TimeSource,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IdStream")
            .field("sonyflake", &self.sonyflake)
            .field("pending", &self.pending)
            .field("done", &self.done)
            .finish()
    }
}
