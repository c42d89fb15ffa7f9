//! Asynchronous row consumption over synchronous enumeration.

use std::fmt;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures::Stream;
use projex_expr::Value;

use crate::source::RowIter;

/// A [`Stream`] that steps a synchronous row iterator.
///
/// Every poll completes immediately on the calling thread. There is no
/// suspension and no backpressure.
pub struct AsyncRows {
    inner: RowIter,
    yielded: usize,
}

impl AsyncRows {
    pub fn new(inner: RowIter) -> Self {
        Self { inner, yielded: 0 }
    }

    /// Rows produced so far.
    pub fn yielded(&self) -> usize {
        self.yielded
    }
}

impl Stream for AsyncRows {
    type Item = Value;

    fn poll_next(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Option<Value>> {
        let this = self.get_mut();
        let next = this.inner.next();
        if next.is_some() {
            this.yielded += 1;
        }
        Poll::Ready(next)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl fmt::Debug for AsyncRows {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AsyncRows")
            .field("yielded", &self.yielded)
            .finish_non_exhaustive()
    }
}
