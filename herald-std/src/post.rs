//! Handles returned by scheduled posts.
//!
//! - [`PostHandle`] is the task-returning mode: an awaitable handle to a pass
//!   running on the bus runtime, with [`abort`](PostHandle::abort).
//! - [`PostFuture`] is the future-returning mode for callers that are not
//!   async themselves: block on it, poll it, or attach a completion callback.
//!
//! Both resolve to `Result<PostResult<E>, DispatchError>`. The error side is
//! only reached when the pass never finished (aborted task, dropped runtime,
//! engine panic); listener faults are always part of the [`PostResult`].

use futures::channel::oneshot;
use herald_core::{DispatchError, PostResult};
use std::{
    fmt,
    future::Future,
    pin::Pin,
    task::{Context, Poll},
};
use tokio::{runtime::Handle, task::JoinHandle};

/// Outcome of a scheduled post.
pub type PostOutcome<E> = Result<PostResult<E>, DispatchError>;

// ============================================================================
// PostHandle
// ============================================================================

enum HandleState<E> {
    Spawned(JoinHandle<PostResult<E>>),
    Ready(Option<PostResult<E>>),
}

/// Awaitable handle to a dispatch pass started by [`EventBus::post`].
///
/// Dropping the handle detaches the pass; it still runs to completion.
///
/// [`EventBus::post`]: crate::EventBus::post
pub struct PostHandle<E> {
    state: HandleState<E>,
}

// No field is ever pinned in place.
impl<E> Unpin for PostHandle<E> {}

impl<E> PostHandle<E> {
    pub(crate) fn spawned(handle: JoinHandle<PostResult<E>>) -> Self {
        Self {
            state: HandleState::Spawned(handle),
        }
    }

    pub(crate) fn ready(result: PostResult<E>) -> Self {
        Self {
            state: HandleState::Ready(Some(result)),
        }
    }

    /// Cancel the pass at its next await point.
    ///
    /// Awaiting the handle afterwards yields [`DispatchError::Cancelled`]
    /// unless the pass had already finished. A pass that ran inline is
    /// always finished.
    pub fn abort(&self) {
        if let HandleState::Spawned(handle) = &self.state {
            handle.abort();
        }
    }

    /// Whether the pass has ended, successfully or not.
    pub fn is_finished(&self) -> bool {
        match &self.state {
            HandleState::Spawned(handle) => handle.is_finished(),
            HandleState::Ready(_) => true,
        }
    }
}

impl<E> Future for PostHandle<E> {
    type Output = PostOutcome<E>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match &mut self.get_mut().state {
            HandleState::Spawned(handle) => Pin::new(handle).poll(cx).map(|joined| {
                joined.map_err(|err| {
                    if err.is_panic() {
                        DispatchError::from_panic(err.into_panic())
                    } else {
                        DispatchError::Cancelled
                    }
                })
            }),
            HandleState::Ready(result) => {
                Poll::Ready(result.take().ok_or(DispatchError::Cancelled))
            }
        }
    }
}

impl<E> fmt::Debug for PostHandle<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mode = match self.state {
            HandleState::Spawned(_) => "spawned",
            HandleState::Ready(_) => "inline",
        };
        f.debug_struct("PostHandle")
            .field("mode", &mode)
            .field("finished", &self.is_finished())
            .finish()
    }
}

// ============================================================================
// PostFuture
// ============================================================================

/// Completion handle returned by [`EventBus::post_future`].
///
/// [`EventBus::post_future`]: crate::EventBus::post_future
pub struct PostFuture<E> {
    rx: oneshot::Receiver<PostOutcome<E>>,
    runtime: Option<Handle>,
}

impl<E> PostFuture<E> {
    pub(crate) fn new(rx: oneshot::Receiver<PostOutcome<E>>, runtime: Option<Handle>) -> Self {
        Self { rx, runtime }
    }

    /// Block the current thread until the pass ends.
    ///
    /// Must not be called from a task running on a single-threaded runtime
    /// that is also responsible for the pass.
    pub fn wait(self) -> PostOutcome<E> {
        futures::executor::block_on(self)
    }

    /// The outcome if the pass has ended, without blocking.
    ///
    /// Returns `None` while the pass is still running. Once an outcome has
    /// been taken, later calls report [`DispatchError::Cancelled`].
    pub fn try_take(&mut self) -> Option<PostOutcome<E>> {
        match self.rx.try_recv() {
            Ok(Some(outcome)) => Some(outcome),
            Ok(None) => None,
            Err(oneshot::Canceled) => Some(Err(DispatchError::Cancelled)),
        }
    }

    /// Invoke `callback` with the outcome once the pass ends.
    ///
    /// With a runtime the callback runs on a runtime task; otherwise the pass
    /// already ran inline and the callback is invoked immediately.
    pub fn on_complete<F>(self, callback: F)
    where
        E: Send + 'static,
        F: FnOnce(PostOutcome<E>) + Send + 'static,
    {
        match self.runtime.clone() {
            Some(runtime) => {
                runtime.spawn(async move { callback(self.await) });
            }
            None => callback(self.wait()),
        }
    }
}

impl<E> Future for PostFuture<E> {
    type Output = PostOutcome<E>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.rx)
            .poll(cx)
            .map(|received| received.unwrap_or(Err(DispatchError::Cancelled)))
    }
}

impl<E> fmt::Debug for PostFuture<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PostFuture")
            .field("runtime", &self.runtime.is_some())
            .finish_non_exhaustive()
    }
}
