//! Handle to a call running on a blocking thread.

use std::{fmt, future::IntoFuture};

use futures::future::BoxFuture;
use tokio::{
    runtime::Handle,
    sync::oneshot,
    task::JoinHandle,
};
use tokio_util::sync::CancellationToken;

use super::{Call, Returned};
use crate::error::{EndpointError, Result};

/// A call started by the deferred adapter.
///
/// The call runs on the runtime's blocking pool. Await the handle (or
/// [`wait`](Self::wait) outside async code) for its result. Cancelling
/// before the call starts prevents it from running at all; cancelling
/// afterwards discards its result.
///
/// # Examples
///
/// ```no_run
/// # async fn demo(call: restframe::call::DeferredCall) -> restframe::Result<()> {
/// let returned = call.await?;
/// # let _ = returned;
/// # Ok(())
/// # }
/// ```
pub struct DeferredCall {
    receiver: oneshot::Receiver<Result<Returned>>,
    cancellation: CancellationToken,
    task: JoinHandle<()>,
}

impl DeferredCall {
    pub(crate) fn spawn(runtime: &Handle, call: Call) -> Self {
        let (sender, receiver) = oneshot::channel();
        let cancellation = CancellationToken::new();
        let token = cancellation.clone();
        let task = runtime.spawn_blocking(move || {
            if token.is_cancelled() {
                tracing::debug!("deferred call cancelled before start");
                return;
            }
            // The receiver may already be gone after cancellation.
            let _ = sender.send(call());
        });
        Self {
            receiver,
            cancellation,
            task,
        }
    }

    /// Request cancellation.
    ///
    /// Awaiting the call afterwards yields [`EndpointError::Cancelled`].
    pub fn cancel(&self) {
        self.cancellation.cancel();
        self.task.abort();
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool { self.cancellation.is_cancelled() }

    /// Returns true once the underlying task has completed.
    #[must_use]
    pub fn is_finished(&self) -> bool { self.task.is_finished() }

    /// Token cancelled by [`cancel`](Self::cancel); useful for tying the
    /// call to a wider shutdown.
    #[must_use]
    pub fn cancellation_token(&self) -> CancellationToken { self.cancellation.clone() }

    /// Block the current thread until the call completes.
    ///
    /// Must not be used from within an async context.
    ///
    /// # Errors
    ///
    /// Returns the call's own error, or [`EndpointError::Cancelled`] when the
    /// call was cancelled or its task was lost.
    pub fn wait(self) -> Result<Returned> { futures::executor::block_on(self.into_future()) }
}

impl IntoFuture for DeferredCall {
    type Output = Result<Returned>;
    type IntoFuture = BoxFuture<'static, Result<Returned>>;

    fn into_future(self) -> Self::IntoFuture {
        let Self {
            receiver,
            cancellation,
            task: _,
        } = self;
        Box::pin(async move {
            tokio::select! {
                biased;
                () = cancellation.cancelled() => Err(EndpointError::Cancelled),
                received = receiver => received.unwrap_or(Err(EndpointError::Cancelled)),
            }
        })
    }
}

impl fmt::Debug for DeferredCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeferredCall")
            .field("cancelled", &self.is_cancelled())
            .field("finished", &self.is_finished())
            .finish_non_exhaustive()
    }
}
