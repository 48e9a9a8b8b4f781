//! Cancellation utilities
//!
//! Provides first-class cancellation handles for long-running operations such
//! as task polling.

use tokio_util::sync::CancellationToken;

/// A handle that can be used to request cancellation.
#[derive(Clone, Debug, Default)]
pub struct CancelHandle {
    token: CancellationToken,
}

impl CancelHandle {
    /// Create a new, uncancelled handle.
    pub fn new() -> Self {
        Self {
            token: CancellationToken::new(),
        }
    }

    /// Request cancellation. Any poller observing this handle stops at its
    /// next suspension point, including an in-flight status query.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Check if cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// A future that resolves when cancellation is requested.
    pub fn cancelled(&self) -> tokio_util::sync::WaitForCancellationFuture<'_> {
        self.token.cancelled()
    }

    /// Create a handle that is cancelled together with this one but can also
    /// be cancelled on its own.
    pub fn child(&self) -> Self {
        Self {
            token: self.token.child_token(),
        }
    }
}

/// Create a standalone cancel handle that can be shared across tasks.
pub fn new_cancel_handle() -> CancelHandle {
    CancelHandle::new()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parent_cancellation_reaches_child() {
        let parent = new_cancel_handle();
        let child = parent.child();
        assert!(!child.is_cancelled());

        parent.cancel();
        assert!(child.is_cancelled());
    }

    #[test]
    fn child_cancellation_does_not_reach_parent() {
        let parent = CancelHandle::new();
        let child = parent.child();

        child.cancel();
        assert!(child.is_cancelled());
        assert!(!parent.is_cancelled());
    }

    #[tokio::test]
    async fn cancelled_future_resolves_after_cancel() {
        let handle = CancelHandle::new();
        let observer = handle.clone();
        let waiter = tokio::spawn(async move { observer.cancelled().await });

        handle.cancel();
        waiter.await.expect("waiter task should finish");
    }
}
