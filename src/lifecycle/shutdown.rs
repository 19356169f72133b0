//! Shutdown coordination.

use std::time::Duration;

use tokio_util::sync::CancellationToken;

/// Coordinator for graceful shutdown.
///
/// Long-running tasks hold the root token or a child of it. Cancelling the
/// root cancels every child; cancelling a child leaves the root untouched.
#[derive(Debug, Clone, Default)]
pub struct Shutdown {
    token: CancellationToken,
}

impl Shutdown {
    /// Create a new shutdown coordinator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Token cancelled on shutdown or, if given, after `deadline` elapses.
    ///
    /// Must be called from within a Tokio runtime when `deadline` is set.
    pub fn child_with_deadline(&self, deadline: Option<Duration>) -> CancellationToken {
        let child = self.token.child_token();
        if let Some(deadline) = deadline {
            let expiring = child.clone();
            tokio::spawn(async move {
                tokio::select! {
                    _ = tokio::time::sleep(deadline) => {
                        tracing::warn!(deadline = ?deadline, "Resolution deadline reached");
                        expiring.cancel();
                    }
                    _ = expiring.cancelled() => {}
                }
            });
        }
        child
    }

    /// Trigger the shutdown signal.
    pub fn trigger(&self) {
        self.token.cancel();
    }

    pub fn is_triggered(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Wait until shutdown is triggered.
    pub async fn wait(&self) {
        self.token.cancelled().await
    }
}
