//! Configuration for a [`DeferredHandler`](super::DeferredHandler).
//!
//! Options are built with chained setters over the defaults and are immutable
//! once handed to the handler.
//!
//! # Example
//! ```rust
//! use std::time::Duration;
//! use deferred_handler::{BackoffStrategy, Options};
//!
//! let options = Options::default()
//!     .timeout_after(Duration::from_secs(5))
//!     .backoff(BackoffStrategy::exponential(Duration::from_millis(200)))
//!     .notify(|err| eprintln!("{err}"));
//!
//! assert_eq!(options.timeout(), Duration::from_secs(5));
//! ```

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::deferred::responses::StatusResponder;
use crate::error::AttemptError;
use crate::handler::{shared, Handler, SharedHandler};
use crate::resilience::backoff::{BackoffStrategy, DEFAULT_RETRY_AFTER};

/// Default per-request wait ceiling.
pub const DEFAULT_TIMEOUT_AFTER: Duration = Duration::from_secs(15);

/// Observer invoked once per failed construction attempt.
pub type Notify = Arc<dyn Fn(AttemptError) + Send + Sync>;

/// Settings for retry pacing, request timeouts and failure reporting.
#[derive(Clone)]
pub struct Options {
    pub(crate) notify: Notify,
    pub(crate) failed_handler: SharedHandler,
    pub(crate) timeout_after: Duration,
    pub(crate) retry: BackoffStrategy,
}

impl Default for Options {
    /// Returns options with:
    /// - `notify` = no-op;
    /// - `failed_handler` = 503 "permanent error creating handler";
    /// - `timeout_after` = 15s;
    /// - `retry` = constant 10s.
    fn default() -> Self {
        Self {
            notify: Arc::new(|_: AttemptError| {}),
            failed_handler: shared(StatusResponder::failed()),
            timeout_after: DEFAULT_TIMEOUT_AFTER,
            retry: BackoffStrategy::constant(DEFAULT_RETRY_AFTER),
        }
    }
}

impl Options {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait a constant `interval` between failed attempts.
    pub fn retry_after(self, interval: Duration) -> Self {
        self.backoff(BackoffStrategy::constant(interval))
    }

    /// Pace retries with an arbitrary strategy.
    pub fn backoff(mut self, strategy: BackoffStrategy) -> Self {
        self.retry = strategy;
        self
    }

    /// How long a request waits for resolution before getting a 503.
    pub fn timeout_after(mut self, timeout: Duration) -> Self {
        self.timeout_after = timeout;
        self
    }

    /// Called with every construction error.
    ///
    /// Runs on the resolver task before the next retry is scheduled, so a slow
    /// observer delays the next attempt.
    pub fn notify<F>(mut self, notify: F) -> Self
    where
        F: Fn(AttemptError) + Send + Sync + 'static,
    {
        self.notify = Arc::new(notify);
        self
    }

    /// Handler serving every request once resolution has been cancelled.
    pub fn failed_handler<H: Handler>(mut self, handler: H) -> Self {
        self.failed_handler = shared(handler);
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout_after
    }

    /// The strategy in its initial state.
    pub fn retry_strategy(&self) -> BackoffStrategy {
        self.retry
    }
}

impl fmt::Debug for Options {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Options")
            .field("timeout_after", &self.timeout_after)
            .field("retry", &self.retry)
            .finish_non_exhaustive()
    }
}
