//! Error types shared across the deferred handler.
//!
//! Construction failures never reach request handling directly: they are
//! wrapped in [`AttemptError`] and handed to the `notify` observer. The other
//! variants describe misuse of the synchronization primitives.

use thiserror::Error;

/// Boxed error returned by handler constructors.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// A single failed construction attempt.
#[derive(Debug, Error)]
#[error("attempt {attempt} failed to create handler: {source}")]
pub struct AttemptError {
    /// 1-based number of the attempt that failed.
    pub attempt: u32,
    /// Error returned by the constructor.
    #[source]
    pub source: BoxError,
}

impl AttemptError {
    pub fn new(attempt: u32, source: impl Into<BoxError>) -> Self {
        Self {
            attempt,
            source: source.into(),
        }
    }
}

/// The writer side of a broadcast cell went away without publishing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("broadcast cell closed before a value was published")]
pub struct BroadcastClosed;

/// Errors raised by [`HandlerSwitch`](crate::sync::HandlerSwitch).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SwitchError {
    /// A handler has already been installed; the switch is write-once.
    #[error("a handler is already installed")]
    AlreadyInstalled,
}
