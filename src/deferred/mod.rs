//! Deferred handler subsystem.
//!
//! # Data Flow
//! ```text
//! DeferredHandler::new
//!     → options.rs (retry pacing, per-request timeout, notify, failed handler)
//!     → resolver.rs spawned on the runtime
//!
//! Request
//!     → handler.rs
//!         ├─ switch installed → delegate
//!         └─ otherwise wait on the broadcast cell, bounded by timeout_after
//!                ├─ outcome published → delegate
//!                └─ timer fired → responses.rs (503)
//! ```
//!
//! # Design Decisions
//! - The resolver installs before it publishes, so woken waiters and new
//!   requests agree on the handler
//! - A request timing out never affects the resolver
//! - Cancellation is the only way to reach permanent failure

pub mod handler;
pub mod options;
pub mod resolver;
pub mod responses;

pub use handler::DeferredHandler;
pub use options::Options;
pub use resolver::Resolver;
pub use responses::StatusResponder;

use std::fmt;

/// Where a deferred handler is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResolutionState {
    /// Construction has not succeeded yet; requests wait.
    Attempting,
    /// The constructed handler is serving.
    Resolved,
    /// Resolution was cancelled; the failed handler is serving.
    PermanentlyFailed,
}

impl ResolutionState {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            ResolutionState::Attempting => "attempting",
            ResolutionState::Resolved => "resolved",
            ResolutionState::PermanentlyFailed => "permanently_failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, ResolutionState::Attempting)
    }
}

impl fmt::Display for ResolutionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_label())
    }
}
