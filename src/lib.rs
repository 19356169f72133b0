//! Deferred-initialization request handler.
//!
//! A [`DeferredHandler`] accepts requests before the handler that should serve
//! them exists. Callers wait (bounded by a per-request timeout) while a
//! background task retries construction; once construction succeeds every
//! request is delegated straight to the constructed handler.
//!
//! # Architecture Overview
//!
//! ```text
//!     Request ──▶ DeferredHandler ──▶ HandlerSwitch ──(installed)──▶ Handler
//!                       │                   ▲
//!                       │ (empty)           │ install
//!                       ▼                   │
//!                 BroadcastCell ◀──publish── Resolver ──▶ create()
//!                 (wait, bounded                 │
//!                  by timeout)                   └── BackoffStrategy / CancellationToken
//! ```

// Core
pub mod deferred;
pub mod handler;
pub mod http;
pub mod sync;

// Cross-cutting concerns
pub mod config;
pub mod error;
pub mod lifecycle;
pub mod observability;
pub mod resilience;

pub use deferred::{DeferredHandler, Options, ResolutionState};
pub use error::{AttemptError, BoxError};
pub use handler::{Handler, SharedHandler};
pub use resilience::backoff::BackoffStrategy;
