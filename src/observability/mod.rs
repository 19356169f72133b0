//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Resolver and façade produce:
//!     → logging.rs (structured `tracing` events)
//!     → metrics.rs (counters, gauge, histogram)
//! ```
//!
//! # Design Decisions
//! - Every failed construction attempt is logged at `warn` with its attempt number
//! - Metrics are cheap and optional; the binary decides whether to export them

pub mod logging;
pub mod metrics;
