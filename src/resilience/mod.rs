//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Failed construction attempt:
//!     → backoff.rs (next delay for this resolution sequence)
//!     → resolver waits out the delay, racing cancellation
//!     → next attempt
//! ```
//!
//! # Design Decisions
//! - Strategies are plain values; each resolution sequence owns a fresh copy
//! - Delays are bounded on both sides, including under float overflow

pub mod backoff;
