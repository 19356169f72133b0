//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Shutdown (shutdown.rs):
//!     Signal received → cancel root token → server drains, resolution gives up
//!
//! Signals (signals.rs):
//!     SIGINT (Ctrl+C) → trigger shutdown
//! ```
//!
//! # Design Decisions
//! - One root `CancellationToken`; resolution runs on a child token so a
//!   deadline can give up on resolution without stopping the server

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
