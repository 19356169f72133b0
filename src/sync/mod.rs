//! Synchronization primitives behind the deferred handler.
//!
//! # Data Flow
//! ```text
//! Resolver outcome
//!     → switch.rs (install: requests stop waiting)
//!     → broadcast.rs (publish: wake every request already waiting)
//! ```
//!
//! # Design Decisions
//! - Both primitives are write-once
//! - Readers never take a lock on the fast path
//! - Only the resolver owns the broadcast writer, so a resolver that dies
//!   without an outcome releases its waiters instead of stranding them

pub mod broadcast;
pub mod switch;

pub use broadcast::{BroadcastCell, Subscription};
pub use switch::{HandlerSwitch, Installed};
