//! HTTP serving subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, tracing layer)
//!     → DeferredHandler (waits for, then delegates to)
//!     → content.rs (Router built from the content file)
//! ```

pub mod content;
pub mod server;

pub use server::HttpServer;
