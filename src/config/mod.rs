//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize, apply command-line overrides)
//!     → validation.rs (semantic checks, run once on the final values)
//!     → AppConfig (validated, immutable)
//!     → DeferredConfig::to_options() for the deferred handler
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, resolve_config, ConfigError, Overrides};
pub use schema::AppConfig;
pub use schema::BackoffConfig;
pub use schema::DeferredConfig;
pub use schema::ListenerConfig;
