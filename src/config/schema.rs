//! Configuration schema definitions.
//!
//! This module defines the configuration structure for the bundled server.
//! All types derive Serde traits for deserialization from config files.

use std::path::PathBuf;
use std::time::Duration;

use axum::http::StatusCode;
use serde::{Deserialize, Serialize};

use crate::deferred::{Options, StatusResponder};
use crate::resilience::backoff::BackoffStrategy;

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Deferred handler settings.
    pub deferred: DeferredConfig,

    /// What the resolved handler serves.
    pub content: ContentConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Deferred handler configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DeferredConfig {
    /// Interval between failed construction attempts (constant backoff).
    pub retry_after_ms: u64,

    /// How long a request waits for the handler before getting a 503.
    pub timeout_after_ms: u64,

    /// Give up resolving after this many seconds (no deadline if unset).
    pub give_up_after_secs: Option<u64>,

    /// Status served after resolution has been given up.
    pub failed_status: u16,

    /// Body served after resolution has been given up.
    pub failed_message: String,

    /// Retry pacing.
    pub backoff: BackoffConfig,
}

impl Default for DeferredConfig {
    fn default() -> Self {
        Self {
            retry_after_ms: 10_000,
            timeout_after_ms: 15_000,
            give_up_after_secs: None,
            failed_status: 503,
            failed_message: crate::deferred::responses::FAILED_MESSAGE.to_string(),
            backoff: BackoffConfig::default(),
        }
    }
}

impl DeferredConfig {
    /// Build handler options from this configuration.
    ///
    /// Expects a validated config; an invalid `failed_status` falls back to 503.
    pub fn to_options(&self) -> Options {
        let status =
            StatusCode::from_u16(self.failed_status).unwrap_or(StatusCode::SERVICE_UNAVAILABLE);
        Options::new()
            .timeout_after(Duration::from_millis(self.timeout_after_ms))
            .backoff(self.backoff.strategy(Duration::from_millis(self.retry_after_ms)))
            .failed_handler(StatusResponder::new(status, self.failed_message.clone()))
    }

    pub fn give_up_after(&self) -> Option<Duration> {
        self.give_up_after_secs.map(Duration::from_secs)
    }
}

/// Backoff kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum BackoffKind {
    /// Wait `retry_after_ms` between attempts.
    #[default]
    Constant,
    /// Jittered exponential growth from `base_delay_ms`.
    Exponential,
}

/// Backoff configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BackoffConfig {
    pub kind: BackoffKind,

    /// Base delay for exponential backoff.
    pub base_delay_ms: u64,
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            kind: BackoffKind::Constant,
            base_delay_ms: 100,
        }
    }
}

impl BackoffConfig {
    pub fn strategy(&self, retry_after: Duration) -> BackoffStrategy {
        match self.kind {
            BackoffKind::Constant => BackoffStrategy::constant(retry_after),
            BackoffKind::Exponential => {
                BackoffStrategy::exponential(Duration::from_millis(self.base_delay_ms))
            }
        }
    }
}

/// Content served once the handler resolves.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ContentConfig {
    /// File whose contents are served; resolution retries until it exists.
    pub path: PathBuf,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("./site/index.html"),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_uses_defaults() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert_eq!(config.listener.bind_address, "0.0.0.0:8080");
        assert_eq!(config.deferred.retry_after_ms, 10_000);
        assert_eq!(config.deferred.timeout_after_ms, 15_000);
        assert_eq!(config.deferred.backoff.kind, BackoffKind::Constant);
        assert!(config.deferred.give_up_after().is_none());
    }

    #[test]
    fn to_options_maps_durations_and_backoff() {
        let config: AppConfig = toml::from_str(
            r#"
            [deferred]
            retry_after_ms = 250
            timeout_after_ms = 2000

            [deferred.backoff]
            kind = "exponential"
            base_delay_ms = 50
            "#,
        )
        .unwrap();

        let options = config.deferred.to_options();
        assert_eq!(options.timeout(), Duration::from_secs(2));
        assert_eq!(
            options.retry_strategy(),
            BackoffStrategy::exponential(Duration::from_millis(50))
        );
    }

    #[test]
    fn constant_backoff_uses_retry_after() {
        let config = DeferredConfig {
            retry_after_ms: 300,
            ..Default::default()
        };
        assert_eq!(
            config.to_options().retry_strategy(),
            BackoffStrategy::constant(Duration::from_millis(300))
        );
    }
}
