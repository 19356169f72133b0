//! The handler the demo server resolves to.
//!
//! Construction reads the configured content file; until the file exists (or
//! while it is empty) construction fails and the deferred handler retries.

use std::io;
use std::path::{Path, PathBuf};

use axum::{routing::get, Router};
use thiserror::Error;

/// Reasons the content handler cannot be built yet.
#[derive(Debug, Error)]
pub enum ContentError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{path} is empty")]
    Empty { path: PathBuf },
}

/// Build a router serving the file at `path` on every route except `/healthz`.
pub async fn build_router(path: &Path) -> Result<Router, ContentError> {
    let body = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| ContentError::Read {
            path: path.to_path_buf(),
            source,
        })?;
    if body.trim().is_empty() {
        return Err(ContentError::Empty {
            path: path.to_path_buf(),
        });
    }

    tracing::info!(path = %path.display(), bytes = body.len(), "Content loaded");

    let page = move || {
        let body = body.clone();
        async move { body }
    };
    Ok(Router::new()
        .route("/healthz", get(|| async { "ok" }))
        .route("/", get(page.clone()))
        .fallback(page))
}
