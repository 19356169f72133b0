//! The public façade.
//!
//! # Responsibilities
//! - Accept requests before the real handler exists
//! - Spawn the resolver that builds the real handler
//! - Park requests on the broadcast cell, bounded by `timeout_after`
//! - Delegate straight to the installed handler once resolution completes
//!
//! The façade only holds the reader half of the cell. The resolver task owns
//! the writer, so a resolver that dies without settling releases every waiter
//! with a 503 instead of leaving them parked.

use std::convert::Infallible;
use std::future::Future;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::{Duration, Instant};

use axum::{body::Body, http::Request, response::Response};
use futures_util::future::BoxFuture;
use tokio_util::sync::CancellationToken;
use tower::Service;
use tracing::Instrument;

use crate::deferred::{responses, Options, ResolutionState, Resolver};
use crate::error::{BoxError, BroadcastClosed};
use crate::handler::Handler;
use crate::observability::metrics;
use crate::sync::{BroadcastCell, HandlerSwitch, Installed, Subscription};

/// Request handler that queues callers until its backing handler is built.
///
/// Cloning is cheap; all clones share the same resolution.
#[derive(Clone)]
pub struct DeferredHandler {
    inner: Arc<Shared>,
}

struct Shared {
    switch: Arc<HandlerSwitch>,
    outcome: Subscription<Arc<Installed>>,
    timeout_after: Duration,
}

impl DeferredHandler {
    /// Create the handler and start resolving it in the background.
    ///
    /// `create` is called immediately and then again after every failure,
    /// paced by the configured backoff, until it succeeds or `cancel` fires.
    /// After cancellation every request is answered by the failed handler.
    ///
    /// Blocking constructors should wrap their work in
    /// `tokio::task::spawn_blocking`.
    ///
    /// # Panics
    /// Must be called from within a Tokio runtime.
    pub fn new<F, Fut, H, E>(cancel: CancellationToken, create: F, options: Options) -> Self
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = Result<H, E>> + Send + 'static,
        H: Handler,
        E: Into<BoxError> + Send + 'static,
    {
        let switch = Arc::new(HandlerSwitch::new());
        let cell = BroadcastCell::new();
        let outcome = cell.subscribe();
        let timeout_after = options.timeout();

        tracing::debug!(
            timeout_after = ?timeout_after,
            strategy = options.retry_strategy().kind(),
            "Deferred handler created"
        );

        let resolver = Resolver::new(create, options, Arc::clone(&switch), cell);
        tokio::spawn(
            async move {
                let state = resolver.run(cancel).await;
                tracing::info!(state = %state, "Resolution finished");
            }
            .instrument(tracing::info_span!("resolve_handler")),
        );

        Self::from_parts(switch, outcome, timeout_after)
    }

    fn from_parts(
        switch: Arc<HandlerSwitch>,
        outcome: Subscription<Arc<Installed>>,
        timeout_after: Duration,
    ) -> Self {
        Self {
            inner: Arc::new(Shared {
                switch,
                outcome,
                timeout_after,
            }),
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> ResolutionState {
        self.inner
            .switch
            .load()
            .map_or(ResolutionState::Attempting, |installed| installed.state())
    }

    /// Wait, without a timeout, until resolution reaches a terminal state.
    ///
    /// Fails if the resolver stopped without an outcome, e.g. because the
    /// constructor panicked.
    pub async fn resolved(&self) -> Result<ResolutionState, BroadcastClosed> {
        if let Some(installed) = self.inner.switch.load() {
            return Ok(installed.state());
        }
        let installed = self.inner.outcome.clone().recv().await?;
        Ok(installed.state())
    }

    /// Serve one request.
    pub async fn serve(&self, request: Request<Body>) -> Response {
        let request = match self.inner.switch.serve(request) {
            Ok(response) => {
                metrics::record_request("direct");
                return response.await;
            }
            Err(request) => request,
        };

        let started = Instant::now();
        let subscription = self.inner.outcome.clone();
        match tokio::time::timeout(self.inner.timeout_after, subscription.recv()).await {
            Ok(Ok(installed)) => {
                metrics::record_request("waited");
                metrics::record_wait(started.elapsed());
                tracing::debug!(
                    waited = ?started.elapsed(),
                    state = %installed.state(),
                    "Request released"
                );
                installed.serve(request).await
            }
            Ok(Err(closed)) => {
                metrics::record_request("closed");
                tracing::error!(error = %closed, "Resolver stopped without an outcome");
                responses::closed()
            }
            Err(_elapsed) => {
                metrics::record_request("timed_out");
                tracing::warn!(
                    timeout = ?self.inner.timeout_after,
                    path = %request.uri().path(),
                    "Timed out waiting for handler"
                );
                responses::timed_out()
            }
        }
    }
}

impl std::fmt::Debug for DeferredHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeferredHandler")
            .field("state", &self.state())
            .field("timeout_after", &self.inner.timeout_after)
            .finish()
    }
}

impl Service<Request<Body>> for DeferredHandler {
    type Response = Response;
    type Error = Infallible;
    type Future = BoxFuture<'static, Result<Response, Infallible>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, request: Request<Body>) -> Self::Future {
        let handler = self.clone();
        Box::pin(async move { Ok(handler.serve(request).await) })
    }
}
