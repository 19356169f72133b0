//! Type-erased request handlers.
//!
//! Anything that behaves like an infallible, cloneable tower service over
//! `Request<Body>` is a [`Handler`]: an `axum::Router`, a
//! `tower::service_fn`, or a [`DeferredHandler`](crate::DeferredHandler)
//! itself. Handlers are shared behind an `Arc` so the constructed handler can
//! be handed to every waiting request at once.

use std::convert::Infallible;
use std::sync::Arc;

use axum::{body::Body, http::Request, response::Response};
use futures_util::future::BoxFuture;
use tower::{Service, ServiceExt};

/// A request handler that can be shared across tasks.
pub trait Handler: Send + Sync + 'static {
    /// Handle one request. The returned future does not borrow `self`.
    fn handle(&self, request: Request<Body>) -> BoxFuture<'static, Response>;
}

/// Shared, type-erased handler.
pub type SharedHandler = Arc<dyn Handler>;

impl<S> Handler for S
where
    S: Service<Request<Body>, Response = Response, Error = Infallible>
        + Clone
        + Send
        + Sync
        + 'static,
    S::Future: Send + 'static,
{
    fn handle(&self, request: Request<Body>) -> BoxFuture<'static, Response> {
        // Each call drives its own clone, so `poll_ready` state is never shared.
        let service = self.clone();
        Box::pin(async move {
            match service.oneshot(request).await {
                Ok(response) => response,
                Err(never) => match never {},
            }
        })
    }
}

/// Erase a handler into a [`SharedHandler`].
pub fn shared<H: Handler>(handler: H) -> SharedHandler {
    Arc::new(handler)
}
