//! Canned responses served while no real handler is available.

use std::convert::Infallible;
use std::future::{ready, Ready};
use std::task::{Context, Poll};

use axum::{
    body::Body,
    http::{Request, StatusCode},
    response::{IntoResponse, Response},
};
use tower::Service;

/// Body of the response sent when a request gives up waiting.
pub const TIMEOUT_MESSAGE: &str = "timed out waiting for handler to be created and sent";

/// Body of the default permanent-failure response.
pub const FAILED_MESSAGE: &str = "permanent error creating handler";

/// Body of the response sent when resolution stopped without an outcome.
pub const CLOSED_MESSAGE: &str = "handler resolution stopped before a handler was created";

/// Handler that answers every request with a fixed status and plain-text body.
#[derive(Debug, Clone)]
pub struct StatusResponder {
    status: StatusCode,
    message: String,
}

impl StatusResponder {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    /// The default permanent-failure responder (503).
    pub fn failed() -> Self {
        Self::new(StatusCode::SERVICE_UNAVAILABLE, FAILED_MESSAGE)
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn response(&self) -> Response {
        (self.status, self.message.clone()).into_response()
    }
}

impl Service<Request<Body>> for StatusResponder {
    type Response = Response;
    type Error = Infallible;
    type Future = Ready<Result<Response, Infallible>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, _request: Request<Body>) -> Self::Future {
        ready(Ok(self.response()))
    }
}

/// 503 sent when a request times out waiting for resolution.
pub fn timed_out() -> Response {
    (StatusCode::SERVICE_UNAVAILABLE, TIMEOUT_MESSAGE).into_response()
}

/// 503 sent when the resolver disappeared without an outcome.
pub fn closed() -> Response {
    (StatusCode::SERVICE_UNAVAILABLE, CLOSED_MESSAGE).into_response()
}
