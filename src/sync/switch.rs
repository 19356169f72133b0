//! The live handler slot.
//!
//! [`HandlerSwitch`] starts empty, which sends requests down the waiting path.
//! The resolver installs the outcome exactly once; from then on every reader
//! loads the same `Arc<Installed>` without taking a lock.

use std::fmt;
use std::sync::Arc;

use arc_swap::ArcSwapOption;
use axum::{body::Body, http::Request, response::Response};
use futures_util::future::BoxFuture;

use crate::deferred::ResolutionState;
use crate::error::SwitchError;
use crate::handler::{Handler, SharedHandler};

/// Outcome of a resolution: the handler to serve with and how it was obtained.
pub struct Installed {
    handler: SharedHandler,
    state: ResolutionState,
}

impl Installed {
    pub fn new(handler: SharedHandler, state: ResolutionState) -> Self {
        Self { handler, state }
    }

    pub fn state(&self) -> ResolutionState {
        self.state
    }

    /// Delegate a request to the installed handler.
    pub fn serve(&self, request: Request<Body>) -> BoxFuture<'static, Response> {
        self.handler.handle(request)
    }
}

impl fmt::Debug for Installed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Installed")
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

/// Write-once, lock-free readable handler slot.
#[derive(Default)]
pub struct HandlerSwitch {
    current: ArcSwapOption<Installed>,
}

impl HandlerSwitch {
    pub fn new() -> Self {
        Self::default()
    }

    /// The installed outcome, if any.
    pub fn load(&self) -> Option<Arc<Installed>> {
        self.current.load_full()
    }

    pub fn is_installed(&self) -> bool {
        self.current.load().is_some()
    }

    /// Serve through the installed handler, or hand the request back if the
    /// switch is still empty.
    pub fn serve(
        &self,
        request: Request<Body>,
    ) -> Result<BoxFuture<'static, Response>, Request<Body>> {
        let current = self.current.load();
        match &*current {
            Some(installed) => Ok(installed.serve(request)),
            None => Err(request),
        }
    }

    /// Install the outcome. Only the first install succeeds.
    pub fn install(&self, installed: Arc<Installed>) -> Result<(), SwitchError> {
        let empty: Option<Arc<Installed>> = None;
        let previous = self.current.compare_and_swap(&empty, Some(installed));
        if previous.is_some() {
            return Err(SwitchError::AlreadyInstalled);
        }
        Ok(())
    }
}

impl fmt::Debug for HandlerSwitch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerSwitch")
            .field("current", &self.load())
            .finish()
    }
}
