//! # Resolver: the retrying construction loop.
//!
//! Drives the user-supplied constructor until it yields a handler or the
//! cancellation token fires.
//!
//! ```text
//! loop {
//!   ├─► cancelled?             ─► install + publish failed handler, exit
//!   ├─► attempt += 1
//!   ├─► create().await
//!   │       ├─ Ok  ──► install + publish handler, exit
//!   │       └─ Err ──► notify(AttemptError)
//!   │                  ├─ delay = backoff.next_delay()
//!   │                  └─ sleep(delay) raced against cancellation
//!   └─ repeat
//! }
//! ```
//!
//! ## Rules
//! - The first attempt runs immediately
//! - Attempts run **sequentially** (one constructor call outstanding at most)
//! - Every failed attempt produces exactly one `notify` call
//! - Cancellation aborts a pending backoff sleep at once; an attempt already
//!   running is allowed to finish, and its success wins
//! - The outcome is installed into the switch **before** it is published
//! - The resolver owns the only writer of the cell; if it is dropped without
//!   settling (panicking constructor, aborted task) waiters see the cell close

use std::future::Future;
use std::sync::Arc;

use tokio::{select, time};
use tokio_util::sync::CancellationToken;

use crate::deferred::{Options, ResolutionState};
use crate::error::{AttemptError, BoxError};
use crate::handler::{shared, Handler, SharedHandler};
use crate::observability::metrics;
use crate::sync::{BroadcastCell, HandlerSwitch, Installed};

/// Background driver that turns a fallible constructor into an installed handler.
pub struct Resolver<F> {
    create: F,
    options: Options,
    switch: Arc<HandlerSwitch>,
    cell: BroadcastCell<Arc<Installed>>,
}

impl<F, Fut, H, E> Resolver<F>
where
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = Result<H, E>> + Send + 'static,
    H: Handler,
    E: Into<BoxError> + Send + 'static,
{
    pub fn new(
        create: F,
        options: Options,
        switch: Arc<HandlerSwitch>,
        cell: BroadcastCell<Arc<Installed>>,
    ) -> Self {
        Self {
            create,
            options,
            switch,
            cell,
        }
    }

    /// Run until the handler is created or `cancel` fires.
    ///
    /// Returns the terminal state: [`ResolutionState::Resolved`] or
    /// [`ResolutionState::PermanentlyFailed`].
    pub async fn run(mut self, cancel: CancellationToken) -> ResolutionState {
        let mut backoff = self.options.retry_strategy();
        let mut attempt: u32 = 0;

        metrics::record_state(ResolutionState::Attempting);
        tracing::debug!(strategy = backoff.kind(), "Resolver starting");

        loop {
            if cancel.is_cancelled() {
                return self.give_up(attempt);
            }

            attempt = attempt.saturating_add(1);
            tracing::debug!(attempt, "Creating handler");

            match (self.create)().await {
                Ok(handler) => {
                    metrics::record_attempt("success");
                    tracing::info!(attempt, "Handler created");
                    return self.settle(shared(handler), ResolutionState::Resolved);
                }
                Err(err) => {
                    metrics::record_attempt("error");
                    let err = AttemptError::new(attempt, err);
                    let delay = backoff.next_delay();
                    tracing::warn!(
                        attempt,
                        error = %err.source,
                        retry_in = ?delay,
                        "Handler creation failed"
                    );
                    (self.options.notify)(err);

                    let sleep = time::sleep(delay);
                    tokio::pin!(sleep);
                    select! {
                        biased;
                        _ = cancel.cancelled() => return self.give_up(attempt),
                        _ = &mut sleep => {}
                    }
                }
            }
        }
    }

    fn give_up(&self, attempts: u32) -> ResolutionState {
        tracing::warn!(attempts, "Resolution cancelled, serving failed handler");
        self.settle(
            Arc::clone(&self.options.failed_handler),
            ResolutionState::PermanentlyFailed,
        )
    }

    fn settle(&self, handler: SharedHandler, state: ResolutionState) -> ResolutionState {
        let installed = Arc::new(Installed::new(handler, state));
        if let Err(err) = self.switch.install(Arc::clone(&installed)) {
            // Only the resolver writes the switch; keep serving what is there.
            tracing::error!(error = %err, state = %state, "Handler switch already populated");
            return state;
        }
        self.cell.publish(installed);
        metrics::record_state(state);
        state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deferred::StatusResponder;
    use axum::http::StatusCode;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    fn parts() -> (Arc<HandlerSwitch>, BroadcastCell<Arc<Installed>>) {
        (Arc::new(HandlerSwitch::new()), BroadcastCell::new())
    }

    fn ok_handler() -> StatusResponder {
        StatusResponder::new(StatusCode::OK, "ok")
    }

    #[tokio::test]
    async fn first_success_resolves_immediately() {
        let (switch, cell) = parts();
        let published = cell.subscribe();
        let calls = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&calls);
        let resolver = Resolver::new(
            move || {
                counter.fetch_add(1, Ordering::SeqCst);
                async { Ok::<_, BoxError>(ok_handler()) }
            },
            Options::new().retry_after(Duration::from_secs(60)),
            Arc::clone(&switch),
            cell,
        );

        let state = resolver.run(CancellationToken::new()).await;
        assert_eq!(state, ResolutionState::Resolved);
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        let installed = switch.load().unwrap();
        assert_eq!(installed.state(), ResolutionState::Resolved);
        assert!(Arc::ptr_eq(&installed, &published.get().unwrap()));
    }

    #[tokio::test]
    async fn notifies_once_per_failure() {
        let (switch, cell) = parts();
        let errors = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&errors);
        let mut remaining_failures = 3u32;

        let resolver = Resolver::new(
            move || {
                let result = if remaining_failures > 0 {
                    remaining_failures -= 1;
                    Err(format!("{} failures left", remaining_failures))
                } else {
                    Ok(ok_handler())
                };
                async move { result }
            },
            Options::new()
                .retry_after(Duration::from_millis(5))
                .notify(move |err| sink.lock().unwrap().push(err.attempt)),
            Arc::clone(&switch),
            cell,
        );

        assert_eq!(
            resolver.run(CancellationToken::new()).await,
            ResolutionState::Resolved
        );
        assert_eq!(*errors.lock().unwrap(), vec![1, 2, 3]);
        assert!(switch.is_installed());
    }

    #[tokio::test]
    async fn cancellation_interrupts_backoff_wait() {
        let (switch, cell) = parts();
        let published = cell.subscribe();
        let notified = Arc::new(AtomicU32::new(0));
        let sink = Arc::clone(&notified);
        let cancel = CancellationToken::new();

        let resolver = Resolver::new(
            || async { Err::<StatusResponder, _>("never") },
            Options::new()
                .retry_after(Duration::from_secs(3600))
                .notify(move |_| {
                    sink.fetch_add(1, Ordering::SeqCst);
                }),
            Arc::clone(&switch),
            cell,
        );
        let task = tokio::spawn(resolver.run(cancel.clone()));

        tokio::time::sleep(Duration::from_millis(50)).await;
        cancel.cancel();

        let state = time::timeout(Duration::from_secs(5), task)
            .await
            .expect("resolver did not observe cancellation")
            .unwrap();
        assert_eq!(state, ResolutionState::PermanentlyFailed);
        assert_eq!(notified.load(Ordering::SeqCst), 1);
        assert_eq!(
            published.get().unwrap().state(),
            ResolutionState::PermanentlyFailed
        );
        assert_eq!(
            switch.load().unwrap().state(),
            ResolutionState::PermanentlyFailed
        );
    }

    #[tokio::test]
    async fn cancelled_before_start_never_attempts() {
        let (switch, cell) = parts();
        let calls = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&calls);
        let cancel = CancellationToken::new();
        cancel.cancel();

        let resolver = Resolver::new(
            move || {
                counter.fetch_add(1, Ordering::SeqCst);
                async { Ok::<_, BoxError>(ok_handler()) }
            },
            Options::new(),
            switch,
            cell,
        );

        assert_eq!(resolver.run(cancel).await, ResolutionState::PermanentlyFailed);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn dropped_resolver_closes_the_cell() {
        let (switch, cell) = parts();
        let waiting = cell.subscribe();
        let resolver = Resolver::new(
            || async { Err::<StatusResponder, _>("never") },
            Options::new().retry_after(Duration::from_secs(3600)),
            Arc::clone(&switch),
            cell,
        );
        let task = tokio::spawn(resolver.run(CancellationToken::new()));

        tokio::time::sleep(Duration::from_millis(50)).await;
        task.abort();

        let outcome = time::timeout(Duration::from_secs(5), waiting.recv())
            .await
            .expect("waiter was not released");
        assert_eq!(outcome.unwrap_err(), crate::error::BroadcastClosed);
        assert!(!switch.is_installed());
    }
}
