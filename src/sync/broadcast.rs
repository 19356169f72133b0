//! Single-assignment, multi-reader broadcast.
//!
//! [`BroadcastCell`] is the writer half: it is written exactly once and owned
//! by a single producer. [`Subscription`] is the reader half; clones are cheap
//! and any number of them may wait. Readers that wait before the write suspend
//! until it happens; readers that wait afterwards get the value immediately.
//!
//! Built on a `tokio::sync::watch` channel holding `Option<T>`: the write flips
//! the slot from `None` to `Some` and wakes every parked receiver. Dropping the
//! cell without publishing closes the channel, which releases every waiter
//! with [`BroadcastClosed`]. A value published before the drop stays readable.

use tokio::sync::watch;

use crate::error::BroadcastClosed;

/// Writer half of a write-once value observed by any number of subscribers.
#[derive(Debug)]
pub struct BroadcastCell<T> {
    tx: watch::Sender<Option<T>>,
}

impl<T> Default for BroadcastCell<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> BroadcastCell<T> {
    /// Create an empty cell.
    pub fn new() -> Self {
        let (tx, _) = watch::channel(None);
        Self { tx }
    }

    /// Store the value and wake every subscriber.
    ///
    /// # Panics
    /// Panics if a value has already been published. There is exactly one
    /// writer per cell; a second publish is a caller bug.
    pub fn publish(&self, value: T) {
        let mut accepted = false;
        self.tx.send_if_modified(|slot| {
            if slot.is_none() {
                *slot = Some(value);
                accepted = true;
            }
            accepted
        });
        assert!(accepted, "BroadcastCell::publish called more than once");
    }

    /// Whether a value has been published.
    pub fn is_published(&self) -> bool {
        self.tx.borrow().is_some()
    }

    /// Subscribe to the published value.
    pub fn subscribe(&self) -> Subscription<T> {
        Subscription {
            rx: self.tx.subscribe(),
        }
    }
}

/// Reader half of a [`BroadcastCell`].
///
/// Holding a subscription does not keep the writer alive.
#[derive(Debug, Clone)]
pub struct Subscription<T> {
    rx: watch::Receiver<Option<T>>,
}

impl<T: Clone> Subscription<T> {
    /// Current value, without waiting.
    pub fn get(&self) -> Option<T> {
        self.rx.borrow().clone()
    }

    /// Wait for the published value.
    ///
    /// Returns immediately if the cell was already published. Fails only if the
    /// cell is dropped without ever being published.
    pub async fn recv(mut self) -> Result<T, BroadcastClosed> {
        let slot = self
            .rx
            .wait_for(Option::is_some)
            .await
            .map_err(|_| BroadcastClosed)?;
        slot.clone().ok_or(BroadcastClosed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    #[tokio::test]
    async fn late_subscriber_gets_value_immediately() {
        let cell = BroadcastCell::new();
        cell.publish(7u32);

        assert!(cell.is_published());
        assert_eq!(cell.subscribe().get(), Some(7));
        assert_eq!(cell.subscribe().recv().await, Ok(7));
        assert_eq!(cell.subscribe().recv().await, Ok(7));
    }

    #[tokio::test]
    async fn early_subscribers_wait_for_publish() {
        let cell = BroadcastCell::new();

        let waiters: Vec<_> = (0..16)
            .map(|_| {
                let subscription = cell.subscribe();
                tokio::spawn(subscription.recv())
            })
            .collect();

        tokio::time::sleep(Duration::from_millis(20)).await;
        for waiter in &waiters {
            assert!(!waiter.is_finished());
        }

        cell.publish(String::from("ready"));

        for waiter in waiters {
            assert_eq!(waiter.await.unwrap(), Ok(String::from("ready")));
        }
    }

    #[tokio::test]
    async fn every_subscriber_sees_the_same_instance() {
        let cell = BroadcastCell::new();
        let early = cell.subscribe();
        let value = Arc::new(42u64);
        cell.publish(Arc::clone(&value));
        let late = cell.subscribe();

        let early = early.recv().await.unwrap();
        let late = late.recv().await.unwrap();
        assert!(Arc::ptr_eq(&early, &value));
        assert!(Arc::ptr_eq(&late, &value));
    }

    #[tokio::test]
    async fn dropped_cell_closes_pending_subscribers() {
        let cell: BroadcastCell<u8> = BroadcastCell::new();
        let subscription = cell.subscribe();
        let parked = tokio::spawn(subscription.clone().recv());

        tokio::time::sleep(Duration::from_millis(20)).await;
        drop(cell);

        assert_eq!(parked.await.unwrap(), Err(BroadcastClosed));
        assert_eq!(subscription.recv().await, Err(BroadcastClosed));
    }

    #[tokio::test]
    async fn value_outlives_the_writer() {
        let cell = BroadcastCell::new();
        let subscription = cell.subscribe();
        cell.publish("done");
        drop(cell);

        assert_eq!(subscription.get(), Some("done"));
        assert_eq!(subscription.clone().recv().await, Ok("done"));
    }

    #[test]
    fn empty_cell_has_no_value() {
        let cell: BroadcastCell<u8> = BroadcastCell::default();
        assert!(!cell.is_published());
        assert_eq!(cell.subscribe().get(), None);
    }

    #[test]
    #[should_panic(expected = "more than once")]
    fn double_publish_panics() {
        let cell = BroadcastCell::new();
        cell.publish(1u8);
        cell.publish(2u8);
    }
}
