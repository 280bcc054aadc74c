//! Fan-out change notification for stores
//!
//! Each subscriber owns an mpsc receiver. Publishing never blocks; senders
//! whose receiver has been dropped are pruned on the next publish.

use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Mutex;

use tracing::debug;

use crate::models::ExpenseId;

/// A mutation observed by the store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreEvent {
    /// An expense was inserted
    Inserted {
        id: ExpenseId,
        occurred_at: i64,
        revision: u64,
    },
}

impl StoreEvent {
    /// Store revision after this mutation
    pub fn revision(&self) -> u64 {
        match self {
            Self::Inserted { revision, .. } => *revision,
        }
    }

    /// Timestamp of the affected expense
    pub fn occurred_at(&self) -> i64 {
        match self {
            Self::Inserted { occurred_at, .. } => *occurred_at,
        }
    }
}

/// Registry of live subscribers
#[derive(Debug, Default)]
pub struct ChangeNotifier {
    subscribers: Mutex<Vec<Sender<StoreEvent>>>,
}

impl ChangeNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a new subscription
    pub fn subscribe(&self) -> Receiver<StoreEvent> {
        let (sender, receiver) = mpsc::channel();
        self.lock().push(sender);
        receiver
    }

    /// Deliver an event to every live subscriber
    pub fn publish(&self, event: StoreEvent) {
        let mut subscribers = self.lock();
        let before = subscribers.len();
        subscribers.retain(|sender| sender.send(event).is_ok());
        let pruned = before - subscribers.len();
        if pruned > 0 {
            debug!(pruned, "dropped closed subscriptions");
        }
    }

    /// Number of subscribers still registered
    pub fn subscriber_count(&self) -> usize {
        self.lock().len()
    }

    // A panic while holding the lock cannot leave the Vec half-updated.
    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Sender<StoreEvent>>> {
        self.subscribers
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inserted(id: i64, revision: u64) -> StoreEvent {
        StoreEvent::Inserted {
            id: ExpenseId::new(id),
            occurred_at: 0,
            revision,
        }
    }

    #[test]
    fn test_publish_reaches_every_subscriber() {
        let notifier = ChangeNotifier::new();
        let a = notifier.subscribe();
        let b = notifier.subscribe();

        notifier.publish(inserted(1, 1));

        assert_eq!(a.try_recv().unwrap(), inserted(1, 1));
        assert_eq!(b.try_recv().unwrap(), inserted(1, 1));
    }

    #[test]
    fn test_events_arrive_in_publish_order() {
        let notifier = ChangeNotifier::new();
        let rx = notifier.subscribe();

        notifier.publish(inserted(1, 1));
        notifier.publish(inserted(2, 2));

        assert_eq!(rx.try_recv().unwrap().revision(), 1);
        assert_eq!(rx.try_recv().unwrap().revision(), 2);
    }

    #[test]
    fn test_dropped_subscribers_are_pruned() {
        let notifier = ChangeNotifier::new();
        let kept = notifier.subscribe();
        drop(notifier.subscribe());
        assert_eq!(notifier.subscriber_count(), 2);

        notifier.publish(inserted(1, 1));

        assert_eq!(notifier.subscriber_count(), 1);
        assert!(kept.try_recv().is_ok());
    }
}
