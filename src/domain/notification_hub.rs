//! Registry of live subscribers and best-effort fan-out of scan events.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{PoisonError, RwLock};

use tokio::sync::mpsc::{self, error::TrySendError};

use crate::domain::scan_event::ScanEvent;

/// Identifier of one live subscription.
pub type SubscriberId = u64;

/// Outcome of a single [`NotificationHub::broadcast`] call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BroadcastReport {
    /// Subscribers that accepted the event.
    pub delivered: usize,
    /// Subscribers whose buffer was full; the event was skipped for them.
    pub dropped: usize,
    /// Subscribers found closed and removed from the registry.
    pub pruned: usize,
}

/// Receiving end handed to a connection.
///
/// Dropping it is enough to release the slot: the next broadcast notices the
/// closed channel and prunes the entry.
#[derive(Debug)]
pub struct Subscription {
    id: SubscriberId,
    receiver: mpsc::Receiver<ScanEvent>,
}

impl Subscription {
    pub fn id(&self) -> SubscriberId {
        self.id
    }

    /// Waits for the next event. Returns `None` once the subscription was removed.
    pub async fn recv(&mut self) -> Option<ScanEvent> {
        self.receiver.recv().await
    }
}

/// Fan-out point for scan events.
///
/// Each subscriber owns a bounded buffer. [`Self::broadcast`] never waits: a
/// full buffer only costs that subscriber the event, a closed one is pruned.
/// The registry lock is held only for map operations, never across I/O.
#[derive(Debug)]
pub struct NotificationHub {
    subscribers: RwLock<HashMap<SubscriberId, mpsc::Sender<ScanEvent>>>,
    next_id: AtomicU64,
    buffer: usize,
}

impl NotificationHub {
    /// Creates a hub whose subscribers buffer up to `buffer` pending events each.
    pub fn new(buffer: usize) -> Self {
        Self {
            subscribers: RwLock::new(HashMap::new()),
            next_id: AtomicU64::new(1),
            buffer: buffer.max(1),
        }
    }

    /// Registers a new live connection.
    pub fn subscribe(&self) -> Subscription {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (sender, receiver) = mpsc::channel(self.buffer);

        self.subscribers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, sender);

        tracing::debug!(subscriber_id = id, "Subscriber connected");

        Subscription { id, receiver }
    }

    /// Removes a subscription. Returns `false` if it was already gone.
    pub fn unsubscribe(&self, id: SubscriberId) -> bool {
        let removed = self
            .subscribers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&id)
            .is_some();

        if removed {
            tracing::debug!(subscriber_id = id, "Subscriber disconnected");
        }

        removed
    }

    /// Offers `event` to every current subscriber without waiting.
    pub fn broadcast(&self, event: &ScanEvent) -> BroadcastReport {
        let mut report = BroadcastReport::default();
        let mut closed = Vec::new();

        {
            let subscribers = self
                .subscribers
                .read()
                .unwrap_or_else(PoisonError::into_inner);

            for (id, sender) in subscribers.iter() {
                match sender.try_send(*event) {
                    Ok(()) => report.delivered += 1,
                    Err(TrySendError::Full(_)) => report.dropped += 1,
                    Err(TrySendError::Closed(_)) => closed.push(*id),
                }
            }
        }

        if !closed.is_empty() {
            let mut subscribers = self
                .subscribers
                .write()
                .unwrap_or_else(PoisonError::into_inner);

            for id in &closed {
                if subscribers.remove(id).is_some() {
                    report.pruned += 1;
                }
            }
        }

        if report.dropped > 0 {
            metrics::counter!("scan_notifications_dropped_total").increment(report.dropped as u64);
        }

        report
    }

    /// Number of registered subscribers, including closed ones not yet pruned.
    pub fn subscriber_count(&self) -> usize {
        self.subscribers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}
