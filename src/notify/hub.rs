use std::collections::HashMap;
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use bytes::Bytes;
use serde::Serialize;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use super::event::{EventKind, encode_event};
use crate::error::AppResult;

pub const DEFAULT_EVENT_CAPACITY: NonZeroUsize = match NonZeroUsize::new(256) {
    Some(value) => value,
    None => NonZeroUsize::MIN,
};

/// What happened to a published event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    Queued,
    Dropped,
}

/// A registered observer. Dropping the receiver unregisters it on the next
/// fan-out.
#[derive(Debug)]
pub struct Subscription {
    pub id: u64,
    pub events: mpsc::Receiver<Bytes>,
}

#[derive(Debug)]
pub(super) struct Registry {
    subscribers: RwLock<HashMap<u64, mpsc::Sender<Bytes>>>,
    next_id: AtomicU64,
    subscriber_capacity: usize,
}

impl Registry {
    fn snapshot(&self) -> Vec<(u64, mpsc::Sender<Bytes>)> {
        self.subscribers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(id, sender)| (*id, sender.clone()))
            .collect()
    }

    fn remove(&self, id: u64) -> bool {
        self.subscribers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&id)
            .is_some()
    }
}

/// Handle for publishing events and managing subscribers. Clones share the
/// same queue and registry.
#[derive(Debug, Clone)]
pub struct Notifier {
    queue_tx: mpsc::Sender<Bytes>,
    registry: Arc<Registry>,
}

impl Notifier {
    /// Creates a notifier and starts its fan-out task on the current tokio
    /// runtime. The task ends once every clone of the notifier is dropped.
    #[must_use]
    pub fn spawn(capacity: NonZeroUsize) -> (Self, JoinHandle<()>) {
        let (notifier, queue_rx) = Self::channel(capacity);
        let registry = Arc::clone(&notifier.registry);
        let handle = tokio::spawn(fan_out(queue_rx, registry));
        (notifier, handle)
    }

    pub(crate) fn channel(capacity: NonZeroUsize) -> (Self, mpsc::Receiver<Bytes>) {
        let (queue_tx, queue_rx) = mpsc::channel(capacity.get());
        let registry = Arc::new(Registry {
            subscribers: RwLock::new(HashMap::new()),
            next_id: AtomicU64::new(1),
            subscriber_capacity: capacity.get(),
        });
        (Self { queue_tx, registry }, queue_rx)
    }

    /// Queues `data` as a `kind` event without waiting.
    ///
    /// # Errors
    ///
    /// Returns an error only when the event cannot be serialized. A full or
    /// stopped queue is reported as `Delivery::Dropped`.
    pub fn publish<T>(&self, kind: EventKind, data: &T) -> AppResult<Delivery>
    where
        T: Serialize,
    {
        let payload = encode_event(kind, data)?;
        match self.queue_tx.try_send(payload) {
            Ok(()) => Ok(Delivery::Queued),
            Err(TrySendError::Full(_)) => {
                warn!("Event queue full, dropping '{}' event", kind.as_str());
                Ok(Delivery::Dropped)
            }
            Err(TrySendError::Closed(_)) => {
                warn!(
                    "Event fan-out stopped, dropping '{}' event",
                    kind.as_str()
                );
                Ok(Delivery::Dropped)
            }
        }
    }

    #[must_use]
    pub fn subscribe(&self) -> Subscription {
        let id = self.registry.next_id.fetch_add(1, Ordering::Relaxed);
        let (sender, events) = mpsc::channel(self.registry.subscriber_capacity);
        self.registry
            .subscribers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, sender);
        debug!("Subscriber {} registered", id);
        Subscription { id, events }
    }

    /// Returns `false` when `id` was not registered.
    pub fn unsubscribe(&self, id: u64) -> bool {
        let removed = self.registry.remove(id);
        if removed {
            debug!("Subscriber {} unregistered", id);
        }
        removed
    }

    #[cfg(test)]
    pub(super) fn registry(&self) -> &Registry {
        &self.registry
    }

    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.registry
            .subscribers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

async fn fan_out(mut queue_rx: mpsc::Receiver<Bytes>, registry: Arc<Registry>) {
    while let Some(event) = queue_rx.recv().await {
        deliver(&registry, &event);
    }
    debug!("Event fan-out finished");
}

pub(super) fn deliver(registry: &Registry, event: &Bytes) {
    for (id, sender) in registry.snapshot() {
        match sender.try_send(event.clone()) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => {
                warn!("Subscriber {} is lagging, skipping event", id);
            }
            Err(TrySendError::Closed(_)) => {
                if registry.remove(id) {
                    warn!("Subscriber {} disconnected, removing", id);
                }
            }
        }
    }
}
