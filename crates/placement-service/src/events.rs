//! In-process broadcast of domain events.

use tokio::sync::broadcast;
use tracing::trace;

use placement_core::events::DomainEvent;

/// Fan-out bus for [`DomainEvent`]s.
///
/// Slow subscribers lag and lose the oldest events; publishing never
/// blocks and succeeds even when nobody listens.
#[derive(Debug)]
pub struct EventBus {
    /// Shared sender; receivers are created on demand.
    tx: broadcast::Sender<DomainEvent>,
}

impl EventBus {
    /// Create a bus buffering up to `buffer_size` events per subscriber.
    pub fn new(buffer_size: usize) -> Self {
        let (tx, _) = broadcast::channel(buffer_size.max(1));
        Self { tx }
    }

    /// Publish an event, returning how many subscribers received it.
    pub fn publish(&self, event: DomainEvent) -> usize {
        let delivered = self.tx.send(event).unwrap_or(0);
        trace!(delivered, "Domain event published");
        delivered
    }

    /// Subscribe to events published from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<DomainEvent> {
        self.tx.subscribe()
    }

    /// Number of live subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(256)
    }
}
