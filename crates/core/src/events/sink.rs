//! Domain event sinks.

use std::sync::{Arc, Mutex};

use tokio::sync::broadcast;

use super::DomainEvent;

/// Receiver of domain events.
///
/// `emit()` must not block: it runs on the request path right after a write.
/// A failed emit never fails the mutation that produced the event.
pub trait DomainEventSink: Send + Sync {
    fn emit(&self, event: DomainEvent);

    fn emit_batch(&self, events: Vec<DomainEvent>) {
        for event in events {
            self.emit(event);
        }
    }
}

/// Discards every event.
#[derive(Clone, Default)]
pub struct NoOpDomainEventSink;

impl DomainEventSink for NoOpDomainEventSink {
    fn emit(&self, _event: DomainEvent) {}
}

/// Fans events out to any number of subscribers.
///
/// Slow subscribers lag and lose the oldest events; nothing is buffered
/// when no one is listening.
#[derive(Clone)]
pub struct BroadcastEventSink {
    sender: broadcast::Sender<DomainEvent>,
}

impl BroadcastEventSink {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<DomainEvent> {
        self.sender.subscribe()
    }
}

impl DomainEventSink for BroadcastEventSink {
    fn emit(&self, event: DomainEvent) {
        // Err only means there are no receivers right now
        let _ = self.sender.send(event);
    }
}

/// Collects events in memory; used by tests.
#[derive(Clone, Default)]
pub struct MockDomainEventSink {
    events: Arc<Mutex<Vec<DomainEvent>>>,
}

impl MockDomainEventSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<DomainEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn clear(&self) {
        self.events.lock().unwrap().clear();
    }

    pub fn len(&self) -> usize {
        self.events.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.lock().unwrap().is_empty()
    }
}

impl DomainEventSink for MockDomainEventSink {
    fn emit(&self, event: DomainEvent) {
        self.events.lock().unwrap().push(event);
    }
}
