use crate::events::{EventRecord, RegistryEvent};
use parking_lot::RwLock;
use std::sync::Arc;

/// Receives every committed event, in log order.
///
/// Observers are invoked synchronously while the registry's write lock is
/// held, so they must not call back into the registry.
pub trait RegistryObserver: Send + Sync {
    fn on_event(&self, record: &EventRecord);
}

/// In-memory observer that keeps a copy of every event it receives.
#[derive(Clone, Default)]
pub struct RecordingObserver {
    records: Arc<RwLock<Vec<EventRecord>>>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<EventRecord> {
        self.records.read().clone()
    }

    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }
}

impl RegistryObserver for RecordingObserver {
    fn on_event(&self, record: &EventRecord) {
        self.records.write().push(record.clone());
    }
}

/// Writes each event to the `tracing` subscriber.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl RegistryObserver for TracingObserver {
    fn on_event(&self, record: &EventRecord) {
        match &record.event {
            RegistryEvent::Registered {
                owner,
                domain,
                decentralized_id,
                content_pointer,
            } => tracing::info!(
                sequence = record.sequence,
                %owner,
                %domain,
                decentralized_id = %decentralized_id,
                content_pointer = %content_pointer,
                "AggregatorRegistered"
            ),
            RegistryEvent::Updated {
                owner,
                domain,
                decentralized_id,
                content_pointer,
            } => tracing::info!(
                sequence = record.sequence,
                %owner,
                %domain,
                decentralized_id = %decentralized_id,
                content_pointer = %content_pointer,
                "AggregatorUpdated"
            ),
        }
    }
}
