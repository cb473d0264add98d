//! Notifications emitted after successful mutations

use aggregator_types::{Domain, Principal};
use serde::{Deserialize, Serialize};

/// A committed registry mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RegistryEvent {
    /// A new domain was registered by `owner`.
    Registered {
        owner: Principal,
        domain: Domain,
        decentralized_id: String,
        content_pointer: String,
    },
    /// The owner replaced the descriptor of `domain`.
    Updated {
        owner: Principal,
        domain: Domain,
        decentralized_id: String,
        content_pointer: String,
    },
}

impl RegistryEvent {
    pub fn domain(&self) -> &Domain {
        match self {
            RegistryEvent::Registered { domain, .. } | RegistryEvent::Updated { domain, .. } => {
                domain
            }
        }
    }

    pub fn owner(&self) -> &Principal {
        match self {
            RegistryEvent::Registered { owner, .. } | RegistryEvent::Updated { owner, .. } => owner,
        }
    }
}

/// Event together with its position in the log (first event is 1).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    pub sequence: u64,
    pub event: RegistryEvent,
}

/// Append-only, ordered event log.
#[derive(Debug, Default)]
pub struct EventLog {
    entries: Vec<EventRecord>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, event: RegistryEvent) -> EventRecord {
        let record = EventRecord {
            sequence: self.entries.len() as u64 + 1,
            event,
        };
        self.entries.push(record.clone());
        record
    }

    pub fn entries(&self) -> &[EventRecord] {
        &self.entries
    }

    /// Events with a sequence number strictly greater than `after`.
    pub fn since(&self, after: u64) -> &[EventRecord] {
        let start = usize::try_from(after)
            .unwrap_or(usize::MAX)
            .min(self.entries.len());
        &self.entries[start..]
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
