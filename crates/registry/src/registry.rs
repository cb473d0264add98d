//! Aggregator Registry implementation
//!
//! One record per domain, one domain per owner. The record store and the
//! owner index live behind a single lock together with the event log, so
//! every mutation checks, commits and emits as one step.

use crate::errors::*;
use crate::events::{EventLog, EventRecord, RegistryEvent};
use crate::observer::RegistryObserver;
use aggregator_storage::{MemoryStore, RegistryStore, StoreLocation};
use aggregator_types::{AggregatorRecord, Domain, DomainRecord, OwnerRecord, Principal};
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::{debug, info, warn};

struct RegistryState<S> {
    store: S,
    events: EventLog,
}

/// Aggregator Registry
///
/// Maintains two lookups over the same records: domain → (DID, content
/// pointer, owner) and owner → (domain, DID, content pointer).
pub struct AggregatorRegistry<S: RegistryStore = MemoryStore> {
    state: RwLock<RegistryState<S>>,
    observers: RwLock<Vec<Arc<dyn RegistryObserver>>>,
}

impl AggregatorRegistry<MemoryStore> {
    /// Create an empty registry backed by memory
    pub fn new() -> Self {
        Self::with_store(MemoryStore::new())
    }
}

impl Default for AggregatorRegistry<MemoryStore> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: RegistryStore> AggregatorRegistry<S> {
    /// Create a registry over an existing store
    pub fn with_store(store: S) -> Self {
        Self {
            state: RwLock::new(RegistryState {
                store,
                events: EventLog::new(),
            }),
            observers: RwLock::new(Vec::new()),
        }
    }

    /// Attach an observer that receives every future event
    pub fn subscribe(&self, observer: Arc<dyn RegistryObserver>) {
        self.observers.write().push(observer);
    }

    /// Register `domain` for `caller`.
    ///
    /// The domain check runs before the owner check, so a caller that
    /// already owns a domain and targets a taken one gets
    /// `DomainAlreadyRegistered`.
    pub fn register(
        &self,
        caller: &Principal,
        domain: &str,
        decentralized_id: &str,
        content_pointer: &str,
    ) -> Result<()> {
        let domain = Domain::new(domain);
        let mut state = self.state.write();

        if state.store.get_record(&domain)?.is_some() {
            debug!(%domain, %caller, "Rejected registration of taken domain");
            return Err(RegistryError::DomainAlreadyRegistered { domain: domain.0 });
        }

        if let Some(existing) = state.store.domain_of(caller)? {
            debug!(%caller, %existing, "Rejected second registration by owner");
            return Err(RegistryError::OwnerAlreadyRegistered { owner: *caller });
        }

        let record = AggregatorRecord::new(domain, decentralized_id, content_pointer, *caller);
        state.store.insert_record(&record)?;

        info!(domain = %record.domain, owner = %caller, "Registered aggregator");

        let event = state.events.append(RegistryEvent::Registered {
            owner: record.owner,
            domain: record.domain,
            decentralized_id: record.decentralized_id,
            content_pointer: record.content_pointer,
        });
        self.notify(&event);

        Ok(())
    }

    /// Replace the DID and content pointer of `domain`; only its owner may.
    pub fn update(
        &self,
        caller: &Principal,
        domain: &str,
        new_decentralized_id: &str,
        new_content_pointer: &str,
    ) -> Result<()> {
        let domain = Domain::new(domain);
        let mut state = self.state.write();

        let Some(current) = state.store.get_record(&domain)? else {
            debug!(%domain, %caller, "Rejected update of unknown domain");
            return Err(RegistryError::DomainNotFound { domain: domain.0 });
        };

        if current.owner != *caller {
            debug!(%domain, %caller, owner = %current.owner, "Rejected update by non-owner");
            return Err(RegistryError::NotOwner { domain: domain.0 });
        }

        state
            .store
            .update_descriptor(&domain, new_decentralized_id, new_content_pointer)?;

        info!(%domain, owner = %caller, "Updated aggregator");

        let event = state.events.append(RegistryEvent::Updated {
            owner: *caller,
            domain,
            decentralized_id: new_decentralized_id.to_string(),
            content_pointer: new_content_pointer.to_string(),
        });
        self.notify(&event);

        Ok(())
    }

    /// Look up `(decentralized_id, content_pointer, owner)` by domain
    pub fn get_by_domain(&self, domain: &str) -> Result<DomainRecord> {
        let state = self.state.read();
        state
            .store
            .get_record(&Domain::new(domain))?
            .ok_or_else(|| RegistryError::DomainNotFound {
                domain: domain.to_string(),
            })
    }

    /// Look up `(domain, decentralized_id, content_pointer)` by owner
    pub fn get_by_owner(&self, owner: &Principal) -> Result<OwnerRecord> {
        let state = self.state.read();
        let not_found = || RegistryError::OwnerNotFound { owner: *owner };

        let domain = state.store.domain_of(owner)?.ok_or_else(not_found)?;
        let record = state.store.get_record(&domain)?.ok_or_else(|| {
            RegistryError::Storage(anyhow::anyhow!(
                "owner index for {} points at missing domain {}",
                owner,
                domain
            ))
        })?;

        Ok(record.into_record(domain).by_owner())
    }

    pub fn is_domain_registered(&self, domain: &str) -> bool {
        let state = self.state.read();
        match state.store.get_record(&Domain::new(domain)) {
            Ok(record) => record.is_some(),
            Err(err) => {
                warn!(%domain, "Domain probe failed: {}", err);
                false
            }
        }
    }

    /// True only when `domain` exists and `candidate` is its recorded owner
    pub fn is_owner_of_domain(&self, candidate: &Principal, domain: &str) -> bool {
        let state = self.state.read();
        match state.store.get_record(&Domain::new(domain)) {
            Ok(record) => record.is_some_and(|r| r.owner == *candidate),
            Err(err) => {
                warn!(%domain, %candidate, "Ownership probe failed: {}", err);
                false
            }
        }
    }

    /// Number of registered domains
    pub fn len(&self) -> Result<usize> {
        Ok(self.state.read().store.record_count()?)
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    /// Every event emitted since this registry was constructed
    pub fn events(&self) -> Vec<EventRecord> {
        self.state.read().events.entries().to_vec()
    }

    /// Events with a sequence number greater than `after`
    pub fn events_since(&self, after: u64) -> Vec<EventRecord> {
        self.state.read().events.since(after).to_vec()
    }

    pub fn location(&self) -> StoreLocation {
        self.state.read().store.location()
    }

    /// Flush the backing store to durable storage
    pub fn flush(&self) -> Result<()> {
        Ok(self.state.read().store.flush()?)
    }

    fn notify(&self, record: &EventRecord) {
        for observer in self.observers.read().iter() {
            observer.on_event(record);
        }
    }
}
