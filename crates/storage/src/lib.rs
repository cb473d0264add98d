//! Record store and owner index backends for the aggregator registry.

use aggregator_types::{AggregatorRecord, Domain, DomainRecord, Principal};
use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use sled::transaction::{ConflictableTransactionResult, TransactionError};
use sled::{Db, Transactional, Tree};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Where a store keeps its data, reported by the bootstrap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "store", rename_all = "snake_case")]
pub enum StoreLocation {
    Memory,
    Sled { path: PathBuf },
}

impl StoreLocation {
    /// Backend name as accepted by the node's `store` setting
    pub fn kind(&self) -> &'static str {
        match self {
            StoreLocation::Memory => "memory",
            StoreLocation::Sled { .. } => "sled",
        }
    }
}

/// Key-value backend holding the registry's record store and owner index.
///
/// Records are keyed by domain. The owner index maps each principal to the
/// single domain it registered; the owner-keyed view is derived by joining
/// the index with the record store, so descriptors are stored once.
///
/// Writes take `&mut self`: callers hold exclusive access for the whole
/// check-then-commit sequence.
pub trait RegistryStore: Send + Sync {
    fn get_record(&self, domain: &Domain) -> Result<Option<DomainRecord>>;
    fn domain_of(&self, owner: &Principal) -> Result<Option<Domain>>;

    /// Insert a new record and its owner index entry in one commit.
    fn insert_record(&mut self, record: &AggregatorRecord) -> Result<()>;

    /// Replace the descriptor fields of an existing record.
    fn update_descriptor(
        &mut self,
        domain: &Domain,
        decentralized_id: &str,
        content_pointer: &str,
    ) -> Result<()>;

    fn record_count(&self) -> Result<usize>;
    fn location(&self) -> StoreLocation;

    fn flush(&self) -> Result<()> {
        Ok(())
    }
}

impl<S: RegistryStore + ?Sized> RegistryStore for Box<S> {
    fn get_record(&self, domain: &Domain) -> Result<Option<DomainRecord>> {
        (**self).get_record(domain)
    }

    fn domain_of(&self, owner: &Principal) -> Result<Option<Domain>> {
        (**self).domain_of(owner)
    }

    fn insert_record(&mut self, record: &AggregatorRecord) -> Result<()> {
        (**self).insert_record(record)
    }

    fn update_descriptor(
        &mut self,
        domain: &Domain,
        decentralized_id: &str,
        content_pointer: &str,
    ) -> Result<()> {
        (**self).update_descriptor(domain, decentralized_id, content_pointer)
    }

    fn record_count(&self) -> Result<usize> {
        (**self).record_count()
    }

    fn location(&self) -> StoreLocation {
        (**self).location()
    }

    fn flush(&self) -> Result<()> {
        (**self).flush()
    }
}

/// Sled-backed implementation
pub struct SledStore {
    db: Db,
    path: PathBuf,
    records: Tree,
    owners: Tree,
}

impl SledStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let db = sled::open(&path)?;
        let records = db.open_tree("records")?;
        let owners = db.open_tree("owners")?;
        tracing::debug!(
            path = %path.display(),
            records = records.len(),
            "Opened sled registry store"
        );

        Ok(Self {
            db,
            path,
            records,
            owners,
        })
    }
}

impl RegistryStore for SledStore {
    fn get_record(&self, domain: &Domain) -> Result<Option<DomainRecord>> {
        self.records
            .get(domain.as_bytes())?
            .map(|v| serde_json::from_slice(&v))
            .transpose()
            .map_err(Into::into)
    }

    fn domain_of(&self, owner: &Principal) -> Result<Option<Domain>> {
        self.owners
            .get(owner.as_bytes())?
            .map(|v| {
                String::from_utf8(v.to_vec())
                    .map(Domain::new)
                    .map_err(|e| anyhow!("corrupt owner index entry for {}: {}", owner, e))
            })
            .transpose()
    }

    fn insert_record(&mut self, record: &AggregatorRecord) -> Result<()> {
        let value = serde_json::to_vec(&record.by_domain())?;
        let domain_key = record.domain.as_bytes();
        let owner_key = record.owner.as_bytes();

        (&self.records, &self.owners)
            .transaction(|(records, owners)| -> ConflictableTransactionResult<()> {
                records.insert(domain_key, value.as_slice())?;
                owners.insert(&owner_key[..], domain_key)?;
                Ok(())
            })
            .map_err(|e: TransactionError<()>| {
                anyhow!("sled transaction failed for {}: {:?}", record.domain, e)
            })
    }

    fn update_descriptor(
        &mut self,
        domain: &Domain,
        decentralized_id: &str,
        content_pointer: &str,
    ) -> Result<()> {
        let mut current = self
            .get_record(domain)?
            .ok_or_else(|| anyhow!("no stored record for {}", domain))?;
        current.decentralized_id = decentralized_id.to_string();
        current.content_pointer = content_pointer.to_string();

        let value = serde_json::to_vec(&current)?;
        self.records.insert(domain.as_bytes(), value)?;
        Ok(())
    }

    fn record_count(&self) -> Result<usize> {
        Ok(self.records.len())
    }

    fn location(&self) -> StoreLocation {
        StoreLocation::Sled {
            path: self.path.clone(),
        }
    }

    fn flush(&self) -> Result<()> {
        self.db.flush()?;
        Ok(())
    }
}

/// In-memory implementation
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: HashMap<Domain, DomainRecord>,
    owners: HashMap<Principal, Domain>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RegistryStore for MemoryStore {
    fn get_record(&self, domain: &Domain) -> Result<Option<DomainRecord>> {
        Ok(self.records.get(domain).cloned())
    }

    fn domain_of(&self, owner: &Principal) -> Result<Option<Domain>> {
        Ok(self.owners.get(owner).cloned())
    }

    fn insert_record(&mut self, record: &AggregatorRecord) -> Result<()> {
        self.records.insert(record.domain.clone(), record.by_domain());
        self.owners.insert(record.owner, record.domain.clone());
        Ok(())
    }

    fn update_descriptor(
        &mut self,
        domain: &Domain,
        decentralized_id: &str,
        content_pointer: &str,
    ) -> Result<()> {
        let current = self
            .records
            .get_mut(domain)
            .ok_or_else(|| anyhow!("no stored record for {}", domain))?;
        current.decentralized_id = decentralized_id.to_string();
        current.content_pointer = content_pointer.to_string();
        Ok(())
    }

    fn record_count(&self) -> Result<usize> {
        Ok(self.records.len())
    }

    fn location(&self) -> StoreLocation {
        StoreLocation::Memory
    }
}
