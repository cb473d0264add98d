//! Registry records and the two lookup views over them

use crate::Principal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Human-readable domain key (e.g. `duffel.xyz`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Domain(pub String);

impl Domain {
    /// Create a new domain from string
    pub fn new(domain: impl Into<String>) -> Self {
        Self(domain.into())
    }

    /// Get the domain as string
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl From<&str> for Domain {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One registration: the unit indexed both by domain and by owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregatorRecord {
    pub domain: Domain,
    pub decentralized_id: String,
    pub content_pointer: String,
    pub owner: Principal,
}

impl AggregatorRecord {
    pub fn new(
        domain: Domain,
        decentralized_id: impl Into<String>,
        content_pointer: impl Into<String>,
        owner: Principal,
    ) -> Self {
        Self {
            domain,
            decentralized_id: decentralized_id.into(),
            content_pointer: content_pointer.into(),
            owner,
        }
    }

    /// View keyed by domain
    pub fn by_domain(&self) -> DomainRecord {
        DomainRecord {
            decentralized_id: self.decentralized_id.clone(),
            content_pointer: self.content_pointer.clone(),
            owner: self.owner,
        }
    }

    /// View keyed by owner
    pub fn by_owner(&self) -> OwnerRecord {
        OwnerRecord {
            domain: self.domain.clone(),
            decentralized_id: self.decentralized_id.clone(),
            content_pointer: self.content_pointer.clone(),
        }
    }
}

/// Value stored under a domain key: `(decentralized_id, content_pointer, owner)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainRecord {
    pub decentralized_id: String,
    pub content_pointer: String,
    pub owner: Principal,
}

impl DomainRecord {
    /// Reattach the domain key to rebuild the full record.
    pub fn into_record(self, domain: Domain) -> AggregatorRecord {
        AggregatorRecord {
            domain,
            decentralized_id: self.decentralized_id,
            content_pointer: self.content_pointer,
            owner: self.owner,
        }
    }
}

/// Value reported for an owner: `(domain, decentralized_id, content_pointer)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnerRecord {
    pub domain: Domain,
    pub decentralized_id: String,
    pub content_pointer: String,
}
