//! Error types for the aggregator registry

use aggregator_types::Principal;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("Domain already registered: {domain}")]
    DomainAlreadyRegistered { domain: String },

    #[error("Sender already registered a domain: {owner}")]
    OwnerAlreadyRegistered { owner: Principal },

    #[error("Domain not found: {domain}")]
    DomainNotFound { domain: String },

    #[error("Only owner can update: {domain}")]
    NotOwner { domain: String },

    #[error("Address not found: {owner}")]
    OwnerNotFound { owner: Principal },

    #[error("Registry storage error: {0}")]
    Storage(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, RegistryError>;
