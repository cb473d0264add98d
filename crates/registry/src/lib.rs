//! Aggregator Registry
//!
//! Binds human-readable domains (e.g. `duffel.xyz`) to a decentralized
//! identifier and a content pointer, with exactly one owning principal per
//! domain and exactly one domain per principal.

pub mod errors;
pub mod events;
pub mod observer;
pub mod registry;

pub use aggregator_storage::{MemoryStore, RegistryStore, SledStore, StoreLocation};
pub use aggregator_types::{AggregatorRecord, Domain, DomainRecord, OwnerRecord, Principal};
pub use errors::*;
pub use events::*;
pub use observer::*;
pub use registry::AggregatorRegistry;
