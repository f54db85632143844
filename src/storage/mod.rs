//! Storage for genetic profiles and breeding records
//!
//! `Repository` is the port the breeding manager talks to; `GeneticsStore`
//! is the bundled adapter, in-memory or persisted as a JSON file.

mod repository;
mod store;

pub use repository::{BreedingCommit, MutationEntry, Repository, RepositoryError};
pub use store::{GeneticsStore, StoreMetadata};
