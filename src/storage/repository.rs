//! Repository port: persistence contract for the breeding workflow
//!
//! Single-entity writes are atomic. A completed breeding touches several
//! entities at once and goes through `commit_breeding`, which applies all of
//! them or none.

use crate::breeding::{BreedingAchievement, BreedingContract, IncubationRecord};
use crate::genome::{GeneticProfile, Lineage, MutationRecord};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("storage serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("conflicting write: {0}")]
    Conflict(String),

    #[error("swarm {swarm_id} changed since it was read")]
    VersionConflict { swarm_id: String },
}

/// A persisted mutation, tied to the swarm it was rolled for
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MutationEntry {
    pub swarm_id: String,
    pub record: MutationRecord,
    pub trigger_source: String,
    pub occurred_at: DateTime<Utc>,
}

/// Every write of one completed breeding
#[derive(Debug, Clone)]
pub struct BreedingCommit {
    /// Parents with updated counters, each paired with the version it was read at
    pub parents: [(GeneticProfile, u64); 2],
    pub offspring: GeneticProfile,
    pub lineage: Lineage,
    pub mutations: Vec<MutationRecord>,
    pub contract: BreedingContract,
    pub achievement: Option<BreedingAchievement>,
    pub occurred_at: DateTime<Utc>,
}

#[async_trait]
pub trait Repository: Send + Sync {
    async fn get_profile(&self, swarm_id: &str) -> Result<Option<GeneticProfile>, RepositoryError>;

    /// Unconditional upsert
    async fn save_profile(&self, profile: &GeneticProfile) -> Result<(), RepositoryError>;

    /// Apply a completed breeding as one unit. Fails with `VersionConflict`,
    /// writing nothing, if either parent's stored version moved on; each
    /// parent is stored with its version bumped by one.
    async fn commit_breeding(&self, commit: &BreedingCommit) -> Result<(), RepositoryError>;

    async fn get_contract(&self, id: &str) -> Result<Option<BreedingContract>, RepositoryError>;

    async fn save_contract(&self, contract: &BreedingContract) -> Result<(), RepositoryError>;

    /// Contracts where the owner holds any role, newest first
    async fn contracts_for_owner(&self, owner_id: &str) -> Result<Vec<BreedingContract>, RepositoryError>;

    async fn append_mutation_records(
        &self,
        swarm_id: &str,
        records: &[MutationRecord],
        occurred_at: DateTime<Utc>,
    ) -> Result<(), RepositoryError>;

    /// Newest first
    async fn mutations_for(&self, swarm_id: &str) -> Result<Vec<MutationEntry>, RepositoryError>;

    async fn append_lineage(&self, lineage: &Lineage) -> Result<(), RepositoryError>;

    async fn get_lineage(&self, swarm_id: &str) -> Result<Option<Lineage>, RepositoryError>;

    async fn save_incubation(&self, record: &IncubationRecord) -> Result<(), RepositoryError>;

    async fn get_incubation(&self, contract_id: &str) -> Result<Option<IncubationRecord>, RepositoryError>;

    async fn append_achievement(&self, achievement: &BreedingAchievement) -> Result<(), RepositoryError>;

    async fn achievements_for(&self, owner_id: &str) -> Result<Vec<BreedingAchievement>, RepositoryError>;
}
