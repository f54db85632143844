//! GeneticsStore: local store for profiles, contracts and breeding history
//!
//! Everything lives in one serde document guarded by an async mutex. With a
//! path, the document is rewritten as pretty JSON after every write.

use super::{BreedingCommit, MutationEntry, Repository, RepositoryError};
use crate::breeding::{BreedingAchievement, BreedingContract, IncubationRecord};
use crate::genome::{GeneticProfile, Lineage, MutationRecord};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreMetadata {
    pub created_at: DateTime<Utc>,
    pub total_profiles_ever: u64,
    pub total_contracts_ever: u64,
    pub total_mutations: u64,
}

impl Default for StoreMetadata {
    fn default() -> Self {
        Self {
            created_at: Utc::now(),
            total_profiles_ever: 0,
            total_contracts_ever: 0,
            total_mutations: 0,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct StoreState {
    profiles: HashMap<String, GeneticProfile>,
    contracts: HashMap<String, BreedingContract>,
    mutations: Vec<MutationEntry>,
    lineages: HashMap<String, Lineage>,
    incubations: HashMap<String, IncubationRecord>,
    achievements: Vec<BreedingAchievement>,
    metadata: StoreMetadata,
}

#[derive(Debug)]
pub struct GeneticsStore {
    state: Mutex<StoreState>,
    path: Option<PathBuf>,
}

impl Default for GeneticsStore {
    fn default() -> Self {
        Self::in_memory()
    }
}

impl GeneticsStore {
    pub fn in_memory() -> Self {
        Self {
            state: Mutex::new(StoreState::default()),
            path: None,
        }
    }

    /// Open a JSON-backed store, creating an empty one if the file is absent
    pub fn open(path: impl AsRef<Path>) -> Result<Self, RepositoryError> {
        let path = path.as_ref().to_path_buf();
        let state = if path.exists() {
            let data = std::fs::read_to_string(&path)?;
            let state: StoreState = serde_json::from_str(&data)?;
            info!(
                "Loaded genetics store with {} profiles and {} contracts from {}",
                state.profiles.len(),
                state.contracts.len(),
                path.display()
            );
            state
        } else {
            StoreState::default()
        };
        Ok(Self {
            state: Mutex::new(state),
            path: Some(path),
        })
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    async fn persist(&self, state: &StoreState) -> Result<(), RepositoryError> {
        if let Some(path) = &self.path {
            let json = serde_json::to_string_pretty(state)?;
            tokio::fs::write(path, json).await?;
            debug!("Persisted genetics store to {}", path.display());
        }
        Ok(())
    }

    /// All profiles, fittest first
    pub async fn profiles_by_fitness(&self) -> Vec<GeneticProfile> {
        let state = self.state.lock().await;
        let mut profiles: Vec<GeneticProfile> = state.profiles.values().cloned().collect();
        profiles.sort_by(|a, b| b.genetic_fitness.total_cmp(&a.genetic_fitness));
        profiles
    }

    pub async fn metadata(&self) -> StoreMetadata {
        self.state.lock().await.metadata.clone()
    }

    pub async fn summary(&self) -> String {
        let state = self.state.lock().await;
        let total = state.profiles.len();
        let avg_fitness = if total > 0 {
            state.profiles.values().map(|p| p.genetic_fitness).sum::<f64>() / total as f64
        } else {
            0.0
        };
        let max_generation = state.profiles.values().map(|p| p.generation).max().unwrap_or(0);
        let open = state
            .contracts
            .values()
            .filter(|c| !c.status().is_terminal())
            .count();
        format!(
            "GeneticsStore | {} profiles | avg fitness {:.2} | max generation {} | {} contracts ({} open) | {} mutations",
            total,
            avg_fitness,
            max_generation,
            state.contracts.len(),
            open,
            state.mutations.len()
        )
    }
}

impl StoreState {
    fn put_profile(&mut self, profile: GeneticProfile) {
        if !self.profiles.contains_key(&profile.swarm_id) {
            self.metadata.total_profiles_ever += 1;
        }
        self.profiles.insert(profile.swarm_id.clone(), profile);
    }

    fn put_contract(&mut self, contract: BreedingContract) {
        if !self.contracts.contains_key(&contract.id) {
            self.metadata.total_contracts_ever += 1;
        }
        self.contracts.insert(contract.id.clone(), contract);
    }

    fn put_lineage(&mut self, lineage: Lineage) -> Result<(), RepositoryError> {
        if self.lineages.contains_key(&lineage.swarm_id) {
            return Err(RepositoryError::Conflict(format!(
                "lineage for '{}' already recorded",
                lineage.swarm_id
            )));
        }
        self.lineages.insert(lineage.swarm_id.clone(), lineage);
        Ok(())
    }

    fn push_mutations(&mut self, swarm_id: &str, records: &[MutationRecord], occurred_at: DateTime<Utc>) {
        self.mutations.extend(records.iter().map(|record| MutationEntry {
            swarm_id: swarm_id.to_string(),
            record: record.clone(),
            trigger_source: "natural".to_string(),
            occurred_at,
        }));
        self.metadata.total_mutations += records.len() as u64;
    }
}

impl GeneticsStore {
    /// Apply `change` to a copy of the state, persist the copy, then swap it
    /// in. A failed change or write leaves the live state untouched.
    async fn update<T>(
        &self,
        change: impl FnOnce(&mut StoreState) -> Result<T, RepositoryError> + Send,
    ) -> Result<T, RepositoryError> {
        let mut state = self.state.lock().await;
        let mut next = StoreState::clone(&state);
        let out = change(&mut next)?;
        self.persist(&next).await?;
        *state = next;
        Ok(out)
    }
}

#[async_trait]
impl Repository for GeneticsStore {
    async fn get_profile(&self, swarm_id: &str) -> Result<Option<GeneticProfile>, RepositoryError> {
        Ok(self.state.lock().await.profiles.get(swarm_id).cloned())
    }

    async fn save_profile(&self, profile: &GeneticProfile) -> Result<(), RepositoryError> {
        self.update(|state| {
            state.put_profile(profile.clone());
            Ok(())
        })
        .await
    }

    async fn commit_breeding(&self, commit: &BreedingCommit) -> Result<(), RepositoryError> {
        self.update(|state| {
            for (parent, expected_version) in &commit.parents {
                let current = state.profiles.get(&parent.swarm_id).map(|p| p.version);
                if current != Some(*expected_version) {
                    debug!(
                        "Version conflict on '{}': expected {}, found {:?}",
                        parent.swarm_id, expected_version, current
                    );
                    return Err(RepositoryError::VersionConflict {
                        swarm_id: parent.swarm_id.clone(),
                    });
                }
            }

            state.put_lineage(commit.lineage.clone())?;
            for (parent, expected_version) in &commit.parents {
                let mut updated = parent.clone();
                updated.version = expected_version + 1;
                state.put_profile(updated);
            }
            state.put_profile(commit.offspring.clone());
            state.push_mutations(&commit.offspring.swarm_id, &commit.mutations, commit.occurred_at);
            state.put_contract(commit.contract.clone());
            if let Some(achievement) = &commit.achievement {
                state.achievements.push(achievement.clone());
            }
            Ok(())
        })
        .await
    }

    async fn get_contract(&self, id: &str) -> Result<Option<BreedingContract>, RepositoryError> {
        Ok(self.state.lock().await.contracts.get(id).cloned())
    }

    async fn save_contract(&self, contract: &BreedingContract) -> Result<(), RepositoryError> {
        self.update(|state| {
            state.put_contract(contract.clone());
            Ok(())
        })
        .await
    }

    async fn contracts_for_owner(&self, owner_id: &str) -> Result<Vec<BreedingContract>, RepositoryError> {
        let state = self.state.lock().await;
        let mut contracts: Vec<BreedingContract> = state
            .contracts
            .values()
            .filter(|c| c.is_party(owner_id))
            .cloned()
            .collect();
        contracts.sort_by(|a, b| b.proposed_at.cmp(&a.proposed_at));
        Ok(contracts)
    }

    async fn append_mutation_records(
        &self,
        swarm_id: &str,
        records: &[MutationRecord],
        occurred_at: DateTime<Utc>,
    ) -> Result<(), RepositoryError> {
        if records.is_empty() {
            return Ok(());
        }
        self.update(|state| {
            state.push_mutations(swarm_id, records, occurred_at);
            Ok(())
        })
        .await
    }

    async fn mutations_for(&self, swarm_id: &str) -> Result<Vec<MutationEntry>, RepositoryError> {
        let state = self.state.lock().await;
        Ok(state
            .mutations
            .iter()
            .rev()
            .filter(|m| m.swarm_id == swarm_id)
            .cloned()
            .collect())
    }

    async fn append_lineage(&self, lineage: &Lineage) -> Result<(), RepositoryError> {
        self.update(|state| state.put_lineage(lineage.clone())).await
    }

    async fn get_lineage(&self, swarm_id: &str) -> Result<Option<Lineage>, RepositoryError> {
        Ok(self.state.lock().await.lineages.get(swarm_id).cloned())
    }

    async fn save_incubation(&self, record: &IncubationRecord) -> Result<(), RepositoryError> {
        self.update(|state| {
            state.incubations.insert(record.contract_id.clone(), record.clone());
            Ok(())
        })
        .await
    }

    async fn get_incubation(&self, contract_id: &str) -> Result<Option<IncubationRecord>, RepositoryError> {
        Ok(self.state.lock().await.incubations.get(contract_id).cloned())
    }

    async fn append_achievement(&self, achievement: &BreedingAchievement) -> Result<(), RepositoryError> {
        self.update(|state| {
            state.achievements.push(achievement.clone());
            Ok(())
        })
        .await
    }

    async fn achievements_for(&self, owner_id: &str) -> Result<Vec<BreedingAchievement>, RepositoryError> {
        let state = self.state.lock().await;
        Ok(state
            .achievements
            .iter()
            .rev()
            .filter(|a| a.owner_id == owner_id)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::breeding::{ContractTerms, ParentProofs, ProposalRequest};
    use crate::engine::{GeneticEngine, RngSource, SequenceSource};
    use crate::genome::{MutationTable, ParentLineage, SwarmPerformance, Trait};

    fn profile(id: &str) -> GeneticProfile {
        GeneticEngine::default().initialize_profile(
            id,
            "owner",
            None,
            SwarmPerformance::default(),
            &mut RngSource::seeded(1),
        )
    }

    #[tokio::test]
    async fn test_profile_roundtrip() {
        let store = GeneticsStore::in_memory();
        assert!(store.get_profile("a").await.unwrap().is_none());
        let p = profile("a");
        store.save_profile(&p).await.unwrap();
        assert_eq!(store.get_profile("a").await.unwrap(), Some(p));
        assert_eq!(store.metadata().await.total_profiles_ever, 1);
    }

    fn commit_for(store_parents: [&GeneticProfile; 2], child: &str) -> BreedingCommit {
        let contract = BreedingContract::propose(
            ProposalRequest {
                parent1_id: store_parents[0].swarm_id.clone(),
                parent2_id: store_parents[1].swarm_id.clone(),
                parent1_owner: "owner".into(),
                parent2_owner: "owner".into(),
                offspring_owner: "owner".into(),
                breeding_fee: 0.0,
                profit_share_percent: 0.0,
                profit_share_duration_days: 0,
            },
            80.0,
            60.0,
            ParentProofs { parent1: "t1".into(), parent2: "t2".into() },
            ContractTerms { min_compatibility: 50.0, mutation_chance: 5.0, estimated_generation: 2 },
            Utc::now(),
        );
        let bumped = |p: &GeneticProfile| {
            let mut updated = p.clone();
            updated.breeding_count += 1;
            (updated, p.version)
        };
        let mut offspring = profile(child);
        offspring.generation = 2;
        let lineage = Lineage::offspring(
            child,
            2,
            ParentLineage::new(&store_parents[0].swarm_id, None),
            ParentLineage::new(&store_parents[1].swarm_id, None),
            &[],
        );
        BreedingCommit {
            parents: [bumped(store_parents[0]), bumped(store_parents[1])],
            offspring,
            lineage,
            mutations: vec![MutationTable::default().roll(Trait::Speed, &mut SequenceSource::constant(0.5))],
            contract,
            achievement: None,
            occurred_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_commit_breeding_applies_everything() {
        let store = GeneticsStore::in_memory();
        let (a, b) = (profile("a"), profile("b"));
        store.save_profile(&a).await.unwrap();
        store.save_profile(&b).await.unwrap();

        let commit = commit_for([&a, &b], "child");
        store.commit_breeding(&commit).await.unwrap();

        for id in ["a", "b"] {
            let stored = store.get_profile(id).await.unwrap().unwrap();
            assert_eq!(stored.version, 1);
            assert_eq!(stored.breeding_count, 1);
        }
        assert!(store.get_profile("child").await.unwrap().is_some());
        assert!(store.get_lineage("child").await.unwrap().is_some());
        assert_eq!(store.mutations_for("child").await.unwrap().len(), 1);
        assert!(store.get_contract(&commit.contract.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_commit_breeding_version_conflict_writes_nothing() {
        let store = GeneticsStore::in_memory();
        let (a, b) = (profile("a"), profile("b"));
        store.save_profile(&a).await.unwrap();
        store.save_profile(&b).await.unwrap();
        let stale = commit_for([&a, &b], "first");
        store.commit_breeding(&stale).await.unwrap();

        // same parent snapshots, read before the first commit
        let again = commit_for([&a, &b], "second");
        let err = store.commit_breeding(&again).await.unwrap_err();
        assert!(matches!(err, RepositoryError::VersionConflict { ref swarm_id } if swarm_id == "a"));
        assert_eq!(store.get_profile("a").await.unwrap().unwrap().breeding_count, 1);
        assert!(store.get_profile("second").await.unwrap().is_none());
        assert!(store.get_lineage("second").await.unwrap().is_none());
        assert!(store.get_contract(&again.contract.id).await.unwrap().is_none());
        assert_eq!(store.metadata().await.total_profiles_ever, 3);
    }

    #[tokio::test]
    async fn test_failed_write_leaves_state_untouched() {
        let dir = std::env::temp_dir().join(format!("genetics-store-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        let store = GeneticsStore::open(dir.join("store.json")).unwrap();
        let mut a = profile("a");
        store.save_profile(&a).await.unwrap();

        std::fs::remove_dir_all(&dir).unwrap();
        a.breeding_count = 3;
        assert!(matches!(store.save_profile(&a).await, Err(RepositoryError::Io(_))));
        assert!(store.save_profile(&profile("b")).await.is_err());
        assert!(store.append_lineage(&Lineage::genesis("a")).await.is_err());

        assert_eq!(store.get_profile("a").await.unwrap().unwrap().breeding_count, 0);
        assert!(store.get_profile("b").await.unwrap().is_none());
        assert!(store.get_lineage("a").await.unwrap().is_none());
        assert_eq!(store.metadata().await.total_profiles_ever, 1);
    }

    #[tokio::test]
    async fn test_lineage_append_once() {
        let store = GeneticsStore::in_memory();
        store.append_lineage(&Lineage::genesis("a")).await.unwrap();
        let again = store.append_lineage(&Lineage::genesis("a")).await;
        assert!(matches!(again, Err(RepositoryError::Conflict(_))));
        assert_eq!(store.get_lineage("a").await.unwrap().unwrap().generation, 1);
    }

    #[tokio::test]
    async fn test_mutations_newest_first() {
        let store = GeneticsStore::in_memory();
        let table = MutationTable::default();
        let first = table.roll(Trait::Speed, &mut SequenceSource::constant(0.01));
        let second = table.roll(Trait::Patience, &mut SequenceSource::constant(0.1));
        let now = Utc::now();
        store.append_mutation_records("a", &[first], now).await.unwrap();
        store.append_mutation_records("b", &[], now).await.unwrap();
        store.append_mutation_records("a", &[second], now).await.unwrap();

        let entries = store.mutations_for("a").await.unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].record.trait_affected, Trait::Patience);
        assert_eq!(entries[1].record.trait_affected, Trait::Speed);
        assert!(store.mutations_for("b").await.unwrap().is_empty());
        assert_eq!(store.metadata().await.total_mutations, 2);
    }

    #[tokio::test]
    async fn test_file_persistence() {
        let path = std::env::temp_dir().join(format!("genetics-store-{}.json", uuid::Uuid::new_v4()));
        {
            let store = GeneticsStore::open(&path).unwrap();
            store.save_profile(&profile("persisted")).await.unwrap();
            store.append_lineage(&Lineage::genesis("persisted")).await.unwrap();
        }
        let reopened = GeneticsStore::open(&path).unwrap();
        assert!(reopened.get_profile("persisted").await.unwrap().is_some());
        assert!(reopened.get_lineage("persisted").await.unwrap().is_some());
        assert!(reopened.summary().await.contains("1 profiles"));
        std::fs::remove_file(&path).unwrap();
    }

    #[tokio::test]
    async fn test_corrupt_file_is_an_error() {
        let path = std::env::temp_dir().join(format!("genetics-store-{}.json", uuid::Uuid::new_v4()));
        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(GeneticsStore::open(&path), Err(RepositoryError::Serialization(_))));
        std::fs::remove_file(&path).unwrap();
    }
}
