//! Breeding contract manager: orchestrates propose → accept → incubate → complete
//!
//! Loads parent snapshots from the repository, asks the engine for scores
//! and offspring, and records every side effect of a completed breeding.
//! Operations touching the same swarm or contract are serialized through
//! keyed locks; a completed breeding is written as one version-checked
//! commit, so a failure leaves no partial state behind.

use super::locks::{contract_key, swarm_key, KeyedLocks};
use super::{
    BreedingAchievement, BreedingContract, BreedingError, ContractAction, ContractTerms,
    IncubationRecord, ParentProofs, ProposalRequest,
};
use crate::clock::{Clock, SystemClock};
use crate::config::{BreedingConfig, ConfigError};
use crate::engine::{GeneticEngine, RandomSource, RngSource};
use crate::genome::{
    GeneticProfile, LegendaryTrait, Lineage, MutationRecord, ParentLineage, SwarmPerformance, TraitSubset,
};
use crate::storage::{BreedingCommit, MutationEntry, Repository, RepositoryError};
use crate::zk::{PerformanceClaim, ProofService};
use chrono::{DateTime, Duration, Utc};
use log::{debug, info, warn};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Everything a completed breeding produced
#[derive(Debug, Clone)]
pub struct BreedingReceipt {
    pub contract: BreedingContract,
    pub offspring: GeneticProfile,
    pub mutations: Vec<MutationRecord>,
    pub legendary_traits: Vec<LegendaryTrait>,
    pub lineage: Lineage,
    pub achievement: Option<BreedingAchievement>,
}

pub struct BreedingContractManager {
    repository: Arc<dyn Repository>,
    proofs: Arc<dyn ProofService>,
    engine: GeneticEngine,
    config: BreedingConfig,
    rng: Mutex<Box<dyn RandomSource + Send>>,
    clock: Arc<dyn Clock>,
    locks: KeyedLocks,
}

impl BreedingContractManager {
    pub fn new(
        repository: Arc<dyn Repository>,
        proofs: Arc<dyn ProofService>,
        config: BreedingConfig,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let engine = GeneticEngine::new(config.mutation_table.clone()).with_max_breeding(config.max_breeding);
        Ok(Self {
            repository,
            proofs,
            engine,
            config,
            rng: Mutex::new(Box::new(RngSource::from_entropy())),
            clock: Arc::new(SystemClock),
            locks: KeyedLocks::default(),
        })
    }

    pub fn with_random_source(mut self, rng: impl RandomSource + Send + 'static) -> Self {
        self.rng = Mutex::new(Box::new(rng));
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn engine(&self) -> &GeneticEngine {
        &self.engine
    }

    pub fn config(&self) -> &BreedingConfig {
        &self.config
    }

    // ── Profiles ─────────────────────────────────────────────

    /// Return the swarm's profile, creating a first-generation one if absent
    pub async fn initialize_profile(
        &self,
        swarm_id: &str,
        owner_id: &str,
        baseline: Option<&TraitSubset>,
        performance: SwarmPerformance,
    ) -> Result<GeneticProfile, BreedingError> {
        require_id("swarm_id", swarm_id)?;
        require_id("owner_id", owner_id)?;
        if !(0.0..=100.0).contains(&performance.win_rate) || !performance.total_profit.is_finite() {
            return Err(BreedingError::Validation(format!(
                "win_rate must be within [0, 100] and total_profit finite, got {} / {}",
                performance.win_rate, performance.total_profit
            )));
        }

        let _guard = self.locks.acquire(&[swarm_key(swarm_id)]).await;
        if let Some(existing) = self.repository.get_profile(swarm_id).await? {
            return Ok(existing);
        }

        let profile = {
            let mut rng = self.rng.lock().await;
            self.engine
                .initialize_profile(swarm_id, owner_id, baseline, performance, &mut **rng)
        };
        self.repository.save_profile(&profile).await?;
        if self.repository.get_lineage(swarm_id).await?.is_none() {
            self.repository.append_lineage(&Lineage::genesis(swarm_id)).await?;
        }
        info!("Initialized genetics: {}", profile.summary());
        Ok(profile)
    }

    pub async fn profile(&self, swarm_id: &str) -> Result<GeneticProfile, BreedingError> {
        self.repository
            .get_profile(swarm_id)
            .await?
            .ok_or_else(|| BreedingError::not_found("genetic profile", swarm_id))
    }

    // ── Contract lifecycle ───────────────────────────────────

    pub async fn propose(&self, request: ProposalRequest) -> Result<BreedingContract, BreedingError> {
        validate_request(&request)?;
        let _guard = self
            .locks
            .acquire(&[swarm_key(&request.parent1_id), swarm_key(&request.parent2_id)])
            .await;

        let parent1 = self.profile(&request.parent1_id).await?;
        let parent2 = self.profile(&request.parent2_id).await?;
        let now = self.clock.now();

        ensure_capacity(&parent1)?;
        ensure_capacity(&parent2)?;
        self.ensure_cooled_down(&parent1, now)?;

        let compatibility = self.engine.compatibility(&parent1, &parent2);
        let predicted = {
            let mut rng = self.rng.lock().await;
            self.engine.predict_offspring_fitness(
                parent1.genetic_fitness,
                parent2.genetic_fitness,
                compatibility,
                &mut **rng,
            )
        };

        let proofs = ParentProofs {
            parent1: self.performance_proof(&parent1, now).await?,
            parent2: self.performance_proof(&parent2, now).await?,
        };
        let terms = ContractTerms {
            min_compatibility: self.config.min_compatibility,
            mutation_chance: parent1.mutation_rate,
            estimated_generation: parent1.generation.max(parent2.generation) + 1,
        };

        let contract = BreedingContract::propose(request, compatibility, predicted, proofs, terms, now);
        self.repository.save_contract(&contract).await?;
        info!("Proposed breeding: {}", contract.summary());
        Ok(contract)
    }

    pub async fn accept(&self, contract_id: &str) -> Result<BreedingContract, BreedingError> {
        let _guard = self.locks.acquire(&[contract_key(contract_id)]).await;
        let mut contract = self.load_contract(contract_id).await?;
        contract
            .accept(self.clock.now())
            .map_err(|t| BreedingError::invalid_state(contract_id, t))?;
        self.repository.save_contract(&contract).await?;
        info!("Contract {} accepted", contract_id);
        Ok(contract)
    }

    /// Move an accepted contract into incubation and queue its incubation window
    pub async fn start_incubation(
        &self,
        contract_id: &str,
    ) -> Result<(BreedingContract, IncubationRecord), BreedingError> {
        let _guard = self.locks.acquire(&[contract_key(contract_id)]).await;
        let mut contract = self.load_contract(contract_id).await?;
        contract
            .check(ContractAction::StartIncubation)
            .map_err(|t| BreedingError::invalid_state(contract_id, t))?;

        let span = self.config.incubation_max_hours - self.config.incubation_min_hours;
        let hours = {
            let mut rng = self.rng.lock().await;
            self.config.incubation_min_hours + rng.index(span as usize) as u32
        };
        let now = self.clock.now();
        let record = IncubationRecord::new(&contract.id, &contract.offspring_owner, hours, now);
        contract
            .start_incubation(now)
            .map_err(|t| BreedingError::invalid_state(contract_id, t))?;

        self.repository.save_incubation(&record).await?;
        self.repository.save_contract(&contract).await?;
        info!(
            "Contract {} incubating for {}h (ready at {})",
            contract_id, hours, record.estimated_completion
        );
        Ok((contract, record))
    }

    /// Breed the offspring of an incubating contract and record every side
    /// effect in one repository commit
    pub async fn complete(&self, contract_id: &str) -> Result<BreedingReceipt, BreedingError> {
        let _contract_guard = self.locks.acquire(&[contract_key(contract_id)]).await;
        let mut contract = self.load_contract(contract_id).await?;
        contract
            .check(ContractAction::Complete)
            .map_err(|t| BreedingError::invalid_state(contract_id, t))?;

        let now = self.clock.now();
        if self.config.enforce_incubation {
            if let Some(ready_at) = self.incubating_until(&contract, now).await? {
                return Err(BreedingError::IncubationPending {
                    contract_id: contract_id.to_string(),
                    ready_at,
                });
            }
        }

        let _swarm_guard = self
            .locks
            .acquire(&[swarm_key(&contract.parent1_id), swarm_key(&contract.parent2_id)])
            .await;
        let parent1 = self.profile(&contract.parent1_id).await?;
        let parent2 = self.profile(&contract.parent2_id).await?;
        ensure_capacity(&parent1)?;
        ensure_capacity(&parent2)?;
        self.ensure_cooled_down(&parent1, now)?;
        let lineage1 = self.repository.get_lineage(&parent1.swarm_id).await?;
        let lineage2 = self.repository.get_lineage(&parent2.swarm_id).await?;

        let outcome = {
            let mut rng = self.rng.lock().await;
            self.engine.breed(&parent1, &parent2, &mut **rng)
        };
        let mut offspring = outcome.offspring;
        offspring.owner_id = contract.offspring_owner.clone();
        debug!(
            "Bred {} from {} × {}: {} mutations, {} legendary traits",
            offspring.swarm_id,
            parent1.swarm_id,
            parent2.swarm_id,
            outcome.mutations.len(),
            outcome.legendary_traits.len()
        );

        let lineage = Lineage::offspring(
            offspring.swarm_id.clone(),
            offspring.generation,
            ParentLineage::new(&parent1.swarm_id, lineage1.as_ref()),
            ParentLineage::new(&parent2.swarm_id, lineage2.as_ref()),
            &outcome.legendary_traits,
        );
        contract
            .complete(offspring.swarm_id.clone(), now)
            .map_err(|t| BreedingError::invalid_state(contract_id, t))?;
        let achievement = (!outcome.legendary_traits.is_empty()).then(|| {
            BreedingAchievement::legendary_birth(
                &contract.offspring_owner,
                &offspring.swarm_id,
                self.config.legendary_bonus_reputation,
                now,
            )
        });

        let commit = BreedingCommit {
            parents: [
                (bred_at(&parent1, now), parent1.version),
                (bred_at(&parent2, now), parent2.version),
            ],
            offspring,
            lineage,
            mutations: outcome.mutations,
            contract,
            achievement,
            occurred_at: now,
        };
        self.repository.commit_breeding(&commit).await.map_err(|e| match e {
            RepositoryError::VersionConflict { swarm_id } => {
                warn!("Lost update race on swarm {}; contract {} left open", swarm_id, contract_id);
                BreedingError::ConcurrentModification { swarm_id }
            }
            other => BreedingError::Repository(other),
        })?;

        let BreedingCommit {
            offspring,
            lineage,
            mutations,
            contract,
            achievement,
            ..
        } = commit;
        info!(
            "Contract {} completed: {} ({:?} bloodline)",
            contract_id,
            offspring.summary(),
            lineage.bloodline_tier
        );
        Ok(BreedingReceipt {
            contract,
            offspring,
            mutations,
            legendary_traits: outcome.legendary_traits,
            lineage,
            achievement,
        })
    }

    pub async fn reject(&self, contract_id: &str) -> Result<BreedingContract, BreedingError> {
        let _guard = self.locks.acquire(&[contract_key(contract_id)]).await;
        let mut contract = self.load_contract(contract_id).await?;
        contract
            .reject(self.clock.now())
            .map_err(|t| BreedingError::invalid_state(contract_id, t))?;
        self.repository.save_contract(&contract).await?;
        info!("Contract {} rejected", contract_id);
        Ok(contract)
    }

    pub async fn cancel(&self, contract_id: &str) -> Result<BreedingContract, BreedingError> {
        let _guard = self.locks.acquire(&[contract_key(contract_id)]).await;
        let mut contract = self.load_contract(contract_id).await?;
        contract
            .cancel(self.clock.now())
            .map_err(|t| BreedingError::invalid_state(contract_id, t))?;
        self.repository.save_contract(&contract).await?;
        info!("Contract {} cancelled", contract_id);
        Ok(contract)
    }

    /// Ask the proof service whether both parents' tokens still verify
    pub async fn verify_contract_proofs(&self, contract_id: &str) -> Result<bool, BreedingError> {
        let contract = self.load_contract(contract_id).await?;
        let first = self.proofs.verify_proof(&contract.proofs.parent1).await?;
        let second = self.proofs.verify_proof(&contract.proofs.parent2).await?;
        Ok(first && second)
    }

    // ── Queries ──────────────────────────────────────────────

    pub async fn contract(&self, contract_id: &str) -> Result<BreedingContract, BreedingError> {
        self.load_contract(contract_id).await
    }

    pub async fn contracts_for_owner(&self, owner_id: &str) -> Result<Vec<BreedingContract>, BreedingError> {
        Ok(self.repository.contracts_for_owner(owner_id).await?)
    }

    pub async fn lineage(&self, swarm_id: &str) -> Result<Lineage, BreedingError> {
        self.repository
            .get_lineage(swarm_id)
            .await?
            .ok_or_else(|| BreedingError::not_found("lineage", swarm_id))
    }

    pub async fn mutations(&self, swarm_id: &str) -> Result<Vec<MutationEntry>, BreedingError> {
        Ok(self.repository.mutations_for(swarm_id).await?)
    }

    pub async fn incubation_status(&self, contract_id: &str) -> Result<Option<IncubationRecord>, BreedingError> {
        Ok(self.repository.get_incubation(contract_id).await?)
    }

    pub async fn achievements(&self, owner_id: &str) -> Result<Vec<BreedingAchievement>, BreedingError> {
        Ok(self.repository.achievements_for(owner_id).await?)
    }

    // ── Internals ────────────────────────────────────────────

    async fn load_contract(&self, contract_id: &str) -> Result<BreedingContract, BreedingError> {
        self.repository
            .get_contract(contract_id)
            .await?
            .ok_or_else(|| BreedingError::not_found("breeding contract", contract_id))
    }

    async fn performance_proof(&self, profile: &GeneticProfile, now: DateTime<Utc>) -> Result<String, BreedingError> {
        let claim = PerformanceClaim::new(&profile.swarm_id, profile.genetic_fitness, now);
        Ok(self.proofs.generate_proof(&claim.to_payload()?).await?)
    }

    /// End of the incubation window if it is still open. Falls back to the
    /// minimum window when the queue entry is missing.
    async fn incubating_until(
        &self,
        contract: &BreedingContract,
        now: DateTime<Utc>,
    ) -> Result<Option<DateTime<Utc>>, BreedingError> {
        if let Some(record) = self.repository.get_incubation(&contract.id).await? {
            return Ok((!record.is_ready(now)).then_some(record.estimated_completion));
        }
        let started = contract.incubation_started_at.unwrap_or(contract.proposed_at);
        let ready_at = started + Duration::hours(self.config.incubation_min_hours as i64);
        Ok((now < ready_at).then_some(ready_at))
    }

    fn ensure_cooled_down(&self, parent: &GeneticProfile, now: DateTime<Utc>) -> Result<(), BreedingError> {
        let cooldown = self.config.cooldown();
        if !parent.in_cooldown(now, cooldown) {
            return Ok(());
        }
        Err(BreedingError::CooldownActive {
            swarm_id: parent.swarm_id.clone(),
            until: parent.cooldown_until(cooldown).unwrap_or(now),
        })
    }
}

fn bred_at(parent: &GeneticProfile, now: DateTime<Utc>) -> GeneticProfile {
    let mut updated = parent.clone();
    updated.breeding_count += 1;
    updated.last_bred_at = Some(now);
    updated
}

fn require_id(field: &str, value: &str) -> Result<(), BreedingError> {
    if value.trim().is_empty() {
        return Err(BreedingError::Validation(format!("{} must not be empty", field)));
    }
    Ok(())
}

fn ensure_capacity(profile: &GeneticProfile) -> Result<(), BreedingError> {
    if profile.has_capacity() {
        return Ok(());
    }
    Err(BreedingError::CapacityExceeded {
        swarm_id: profile.swarm_id.clone(),
        breeding_count: profile.breeding_count,
        max_breeding: profile.max_breeding,
    })
}

fn validate_request(request: &ProposalRequest) -> Result<(), BreedingError> {
    require_id("parent1_id", &request.parent1_id)?;
    require_id("parent2_id", &request.parent2_id)?;
    require_id("parent1_owner", &request.parent1_owner)?;
    require_id("parent2_owner", &request.parent2_owner)?;
    require_id("offspring_owner", &request.offspring_owner)?;
    if request.parent1_id == request.parent2_id {
        return Err(BreedingError::Validation("a swarm cannot breed with itself".into()));
    }
    if !request.breeding_fee.is_finite() || request.breeding_fee < 0.0 {
        return Err(BreedingError::Validation(format!(
            "breeding_fee must be a non-negative amount, got {}",
            request.breeding_fee
        )));
    }
    if !(0.0..=100.0).contains(&request.profit_share_percent) {
        return Err(BreedingError::Validation(format!(
            "profit_share_percent must be within [0, 100], got {}",
            request.profit_share_percent
        )));
    }
    if request.profit_share_percent > 0.0 && request.profit_share_duration_days == 0 {
        return Err(BreedingError::Validation(
            "profit_share_duration_days must be positive when a share is offered".into(),
        ));
    }
    Ok(())
}
