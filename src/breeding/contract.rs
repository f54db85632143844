//! Breeding contracts and their lifecycle
//!
//! proposed → accepted → incubating → completed, with `rejected` reachable
//! from proposed and `cancelled` from any non-terminal state. Terminal
//! contracts never change again.

use crate::genome::LegendaryRarity;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContractStatus {
    Proposed,
    Accepted,
    Incubating,
    Completed,
    Cancelled,
    Rejected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContractAction {
    Accept,
    StartIncubation,
    Complete,
    Reject,
    Cancel,
}

impl ContractStatus {
    /// The transition table. `None` means the action is not allowed here.
    pub fn apply(self, action: ContractAction) -> Option<ContractStatus> {
        use ContractAction as A;
        use ContractStatus as S;
        match self {
            S::Proposed => match action {
                A::Accept => Some(S::Accepted),
                A::Reject => Some(S::Rejected),
                A::Cancel => Some(S::Cancelled),
                A::StartIncubation | A::Complete => None,
            },
            S::Accepted => match action {
                A::StartIncubation => Some(S::Incubating),
                A::Cancel => Some(S::Cancelled),
                A::Accept | A::Complete | A::Reject => None,
            },
            S::Incubating => match action {
                A::Complete => Some(S::Completed),
                A::Cancel => Some(S::Cancelled),
                A::Accept | A::StartIncubation | A::Reject => None,
            },
            S::Completed | S::Cancelled | S::Rejected => None,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, ContractStatus::Completed | ContractStatus::Cancelled | ContractStatus::Rejected)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ContractStatus::Proposed => "proposed",
            ContractStatus::Accepted => "accepted",
            ContractStatus::Incubating => "incubating",
            ContractStatus::Completed => "completed",
            ContractStatus::Cancelled => "cancelled",
            ContractStatus::Rejected => "rejected",
        }
    }
}

impl fmt::Display for ContractStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for ContractAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ContractAction::Accept => "accept",
            ContractAction::StartIncubation => "start_incubation",
            ContractAction::Complete => "complete",
            ContractAction::Reject => "reject",
            ContractAction::Cancel => "cancel",
        };
        f.write_str(name)
    }
}

/// Rejected transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidTransition {
    pub from: ContractStatus,
    pub action: ContractAction,
}

/// What the two owners agree to at proposal time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProposalRequest {
    pub parent1_id: String,
    pub parent2_id: String,
    pub parent1_owner: String,
    pub parent2_owner: String,
    pub offspring_owner: String,
    pub breeding_fee: f64,
    pub profit_share_percent: f64,
    pub profit_share_duration_days: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContractTerms {
    pub min_compatibility: f64,
    pub mutation_chance: f64,
    pub estimated_generation: u32,
}

/// Performance proof tokens for both parents, opaque to the engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParentProofs {
    pub parent1: String,
    pub parent2: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreedingContract {
    pub id: String,
    pub parent1_id: String,
    pub parent2_id: String,
    pub parent1_owner: String,
    pub parent2_owner: String,
    pub offspring_owner: String,
    pub offspring_id: Option<String>,
    pub breeding_fee: f64,
    pub profit_share_percent: f64,
    pub profit_share_duration_days: u32,
    status: ContractStatus,
    pub proofs: ParentProofs,
    compatibility_score: f64,
    predicted_fitness: f64,
    pub terms: ContractTerms,
    pub proposed_at: DateTime<Utc>,
    pub accepted_at: Option<DateTime<Utc>>,
    pub incubation_started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub closed_at: Option<DateTime<Utc>>,
}

impl BreedingContract {
    /// A fresh contract in `proposed`; scores are fixed from here on
    pub fn propose(
        request: ProposalRequest,
        compatibility_score: f64,
        predicted_fitness: f64,
        proofs: ParentProofs,
        terms: ContractTerms,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            parent1_id: request.parent1_id,
            parent2_id: request.parent2_id,
            parent1_owner: request.parent1_owner,
            parent2_owner: request.parent2_owner,
            offspring_owner: request.offspring_owner,
            offspring_id: None,
            breeding_fee: request.breeding_fee,
            profit_share_percent: request.profit_share_percent,
            profit_share_duration_days: request.profit_share_duration_days,
            status: ContractStatus::Proposed,
            proofs,
            compatibility_score,
            predicted_fitness,
            terms,
            proposed_at: now,
            accepted_at: None,
            incubation_started_at: None,
            completed_at: None,
            closed_at: None,
        }
    }

    pub fn status(&self) -> ContractStatus {
        self.status
    }

    pub fn compatibility_score(&self) -> f64 {
        self.compatibility_score
    }

    pub fn predicted_fitness(&self) -> f64 {
        self.predicted_fitness
    }

    pub fn is_party(&self, owner_id: &str) -> bool {
        self.parent1_owner == owner_id || self.parent2_owner == owner_id || self.offspring_owner == owner_id
    }

    /// Check an action against the table without applying it
    pub fn check(&self, action: ContractAction) -> Result<ContractStatus, InvalidTransition> {
        self.status.apply(action).ok_or(InvalidTransition {
            from: self.status,
            action,
        })
    }

    fn apply(&mut self, action: ContractAction, now: DateTime<Utc>) -> Result<(), InvalidTransition> {
        let next = self.check(action)?;
        match next {
            ContractStatus::Accepted => self.accepted_at = Some(now),
            ContractStatus::Incubating => self.incubation_started_at = Some(now),
            ContractStatus::Completed => self.completed_at = Some(now),
            ContractStatus::Cancelled | ContractStatus::Rejected => self.closed_at = Some(now),
            ContractStatus::Proposed => {}
        }
        self.status = next;
        Ok(())
    }

    pub fn accept(&mut self, now: DateTime<Utc>) -> Result<(), InvalidTransition> {
        self.apply(ContractAction::Accept, now)
    }

    pub fn start_incubation(&mut self, now: DateTime<Utc>) -> Result<(), InvalidTransition> {
        self.apply(ContractAction::StartIncubation, now)
    }

    pub fn complete(&mut self, offspring_id: impl Into<String>, now: DateTime<Utc>) -> Result<(), InvalidTransition> {
        self.apply(ContractAction::Complete, now)?;
        self.offspring_id = Some(offspring_id.into());
        Ok(())
    }

    pub fn reject(&mut self, now: DateTime<Utc>) -> Result<(), InvalidTransition> {
        self.apply(ContractAction::Reject, now)
    }

    pub fn cancel(&mut self, now: DateTime<Utc>) -> Result<(), InvalidTransition> {
        self.apply(ContractAction::Cancel, now)
    }

    pub fn summary(&self) -> String {
        format!(
            "Contract {} | {} × {} | status={} | compat={:.1} | predicted={:.1} | fee={:.2} | share={:.1}%/{}d",
            self.id,
            self.parent1_id,
            self.parent2_id,
            self.status,
            self.compatibility_score,
            self.predicted_fitness,
            self.breeding_fee,
            self.profit_share_percent,
            self.profit_share_duration_days
        )
    }
}

/// Entry in the incubation queue
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncubationRecord {
    pub contract_id: String,
    pub owner_id: String,
    pub duration_hours: u32,
    pub started_at: DateTime<Utc>,
    pub estimated_completion: DateTime<Utc>,
}

impl IncubationRecord {
    pub fn new(contract_id: &str, owner_id: &str, duration_hours: u32, started_at: DateTime<Utc>) -> Self {
        Self {
            contract_id: contract_id.to_string(),
            owner_id: owner_id.to_string(),
            duration_hours,
            started_at,
            estimated_completion: started_at + Duration::hours(duration_hours as i64),
        }
    }

    pub fn is_ready(&self, now: DateTime<Utc>) -> bool {
        now >= self.estimated_completion
    }

    pub fn remaining(&self, now: DateTime<Utc>) -> Duration {
        (self.estimated_completion - now).max(Duration::zero())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AchievementKind {
    LegendaryOffspring,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreedingAchievement {
    pub id: String,
    pub owner_id: String,
    pub swarm_id: String,
    pub kind: AchievementKind,
    pub name: String,
    pub description: String,
    pub rarity: LegendaryRarity,
    pub bonus_reputation: u32,
    pub earned_at: DateTime<Utc>,
}

impl BreedingAchievement {
    pub fn legendary_birth(owner_id: &str, swarm_id: &str, bonus_reputation: u32, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            owner_id: owner_id.to_string(),
            swarm_id: swarm_id.to_string(),
            kind: AchievementKind::LegendaryOffspring,
            name: "Legendary Birth".to_string(),
            description: "Bred a swarm with legendary traits".to_string(),
            rarity: LegendaryRarity::Legendary,
            bonus_reputation,
            earned_at: now,
        }
    }
}
