use super::{ContractAction, ContractStatus, InvalidTransition};
use crate::storage::RepositoryError;
use crate::zk::ProofError;
use chrono::{DateTime, Utc};
use thiserror::Error;

/// Failures of the breeding workflow. Every variant is raised before any
/// write for the failing operation has been attempted, except the
/// `Repository` variant, which reports the store's own failure.
#[derive(Debug, Error)]
pub enum BreedingError {
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    #[error("cannot {action} contract {contract_id} while it is {status}")]
    InvalidState {
        contract_id: String,
        status: ContractStatus,
        action: ContractAction,
    },

    #[error("swarm {swarm_id} has used its breeding capacity ({breeding_count}/{max_breeding})")]
    CapacityExceeded {
        swarm_id: String,
        breeding_count: u32,
        max_breeding: u32,
    },

    #[error("swarm {swarm_id} is cooling down until {until}")]
    CooldownActive { swarm_id: String, until: DateTime<Utc> },

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("contract {contract_id} is still incubating until {ready_at}")]
    IncubationPending { contract_id: String, ready_at: DateTime<Utc> },

    #[error("swarm {swarm_id} was modified concurrently")]
    ConcurrentModification { swarm_id: String },

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error(transparent)]
    Proof(#[from] ProofError),
}

impl BreedingError {
    pub(crate) fn not_found(kind: &'static str, id: &str) -> Self {
        BreedingError::NotFound { kind, id: id.to_string() }
    }

    pub(crate) fn invalid_state(contract_id: &str, transition: InvalidTransition) -> Self {
        BreedingError::InvalidState {
            contract_id: contract_id.to_string(),
            status: transition.from,
            action: transition.action,
        }
    }
}
