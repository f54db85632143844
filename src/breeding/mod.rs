//! Breeding: contracts between swarm owners and the workflow that runs them
//!
//! - BreedingContract: the agreement and its status machine
//! - BreedingContractManager: propose, accept, incubate, complete, reject, cancel
//! - IncubationRecord / BreedingAchievement: side records of a breeding

mod contract;
mod error;
mod locks;
mod manager;

pub use contract::{
    AchievementKind, BreedingAchievement, BreedingContract, ContractAction, ContractStatus, ContractTerms,
    IncubationRecord, InvalidTransition, ParentProofs, ProposalRequest,
};
pub use error::BreedingError;
pub use manager::{BreedingContractManager, BreedingReceipt};
