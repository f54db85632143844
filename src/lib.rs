//! Swarm Genetics: heritable traits and breeding contracts for trading swarms
//!
//! Swarms carry a genome of twelve trading traits. Two owners agree a
//! breeding contract, the engine recombines the parents' genes with
//! mutations and rare legendary traits, and the offspring is recorded
//! with its lineage.

pub mod breeding;
pub mod clock;
pub mod config;
pub mod engine;
pub mod genome;
pub mod storage;
pub mod zk;

pub use breeding::{BreedingContract, BreedingContractManager, BreedingError, ContractStatus, ProposalRequest};
pub use config::BreedingConfig;
pub use engine::{GeneticEngine, RandomSource, RngSource};
pub use genome::{GeneticProfile, Lineage, Trait, TraitVector};
pub use storage::{GeneticsStore, Repository};
pub use zk::{DigestProofService, ProofService};
