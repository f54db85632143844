//! Genome: the heritable state of a swarm
//!
//! A profile = trait vector + dominant/recessive subsets + mutation rate
//! + generation + legendary traits + synergies. Lineage and mutation
//! records are the bookkeeping left behind by each breeding.

mod traits;
mod profile;
mod legendary;
mod mutation;
mod synergy;
mod lineage;

pub use traits::{clamp_trait, Trait, TraitVector, TRAIT_MAX, TRAIT_MIN};
pub use profile::{GeneticProfile, SwarmPerformance, TraitSubset, DEFAULT_MAX_BREEDING};
pub use legendary::{LegendaryRarity, LegendaryTrait, LegendaryTraitCatalog};
pub use mutation::{MutationRecord, MutationTable, MutationTableError, MutationType, RarityBand, RarityTier};
pub use synergy::{detect_synergies, Synergy};
pub use lineage::{BloodlineTier, Lineage, ParentLineage};
