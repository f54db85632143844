//! Lineage: ancestry tracking for swarms
//!
//! Each swarm carries a lineage record: its parents, the flattened set of
//! ancestors, a bloodline tier and an inbreeding coefficient. Records are
//! chained with SHA-256 so a child's hash commits to both parents' hashes.

use super::{LegendaryRarity, LegendaryTrait};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BloodlineTier {
    Common,
    Legendary,
    Mythic,
}

impl BloodlineTier {
    /// Tier earned by the legendary traits awarded at birth
    pub fn from_awards(awarded: &[LegendaryTrait]) -> Self {
        if awarded.iter().any(|t| t.rarity == LegendaryRarity::Mythic) {
            BloodlineTier::Mythic
        } else if !awarded.is_empty() {
            BloodlineTier::Legendary
        } else {
            BloodlineTier::Common
        }
    }
}

/// A parent as seen by lineage bookkeeping: its id plus its own record, if any
#[derive(Debug, Clone, Copy)]
pub struct ParentLineage<'a> {
    pub swarm_id: &'a str,
    pub lineage: Option<&'a Lineage>,
}

impl<'a> ParentLineage<'a> {
    pub fn new(swarm_id: &'a str, lineage: Option<&'a Lineage>) -> Self {
        Self { swarm_id, lineage }
    }

    /// Ancestors of this parent, including the parent itself
    fn ancestry(&self) -> Vec<String> {
        let mut ids: Vec<String> = self
            .lineage
            .map(|l| l.ancestor_ids.clone())
            .unwrap_or_default();
        if !ids.iter().any(|id| id == self.swarm_id) {
            ids.push(self.swarm_id.to_string());
        }
        ids
    }

    fn hash(&self) -> String {
        match self.lineage {
            Some(l) => l.lineage_hash.clone(),
            None => Lineage::genesis_hash(self.swarm_id),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lineage {
    pub swarm_id: String,
    pub generation: u32,
    pub parent1_id: Option<String>,
    pub parent2_id: Option<String>,
    pub ancestor_ids: Vec<String>,
    pub bloodline_tier: BloodlineTier,
    pub inbreeding_coefficient: f64,
    pub lineage_hash: String,
    pub recorded_at: DateTime<Utc>,
}

impl Lineage {
    /// Record for a first-generation swarm
    pub fn genesis(swarm_id: impl Into<String>) -> Self {
        let swarm_id = swarm_id.into();
        let lineage_hash = Self::genesis_hash(&swarm_id);
        Self {
            swarm_id,
            generation: 1,
            parent1_id: None,
            parent2_id: None,
            ancestor_ids: Vec::new(),
            bloodline_tier: BloodlineTier::Common,
            inbreeding_coefficient: 0.0,
            lineage_hash,
            recorded_at: Utc::now(),
        }
    }

    /// Record for a bred swarm
    pub fn offspring(
        swarm_id: impl Into<String>,
        generation: u32,
        parent1: ParentLineage<'_>,
        parent2: ParentLineage<'_>,
        awarded: &[LegendaryTrait],
    ) -> Self {
        let swarm_id = swarm_id.into();
        let a1 = parent1.ancestry();
        let a2 = parent2.ancestry();

        let mut ancestor_ids = Vec::with_capacity(a1.len() + a2.len());
        for id in a1.iter().chain(a2.iter()) {
            if !ancestor_ids.contains(id) {
                ancestor_ids.push(id.clone());
            }
        }

        let lineage_hash = Self::chain_hash(&parent1.hash(), &parent2.hash(), &swarm_id);
        Self {
            inbreeding_coefficient: Self::inbreeding(&a1, &a2),
            swarm_id,
            generation,
            parent1_id: Some(parent1.swarm_id.to_string()),
            parent2_id: Some(parent2.swarm_id.to_string()),
            ancestor_ids,
            bloodline_tier: BloodlineTier::from_awards(awarded),
            lineage_hash,
            recorded_at: Utc::now(),
        }
    }

    pub fn is_genesis(&self) -> bool {
        self.parent1_id.is_none() && self.parent2_id.is_none()
    }

    /// Recompute the hash from the parents' records and compare
    pub fn verify_chain(&self, parent1: Option<&Lineage>, parent2: Option<&Lineage>) -> bool {
        match (&self.parent1_id, &self.parent2_id) {
            (None, None) => self.lineage_hash == Self::genesis_hash(&self.swarm_id),
            (Some(p1), Some(p2)) => {
                let h1 = ParentLineage::new(p1, parent1).hash();
                let h2 = ParentLineage::new(p2, parent2).hash();
                self.lineage_hash == Self::chain_hash(&h1, &h2, &self.swarm_id)
            }
            _ => false,
        }
    }

    /// Jaccard overlap of the two parents' ancestries
    fn inbreeding(a1: &[String], a2: &[String]) -> f64 {
        let s1: HashSet<&String> = a1.iter().collect();
        let s2: HashSet<&String> = a2.iter().collect();
        let union = s1.union(&s2).count();
        if union == 0 {
            return 0.0;
        }
        s1.intersection(&s2).count() as f64 / union as f64
    }

    fn genesis_hash(swarm_id: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(b"genesis");
        hasher.update(swarm_id.as_bytes());
        hex::encode(hasher.finalize())
    }

    fn chain_hash(parent1_hash: &str, parent2_hash: &str, swarm_id: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(parent1_hash.as_bytes());
        hasher.update(parent2_hash.as_bytes());
        hasher.update(swarm_id.as_bytes());
        hasher.update(b"offspring");
        hex::encode(hasher.finalize())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::genome::LegendaryTraitCatalog;

    #[test]
    fn test_genesis() {
        let lineage = Lineage::genesis("alpha");
        assert_eq!(lineage.generation, 1);
        assert!(lineage.is_genesis());
        assert!(lineage.ancestor_ids.is_empty());
        assert_eq!(lineage.bloodline_tier, BloodlineTier::Common);
        assert!(lineage.verify_chain(None, None));
    }

    #[test]
    fn test_unrelated_parents() {
        let a = Lineage::genesis("a");
        let b = Lineage::genesis("b");
        let child = Lineage::offspring(
            "c",
            2,
            ParentLineage::new("a", Some(&a)),
            ParentLineage::new("b", Some(&b)),
            &[],
        );
        assert_eq!(child.ancestor_ids, vec!["a", "b"]);
        assert_eq!(child.inbreeding_coefficient, 0.0);
        assert_eq!(child.parent1_id.as_deref(), Some("a"));
        assert!(child.verify_chain(Some(&a), Some(&b)));
        assert!(!child.verify_chain(Some(&b), Some(&a)));
    }

    #[test]
    fn test_sibling_inbreeding() {
        let a = Lineage::genesis("a");
        let b = Lineage::genesis("b");
        let pa = ParentLineage::new("a", Some(&a));
        let pb = ParentLineage::new("b", Some(&b));
        let s1 = Lineage::offspring("s1", 2, pa, pb, &[]);
        let s2 = Lineage::offspring("s2", 2, pa, pb, &[]);

        let child = Lineage::offspring(
            "g",
            3,
            ParentLineage::new("s1", Some(&s1)),
            ParentLineage::new("s2", Some(&s2)),
            &[],
        );
        // {a, b, s1} vs {a, b, s2}: two shared out of four
        assert!((child.inbreeding_coefficient - 0.5).abs() < 1e-9);
        assert_eq!(child.ancestor_ids, vec!["a", "b", "s1", "s2"]);
    }

    #[test]
    fn test_missing_parent_records() {
        let child = Lineage::offspring(
            "c",
            2,
            ParentLineage::new("x", None),
            ParentLineage::new("y", None),
            &[],
        );
        assert_eq!(child.ancestor_ids, vec!["x", "y"]);
        assert!(child.verify_chain(None, None));
    }

    #[test]
    fn test_bloodline_tier() {
        let catalog = LegendaryTraitCatalog;
        let legendary = catalog.get("swarm_mind").cloned().unwrap();
        let mythic = catalog.get("quantum_leap").cloned().unwrap();
        assert_eq!(BloodlineTier::from_awards(&[]), BloodlineTier::Common);
        assert_eq!(BloodlineTier::from_awards(&[legendary.clone()]), BloodlineTier::Legendary);
        assert_eq!(BloodlineTier::from_awards(&[legendary, mythic]), BloodlineTier::Mythic);
    }
}
