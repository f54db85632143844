//! GeneticProfile: a swarm's complete genetic state

use super::{LegendaryTrait, Synergy, Trait, TraitVector};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A subset of traits (dominant or recessive) with the value captured for each
pub type TraitSubset = BTreeMap<Trait, f64>;

pub const DEFAULT_MAX_BREEDING: u32 = 5;

/// Observed trading performance feeding the fitness score
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SwarmPerformance {
    /// Percentage of winning trades, 0..=100
    pub win_rate: f64,
    pub total_profit: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneticProfile {
    pub swarm_id: String,
    pub owner_id: String,
    pub traits: TraitVector,
    pub dominant: TraitSubset,
    pub recessive: TraitSubset,
    /// Percent chance per trait of mutating when this profile's genes are produced
    pub mutation_rate: f64,
    pub generation: u32,
    pub parent_ids: Vec<String>,
    pub legendary_traits: Vec<LegendaryTrait>,
    pub synergies: Vec<Synergy>,
    pub genetic_fitness: f64,
    pub breeding_count: u32,
    pub max_breeding: u32,
    pub last_bred_at: Option<DateTime<Utc>>,
    /// Optimistic concurrency token, bumped by the store on every conditional write
    #[serde(default)]
    pub version: u64,
    pub created_at: DateTime<Utc>,
}

impl GeneticProfile {
    pub fn is_dominant(&self, t: Trait) -> bool {
        self.dominant.contains_key(&t)
    }

    pub fn is_recessive(&self, t: Trait) -> bool {
        self.recessive.contains_key(&t)
    }

    pub fn has_capacity(&self) -> bool {
        self.breeding_count < self.max_breeding
    }

    pub fn remaining_breedings(&self) -> u32 {
        self.max_breeding.saturating_sub(self.breeding_count)
    }

    /// Earliest moment this profile may lead a new proposal
    pub fn cooldown_until(&self, cooldown: chrono::Duration) -> Option<DateTime<Utc>> {
        self.last_bred_at.map(|t| t + cooldown)
    }

    pub fn in_cooldown(&self, now: DateTime<Utc>, cooldown: chrono::Duration) -> bool {
        self.cooldown_until(cooldown).is_some_and(|until| now < until)
    }

    pub fn summary(&self) -> String {
        format!(
            "Swarm '{}' | gen={} | fitness={:.2} | mutation={:.1}% | bred {}/{} | dominant={} | legendary={} | synergies={}",
            self.swarm_id,
            self.generation,
            self.genetic_fitness,
            self.mutation_rate,
            self.breeding_count,
            self.max_breeding,
            self.dominant.len(),
            self.legendary_traits.len(),
            self.synergies.len()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn profile() -> GeneticProfile {
        GeneticProfile {
            swarm_id: "swarm-a".into(),
            owner_id: "owner-a".into(),
            traits: TraitVector::default(),
            dominant: TraitSubset::from([(Trait::Speed, 50.0)]),
            recessive: TraitSubset::new(),
            mutation_rate: 5.0,
            generation: 1,
            parent_ids: Vec::new(),
            legendary_traits: Vec::new(),
            synergies: Vec::new(),
            genetic_fitness: 15.0,
            breeding_count: 0,
            max_breeding: DEFAULT_MAX_BREEDING,
            last_bred_at: None,
            version: 0,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_capacity() {
        let mut p = profile();
        assert!(p.has_capacity());
        assert_eq!(p.remaining_breedings(), 5);
        p.breeding_count = 5;
        assert!(!p.has_capacity());
        assert_eq!(p.remaining_breedings(), 0);
    }

    #[test]
    fn test_cooldown() {
        let now = Utc::now();
        let week = Duration::days(7);
        let mut p = profile();
        assert!(!p.in_cooldown(now, week));
        p.last_bred_at = Some(now - Duration::days(3));
        assert!(p.in_cooldown(now, week));
        p.last_bred_at = Some(now - Duration::days(8));
        assert!(!p.in_cooldown(now, week));
    }

    #[test]
    fn test_dominance_lookup() {
        let p = profile();
        assert!(p.is_dominant(Trait::Speed));
        assert!(!p.is_dominant(Trait::Patience));
        assert!(!p.is_recessive(Trait::Speed));
        assert!(p.summary().contains("gen=1"));
    }
}
