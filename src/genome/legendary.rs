//! Legendary trait catalog
//!
//! A fixed registry of bonus abilities. An offspring receives one entry,
//! drawn uniformly, for every legendary-type mutation it rolls.

use crate::engine::RandomSource;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LegendaryRarity {
    Legendary,
    Mythic,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegendaryTrait {
    pub id: String,
    pub name: String,
    pub description: String,
    pub effect: String,
    pub rarity: LegendaryRarity,
    pub bonus_value: f64,
}

const ENTRIES: [(&str, &str, &str, &str, LegendaryRarity, f64); 8] = [
    (
        "swarm_mind",
        "Swarm Mind",
        "Enhanced coordination with other swarms",
        "+20% performance when coordinating with other swarms",
        LegendaryRarity::Legendary,
        20.0,
    ),
    (
        "alpha_instinct",
        "Alpha Instinct",
        "First to detect market opportunities",
        "Detects opportunities 10 seconds earlier",
        LegendaryRarity::Legendary,
        15.0,
    ),
    (
        "phoenix_protocol",
        "Phoenix Protocol",
        "Rapid recovery from losses",
        "50% faster recovery from losing trades",
        LegendaryRarity::Legendary,
        50.0,
    ),
    (
        "quantum_leap",
        "Quantum Leap",
        "Advanced pattern prediction",
        "Can predict 2 steps ahead in market patterns",
        LegendaryRarity::Mythic,
        25.0,
    ),
    (
        "diamond_hands",
        "Diamond Hands",
        "Unshakeable confidence",
        "Reduced panic-selling by 70% in downturns",
        LegendaryRarity::Legendary,
        70.0,
    ),
    (
        "whale_whisperer",
        "Whale Whisperer",
        "Superior whale detection",
        "Detects whale movements 30 seconds earlier",
        LegendaryRarity::Legendary,
        30.0,
    ),
    (
        "perfect_balance",
        "Perfect Balance",
        "Optimal risk/reward ratios",
        "Maintains exact risk/reward targets automatically",
        LegendaryRarity::Mythic,
        35.0,
    ),
    (
        "time_traveler",
        "Time Traveler",
        "Enhanced historical analysis",
        "Historical pattern recognition +40%",
        LegendaryRarity::Legendary,
        40.0,
    ),
];

/// Read-only view over the built-in legendary traits
#[derive(Debug, Clone, Copy, Default)]
pub struct LegendaryTraitCatalog;

impl LegendaryTraitCatalog {
    pub fn all(&self) -> &'static [LegendaryTrait] {
        static CATALOG: OnceLock<Vec<LegendaryTrait>> = OnceLock::new();
        CATALOG.get_or_init(|| {
            ENTRIES
                .iter()
                .map(|&(id, name, description, effect, rarity, bonus_value)| LegendaryTrait {
                    id: id.to_string(),
                    name: name.to_string(),
                    description: description.to_string(),
                    effect: effect.to_string(),
                    rarity,
                    bonus_value,
                })
                .collect()
        })
    }

    pub fn get(&self, id: &str) -> Option<&'static LegendaryTrait> {
        self.all().iter().find(|t| t.id == id)
    }

    pub fn len(&self) -> usize {
        ENTRIES.len()
    }

    pub fn is_empty(&self) -> bool {
        ENTRIES.is_empty()
    }

    /// Draw one entry uniformly
    pub fn draw<R: RandomSource + ?Sized>(&self, rng: &mut R) -> LegendaryTrait {
        let all = self.all();
        all[rng.index(all.len())].clone()
    }
}
