//! Mutations: post-inheritance trait adjustments
//!
//! Once a trait is selected for mutation a single roll in [0, 100) decides
//! the mutation type; beneficial mutations roll again in [0, 1) for a rarity
//! tier. The thresholds live in a `MutationTable` so they can be tuned
//! without touching the engine. All boundaries are half-open (`roll < t`).

use super::Trait;
use crate::engine::RandomSource;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MutationType {
    Beneficial,
    Neutral,
    Detrimental,
    Legendary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RarityTier {
    Common,
    Uncommon,
    Rare,
    Epic,
    Legendary,
    Mythic,
}

/// A mutation applied to one trait of an offspring
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MutationRecord {
    pub trait_affected: Trait,
    pub mutation_type: MutationType,
    pub mutation_name: String,
    pub mutation_description: String,
    pub rarity_tier: RarityTier,
    pub effect_value: f64,
    pub is_hereditary: bool,
}

impl MutationRecord {
    /// Detrimental effects are negative, beneficial and legendary positive
    pub fn sign_is_consistent(&self) -> bool {
        match self.mutation_type {
            MutationType::Detrimental => self.effect_value < 0.0,
            MutationType::Beneficial | MutationType::Legendary => self.effect_value > 0.0,
            MutationType::Neutral => true,
        }
    }
}

/// Rarity band for beneficial mutations: applies when the rarity roll is below `below`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RarityBand {
    pub below: f64,
    pub tier: RarityTier,
    pub effect: f64,
}

#[derive(Debug, Error)]
pub enum MutationTableError {
    #[error("type thresholds must ascend within [0, 100]: {0}")]
    Thresholds(String),

    #[error("effect sign mismatch: {0}")]
    EffectSign(String),

    #[error("rarity bands must ascend within [0, 1]: {0}")]
    RarityBands(String),
}

/// Configurable classification table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MutationTable {
    /// roll < legendary_below → legendary
    pub legendary_below: f64,
    pub legendary_effect: f64,
    /// roll < detrimental_below → detrimental
    pub detrimental_below: f64,
    pub detrimental_effect: f64,
    /// roll < neutral_below → neutral, effect uniform in ±neutral_spread
    pub neutral_below: f64,
    pub neutral_spread: f64,
    /// Ascending bands checked in order; the first match wins
    pub rarity_bands: Vec<RarityBand>,
    /// Effect when no band matches
    pub common_effect: f64,
}

impl Default for MutationTable {
    fn default() -> Self {
        Self {
            legendary_below: 5.0,
            legendary_effect: 25.0,
            detrimental_below: 25.0,
            detrimental_effect: -15.0,
            neutral_below: 60.0,
            neutral_spread: 5.0,
            rarity_bands: vec![
                RarityBand { below: 0.01, tier: RarityTier::Mythic, effect: 25.0 },
                RarityBand { below: 0.05, tier: RarityTier::Legendary, effect: 20.0 },
                RarityBand { below: 0.15, tier: RarityTier::Epic, effect: 15.0 },
                RarityBand { below: 0.35, tier: RarityTier::Rare, effect: 12.0 },
                RarityBand { below: 0.60, tier: RarityTier::Uncommon, effect: 10.0 },
            ],
            common_effect: 8.0,
        }
    }
}

impl MutationTable {
    pub fn validate(&self) -> Result<(), MutationTableError> {
        let ordered = 0.0 <= self.legendary_below
            && self.legendary_below <= self.detrimental_below
            && self.detrimental_below <= self.neutral_below
            && self.neutral_below <= 100.0;
        if !ordered {
            return Err(MutationTableError::Thresholds(format!(
                "{} / {} / {}",
                self.legendary_below, self.detrimental_below, self.neutral_below
            )));
        }
        if self.legendary_effect <= 0.0 {
            return Err(MutationTableError::EffectSign("legendary effect must be positive".into()));
        }
        if self.detrimental_effect >= 0.0 {
            return Err(MutationTableError::EffectSign("detrimental effect must be negative".into()));
        }
        if self.neutral_spread < 0.0 {
            return Err(MutationTableError::EffectSign("neutral spread must be non-negative".into()));
        }
        if self.common_effect <= 0.0 || self.rarity_bands.iter().any(|b| b.effect <= 0.0) {
            return Err(MutationTableError::EffectSign("beneficial effects must be positive".into()));
        }
        let mut prev = 0.0;
        for band in &self.rarity_bands {
            if band.below < prev || band.below > 1.0 {
                return Err(MutationTableError::RarityBands(format!("{:?}", band.tier)));
            }
            prev = band.below;
        }
        Ok(())
    }

    /// Classify a trait already selected for mutation
    pub fn roll<R: RandomSource + ?Sized>(&self, t: Trait, rng: &mut R) -> MutationRecord {
        let roll = rng.next_f64() * 100.0;
        let name = t.display_name();
        let key = t.key();

        if roll < self.legendary_below {
            MutationRecord {
                trait_affected: t,
                mutation_type: MutationType::Legendary,
                mutation_name: format!("Legendary {}", name),
                mutation_description: format!("Exceptional enhancement to {}", key),
                rarity_tier: RarityTier::Legendary,
                effect_value: self.legendary_effect,
                is_hereditary: true,
            }
        } else if roll < self.detrimental_below {
            MutationRecord {
                trait_affected: t,
                mutation_type: MutationType::Detrimental,
                mutation_name: format!("Weakened {}", name),
                mutation_description: format!("Reduced {} capability", key),
                rarity_tier: RarityTier::Common,
                effect_value: self.detrimental_effect,
                is_hereditary: true,
            }
        } else if roll < self.neutral_below {
            MutationRecord {
                trait_affected: t,
                mutation_type: MutationType::Neutral,
                mutation_name: format!("Shifted {}", name),
                mutation_description: format!("Minor adjustment to {}", key),
                rarity_tier: RarityTier::Common,
                effect_value: rng.uniform(-self.neutral_spread, self.neutral_spread),
                is_hereditary: false,
            }
        } else {
            let (rarity_tier, effect_value) = self.rarity_for(rng.next_f64());
            MutationRecord {
                trait_affected: t,
                mutation_type: MutationType::Beneficial,
                mutation_name: format!("Enhanced {}", name),
                mutation_description: format!("Improved {} through mutation", key),
                rarity_tier,
                effect_value,
                is_hereditary: true,
            }
        }
    }

    /// Map a rarity roll in [0, 1) to a tier and effect
    pub fn rarity_for(&self, r: f64) -> (RarityTier, f64) {
        self.rarity_bands
            .iter()
            .find(|band| r < band.below)
            .map(|band| (band.tier, band.effect))
            .unwrap_or((RarityTier::Common, self.common_effect))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::SequenceSource;

    fn classify(draws: Vec<f64>) -> MutationRecord {
        MutationTable::default().roll(Trait::Speed, &mut SequenceSource::new(draws))
    }

    #[test]
    fn test_type_boundaries() {
        assert_eq!(classify(vec![0.0]).mutation_type, MutationType::Legendary);
        assert_eq!(classify(vec![0.0499]).mutation_type, MutationType::Legendary);
        assert_eq!(classify(vec![0.05]).mutation_type, MutationType::Detrimental);
        assert_eq!(classify(vec![0.2499]).mutation_type, MutationType::Detrimental);
        assert_eq!(classify(vec![0.25, 0.5]).mutation_type, MutationType::Neutral);
        assert_eq!(classify(vec![0.5999, 0.5]).mutation_type, MutationType::Neutral);
        assert_eq!(classify(vec![0.61, 0.9]).mutation_type, MutationType::Beneficial);
    }

    #[test]
    fn test_effects_and_heredity() {
        let legendary = classify(vec![0.01]);
        assert_eq!(legendary.effect_value, 25.0);
        assert!(legendary.is_hereditary);
        assert_eq!(legendary.mutation_name, "Legendary Speed");

        let detrimental = classify(vec![0.1]);
        assert_eq!(detrimental.effect_value, -15.0);
        assert!(detrimental.is_hereditary);

        let neutral = classify(vec![0.3, 0.75]);
        assert!((neutral.effect_value - 2.5).abs() < 1e-9);
        assert!(!neutral.is_hereditary);
    }

    #[test]
    fn test_rarity_boundaries() {
        let table = MutationTable::default();
        assert_eq!(table.rarity_for(0.0), (RarityTier::Mythic, 25.0));
        assert_eq!(table.rarity_for(0.0099), (RarityTier::Mythic, 25.0));
        assert_eq!(table.rarity_for(0.01), (RarityTier::Legendary, 20.0));
        assert_eq!(table.rarity_for(0.05), (RarityTier::Epic, 15.0));
        assert_eq!(table.rarity_for(0.15), (RarityTier::Rare, 12.0));
        assert_eq!(table.rarity_for(0.35), (RarityTier::Uncommon, 10.0));
        assert_eq!(table.rarity_for(0.60), (RarityTier::Common, 8.0));
        assert_eq!(table.rarity_for(0.99), (RarityTier::Common, 8.0));
    }

    #[test]
    fn test_sign_matches_type() {
        let mut rng = crate::engine::RngSource::seeded(11);
        let table = MutationTable::default();
        for _ in 0..500 {
            let m = table.roll(Trait::Intuition, &mut rng);
            assert!(m.sign_is_consistent(), "{:?}", m);
        }
    }

    #[test]
    fn test_validate() {
        assert!(MutationTable::default().validate().is_ok());

        let inverted = MutationTable { legendary_below: 30.0, ..MutationTable::default() };
        assert!(matches!(inverted.validate(), Err(MutationTableError::Thresholds(_))));

        let positive_detriment = MutationTable { detrimental_effect: 3.0, ..MutationTable::default() };
        assert!(matches!(positive_detriment.validate(), Err(MutationTableError::EffectSign(_))));

        let mut unordered = MutationTable::default();
        unordered.rarity_bands.swap(0, 4);
        assert!(matches!(unordered.validate(), Err(MutationTableError::RarityBands(_))));
    }
}
