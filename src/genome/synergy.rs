//! Synergies: named bonuses unlocked when two traits jointly run high

use super::{Trait, TraitVector};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Synergy {
    pub name: String,
    pub description: String,
    pub bonus: f64,
}

struct SynergyRule {
    name: &'static str,
    description: &'static str,
    bonus: f64,
    first: (Trait, f64),
    second: (Trait, f64),
}

const RULES: [SynergyRule; 6] = [
    SynergyRule {
        name: "Bold Predictor",
        description: "High risk tolerance combined with strong pattern recognition",
        bonus: 15.0,
        first: (Trait::RiskTolerance, 70.0),
        second: (Trait::PatternRecognition, 70.0),
    },
    SynergyRule {
        name: "Flash Trader",
        description: "Extreme speed with high adaptability",
        bonus: 20.0,
        first: (Trait::Speed, 75.0),
        second: (Trait::Adaptability, 75.0),
    },
    SynergyRule {
        name: "Strategic Hunter",
        description: "Patient waiting combined with aggressive execution",
        bonus: 18.0,
        first: (Trait::Patience, 70.0),
        second: (Trait::Aggression, 70.0),
    },
    SynergyRule {
        name: "Perfect Execution",
        description: "Maximum precision with unwavering discipline",
        bonus: 25.0,
        first: (Trait::Precision, 80.0),
        second: (Trait::Discipline, 80.0),
    },
    SynergyRule {
        name: "Visionary",
        description: "Strong intuition paired with creative problem-solving",
        bonus: 20.0,
        first: (Trait::Intuition, 75.0),
        second: (Trait::Creativity, 75.0),
    },
    SynergyRule {
        name: "Eternal Student",
        description: "Fast learning with tireless endurance",
        bonus: 15.0,
        first: (Trait::LearningRate, 70.0),
        second: (Trait::Endurance, 70.0),
    },
];

impl SynergyRule {
    fn matches(&self, traits: &TraitVector) -> bool {
        traits.get(self.first.0) > self.first.1 && traits.get(self.second.0) > self.second.1
    }
}

/// Every synergy whose thresholds the vector strictly exceeds, in table order
pub fn detect_synergies(traits: &TraitVector) -> Vec<Synergy> {
    RULES
        .iter()
        .filter(|rule| rule.matches(traits))
        .map(|rule| Synergy {
            name: rule.name.to_string(),
            description: rule.description.to_string(),
            bonus: rule.bonus,
        })
        .collect()
}
