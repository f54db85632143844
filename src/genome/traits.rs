//! Trait vector: the twelve behavioural genes of a swarm
//!
//! Every trait is a real number in [0, 100]. All writes go through
//! `TraitVector::set`, which clamps, so the bound holds after any mutation.

use serde::{Deserialize, Serialize};
use std::fmt;

pub const TRAIT_MIN: f64 = 0.0;
pub const TRAIT_MAX: f64 = 100.0;

/// Clamp a raw trait value into [0, 100]
pub fn clamp_trait(value: f64) -> f64 {
    if value.is_nan() {
        return TRAIT_MIN;
    }
    value.clamp(TRAIT_MIN, TRAIT_MAX)
}

/// One of the twelve named traits
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trait {
    Aggression,
    Patience,
    RiskTolerance,
    PatternRecognition,
    Speed,
    Adaptability,
    Precision,
    Endurance,
    LearningRate,
    Intuition,
    Discipline,
    Creativity,
}

impl Trait {
    /// All traits in canonical order
    pub const ALL: [Trait; 12] = [
        Trait::Aggression,
        Trait::Patience,
        Trait::RiskTolerance,
        Trait::PatternRecognition,
        Trait::Speed,
        Trait::Adaptability,
        Trait::Precision,
        Trait::Endurance,
        Trait::LearningRate,
        Trait::Intuition,
        Trait::Discipline,
        Trait::Creativity,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Trait::Aggression => "aggression",
            Trait::Patience => "patience",
            Trait::RiskTolerance => "risk_tolerance",
            Trait::PatternRecognition => "pattern_recognition",
            Trait::Speed => "speed",
            Trait::Adaptability => "adaptability",
            Trait::Precision => "precision",
            Trait::Endurance => "endurance",
            Trait::LearningRate => "learning_rate",
            Trait::Intuition => "intuition",
            Trait::Discipline => "discipline",
            Trait::Creativity => "creativity",
        }
    }

    /// Human-readable name, e.g. "Pattern Recognition"
    pub fn display_name(self) -> String {
        self.key()
            .split('_')
            .map(|word| {
                let mut chars = word.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().chain(chars).collect(),
                    None => String::new(),
                }
            })
            .collect::<Vec<String>>()
            .join(" ")
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Trait::ALL.iter().copied().find(|t| t.key() == key)
    }
}

impl fmt::Display for Trait {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// The full set of twelve trait scores
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "StoredTraits")]
pub struct TraitVector {
    aggression: f64,
    patience: f64,
    risk_tolerance: f64,
    pattern_recognition: f64,
    speed: f64,
    adaptability: f64,
    precision: f64,
    endurance: f64,
    learning_rate: f64,
    intuition: f64,
    discipline: f64,
    creativity: f64,
}

/// Wire form of a `TraitVector`; values are clamped on the way in
#[derive(Deserialize)]
struct StoredTraits {
    aggression: f64,
    patience: f64,
    risk_tolerance: f64,
    pattern_recognition: f64,
    speed: f64,
    adaptability: f64,
    precision: f64,
    endurance: f64,
    learning_rate: f64,
    intuition: f64,
    discipline: f64,
    creativity: f64,
}

impl From<StoredTraits> for TraitVector {
    fn from(raw: StoredTraits) -> Self {
        let unchecked = TraitVector {
            aggression: raw.aggression,
            patience: raw.patience,
            risk_tolerance: raw.risk_tolerance,
            pattern_recognition: raw.pattern_recognition,
            speed: raw.speed,
            adaptability: raw.adaptability,
            precision: raw.precision,
            endurance: raw.endurance,
            learning_rate: raw.learning_rate,
            intuition: raw.intuition,
            discipline: raw.discipline,
            creativity: raw.creativity,
        };
        Self::from_fn(|t| unchecked.get(t))
    }
}

impl Default for TraitVector {
    fn default() -> Self {
        Self::uniform(50.0)
    }
}

impl TraitVector {
    /// Every trait set to the same (clamped) value
    pub fn uniform(value: f64) -> Self {
        let v = clamp_trait(value);
        Self {
            aggression: v,
            patience: v,
            risk_tolerance: v,
            pattern_recognition: v,
            speed: v,
            adaptability: v,
            precision: v,
            endurance: v,
            learning_rate: v,
            intuition: v,
            discipline: v,
            creativity: v,
        }
    }

    /// Build a vector from a per-trait function
    pub fn from_fn(mut f: impl FnMut(Trait) -> f64) -> Self {
        let mut vector = Self::uniform(0.0);
        for t in Trait::ALL {
            vector.set(t, f(t));
        }
        vector
    }

    pub fn get(&self, t: Trait) -> f64 {
        match t {
            Trait::Aggression => self.aggression,
            Trait::Patience => self.patience,
            Trait::RiskTolerance => self.risk_tolerance,
            Trait::PatternRecognition => self.pattern_recognition,
            Trait::Speed => self.speed,
            Trait::Adaptability => self.adaptability,
            Trait::Precision => self.precision,
            Trait::Endurance => self.endurance,
            Trait::LearningRate => self.learning_rate,
            Trait::Intuition => self.intuition,
            Trait::Discipline => self.discipline,
            Trait::Creativity => self.creativity,
        }
    }

    /// Set a trait, clamping into [0, 100]
    pub fn set(&mut self, t: Trait, value: f64) {
        let v = clamp_trait(value);
        let slot = match t {
            Trait::Aggression => &mut self.aggression,
            Trait::Patience => &mut self.patience,
            Trait::RiskTolerance => &mut self.risk_tolerance,
            Trait::PatternRecognition => &mut self.pattern_recognition,
            Trait::Speed => &mut self.speed,
            Trait::Adaptability => &mut self.adaptability,
            Trait::Precision => &mut self.precision,
            Trait::Endurance => &mut self.endurance,
            Trait::LearningRate => &mut self.learning_rate,
            Trait::Intuition => &mut self.intuition,
            Trait::Discipline => &mut self.discipline,
            Trait::Creativity => &mut self.creativity,
        };
        *slot = v;
    }

    /// Shift a trait by `delta`, clamping the result
    pub fn adjust(&mut self, t: Trait, delta: f64) {
        self.set(t, self.get(t) + delta);
    }

    pub fn iter(&self) -> impl Iterator<Item = (Trait, f64)> + '_ {
        Trait::ALL.iter().map(move |&t| (t, self.get(t)))
    }

    pub fn mean(&self) -> f64 {
        self.iter().map(|(_, v)| v).sum::<f64>() / Trait::ALL.len() as f64
    }

    /// Population variance across the twelve traits
    pub fn variance(&self) -> f64 {
        let mean = self.mean();
        self.iter().map(|(_, v)| (v - mean).powi(2)).sum::<f64>() / Trait::ALL.len() as f64
    }

    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }

    /// Mean absolute per-trait difference to another vector
    pub fn mean_abs_diff(&self, other: &TraitVector) -> f64 {
        self.iter()
            .map(|(t, v)| (v - other.get(t)).abs())
            .sum::<f64>()
            / Trait::ALL.len() as f64
    }

    pub fn is_within_bounds(&self) -> bool {
        self.iter().all(|(_, v)| (TRAIT_MIN..=TRAIT_MAX).contains(&v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_clamps() {
        let mut v = TraitVector::default();
        v.set(Trait::Speed, 140.0);
        v.set(Trait::Patience, -3.0);
        assert_eq!(v.get(Trait::Speed), 100.0);
        assert_eq!(v.get(Trait::Patience), 0.0);
        v.adjust(Trait::Speed, 25.0);
        assert_eq!(v.get(Trait::Speed), 100.0);
        assert!(v.is_within_bounds());
    }

    #[test]
    fn test_nan_clamps_to_floor() {
        let mut v = TraitVector::default();
        v.set(Trait::Creativity, f64::NAN);
        assert_eq!(v.get(Trait::Creativity), 0.0);
    }

    #[test]
    fn test_statistics() {
        let v = TraitVector::from_fn(|t| if t == Trait::Aggression { 62.0 } else { 50.0 });
        assert!((v.mean() - 51.0).abs() < 1e-9);
        assert!(v.std_dev() > 0.0);
        assert_eq!(TraitVector::uniform(40.0).std_dev(), 0.0);

        let a = TraitVector::uniform(30.0);
        let b = TraitVector::uniform(55.0);
        assert!((a.mean_abs_diff(&b) - 25.0).abs() < 1e-9);
    }

    #[test]
    fn test_loaded_values_are_clamped() {
        let mut json = serde_json::to_value(TraitVector::uniform(60.0)).unwrap();
        json["speed"] = serde_json::json!(150.0);
        json["patience"] = serde_json::json!(-20.0);
        let v: TraitVector = serde_json::from_value(json).unwrap();
        assert_eq!(v.get(Trait::Speed), 100.0);
        assert_eq!(v.get(Trait::Patience), 0.0);
        assert_eq!(v.get(Trait::Aggression), 60.0);
        assert!(v.is_within_bounds());
    }

    #[test]
    fn test_names() {
        assert_eq!(Trait::PatternRecognition.display_name(), "Pattern Recognition");
        assert_eq!(Trait::from_key("learning_rate"), Some(Trait::LearningRate));
        assert_eq!(Trait::from_key("charisma"), None);
        let json = serde_json::to_string(&Trait::RiskTolerance).unwrap();
        assert_eq!(json, "\"risk_tolerance\"");
    }
}
