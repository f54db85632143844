//! Breeding configuration
//!
//! Plain serde struct with defaults for every field; a JSON file only needs
//! to name the values it overrides.

use crate::genome::{MutationTable, MutationTableError, DEFAULT_MAX_BREEDING};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid config: {0}")]
    Invalid(String),

    #[error("invalid mutation table: {0}")]
    MutationTable(#[from] MutationTableError),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BreedingConfig {
    /// Lifetime breeding capacity given to new profiles
    pub max_breeding: u32,
    /// Days after a breeding during which parent 1 cannot lead a new proposal
    pub cooldown_days: i64,
    pub incubation_min_hours: u32,
    /// Exclusive upper bound of the drawn incubation duration
    pub incubation_max_hours: u32,
    /// Refuse `complete` until the incubation window has elapsed
    pub enforce_incubation: bool,
    /// Recorded in contract terms
    pub min_compatibility: f64,
    /// Reputation granted by a legendary-birth achievement
    pub legendary_bonus_reputation: u32,
    pub mutation_table: MutationTable,
}

impl Default for BreedingConfig {
    fn default() -> Self {
        Self {
            max_breeding: DEFAULT_MAX_BREEDING,
            cooldown_days: 7,
            incubation_min_hours: 24,
            incubation_max_hours: 48,
            enforce_incubation: true,
            min_compatibility: 50.0,
            legendary_bonus_reputation: 500,
            mutation_table: MutationTable::default(),
        }
    }
}

impl BreedingConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let data = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&data)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_breeding == 0 {
            return Err(ConfigError::Invalid("max_breeding must be at least 1".into()));
        }
        if self.cooldown_days < 0 {
            return Err(ConfigError::Invalid("cooldown_days must be non-negative".into()));
        }
        if self.incubation_min_hours >= self.incubation_max_hours {
            return Err(ConfigError::Invalid(format!(
                "incubation window {}..{} hours is empty",
                self.incubation_min_hours, self.incubation_max_hours
            )));
        }
        if !(0.0..=100.0).contains(&self.min_compatibility) {
            return Err(ConfigError::Invalid("min_compatibility must be within [0, 100]".into()));
        }
        self.mutation_table.validate()?;
        Ok(())
    }

    pub fn cooldown(&self) -> chrono::Duration {
        chrono::Duration::days(self.cooldown_days)
    }
}
