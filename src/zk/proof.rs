//! Performance proofs: opaque tokens vouching for a parent's record
//!
//! The breeding workflow only ever sees tokens as strings and asks the
//! service whether one verifies. `DigestProofService` is the local adapter:
//! it commits to the payload with a salted SHA-256 hash and remembers what
//! it issued.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashSet;
use thiserror::Error;
use tokio::sync::Mutex;

#[derive(Debug, Error)]
pub enum ProofError {
    #[error("failed to encode proof payload: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("proof service rejected the request: {0}")]
    Rejected(String),
}

#[async_trait]
pub trait ProofService: Send + Sync {
    async fn generate_proof(&self, payload: &[u8]) -> Result<String, ProofError>;

    async fn verify_proof(&self, token: &str) -> Result<bool, ProofError>;
}

/// Claim attached to each parent at proposal time
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerformanceClaim {
    pub swarm_id: String,
    pub fitness: f64,
    pub win_rate: String,
    pub timestamp: DateTime<Utc>,
}

impl PerformanceClaim {
    pub fn new(swarm_id: impl Into<String>, fitness: f64, timestamp: DateTime<Utc>) -> Self {
        Self {
            swarm_id: swarm_id.into(),
            fitness,
            win_rate: "verified".to_string(),
            timestamp,
        }
    }

    pub fn to_payload(&self) -> Result<Vec<u8>, ProofError> {
        Ok(serde_json::to_vec(self)?)
    }
}

/// Salted SHA-256 commitments, verified against the set of issued tokens
#[derive(Debug, Default)]
pub struct DigestProofService {
    issued: Mutex<HashSet<String>>,
}

const TOKEN_PREFIX: &str = "pp1";

impl DigestProofService {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn issued_count(&self) -> usize {
        self.issued.lock().await.len()
    }

    fn commit(payload: &[u8], salt: &[u8; 16]) -> String {
        let mut hasher = Sha256::new();
        hasher.update(salt);
        hasher.update(payload);
        format!("{}:{}:{}", TOKEN_PREFIX, hex::encode(salt), hex::encode(hasher.finalize()))
    }
}

#[async_trait]
impl ProofService for DigestProofService {
    async fn generate_proof(&self, payload: &[u8]) -> Result<String, ProofError> {
        if payload.is_empty() {
            return Err(ProofError::Rejected("empty payload".into()));
        }
        let salt: [u8; 16] = rand::random();
        let token = Self::commit(payload, &salt);
        self.issued.lock().await.insert(token.clone());
        Ok(token)
    }

    async fn verify_proof(&self, token: &str) -> Result<bool, ProofError> {
        let well_formed = token.starts_with(TOKEN_PREFIX) && token.split(':').count() == 3;
        Ok(well_formed && self.issued.lock().await.contains(token))
    }
}
