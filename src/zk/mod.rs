//! Proof port for breeding contracts
//!
//! - ProofService: generate and verify opaque performance proofs
//! - DigestProofService: local salted-hash implementation

mod proof;

pub use proof::{DigestProofService, PerformanceClaim, ProofError, ProofService};
