use chrono::Utc;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::canonical::to_canonical_vec;
use crate::transaction::Transaction;

/// A sealed batch of transactions linked to its predecessor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    /// 1-based position in the chain.
    pub index: u64,
    /// Unix seconds (UTC), microsecond precision.
    pub timestamp: f64,
    pub transactions: Vec<Transaction>,
    pub proof: u64,
    pub previous_hash: String,
}

impl Block {
    /// Create a block stamped with the current time.
    pub fn new(
        index: u64,
        transactions: Vec<Transaction>,
        proof: u64,
        previous_hash: String,
    ) -> Self {
        Self {
            index,
            timestamp: now_timestamp(),
            transactions,
            proof,
            previous_hash,
        }
    }

    /// SHA-256 (lowercase hex) over the canonical JSON encoding of every
    /// field. Two blocks with equal fields always hash the same.
    pub fn compute_hash(&self) -> String {
        let preimage = to_canonical_vec(self).expect("block fields always encode as JSON");
        hex::encode(Sha256::digest(&preimage))
    }
}

pub fn now_timestamp() -> f64 {
    Utc::now().timestamp_micros() as f64 / 1_000_000.0
}
