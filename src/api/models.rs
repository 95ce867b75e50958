use parking_lot::RwLock;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::time::Duration;

use crate::blockchain::{Block, Blockchain};
use crate::config::Config;
use crate::error::ApiError;
use crate::transaction::Transaction;

/// Fields a queued transaction must carry.
pub const REQUIRED_TRANSACTION_FIELDS: &[&str] = &["sender", "recipient", "product_data"];

/// Shared application state: one authoritative ledger behind a lock.
///
/// Writers (queue, seal) take the write lock; chain reads and validation
/// share the read lock.
pub struct AppState {
    pub blockchain: RwLock<Blockchain>,
    pub miner_address: String,
    pub mine_timeout: Option<Duration>,
}

impl AppState {
    pub fn new(blockchain: Blockchain, miner_address: impl Into<String>) -> Self {
        Self {
            blockchain: RwLock::new(blockchain),
            miner_address: miner_address.into(),
            mine_timeout: None,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self {
            mine_timeout: config.mine_timeout,
            ..Self::new(Blockchain::new(config.difficulty), &config.miner_address)
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

/* ---------- Info ---------- */

#[derive(Serialize)]
pub struct InfoResponse {
    pub message: &'static str,
    pub version: &'static str,
    pub endpoints: serde_json::Map<String, Value>,
}

/* ---------- TX API Models ---------- */

/// Body of `POST /api/transaction/new`. Every field is optional at the
/// serde level so absence can be reported with the full required list.
#[derive(Debug, Deserialize)]
pub struct NewTxRequest {
    pub sender: Option<String>,
    pub recipient: Option<String>,
    /// `Some(Value::Null)` when the key is present with a JSON null.
    #[serde(default, deserialize_with = "present")]
    pub product_data: Option<Value>,
}

impl NewTxRequest {
    pub fn into_parts(self) -> Result<(String, String, Value), ApiError> {
        match (self.sender, self.recipient, self.product_data) {
            (Some(sender), Some(recipient), Some(product_data)) => {
                Ok((sender, recipient, product_data))
            }
            _ => Err(ApiError::MissingFields),
        }
    }
}

fn present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

#[derive(Serialize)]
pub struct NewTxResponse {
    pub message: String,
}

#[derive(Serialize)]
pub struct PendingResponse<'a> {
    pub size: usize,
    pub transactions: &'a [Transaction],
}

/* ---------- Chain API Models ---------- */

#[derive(Serialize)]
pub struct ChainResponse<'a> {
    pub chain: &'a [Block],
    pub length: usize,
}

#[derive(Serialize)]
pub struct ValidateResponse {
    pub message: &'static str,
    pub valid: bool,
}

#[derive(Serialize)]
pub struct MineResponse {
    pub message: &'static str,
    pub index: u64,
    pub transactions: Vec<Transaction>,
    pub proof: u64,
    pub previous_hash: String,
}

impl From<Block> for MineResponse {
    fn from(block: Block) -> Self {
        Self {
            message: "New Block Forged",
            index: block.index,
            transactions: block.transactions,
            proof: block.proof,
            previous_hash: block.previous_hash,
        }
    }
}
