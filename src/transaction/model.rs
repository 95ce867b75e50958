use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Sender used for the system-generated mining reward.
pub const REWARD_SENDER: &str = "0";

/// Payload carried by every mining reward entry.
pub const REWARD_PRODUCT_DATA: &str = "Mining reward";

/// A queued or sealed ledger entry.
///
/// `product_data` is opaque: it is stored and hashed verbatim, never
/// interpreted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub sender: String,
    pub recipient: String,
    pub product_data: Value,
}

impl Transaction {
    pub fn new(
        sender: impl Into<String>,
        recipient: impl Into<String>,
        product_data: impl Into<Value>,
    ) -> Self {
        Self {
            sender: sender.into(),
            recipient: recipient.into(),
            product_data: product_data.into(),
        }
    }

    /// Reward entry appended to a block by the miner.
    pub fn reward(miner_address: impl Into<String>) -> Self {
        Self::new(REWARD_SENDER, miner_address, REWARD_PRODUCT_DATA)
    }

    pub fn is_reward(&self) -> bool {
        self.sender == REWARD_SENDER
    }
}
