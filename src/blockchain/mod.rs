pub mod block;
pub mod canonical;
pub mod model;
pub mod pow;

pub use block::Block;
pub use model::Blockchain;
pub use pow::{CancelFlag, ProofError};

/// Default Proof-of-Work difficulty (number of leading zero hex digits).
pub const DEFAULT_DIFFICULTY: u32 = 4;

/// A SHA-256 hex digest has 64 digits, so no higher difficulty is reachable.
pub const MAX_DIFFICULTY: u32 = 64;

/// Proof stored in the genesis block.
pub const GENESIS_PROOF: u64 = 100;

/// Placeholder previous-hash of the genesis block.
pub const GENESIS_PREVIOUS_HASH: &str = "1";
