use log::debug;
use serde_json::Value;
use thiserror::Error;

use super::pow::valid_proof;
use super::{Block, DEFAULT_DIFFICULTY, GENESIS_PREVIOUS_HASH, GENESIS_PROOF};
use crate::transaction::Transaction;

/// First block that failed validation, with the check it failed.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ChainFault {
    #[error("block #{index}: previous_hash does not match the digest of its predecessor")]
    BrokenLink { index: u64 },
    #[error("block #{index}: proof does not satisfy proof-of-work against its predecessor")]
    InvalidProof { index: u64 },
}

/// In-memory ledger: the sealed chain plus the pending transaction buffer.
#[derive(Debug)]
pub struct Blockchain {
    chain: Vec<Block>,
    current_transactions: Vec<Transaction>,
    difficulty: u32,
}

impl Blockchain {
    /// Initialize a new ledger and seal its genesis block.
    pub fn new(difficulty: u32) -> Self {
        let mut bc = Self {
            chain: Vec::new(),
            current_transactions: Vec::new(),
            difficulty,
        };
        bc.new_block(GENESIS_PROOF, Some(GENESIS_PREVIOUS_HASH.to_string()));
        bc
    }

    /// Queue a transaction for the next block. Returns the index of the
    /// block that will contain it.
    pub fn new_transaction(
        &mut self,
        sender: impl Into<String>,
        recipient: impl Into<String>,
        product_data: impl Into<Value>,
    ) -> u64 {
        self.add_transaction(Transaction::new(sender, recipient, product_data))
    }

    /// Queue an already built transaction (e.g. the mining reward).
    pub fn add_transaction(&mut self, tx: Transaction) -> u64 {
        self.current_transactions.push(tx);
        self.last_block().index + 1
    }

    /// Seal the pending buffer into a new block and append it.
    ///
    /// The proof is trusted: callers validate it (normally by obtaining it
    /// from the proof search) before sealing. Without an override (or with an
    /// empty one) the block links to the digest of the current head.
    pub fn new_block(&mut self, proof: u64, previous_hash: Option<String>) -> &Block {
        let previous_hash = match previous_hash.filter(|h| !h.is_empty()) {
            Some(hash) => hash,
            None => Self::hash(self.last_block()),
        };
        let transactions = std::mem::take(&mut self.current_transactions);
        let block = Block::new(self.chain.len() as u64 + 1, transactions, proof, previous_hash);
        debug!(
            "sealed block #{} (txs={}, proof={})",
            block.index,
            block.transactions.len(),
            block.proof
        );
        self.chain.push(block);
        self.last_block()
    }

    /// Digest of any block (same function used when linking).
    pub fn hash(block: &Block) -> String {
        block.compute_hash()
    }

    /// Return the last block in the chain.
    pub fn last_block(&self) -> &Block {
        self.chain
            .last()
            .expect("Blockchain should always have at least the genesis block")
    }

    pub fn chain(&self) -> &[Block] {
        &self.chain
    }

    pub fn pending_transactions(&self) -> &[Transaction] {
        &self.current_transactions
    }

    pub fn len(&self) -> usize {
        self.chain.len()
    }

    pub fn difficulty(&self) -> u32 {
        self.difficulty
    }

    /// Check hash links and proofs from the second block onward, stopping at
    /// the first failure. Index and timestamp ordering are not checked.
    pub fn validate_chain(&self) -> Result<(), ChainFault> {
        for pair in self.chain.windows(2) {
            let (prev, current) = (&pair[0], &pair[1]);

            if current.previous_hash != prev.compute_hash() {
                return Err(ChainFault::BrokenLink {
                    index: current.index,
                });
            }

            if !valid_proof(prev.proof, current.proof, self.difficulty) {
                return Err(ChainFault::InvalidProof {
                    index: current.index,
                });
            }
        }
        Ok(())
    }

    pub fn is_valid_chain(&self) -> bool {
        self.validate_chain().is_ok()
    }

    #[cfg(test)]
    pub(crate) fn chain_mut(&mut self) -> &mut Vec<Block> {
        &mut self.chain
    }
}

impl Default for Blockchain {
    fn default() -> Self {
        Self::new(DEFAULT_DIFFICULTY)
    }
}

#[cfg(test)]
mod tests {
    use super::{Blockchain, ChainFault};
    use crate::blockchain::pow::{find_proof, valid_proof};
    use crate::transaction::Transaction;
    use serde_json::json;

    const EASY: u32 = 2;

    fn mine(bc: &mut Blockchain) -> u64 {
        let proof = find_proof(bc.last_block().proof, bc.difficulty());
        bc.new_block(proof, None).index
    }

    #[test]
    fn genesis_invariant() {
        let bc = Blockchain::default();
        assert_eq!(bc.len(), 1);
        let genesis = bc.last_block();
        assert_eq!(genesis.index, 1);
        assert_eq!(genesis.previous_hash, "1");
        assert_eq!(genesis.proof, 100);
        assert!(genesis.transactions.is_empty());
        assert!(bc.pending_transactions().is_empty());
        assert_eq!(bc.difficulty(), 4);
        assert!(bc.is_valid_chain());
    }

    #[test]
    fn queue_returns_next_block_index() {
        let mut bc = Blockchain::new(EASY);
        assert_eq!(bc.new_transaction("a", "b", "x"), 2);
        assert_eq!(bc.new_transaction("c", "d", json!({"k": 1})), 2);
        mine(&mut bc);
        assert_eq!(bc.new_transaction("e", "f", "y"), 3);
    }

    #[test]
    fn seal_snapshots_and_clears_pending() {
        let mut bc = Blockchain::new(EASY);
        let t1 = Transaction::new("a", "b", "x");
        let t2 = Transaction::new("c", "d", json!([1, 2]));
        bc.new_transaction("a", "b", "x");
        bc.new_transaction("c", "d", json!([1, 2]));

        let proof = find_proof(100, EASY);
        let block = bc.new_block(proof, None).clone();

        assert_eq!(block.transactions, vec![t1, t2]);
        assert!(bc.pending_transactions().is_empty());
        assert_eq!(bc.last_block(), &block);
    }

    #[test]
    fn indices_are_one_based_and_contiguous() {
        let mut bc = Blockchain::new(EASY);
        for _ in 0..5 {
            mine(&mut bc);
        }
        assert_eq!(bc.len(), 6);
        for (i, block) in bc.chain().iter().enumerate() {
            assert_eq!(block.index, i as u64 + 1);
        }
    }

    #[test]
    fn links_to_digest_of_previous_block() {
        let mut bc = Blockchain::new(EASY);
        mine(&mut bc);
        mine(&mut bc);
        for pair in bc.chain().windows(2) {
            assert_eq!(pair[1].previous_hash, Blockchain::hash(&pair[0]));
            assert!(valid_proof(pair[0].proof, pair[1].proof, EASY));
        }
    }

    #[test]
    fn previous_hash_override_is_used_verbatim() {
        let mut bc = Blockchain::new(EASY);
        let block = bc.new_block(1, Some("deadbeef".into()));
        assert_eq!(block.previous_hash, "deadbeef");

        let head_hash = bc.last_block().compute_hash();
        let block = bc.new_block(2, Some(String::new()));
        assert_eq!(block.previous_hash, head_hash);
    }

    #[test]
    fn chain_built_from_found_proofs_is_valid() {
        let mut bc = Blockchain::new(EASY);
        for i in 0u64..4 {
            bc.new_transaction(format!("s{i}"), "r", i);
            mine(&mut bc);
        }
        assert_eq!(bc.validate_chain(), Ok(()));
    }

    #[test]
    fn tampered_previous_hash_is_detected() {
        let mut bc = Blockchain::new(EASY);
        mine(&mut bc);
        mine(&mut bc);
        bc.chain_mut()[1].previous_hash = "0".repeat(64);
        assert_eq!(bc.validate_chain(), Err(ChainFault::BrokenLink { index: 2 }));
        assert!(!bc.is_valid_chain());
    }

    #[test]
    fn tampered_proof_is_detected() {
        let mut bc = Blockchain::new(EASY);
        mine(&mut bc);
        mine(&mut bc);
        // Changing block 3's proof leaves block 3's link intact.
        let bad = (0..)
            .find(|p| !valid_proof(bc.chain()[1].proof, *p, EASY))
            .unwrap();
        bc.chain_mut()[2].proof = bad;
        assert_eq!(bc.validate_chain(), Err(ChainFault::InvalidProof { index: 3 }));
    }

    #[test]
    fn tampered_transaction_breaks_the_next_link() {
        let mut bc = Blockchain::new(EASY);
        bc.new_transaction("a", "b", "x");
        mine(&mut bc);
        mine(&mut bc);
        bc.chain_mut()[1].transactions[0].product_data = json!("forged");
        assert_eq!(bc.validate_chain(), Err(ChainFault::BrokenLink { index: 3 }));
    }

    #[test]
    fn tampering_the_head_goes_unnoticed_by_links() {
        // Only predecessors are re-hashed, so editing the head's payload is
        // not detectable until another block is sealed on top of it.
        let mut bc = Blockchain::new(EASY);
        bc.new_transaction("a", "b", "x");
        mine(&mut bc);
        bc.chain_mut()[1].transactions.clear();
        assert!(bc.is_valid_chain());
    }

    #[test]
    fn unchecked_seal_with_bad_proof_fails_validation() {
        let mut bc = Blockchain::new(EASY);
        let bad = (0..).find(|p| !valid_proof(100, *p, EASY)).unwrap();
        bc.new_block(bad, None);
        assert_eq!(bc.len(), 2);
        assert_eq!(bc.validate_chain(), Err(ChainFault::InvalidProof { index: 2 }));
    }

    #[test]
    fn mine_scenario_with_reward() {
        let mut bc = Blockchain::default();
        bc.new_transaction("a", "b", "x");

        let proof = find_proof(bc.last_block().proof, bc.difficulty());
        assert_eq!(proof, 35293);
        bc.new_transaction("0", "miner_address", "Mining reward");
        let block = bc.new_block(proof, None).clone();

        assert_eq!(block.index, 2);
        assert_eq!(
            block.transactions,
            vec![
                Transaction::new("a", "b", "x"),
                Transaction::reward("miner_address"),
            ]
        );
        assert!(bc.is_valid_chain());
    }
}
