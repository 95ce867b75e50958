use sha2::{Digest, Sha256};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use thiserror::Error;

/// How many candidates are tried between two cancellation checks.
pub const CANCEL_CHECK_INTERVAL: u64 = 4096;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProofError {
    #[error("proof search cancelled after {attempts} attempts")]
    Cancelled { attempts: u64 },
}

/// Shared flag used to stop a running proof search from another thread.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }

    /// Returns a guard that cancels the search when dropped, e.g. when the
    /// request future driving the search goes away.
    pub fn drop_guard(&self) -> CancelOnDrop {
        CancelOnDrop(self.clone())
    }
}

#[derive(Debug)]
pub struct CancelOnDrop(CancelFlag);

impl Drop for CancelOnDrop {
    fn drop(&mut self) {
        self.0.cancel();
    }
}

/// Does `sha256("{last_proof}{proof}")` start with `difficulty` hex zeros?
///
/// The preimage is the concatenation of both decimal renderings, not a
/// numeric combination: `(1, 23)` and `(12, 3)` hash the same input.
pub fn valid_proof(last_proof: u64, proof: u64, difficulty: u32) -> bool {
    let guess = format!("{last_proof}{proof}");
    let guess_hash = hex::encode(Sha256::digest(guess.as_bytes()));
    guess_hash.len() >= difficulty as usize
        && guess_hash
            .bytes()
            .take(difficulty as usize)
            .all(|c| c == b'0')
}

/// Find the smallest proof, counting up from 0, that validates against
/// `last_proof`. Unbounded: prefer [`find_proof_cancellable`] on shared paths.
pub fn find_proof(last_proof: u64, difficulty: u32) -> u64 {
    let mut proof = 0u64;
    while !valid_proof(last_proof, proof, difficulty) {
        proof = proof.wrapping_add(1);
    }
    proof
}

/// Same search as [`find_proof`], polling `cancel` every
/// [`CANCEL_CHECK_INTERVAL`] candidates.
pub fn find_proof_cancellable(
    last_proof: u64,
    difficulty: u32,
    cancel: &CancelFlag,
) -> Result<u64, ProofError> {
    let mut proof = 0u64;
    loop {
        if proof % CANCEL_CHECK_INTERVAL == 0 && cancel.is_cancelled() {
            return Err(ProofError::Cancelled { attempts: proof });
        }
        if valid_proof(last_proof, proof, difficulty) {
            return Ok(proof);
        }
        proof = proof.wrapping_add(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blockchain::DEFAULT_DIFFICULTY;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn finds_known_proof_for_genesis() {
        let proof = find_proof(100, DEFAULT_DIFFICULTY);
        assert_eq!(proof, 35293);
        assert!(valid_proof(100, proof, DEFAULT_DIFFICULTY));

        let digest = hex::encode(Sha256::digest(b"10035293"));
        assert!(digest.starts_with("0000"));
    }

    #[test]
    fn returns_first_valid_candidate() {
        let proof = find_proof(100, 2);
        assert_eq!(proof, 226);
        assert!((0..proof).all(|p| !valid_proof(100, p, 2)));
    }

    #[test]
    fn chained_search_from_previous_proof() {
        assert_eq!(find_proof(35293, DEFAULT_DIFFICULTY), 35089);
    }

    #[test]
    fn rejects_wrong_candidate() {
        assert!(!valid_proof(100, 35292, DEFAULT_DIFFICULTY));
        assert!(!valid_proof(100, 35293, 64 + 1));
    }

    #[test]
    fn zero_difficulty_accepts_anything() {
        assert!(valid_proof(7, 0, 0));
        assert_eq!(find_proof(7, 0), 0);
    }

    #[test]
    fn cancellable_matches_plain_search() {
        let flag = CancelFlag::new();
        assert_eq!(find_proof_cancellable(100, DEFAULT_DIFFICULTY, &flag), Ok(35293));
    }

    #[test]
    fn pre_cancelled_search_stops_immediately() {
        let flag = CancelFlag::new();
        flag.cancel();
        assert_eq!(
            find_proof_cancellable(100, DEFAULT_DIFFICULTY, &flag),
            Err(ProofError::Cancelled { attempts: 0 })
        );
    }

    #[test]
    fn cancel_from_another_thread() {
        let flag = CancelFlag::new();
        let worker_flag = flag.clone();
        // 64 leading zeros is never reached; only cancellation ends the loop.
        let worker = thread::spawn(move || find_proof_cancellable(1, 64, &worker_flag));

        thread::sleep(Duration::from_millis(20));
        drop(flag.drop_guard());

        match worker.join().unwrap() {
            Err(ProofError::Cancelled { attempts }) => {
                assert_eq!(attempts % CANCEL_CHECK_INTERVAL, 0);
            }
            other => panic!("expected cancellation, got {other:?}"),
        }
    }
}
