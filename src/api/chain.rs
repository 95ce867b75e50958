use actix_web::rt::time::timeout;
use actix_web::{HttpResponse, get, web};
use log::{debug, info, warn};
use std::time::Instant;

use super::models::{AppState, ChainResponse, MineResponse, ValidateResponse};
use crate::blockchain::pow::find_proof_cancellable;
use crate::blockchain::{Block, Blockchain, CancelFlag};
use crate::error::ApiError;
use crate::transaction::Transaction;

/// Get the full blockchain.
#[get("/chain")]
pub async fn get_chain(state: web::Data<AppState>) -> HttpResponse {
    let bc = state.blockchain.read();
    HttpResponse::Ok().json(ChainResponse {
        chain: bc.chain(),
        length: bc.len(),
    })
}

/// Validate the whole chain. Responds 400 when any link or proof is broken.
#[get("/validate")]
pub async fn validate_chain(state: web::Data<AppState>) -> HttpResponse {
    let verdict = state.blockchain.read().validate_chain();
    match verdict {
        Ok(()) => HttpResponse::Ok().json(ValidateResponse {
            message: "Blockchain is valid",
            valid: true,
        }),
        Err(fault) => {
            warn!("VALIDATE - {fault}");
            HttpResponse::BadRequest().json(ValidateResponse {
                message: "Blockchain is not valid",
                valid: false,
            })
        }
    }
}

/// Mine a new block on top of the current head:
/// - search a proof on the blocking pool, without holding the ledger lock
/// - re-check the head, then queue the reward and seal in one write section
#[get("/mine")]
pub async fn mine_block(state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let t0 = Instant::now();
    loop {
        let (head_index, last_proof, difficulty) = {
            let bc = state.blockchain.read();
            let head = bc.last_block();
            (head.index, head.proof, bc.difficulty())
        };
        debug!("MINER - searching on top of #{head_index} (last_proof={last_proof}, difficulty={difficulty})");

        let proof = search_proof(&state, last_proof, difficulty).await?;

        let sealed = {
            let mut bc = state.blockchain.write();
            seal_mined_block(&mut bc, head_index, proof, &state.miner_address)
        };

        match sealed {
            Some(block) => {
                let queued = block.transactions.iter().filter(|t| !t.is_reward()).count();
                info!(
                    "MINER - sealed block #{} (proof={}, txs={}+reward, {} ms)",
                    block.index,
                    block.proof,
                    queued,
                    t0.elapsed().as_millis()
                );
                return Ok(HttpResponse::Ok().json(MineResponse::from(block)));
            }
            None => warn!("MINER - head moved past #{head_index} during search, retrying"),
        }
    }
}

/// Runs the proof search on actix's blocking pool. The search is cancelled
/// when the configured timeout elapses or the request is dropped.
async fn search_proof(state: &AppState, last_proof: u64, difficulty: u32) -> Result<u64, ApiError> {
    let cancel = CancelFlag::new();
    let _guard = cancel.drop_guard();
    let worker_flag = cancel.clone();
    let search = web::block(move || find_proof_cancellable(last_proof, difficulty, &worker_flag));

    let outcome = match state.mine_timeout {
        Some(limit) => timeout(limit, search).await.map_err(|_| {
            warn!("MINER - no proof for last_proof={last_proof} within {limit:?}, cancelling");
            ApiError::MiningTimeout(limit)
        })?,
        None => search.await,
    };
    Ok(outcome??)
}

/// Queue the reward and seal, unless the head moved away from
/// `expected_head` while the proof was being searched.
pub(crate) fn seal_mined_block(
    bc: &mut Blockchain,
    expected_head: u64,
    proof: u64,
    miner_address: &str,
) -> Option<Block> {
    if bc.last_block().index != expected_head {
        return None;
    }
    bc.add_transaction(Transaction::reward(miner_address));
    Some(bc.new_block(proof, None).clone())
}
