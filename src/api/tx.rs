use actix_web::{HttpResponse, get, post, web};
use log::{debug, info};

use super::models::{AppState, NewTxRequest, NewTxResponse, PendingResponse};
use crate::error::ApiError;

/// Queue a transaction for the next block.
#[post("/transaction/new")]
pub async fn post_transaction(
    state: web::Data<AppState>,
    body: web::Json<NewTxRequest>,
) -> Result<HttpResponse, ApiError> {
    let (sender, recipient, product_data) = body.into_inner().into_parts()?;

    let index = {
        let mut bc = state.blockchain.write();
        let index = bc.new_transaction(sender.as_str(), recipient.as_str(), product_data);
        debug!(
            "POST /transaction/new - queued {} -> {} (pending={})",
            sender,
            recipient,
            bc.pending_transactions().len()
        );
        index
    };

    info!("POST /transaction/new - will be sealed in block #{index}");
    Ok(HttpResponse::Created().json(NewTxResponse {
        message: format!("Transaction will be added to Block {index}"),
    }))
}

/// List the pending buffer.
#[get("/transactions/pending")]
pub async fn get_pending(state: web::Data<AppState>) -> HttpResponse {
    let bc = state.blockchain.read();
    let pending = bc.pending_transactions();
    HttpResponse::Ok().json(PendingResponse {
        size: pending.len(),
        transactions: pending,
    })
}

/// Turns body extraction failures into the same 400 shape as missing fields.
pub fn json_error_handler(
    err: actix_web::error::JsonPayloadError,
    _req: &actix_web::HttpRequest,
) -> actix_web::Error {
    debug!("rejected transaction body: {err}");
    ApiError::InvalidBody(err.to_string()).into()
}
