use actix_web::error::BlockingError;
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;

use crate::api::models::REQUIRED_TRANSACTION_FIELDS;
use crate::blockchain::ProofError;

/// Failures surfaced by the HTTP layer. The ledger itself never fails.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Missing values")]
    MissingFields,

    #[error("Invalid request body: {0}")]
    InvalidBody(String),

    #[error("Mining timed out after {0:?}")]
    MiningTimeout(Duration),

    #[error("Mining stopped: {0}")]
    MiningCancelled(#[from] ProofError),

    #[error("Mining worker unavailable: {0}")]
    Worker(#[from] BlockingError),
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    required: Option<&'static [&'static str]>,
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::MissingFields | ApiError::InvalidBody(_) => StatusCode::BAD_REQUEST,
            ApiError::MiningTimeout(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::MiningCancelled(_) | ApiError::Worker(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        let required = match self {
            ApiError::MissingFields | ApiError::InvalidBody(_) => {
                Some(REQUIRED_TRANSACTION_FIELDS)
            }
            _ => None,
        };
        HttpResponse::build(self.status_code()).json(ErrorBody {
            error: self.to_string(),
            required,
        })
    }
}
