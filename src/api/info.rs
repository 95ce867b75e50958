use actix_web::{HttpResponse, Responder, get};
use serde_json::{Map, Value};

use super::models::InfoResponse;

const ENDPOINTS: &[(&str, &str)] = &[
    ("/api", "GET - API Information"),
    ("/api/transaction/new", "POST - Create new transaction"),
    ("/api/transactions/pending", "GET - List pending transactions"),
    ("/api/mine", "GET - Mine a new block"),
    ("/api/chain", "GET - Get full blockchain"),
    ("/api/validate", "GET - Validate blockchain"),
];

#[get("")]
pub async fn api_info() -> impl Responder {
    let endpoints: Map<String, Value> = ENDPOINTS
        .iter()
        .map(|(path, desc)| (path.to_string(), Value::from(*desc)))
        .collect();

    HttpResponse::Ok().json(InfoResponse {
        message: "Blockchain API is running",
        version: env!("CARGO_PKG_VERSION"),
        endpoints,
    })
}
