mod chain;
mod info;
pub mod models;
mod tx;

use actix_cors::Cors;
use actix_web::web::{self, ServiceConfig};

pub use models::AppState;

/// Cross-origin access for browser clients: any origin, method and header,
/// answered with a wildcard `Access-Control-Allow-Origin`.
pub fn cors() -> Cors {
    Cors::default()
        .allow_any_origin()
        .send_wildcard()
        .allow_any_method()
        .allow_any_header()
        .max_age(3600)
}

pub fn init_routes(cfg: &mut ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .app_data(web::JsonConfig::default().error_handler(tx::json_error_handler))
            .service(info::api_info)
            .service(tx::post_transaction)
            .service(tx::get_pending)
            .service(chain::mine_block)
            .service(chain::get_chain)
            .service(chain::validate_chain),
    );
}
