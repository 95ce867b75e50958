mod api;
mod blockchain;
mod config;
mod error;
mod transaction;

use actix_web::{App, HttpServer, middleware::Logger, web};
use dotenvy::dotenv;
use log::info;

use api::AppState;
use config::Config;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let _ = dotenv();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::from_env();
    info!(
        "⛓️ Starting ledger API at http://{}:{} (difficulty={}, miner={})",
        config.host, config.port, config.difficulty, config.miner_address
    );

    let state = web::Data::new(AppState::from_config(&config));

    HttpServer::new(move || {
        App::new()
            .wrap(api::cors())
            .wrap(Logger::default())
            .app_data(state.clone())
            .configure(api::init_routes)
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await
}
