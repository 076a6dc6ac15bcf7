use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use dotenv::dotenv;
use std::sync::Arc;

mod agents;
mod config;
mod controllers;
mod engine;
mod error;
mod http;
mod models;
mod tools;

use agents::AgentRegistry;
use config::Config;

pub struct AppState {
    pub registry: Arc<AgentRegistry>,
    pub config: Config,
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();
    env_logger::init();

    let config = Config::from_env();
    let port = config.port;

    log::info!("Initializing agent registry");
    log::info!(
        "Engine endpoint: {} (model: {})",
        config.engine_endpoint,
        config.engine_model
    );
    let registry = Arc::new(AgentRegistry::new(config.clone()));

    log::info!("Starting Hive server on port {}", port);

    HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allow_any_method()
            .allow_any_header()
            .max_age(3600);

        App::new()
            .app_data(web::Data::new(AppState {
                registry: Arc::clone(&registry),
                config: config.clone(),
            }))
            .wrap(Logger::default())
            .wrap(cors)
            .configure(controllers::health::config)
            .configure(controllers::agents::config)
            .configure(controllers::chat::config)
    })
    .bind(("0.0.0.0", port))?
    .run()
    .await
}
