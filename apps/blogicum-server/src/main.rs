//! # Blogicum Server
//!
//! The main entry point for the Actix-web HTTP server.

use actix_web::{App, HttpServer, web};
use tracing_actix_web::TracingLogger;

use blogicum_server::config::AppConfig;
use blogicum_server::handlers;
use blogicum_server::observability::RequestIdMiddleware;
use blogicum_server::state::AppState;
use blogicum_server::telemetry::{TelemetryConfig, init_telemetry};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    init_telemetry(&TelemetryConfig::from_env());

    let config = AppConfig::from_env();
    tracing::info!("Starting Blogicum on {}:{}", config.host, config.port);

    let state = web::Data::new(AppState::new(&config).await);

    HttpServer::new(move || {
        App::new()
            .wrap(RequestIdMiddleware)
            .wrap(TracingLogger::default())
            .app_data(state.clone())
            .configure(handlers::configure_routes)
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await
}
