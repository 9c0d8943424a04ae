//! # Contentoire API Server
//!
//! Actix-web server behind the Contentoire mobile apps: post drafts, the
//! publishing schedule, live post lists and admin settings.

use actix_web::{App, HttpServer, web};
use tracing_actix_web::TracingLogger;

#[cfg(feature = "scheduler")]
mod background;
mod config;
mod handlers;
mod middleware;
mod observability;
mod state;
mod telemetry;

#[cfg(test)]
mod test_support;

use config::AppConfig;
use observability::RequestIdMiddleware;
use state::AppState;
use telemetry::{TelemetryConfig, init_telemetry};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    init_telemetry(&TelemetryConfig::from_env());

    let config = AppConfig::from_env();
    tracing::info!(
        host = %config.host,
        port = config.port,
        lead_minutes = config.lead_time.num_minutes(),
        "Starting Contentoire API Server"
    );

    let state = AppState::new(&config).await?;

    #[cfg(feature = "scheduler")]
    let mut scheduler =
        background::start(state.clone(), background::SchedulerConfig::from_env()).await?;

    let server_state = state.clone();
    HttpServer::new(move || {
        let limiter = server_state.rate_limiter.clone();
        App::new()
            .wrap(RequestIdMiddleware)
            .wrap(TracingLogger::default())
            .app_data(web::Data::new(server_state.clone()))
            .configure(|cfg| handlers::configure_routes(cfg, limiter))
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await?;

    #[cfg(feature = "scheduler")]
    scheduler.shutdown().await?;

    tracing::info!("Server stopped");
    Ok(())
}
