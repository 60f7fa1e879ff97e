mod config;
mod db;
mod errors;
mod metrics;
mod model;
mod rest;
mod validate;

use anyhow::Context;
use axum::{routing::get, Router};
use std::env;
use tracing::{error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config_path = env::var("CONFIG_PATH").unwrap_or_else(|_| "config.json".to_string());
    let config = config::Config::load(&config_path)
        .with_context(|| format!("loading configuration from {config_path}"))?;

    // Keep the guard alive so the file sink keeps writing
    let _log_guard = config::init_logging(&config.logging)?;

    info!("Starting metric collector");
    info!("HTTP server: {}", config.server.listen_addr);
    info!(
        "Database: {}",
        config.database.url.split('@').last().unwrap_or("***")
    );

    metrics::init_metrics();

    let pool = db::make_pool(&config.database)
        .await
        .context("connecting to database")?;

    let app = Router::new()
        .route("/metrics", get(metrics_handler))
        .merge(rest::create_router(pool, &config.server.routes));

    let listener = tokio::net::TcpListener::bind(&config.server.listen_addr)
        .await
        .with_context(|| format!("binding {}", config.server.listen_addr))?;

    info!("HTTP server listening on {}", config.server.listen_addr);

    let server_handle = tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap_or_else(|e| {
            error!("HTTP server error: {}", e);
        });
    });

    tokio::select! {
        _ = server_handle => {
            error!("HTTP server terminated");
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Received shutdown signal");
        }
    }

    info!("Shutting down");
    Ok(())
}

async fn metrics_handler() -> String {
    metrics::gather_metrics()
}
