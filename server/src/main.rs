mod config;
mod error;
mod imagegen;
mod routes;
mod state;

use std::sync::Arc;

use crate::config::ServerConfig;
use crate::error::ErrorCode;
use crate::imagegen::pollinations::PollinationsClient;

#[tokio::main]
async fn main() {
    let dotenv = dotenvy::dotenv();
    tracing_subscriber::fmt::init();
    if let Err(e) = dotenv {
        if !e.not_found() {
            tracing::warn!(error = %e, "failed to load .env");
        }
    }

    let config = match ServerConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "invalid configuration");
            std::process::exit(1);
        }
    };

    let provider = match PollinationsClient::new(&config.provider) {
        Ok(client) => client,
        Err(e) => {
            tracing::error!(code = e.error_code(), error = %e, "image provider init failed");
            std::process::exit(1);
        }
    };
    tracing::info!(base_url = %config.provider.base_url, "image provider initialized");

    let state = state::AppState::new(Arc::new(provider));
    let app = routes::app(state, config.static_dir.as_deref());

    let port = config.port;
    let listener = match tokio::net::TcpListener::bind(format!("0.0.0.0:{port}")).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!(%port, error = %e, "failed to bind");
            std::process::exit(1);
        }
    };

    tracing::info!(%port, "creative studio listening");
    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!(error = %e, "server failed");
        std::process::exit(1);
    }
}
