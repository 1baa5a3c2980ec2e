//! Binary entrypoint for the linkcard HTTP server.
//!
//! Configuration comes from environment variables; see
//! [`linkcard_server::config`] for the full list.

use std::process;

use linkcard_server::config::ServerConfig;
use linkcard_server::router::build_router;
use linkcard_server::state::AppState;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let config = match ServerConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            tracing::error!(error = %err, "invalid configuration");
            process::exit(2);
        }
    };

    let state = match AppState::from_config(&config).await {
        Ok(state) => state,
        Err(err) => {
            tracing::error!(error = %err, "failed to open snapshot store");
            process::exit(1);
        }
    };
    tracing::info!(policy = ?config.save_policy, "save policy");

    let app = build_router(state);

    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("linkcard server starting on {}", addr);

    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!(error = %err, %addr, "failed to bind");
            process::exit(1);
        }
    };
    if let Err(err) = axum::serve(listener, app).await {
        tracing::error!(error = %err, "server stopped");
        process::exit(1);
    }
}
