//! Quizgen · test generator backend
//!
//! - Axum HTTP API (`POST /api/generate-test` proxy + `/api/v1/...` helpers)
//! - Forwards generation to an external service at a single configured base URL
//! - Optional static frontend fallback
//!
//! Important env variables:
//!   PORT                 : u16 (default 3000)
//!   UPSTREAM_BASE_URL    : base URL of the generation/upload service
//!   VERCEL_URL           : deployment host, used as https://{host} when no explicit base URL
//!   QUIZGEN_CONFIG_PATH  : path to TOML config (messages, form defaults, theme, static dir)
//!   LOG_LEVEL            : tracing filter, e.g. "debug" or full directives
//!   LOG_FORMAT           : "pretty" (default) or "json"

use std::{net::SocketAddr, sync::Arc};

use tokio::net::TcpListener;
use tracing::info;

use quizgen_backend::routes::build_router;
use quizgen_backend::state::AppState;
use quizgen_backend::telemetry;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
  telemetry::init_tracing();

  // Shared state: config, upstream client, theme.
  let state = Arc::new(AppState::from_env()?);

  let app = build_router(state);

  // Read port from env or default to 3000.
  let addr: SocketAddr = std::env::var("PORT")
    .ok()
    .and_then(|p| p.parse::<u16>().ok())
    .map(|port| SocketAddr::from(([0, 0, 0, 0], port)))
    .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], 3000)));

  let listener = TcpListener::bind(addr).await?;
  info!(target: "quizgen_backend", %addr, "HTTP server listening");
  axum::serve(listener, app)
    .with_graceful_shutdown(shutdown_signal())
    .await?;
  Ok(())
}

async fn shutdown_signal() {
  if let Err(e) = tokio::signal::ctrl_c().await {
    tracing::error!(target: "quizgen_backend", error = %e, "Failed to listen for shutdown signal");
    std::future::pending::<()>().await;
  }
  info!(target: "quizgen_backend", "Shutdown signal received");
}
