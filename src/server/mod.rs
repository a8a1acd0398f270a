//! HTTP exposure: application state, router and listener

pub mod handlers;
mod router;
mod state;

pub use router::build_router;
pub use state::AppState;

use crate::config::ServerConfig;
use anyhow::{Context, Result};

/// Bind the listener and serve until shutdown
pub async fn serve(config: &ServerConfig, state: AppState) -> Result<()> {
    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;

    tracing::info!("listening on {}", addr);

    axum::serve(listener, build_router(state))
        .await
        .context("server error")?;

    Ok(())
}
