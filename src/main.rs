use anyhow::Result;
use spendscan::config::AppConfig;
use spendscan::core::auth::{AuthProvider, SingleUserProvider, TokenAuthProvider};
use spendscan::extraction::gateway::GeminiGateway;
use spendscan::server::{self, AppState};
use spendscan::storage::{BillStore, InMemoryStore, ReceiptStore};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Config file path from the first argument, SPENDSCAN_CONFIG, or none.
    let config_path = std::env::args()
        .nth(1)
        .or_else(|| std::env::var("SPENDSCAN_CONFIG").ok());
    let config = AppConfig::load(config_path.as_deref())?;

    if config.extraction.api_key.is_none() {
        warn!("GEMINI_API_KEY is not set; scan requests will fail with a configuration error");
    }

    let (receipts, bills) = build_stores().await?;
    let gateway = Arc::new(GeminiGateway::new(&config.extraction));
    let auth = build_auth(&config);

    let state = AppState::new(receipts, bills, gateway, auth);

    info!(model = %config.extraction.model, "starting spendscan");
    server::serve(&config.server, state).await
}

async fn build_stores() -> Result<(Arc<dyn ReceiptStore>, Arc<dyn BillStore>)> {
    #[cfg(feature = "postgres")]
    {
        if let Ok(url) = std::env::var("DATABASE_URL") {
            info!("using PostgreSQL storage");
            let store = Arc::new(spendscan::storage::PostgresStore::connect(&url).await?);
            return Ok((store.clone(), store));
        }
    }

    info!("using in-memory storage");
    let store = Arc::new(InMemoryStore::new());
    Ok((store.clone(), store))
}

fn build_auth(config: &AppConfig) -> Arc<dyn AuthProvider> {
    if config.auth.tokens.is_empty() {
        warn!("no auth tokens configured; running in single-user development mode");
        Arc::new(SingleUserProvider::default())
    } else {
        info!(sessions = config.auth.tokens.len(), "token authentication enabled");
        Arc::new(TokenAuthProvider::from_pairs(
            config
                .auth
                .tokens
                .iter()
                .map(|entry| (entry.token.clone(), entry.user_id)),
        ))
    }
}
