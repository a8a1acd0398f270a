//! Application state shared across handlers

use crate::core::auth::{AuthContext, AuthProvider};
use crate::core::error::AppError;
use crate::extraction::gateway::VisionGateway;
use crate::ingest::IngestService;
use crate::storage::{BillStore, ReceiptStore};
use axum::http::HeaderMap;
use std::sync::Arc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub receipts: Arc<dyn ReceiptStore>,
    pub bills: Arc<dyn BillStore>,
    pub ingest: Arc<IngestService>,
    pub auth: Arc<dyn AuthProvider>,
}

impl AppState {
    pub fn new(
        receipts: Arc<dyn ReceiptStore>,
        bills: Arc<dyn BillStore>,
        gateway: Arc<dyn VisionGateway>,
        auth: Arc<dyn AuthProvider>,
    ) -> Self {
        let ingest = Arc::new(IngestService::new(gateway, receipts.clone()));
        Self {
            receipts,
            bills,
            ingest,
            auth,
        }
    }

    /// Resolve the calling user; every handler does this first
    pub async fn authenticate(&self, headers: &HeaderMap) -> Result<AuthContext, AppError> {
        self.auth.authenticate(headers).await
    }
}
