//! Receipt ingestion pipeline
//!
//! One user-initiated action runs the whole chain synchronously: intake
//! validation, the external model call, normalization, then the atomic
//! receipt + line-items insert. The steps are strictly ordered awaits;
//! across attempts there is no ordering or mutual exclusion, so two
//! concurrent scans by the same user both insert.

use crate::capture::{DocumentKind, DocumentPayload};
use crate::core::error::AppError;
use crate::extraction::gateway::VisionGateway;
use crate::extraction::normalize::normalize_extraction;
use crate::model::receipt::ReceiptWithItems;
use crate::storage::ReceiptStore;
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

/// Orchestrates capture → extraction → normalization → persistence
pub struct IngestService {
    gateway: Arc<dyn VisionGateway>,
    store: Arc<dyn ReceiptStore>,
}

impl IngestService {
    pub fn new(gateway: Arc<dyn VisionGateway>, store: Arc<dyn ReceiptStore>) -> Self {
        Self { gateway, store }
    }

    /// Run one ingestion attempt for `owner_id`.
    ///
    /// Input validation happens before the gateway is touched, so a missing
    /// or undecodable document costs no network round trip. Persistence is
    /// only attempted after successful normalization; a failure anywhere
    /// leaves no partial rows behind.
    pub async fn ingest(
        &self,
        owner_id: Uuid,
        raw_document: &str,
        kind_hint: Option<DocumentKind>,
    ) -> Result<ReceiptWithItems, AppError> {
        let doc = DocumentPayload::parse(raw_document, kind_hint)?;

        let text = self.gateway.extract(&doc).await?;
        tracing::debug!(chars = text.len(), "vision gateway replied");

        let normalized = normalize_extraction(&text)?;
        tracing::debug!(
            store = normalized.store_name.as_deref().unwrap_or("<unidentified>"),
            items = normalized.items.len(),
            "extraction normalized"
        );

        let saved = self
            .store
            .insert_receipt(owner_id, normalized, Utc::now())
            .await
            .map_err(|e| AppError::storage(e.to_string()))?;

        tracing::info!(
            receipt_id = %saved.receipt.id,
            store = %saved.receipt.store_name,
            items = saved.items.len(),
            "receipt ingested"
        );

        Ok(saved)
    }
}
