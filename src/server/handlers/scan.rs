//! Receipt-scan endpoint: the ingestion pipeline's HTTP entry point

use crate::capture::DocumentKind;
use crate::core::error::AppError;
use crate::model::receipt::ReceiptWithItems;
use crate::server::AppState;
use axum::Json;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use serde::{Deserialize, Serialize};

/// Request body for a scan
#[derive(Debug, Deserialize)]
pub struct ScanRequest {
    /// Base64 document, with or without a `data:` URI prefix
    #[serde(default)]
    pub document: Option<String>,

    /// Optional kind hint: "image" | "pdf"
    #[serde(default)]
    pub kind: Option<String>,
}

/// Response for a successful scan
#[derive(Debug, Serialize)]
pub struct ScanResponse {
    pub message: String,
    pub receipt: ReceiptWithItems,
}

/// Scan a receipt document
///
/// POST /api/scan
///
/// Runs the whole pipeline: intake validation, the external model call,
/// normalization and the atomic insert. Caller errors (no session, no
/// document) are rejected before the model is contacted.
pub async fn scan_document(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<ScanRequest>,
) -> Result<(StatusCode, Json<ScanResponse>), AppError> {
    let ctx = state.authenticate(&headers).await?;

    let document = request
        .document
        .as_deref()
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .ok_or_else(|| AppError::input("document is required"))?;

    let kind_hint = match request.kind.as_deref() {
        None => None,
        Some(kind) => Some(
            DocumentKind::parse_hint(kind)
                .ok_or_else(|| AppError::input(format!("unknown document kind '{}'", kind)))?,
        ),
    };

    let receipt = state.ingest.ingest(ctx.user_id, document, kind_hint).await?;

    Ok((
        StatusCode::CREATED,
        Json(ScanResponse {
            message: "receipt processed successfully".to_string(),
            receipt,
        }),
    ))
}
