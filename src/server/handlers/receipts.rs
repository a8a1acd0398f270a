//! Receipt listing, detail and deletion

use crate::core::error::AppError;
use crate::model::receipt::ReceiptWithItems;
use crate::server::AppState;
use crate::server::handlers::PeriodQuery;
use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use serde::Serialize;
use uuid::Uuid;

/// Response for the receipt list endpoint
#[derive(Debug, Serialize)]
pub struct ListReceiptsResponse {
    pub receipts: Vec<ReceiptWithItems>,
    pub count: usize,
}

/// List the caller's receipts in a time window, newest first
///
/// GET /api/receipts?period=30days
pub async fn list_receipts(
    State(state): State<AppState>,
    Query(query): Query<PeriodQuery>,
    headers: HeaderMap,
) -> Result<Json<ListReceiptsResponse>, AppError> {
    let ctx = state.authenticate(&headers).await?;
    let range = query.resolve()?;

    let receipts = state.receipts.list_receipts(ctx.user_id, &range).await?;

    Ok(Json(ListReceiptsResponse {
        count: receipts.len(),
        receipts,
    }))
}

/// Get one receipt with its line items
///
/// GET /api/receipts/{id}
pub async fn get_receipt(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
) -> Result<Json<ReceiptWithItems>, AppError> {
    let ctx = state.authenticate(&headers).await?;

    state
        .receipts
        .get_receipt(ctx.user_id, id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::not_found("receipt", id.to_string()))
}

/// Delete a receipt and its line items
///
/// DELETE /api/receipts/{id}
pub async fn delete_receipt(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
) -> Result<StatusCode, AppError> {
    let ctx = state.authenticate(&headers).await?;

    if state.receipts.delete_receipt(ctx.user_id, id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::not_found("receipt", id.to_string()))
    }
}
