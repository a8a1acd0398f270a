//! Store breakdown, per-store detail and the rename-in-place flow

use crate::analytics;
use crate::analytics::{StoreBreakdown, StoreDetail};
use crate::core::error::AppError;
use crate::server::AppState;
use crate::server::handlers::PeriodQuery;
use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use serde::{Deserialize, Serialize};

/// Response for the store list endpoint
#[derive(Debug, Serialize)]
pub struct StoresResponse {
    pub stores: Vec<StoreBreakdown>,
    pub count: usize,
}

/// Spending grouped by store, ranked by total
///
/// GET /api/stores?period=30days
pub async fn list_stores(
    State(state): State<AppState>,
    Query(query): Query<PeriodQuery>,
    headers: HeaderMap,
) -> Result<Json<StoresResponse>, AppError> {
    let ctx = state.authenticate(&headers).await?;
    let range = query.resolve()?;

    let receipts = state.receipts.list_receipts(ctx.user_id, &range).await?;
    let stores = analytics::stores_breakdown(&receipts);

    Ok(Json(StoresResponse {
        count: stores.len(),
        stores,
    }))
}

/// One store's purchases broken down by product
///
/// GET /api/stores/{name}?period=30days
pub async fn store_detail(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Query(query): Query<PeriodQuery>,
    headers: HeaderMap,
) -> Result<Json<StoreDetail>, AppError> {
    let ctx = state.authenticate(&headers).await?;
    let range = query.resolve()?;

    let receipts = state.receipts.list_receipts(ctx.user_id, &range).await?;

    analytics::store_detail(&receipts, &name)
        .map(Json)
        .ok_or_else(|| AppError::not_found("store", name))
}

/// Request body for a rename
#[derive(Debug, Deserialize)]
pub struct RenameRequest {
    pub from: String,
    pub to: String,
}

/// Response for a rename
#[derive(Debug, Serialize)]
pub struct RenameResponse {
    pub receipts_renamed: u64,
    pub bills_renamed: u64,
}

/// Rename a store in place, by exact match, across the caller's receipts
/// and paid bills. Subsequent aggregations group under the new name only.
///
/// POST /api/stores/rename
pub async fn rename_store(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<RenameRequest>,
) -> Result<Json<RenameResponse>, AppError> {
    let ctx = state.authenticate(&headers).await?;

    let from = request.from.trim();
    let to = request.to.trim();
    if from.is_empty() || to.is_empty() {
        return Err(AppError::input("both 'from' and 'to' names are required"));
    }
    if from == to {
        return Err(AppError::input("'from' and 'to' are the same name"));
    }

    let receipts_renamed = state.receipts.rename_store(ctx.user_id, from, to).await?;
    let bills_renamed = state
        .bills
        .rename_paid_supplier(ctx.user_id, from, to)
        .await?;

    tracing::info!(%from, %to, receipts_renamed, bills_renamed, "store renamed");

    Ok(Json(RenameResponse {
        receipts_renamed,
        bills_renamed,
    }))
}
