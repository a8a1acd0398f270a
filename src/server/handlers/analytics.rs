//! Dashboard summary and the combined purchase/bill history

use crate::analytics;
use crate::analytics::SpendingSummary;
use crate::core::error::AppError;
use crate::model::history::HistoryEntry;
use crate::server::AppState;
use crate::server::handlers::{PeriodQuery, TOP_N};
use axum::Json;
use axum::extract::{Query, State};
use axum::http::HeaderMap;
use serde::Serialize;

/// Dashboard numbers for a time window
///
/// GET /api/summary?period=30days
pub async fn summary(
    State(state): State<AppState>,
    Query(query): Query<PeriodQuery>,
    headers: HeaderMap,
) -> Result<Json<SpendingSummary>, AppError> {
    let ctx = state.authenticate(&headers).await?;
    let range = query.resolve()?;

    let receipts = state.receipts.list_receipts(ctx.user_id, &range).await?;

    Ok(Json(analytics::summarize(&receipts, TOP_N)))
}

/// Response for the combined history endpoint
#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub entries: Vec<HistoryEntry>,
    pub count: usize,
    pub total_spent: f64,
    /// Arithmetic mean per entry; zero when the window is empty
    pub average_spent: f64,
}

/// Purchases and paid bills merged into one history, newest first
///
/// GET /api/history?period=7days
pub async fn history(
    State(state): State<AppState>,
    Query(query): Query<PeriodQuery>,
    headers: HeaderMap,
) -> Result<Json<HistoryResponse>, AppError> {
    let ctx = state.authenticate(&headers).await?;
    let range = query.resolve()?;

    let receipts = state.receipts.list_receipts(ctx.user_id, &range).await?;
    let paid_bills = state.bills.list_paid_bills(ctx.user_id, &range).await?;

    let entries = analytics::history(&receipts, &paid_bills);
    let total_spent: f64 = entries.iter().map(|e| e.total()).sum();
    let average_spent = if entries.is_empty() {
        0.0
    } else {
        total_spent / entries.len() as f64
    };

    Ok(Json(HistoryResponse {
        count: entries.len(),
        entries,
        total_spent,
        average_spent,
    }))
}
