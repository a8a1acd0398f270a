//! Payable-bill CRUD, mark-paid, and the supplier/category name lists

use crate::core::error::AppError;
use crate::model::bill::{Bill, BillDraft, BillStatus};
use crate::server::AppState;
use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use chrono::Utc;
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Query parameters for the bill list
#[derive(Debug, Default, Deserialize)]
pub struct BillsQuery {
    /// "open" | "overdue" | "paid" | "all" (default)
    pub status: Option<String>,
    /// Case-insensitive substring over supplier, category and description
    pub search: Option<String>,
}

/// Response for the bill list endpoint
#[derive(Debug, Serialize)]
pub struct BillsResponse {
    pub bills: Vec<Bill>,
    pub count: usize,
}

fn matches_search(bill: &Bill, needle: &str) -> bool {
    bill.supplier_name.to_lowercase().contains(needle)
        || bill.category_name.to_lowercase().contains(needle)
        || bill
            .description
            .as_deref()
            .is_some_and(|d| d.to_lowercase().contains(needle))
}

/// List the caller's bills, due date ascending.
///
/// GET /api/bills?status=overdue&search=energia
///
/// The `status` field of each returned bill is the displayed status: an
/// Open bill past its due date reads as Overdue here, while the stored
/// field stays Open until the bill is explicitly paid.
pub async fn list_bills(
    State(state): State<AppState>,
    Query(query): Query<BillsQuery>,
    headers: HeaderMap,
) -> Result<Json<BillsResponse>, AppError> {
    let ctx = state.authenticate(&headers).await?;

    let status_filter = match query.status.as_deref() {
        None | Some("all") => None,
        Some(s) => Some(
            BillStatus::parse(s)
                .ok_or_else(|| AppError::input(format!("unknown status '{}'", s)))?,
        ),
    };

    let today = Utc::now().date_naive();
    let needle = query.search.as_deref().map(str::to_lowercase);

    let bills: Vec<Bill> = state
        .bills
        .list_bills(ctx.user_id)
        .await?
        .into_iter()
        .map(|mut bill| {
            bill.status = bill.effective_status(today);
            bill
        })
        .filter(|bill| status_filter.is_none_or(|wanted| bill.status == wanted))
        .filter(|bill| {
            needle
                .as_deref()
                .is_none_or(|needle| matches_search(bill, needle))
        })
        .collect();

    Ok(Json(BillsResponse {
        count: bills.len(),
        bills,
    }))
}

/// Create a bill; `pay_now` saves it already paid
///
/// POST /api/bills
pub async fn create_bill(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(draft): Json<BillDraft>,
) -> Result<(StatusCode, Json<Bill>), AppError> {
    let ctx = state.authenticate(&headers).await?;

    draft
        .validate()
        .map_err(|e| AppError::input(e.to_string()))?;

    let bill = draft.into_bill(ctx.user_id, Utc::now());
    let saved = state.bills.insert_bill(bill).await?;

    Ok((StatusCode::CREATED, Json(saved)))
}

/// Edit a bill. Last write wins; payment state is preserved unless the
/// edit itself carries `pay_now`.
///
/// PUT /api/bills/{id}
pub async fn update_bill(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
    Json(draft): Json<BillDraft>,
) -> Result<Json<Bill>, AppError> {
    let ctx = state.authenticate(&headers).await?;

    draft
        .validate()
        .map_err(|e| AppError::input(e.to_string()))?;

    let existing = state
        .bills
        .get_bill(ctx.user_id, id)
        .await?
        .ok_or_else(|| AppError::not_found("bill", id.to_string()))?;

    let pay_now = draft.pay_now;
    let mut updated = draft.into_bill(ctx.user_id, Utc::now());
    updated.id = existing.id;
    updated.created_at = existing.created_at;
    if !pay_now {
        updated.status = existing.status;
        updated.paid_at = existing.paid_at;
    }

    state
        .bills
        .update_bill(ctx.user_id, id, updated)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::not_found("bill", id.to_string()))
}

/// Delete a bill
///
/// DELETE /api/bills/{id}
pub async fn delete_bill(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
) -> Result<StatusCode, AppError> {
    let ctx = state.authenticate(&headers).await?;

    if state.bills.delete_bill(ctx.user_id, id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::not_found("bill", id.to_string()))
    }
}

/// Mark a bill as paid, stamping the payment instant
///
/// POST /api/bills/{id}/pay
pub async fn pay_bill(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
) -> Result<Json<Bill>, AppError> {
    let ctx = state.authenticate(&headers).await?;

    state
        .bills
        .mark_bill_paid(ctx.user_id, id, Utc::now())
        .await?
        .map(Json)
        .ok_or_else(|| AppError::not_found("bill", id.to_string()))
}

/// Response for the supplier/category name lists
#[derive(Debug, Serialize)]
pub struct NamesResponse {
    pub names: Vec<String>,
}

fn distinct_sorted(names: impl IntoIterator<Item = String>) -> Vec<String> {
    let mut set: IndexSet<String> = names.into_iter().collect();
    set.sort();
    set.into_iter().collect()
}

/// Distinct supplier names across the caller's bills, for form autocomplete
///
/// GET /api/bills/suppliers
pub async fn list_suppliers(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<NamesResponse>, AppError> {
    let ctx = state.authenticate(&headers).await?;

    let bills = state.bills.list_bills(ctx.user_id).await?;
    Ok(Json(NamesResponse {
        names: distinct_sorted(bills.into_iter().map(|b| b.supplier_name)),
    }))
}

/// Distinct category names across the caller's bills
///
/// GET /api/bills/categories
pub async fn list_categories(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<NamesResponse>, AppError> {
    let ctx = state.authenticate(&headers).await?;

    let bills = state.bills.list_bills(ctx.user_id).await?;
    Ok(Json(NamesResponse {
        names: distinct_sorted(bills.into_iter().map(|b| b.category_name)),
    }))
}
