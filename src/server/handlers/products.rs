//! Product catalog with filters, and per-product detail

use crate::analytics;
use crate::analytics::{ProductBreakdown, ProductDetail};
use crate::core::error::AppError;
use crate::core::period::Period;
use crate::server::AppState;
use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Query parameters for the product catalog
#[derive(Debug, Default, Deserialize)]
pub struct ProductQuery {
    pub period: Option<String>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    /// Case-insensitive substring over name and keywords
    pub search: Option<String>,
    /// Keep only products bought at this store (exact name)
    pub store: Option<String>,
    /// "spent" (default) | "quantity" | "name" | "recent"
    pub sort: Option<String>,
}

/// Response for the product catalog endpoint
#[derive(Debug, Serialize)]
pub struct ProductsResponse {
    pub products: Vec<ProductBreakdown>,
    pub count: usize,
    /// All stores seen in the window, for the filter dropdown
    pub stores: Vec<String>,
}

fn matches_search(product: &ProductBreakdown, needle: &str) -> bool {
    product.name.to_lowercase().contains(needle)
        || product
            .keywords
            .iter()
            .any(|k| k.to_lowercase().contains(needle))
}

/// Product catalog over a time window
///
/// GET /api/products?period=30days&search=arroz&store=Mercado%20X&sort=spent
pub async fn list_products(
    State(state): State<AppState>,
    Query(query): Query<ProductQuery>,
    headers: HeaderMap,
) -> Result<Json<ProductsResponse>, AppError> {
    let ctx = state.authenticate(&headers).await?;
    let range =
        Period::from_query(query.period.as_deref(), query.from, query.to)?.bounds(Utc::now());

    let receipts = state.receipts.list_receipts(ctx.user_id, &range).await?;

    let all_products = analytics::products_breakdown(&receipts);
    let stores: Vec<String> = analytics::stores_breakdown(&receipts)
        .into_iter()
        .map(|s| s.name)
        .collect();

    let mut products: Vec<ProductBreakdown> = all_products
        .into_iter()
        .filter(|p| match query.search.as_deref() {
            Some(needle) => matches_search(p, &needle.to_lowercase()),
            None => true,
        })
        .filter(|p| match query.store.as_deref() {
            Some(store) => p.stores.iter().any(|s| s == store),
            None => true,
        })
        .collect();

    match query.sort.as_deref() {
        None | Some("spent") => {} // products_breakdown already ranks by spend
        Some("quantity") => products.sort_by(|a, b| {
            b.quantity_bought
                .partial_cmp(&a.quantity_bought)
                .unwrap_or(std::cmp::Ordering::Equal)
        }),
        Some("name") => products.sort_by(|a, b| a.name.cmp(&b.name)),
        Some("recent") => products.sort_by(|a, b| b.last_purchased_at.cmp(&a.last_purchased_at)),
        Some(other) => {
            return Err(AppError::input(format!("unknown sort order '{}'", other)));
        }
    }

    Ok(Json(ProductsResponse {
        count: products.len(),
        products,
        stores,
    }))
}

/// One product's purchases broken down by store
///
/// GET /api/products/{name}?period=30days
pub async fn product_detail(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Query(query): Query<ProductQuery>,
    headers: HeaderMap,
) -> Result<Json<ProductDetail>, AppError> {
    let ctx = state.authenticate(&headers).await?;
    let range =
        Period::from_query(query.period.as_deref(), query.from, query.to)?.bounds(Utc::now());

    let receipts = state.receipts.list_receipts(ctx.user_id, &range).await?;

    analytics::product_detail(&receipts, &name)
        .map(Json)
        .ok_or_else(|| AppError::not_found("product", name))
}
