//! Router wiring for all HTTP routes

use crate::server::AppState;
use crate::server::handlers::{analytics, bills, products, receipts, scan, stores};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Build the application router.
///
/// Every `/api` route resolves the authenticated owner before touching any
/// data. CORS is permissive: capture clients are browser pages served from
/// another origin.
pub fn build_router(state: AppState) -> Router {
    let api = Router::new()
        .route("/scan", post(scan::scan_document))
        .route("/receipts", get(receipts::list_receipts))
        .route(
            "/receipts/{id}",
            get(receipts::get_receipt).delete(receipts::delete_receipt),
        )
        .route("/stores", get(stores::list_stores))
        .route("/stores/rename", post(stores::rename_store))
        .route("/stores/{name}", get(stores::store_detail))
        .route("/products", get(products::list_products))
        .route("/products/{name}", get(products::product_detail))
        .route("/bills", get(bills::list_bills).post(bills::create_bill))
        .route("/bills/suppliers", get(bills::list_suppliers))
        .route("/bills/categories", get(bills::list_categories))
        .route(
            "/bills/{id}",
            put(bills::update_bill).delete(bills::delete_bill),
        )
        .route("/bills/{id}/pay", post(bills::pay_bill))
        .route("/summary", get(analytics::summary))
        .route("/history", get(analytics::history));

    Router::new()
        .route("/health", get(health))
        .nest("/api", api)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}
