//! # Spendscan
//!
//! Backend service for a receipt-scanning personal finance tracker.
//!
//! Users photograph store receipts; an external vision-language model
//! extracts structured line items; the service persists them owner-scoped
//! and exposes aggregation endpoints for browsing spending by store, by
//! product and by time period, plus CRUD for manually-entered payable bills.
//!
//! ## Pipeline
//!
//! - **Intake** ([`capture`]): validate the uploaded base64 document and
//!   classify it as JPEG or PDF.
//! - **Extraction** ([`extraction`]): one call to the vision model gateway,
//!   then locate and decode the JSON object in its free-form reply.
//! - **Persistence** ([`storage`]): atomically insert the receipt and its
//!   line items, scoped to the authenticated owner.
//! - **Aggregation** ([`analytics`]): totals, means, per-store and
//!   per-product groupings, top-N rankings, combined purchase/bill history.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use spendscan::prelude::*;
//!
//! let store = Arc::new(InMemoryStore::new());
//! let gateway = Arc::new(GeminiGateway::new(&config.extraction));
//! let state = AppState::new(store.clone(), store, gateway, auth);
//!
//! let app = build_router(state);
//! axum::serve(listener, app).await?;
//! ```

pub mod analytics;
pub mod capture;
pub mod config;
pub mod core;
pub mod extraction;
pub mod ingest;
pub mod model;
pub mod server;
pub mod storage;

/// Re-exports of commonly used types and traits
pub mod prelude {
    // === Core ===
    pub use crate::core::{
        auth::{AuthContext, AuthProvider, SingleUserProvider, TokenAuthProvider},
        error::{AppError, AppResult},
        period::{Period, TimeRange},
    };

    // === Domain model ===
    pub use crate::model::{
        bill::{Bill, BillDraft, BillStatus},
        history::HistoryEntry,
        receipt::{LineItem, NewLineItem, NewReceipt, Receipt, ReceiptWithItems},
    };

    // === Pipeline ===
    pub use crate::capture::{DocumentKind, DocumentPayload};
    pub use crate::extraction::{
        gateway::{GeminiGateway, VisionGateway},
        normalize::normalize_extraction,
    };
    pub use crate::ingest::IngestService;

    // === Storage ===
    pub use crate::storage::{BillStore, InMemoryStore, ReceiptStore};

    // === Config ===
    pub use crate::config::AppConfig;

    // === Server ===
    pub use crate::server::{AppState, build_router};

    // === External dependencies ===
    pub use anyhow::Result;
    pub use async_trait::async_trait;
    pub use chrono::{DateTime, Utc};
    pub use serde::{Deserialize, Serialize};
    pub use std::sync::Arc;
    pub use uuid::Uuid;
}
