//! Shared fixtures for the HTTP integration tests
#![allow(dead_code)]

use async_trait::async_trait;
use axum_test::TestServer;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use chrono::{DateTime, Utc};
use spendscan::capture::DocumentPayload;
use spendscan::core::auth::TokenAuthProvider;
use spendscan::extraction::gateway::{ExtractionError, VisionGateway};
use spendscan::model::receipt::{NewLineItem, NewReceipt, ReceiptWithItems};
use spendscan::server::{AppState, build_router};
use spendscan::storage::{InMemoryStore, ReceiptStore};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use uuid::Uuid;

/// Session token for the primary test user
pub const ALICE_TOKEN: &str = "alice-session-token";
/// Session token for a second user, for isolation tests
pub const BOB_TOKEN: &str = "bob-session-token";

/// Gateway stub returning a canned text reply
pub struct MockGateway {
    reply: Result<String, u16>,
    calls: Arc<AtomicUsize>,
}

impl MockGateway {
    pub fn replying(text: &str) -> Self {
        Self {
            reply: Ok(text.to_string()),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn failing(status: u16) -> Self {
        Self {
            reply: Err(status),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn call_counter(&self) -> Arc<AtomicUsize> {
        self.calls.clone()
    }
}

#[async_trait]
impl VisionGateway for MockGateway {
    async fn extract(&self, _doc: &DocumentPayload) -> Result<String, ExtractionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.reply {
            Ok(text) => Ok(text.clone()),
            Err(status) => Err(ExtractionError::Gateway {
                status: *status,
                body: "upstream error".to_string(),
            }),
        }
    }
}

pub struct TestApp {
    pub server: TestServer,
    pub store: Arc<InMemoryStore>,
    pub alice: Uuid,
    pub bob: Uuid,
    pub gateway_calls: Arc<AtomicUsize>,
}

/// Build a test server around an in-memory store and the given gateway
pub fn spawn_app_with_gateway(gateway: Arc<dyn VisionGateway>) -> TestApp {
    let store = Arc::new(InMemoryStore::new());
    let alice = Uuid::new_v4();
    let bob = Uuid::new_v4();

    let auth = Arc::new(TokenAuthProvider::from_pairs([
        (ALICE_TOKEN.to_string(), alice),
        (BOB_TOKEN.to_string(), bob),
    ]));

    let state = AppState::new(store.clone(), store.clone(), gateway, auth);
    let server = TestServer::try_new(build_router(state)).expect("failed to build test server");

    TestApp {
        server,
        store,
        alice,
        bob,
        gateway_calls: Arc::new(AtomicUsize::new(0)),
    }
}

/// Test server whose gateway answers every extraction with `reply`
pub fn spawn_app(reply: &str) -> TestApp {
    let gateway = MockGateway::replying(reply);
    let calls = gateway.call_counter();
    let mut app = spawn_app_with_gateway(Arc::new(gateway));
    app.gateway_calls = calls;
    app
}

/// A minimal JPEG payload as a data URI, the shape capture clients send
pub fn jpeg_document() -> String {
    format!(
        "data:image/jpeg;base64,{}",
        BASE64.encode([0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10])
    )
}

/// Insert a receipt directly into the store, bypassing the pipeline
pub async fn seed_receipt(
    store: &InMemoryStore,
    owner: Uuid,
    store_name: &str,
    total: f64,
    purchased_at: DateTime<Utc>,
    items: &[(&str, f64, f64)],
) -> ReceiptWithItems {
    store
        .insert_receipt(
            owner,
            NewReceipt {
                store_name: Some(store_name.to_string()),
                total_amount: Some(total),
                items: items
                    .iter()
                    .map(|(name, line_total, quantity)| NewLineItem {
                        name: name.to_string(),
                        unit_price: None,
                        line_total: *line_total,
                        quantity: *quantity,
                        unit: "un".to_string(),
                        keywords: vec![],
                    })
                    .collect(),
            },
            purchased_at,
        )
        .await
        .expect("seed receipt")
}
