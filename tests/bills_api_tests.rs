//! Integration tests for the payable-bills endpoints

mod common;

use axum::http::StatusCode;
use chrono::{Duration, Utc};
use common::*;
use serde_json::{Value, json};
use spendscan::storage::BillStore;
use uuid::Uuid;

fn bill_body(supplier: &str, due_in_days: i64) -> Value {
    let today = Utc::now().date_naive();
    json!({
        "supplier_name": supplier,
        "amount": 150.0,
        "issue_date": today,
        "due_date": today + Duration::days(due_in_days),
    })
}

async fn create_bill(app: &TestApp, body: &Value) -> Value {
    let response = app
        .server
        .post("/api/bills")
        .authorization_bearer(ALICE_TOKEN)
        .json(body)
        .await;
    response.assert_status(StatusCode::CREATED);
    response.json()
}

#[tokio::test]
async fn test_create_bill_applies_form_defaults() {
    let app = spawn_app("{}");

    let bill = create_bill(&app, &bill_body("Energia SA", 10)).await;

    assert_eq!(bill["supplier_name"], "Energia SA");
    assert_eq!(bill["status"], "open");
    assert_eq!(bill["payment_method"], "Dinheiro");
    assert_eq!(bill["account"], "Caixa");
    assert_eq!(bill["category_name"], "Sem categoria");
    assert_eq!(bill["competency_date"], bill["issue_date"]);
    assert!(bill["paid_at"].is_null());
}

#[tokio::test]
async fn test_create_bill_with_pay_now_is_paid_immediately() {
    let app = spawn_app("{}");

    let mut body = bill_body("Internet SA", 10);
    body["pay_now"] = json!(true);
    let bill = create_bill(&app, &body).await;

    assert_eq!(bill["status"], "paid");
    assert!(bill["paid_at"].is_string());
}

#[tokio::test]
async fn test_create_bill_validation() {
    let app = spawn_app("{}");

    let mut blank_supplier = bill_body("", 10);
    blank_supplier["supplier_name"] = json!("");
    app.server
        .post("/api/bills")
        .authorization_bearer(ALICE_TOKEN)
        .json(&blank_supplier)
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    let mut zero_amount = bill_body("Energia SA", 10);
    zero_amount["amount"] = json!(0.0);
    app.server
        .post("/api/bills")
        .authorization_bearer(ALICE_TOKEN)
        .json(&zero_amount)
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_overdue_is_derived_without_mutating_storage() {
    let app = spawn_app("{}");

    let bill = create_bill(&app, &bill_body("Atrasada SA", -5)).await;
    let bill_id: Uuid = bill["id"].as_str().unwrap().parse().unwrap();

    let listed = app
        .server
        .get("/api/bills")
        .authorization_bearer(ALICE_TOKEN)
        .await;
    listed.assert_status_ok();
    let listed: Value = listed.json();
    assert_eq!(listed["bills"][0]["status"], "overdue", "displayed as overdue");

    // The stored row still says open.
    let stored = app
        .store
        .get_bill(app.alice, bill_id)
        .await
        .unwrap()
        .expect("bill exists");
    assert_eq!(stored.status, spendscan::model::bill::BillStatus::Open);
    assert!(stored.paid_at.is_none());
}

#[tokio::test]
async fn test_status_filter_and_search() {
    let app = spawn_app("{}");

    create_bill(&app, &bill_body("Energia SA", -3)).await;
    create_bill(&app, &bill_body("Água SA", 5)).await;
    let mut paid = bill_body("Internet SA", 2);
    paid["pay_now"] = json!(true);
    create_bill(&app, &paid).await;

    let overdue = app
        .server
        .get("/api/bills")
        .add_query_param("status", "overdue")
        .authorization_bearer(ALICE_TOKEN)
        .await;
    let overdue: Value = overdue.json();
    assert_eq!(overdue["count"], 1);
    assert_eq!(overdue["bills"][0]["supplier_name"], "Energia SA");

    let paid = app
        .server
        .get("/api/bills")
        .add_query_param("status", "paid")
        .authorization_bearer(ALICE_TOKEN)
        .await;
    let paid: Value = paid.json();
    assert_eq!(paid["count"], 1);
    assert_eq!(paid["bills"][0]["supplier_name"], "Internet SA");

    let searched = app
        .server
        .get("/api/bills")
        .add_query_param("search", "água")
        .authorization_bearer(ALICE_TOKEN)
        .await;
    let searched: Value = searched.json();
    assert_eq!(searched["count"], 1);

    app.server
        .get("/api/bills")
        .add_query_param("status", "shredded")
        .authorization_bearer(ALICE_TOKEN)
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_pay_bill_stamps_payment_date() {
    let app = spawn_app("{}");

    let bill = create_bill(&app, &bill_body("Energia SA", 10)).await;
    let id = bill["id"].as_str().unwrap();

    let response = app
        .server
        .post(&format!("/api/bills/{}/pay", id))
        .authorization_bearer(ALICE_TOKEN)
        .await;

    response.assert_status_ok();
    let paid: Value = response.json();
    assert_eq!(paid["status"], "paid");
    assert!(paid["paid_at"].is_string());
}

#[tokio::test]
async fn test_update_preserves_payment_state() {
    let app = spawn_app("{}");

    let mut body = bill_body("Internet SA", 5);
    body["pay_now"] = json!(true);
    let bill = create_bill(&app, &body).await;
    let id = bill["id"].as_str().unwrap();

    // Edit the amount without touching pay_now.
    let mut edit = bill_body("Internet SA", 5);
    edit["amount"] = json!(199.9);
    let response = app
        .server
        .put(&format!("/api/bills/{}", id))
        .authorization_bearer(ALICE_TOKEN)
        .json(&edit)
        .await;

    response.assert_status_ok();
    let updated: Value = response.json();
    assert_eq!(updated["amount"], 199.9);
    assert_eq!(updated["status"], "paid", "payment survives the edit");
    assert_eq!(updated["paid_at"], bill["paid_at"]);
}

#[tokio::test]
async fn test_delete_bill() {
    let app = spawn_app("{}");

    let bill = create_bill(&app, &bill_body("Energia SA", 10)).await;
    let id = bill["id"].as_str().unwrap();

    app.server
        .delete(&format!("/api/bills/{}", id))
        .authorization_bearer(ALICE_TOKEN)
        .await
        .assert_status(StatusCode::NO_CONTENT);

    let listed = app
        .server
        .get("/api/bills")
        .authorization_bearer(ALICE_TOKEN)
        .await;
    let listed: Value = listed.json();
    assert_eq!(listed["count"], 0);
}

#[tokio::test]
async fn test_bills_are_isolated_per_user() {
    let app = spawn_app("{}");

    let bill = create_bill(&app, &bill_body("Energia SA", 10)).await;
    let id = bill["id"].as_str().unwrap();

    let bob_list = app
        .server
        .get("/api/bills")
        .authorization_bearer(BOB_TOKEN)
        .await;
    let bob_list: Value = bob_list.json();
    assert_eq!(bob_list["count"], 0);

    app.server
        .delete(&format!("/api/bills/{}", id))
        .authorization_bearer(BOB_TOKEN)
        .await
        .assert_status(StatusCode::NOT_FOUND);

    app.server
        .post(&format!("/api/bills/{}/pay", id))
        .authorization_bearer(BOB_TOKEN)
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_supplier_and_category_lists() {
    let app = spawn_app("{}");

    create_bill(&app, &bill_body("Energia SA", 10)).await;
    create_bill(&app, &bill_body("Energia SA", 20)).await;
    let mut with_category = bill_body("Água SA", 15);
    with_category["category_name"] = json!("Moradia");
    create_bill(&app, &with_category).await;

    let suppliers = app
        .server
        .get("/api/bills/suppliers")
        .authorization_bearer(ALICE_TOKEN)
        .await;
    suppliers.assert_status_ok();
    let suppliers: Value = suppliers.json();
    assert_eq!(
        suppliers["names"],
        json!(["Energia SA", "Água SA"]),
        "distinct and sorted"
    );

    let categories = app
        .server
        .get("/api/bills/categories")
        .authorization_bearer(ALICE_TOKEN)
        .await;
    let categories: Value = categories.json();
    assert_eq!(categories["names"], json!(["Moradia", "Sem categoria"]));
}
