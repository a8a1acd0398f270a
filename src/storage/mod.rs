//! Storage backends
//!
//! Two service traits cover the persisted model: [`ReceiptStore`] for
//! receipts with their line items and [`BillStore`] for payable bills.
//! Every operation is scoped by the owning user's id; owner scoping is
//! enforced here, at the data-access layer, not in handlers.
//!
//! The in-memory backend is the default feature; a PostgreSQL backend is
//! available behind the `postgres` feature flag.

pub mod in_memory;
#[cfg(feature = "postgres")]
pub mod postgres;

pub use in_memory::InMemoryStore;
#[cfg(feature = "postgres")]
pub use postgres::PostgresStore;

use crate::core::period::TimeRange;
use crate::model::bill::Bill;
use crate::model::receipt::{NewReceipt, ReceiptWithItems};
use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Service trait for receipts and their line items
#[async_trait]
pub trait ReceiptStore: Send + Sync {
    /// Insert one receipt and all of its line items as a single atomic
    /// operation. Absent store name and total default to
    /// "store not identified" and zero; `purchased_at` is the insertion
    /// instant supplied by the caller, not a value read from the document.
    async fn insert_receipt(
        &self,
        owner_id: Uuid,
        receipt: NewReceipt,
        purchased_at: DateTime<Utc>,
    ) -> Result<ReceiptWithItems>;

    /// Get one receipt with its items
    async fn get_receipt(&self, owner_id: Uuid, id: Uuid) -> Result<Option<ReceiptWithItems>>;

    /// List the owner's receipts with purchase instant in `range`
    /// (half-open), newest first
    async fn list_receipts(
        &self,
        owner_id: Uuid,
        range: &TimeRange,
    ) -> Result<Vec<ReceiptWithItems>>;

    /// Delete a receipt and its line items; returns whether it existed
    async fn delete_receipt(&self, owner_id: Uuid, id: Uuid) -> Result<bool>;

    /// Rename a store across all of the owner's receipts matching `from`
    /// exactly; returns the number of receipts updated
    async fn rename_store(&self, owner_id: Uuid, from: &str, to: &str) -> Result<u64>;
}

/// Service trait for payable bills
#[async_trait]
pub trait BillStore: Send + Sync {
    async fn insert_bill(&self, bill: Bill) -> Result<Bill>;

    async fn get_bill(&self, owner_id: Uuid, id: Uuid) -> Result<Option<Bill>>;

    /// All of the owner's bills, due date ascending
    async fn list_bills(&self, owner_id: Uuid) -> Result<Vec<Bill>>;

    /// Replace a bill's fields; last write wins, there is no concurrency
    /// token. Returns None when the bill does not exist for this owner.
    async fn update_bill(&self, owner_id: Uuid, id: Uuid, bill: Bill) -> Result<Option<Bill>>;

    async fn delete_bill(&self, owner_id: Uuid, id: Uuid) -> Result<bool>;

    /// Transition a bill to Paid, stamping `paid_at`
    async fn mark_bill_paid(
        &self,
        owner_id: Uuid,
        id: Uuid,
        at: DateTime<Utc>,
    ) -> Result<Option<Bill>>;

    /// The owner's paid bills whose payment instant falls in `range`,
    /// for the combined history view
    async fn list_paid_bills(&self, owner_id: Uuid, range: &TimeRange) -> Result<Vec<Bill>>;

    /// Rename a supplier across the owner's PAID bills matching `from`
    /// exactly; returns the number of bills updated
    async fn rename_paid_supplier(&self, owner_id: Uuid, from: &str, to: &str) -> Result<u64>;
}
