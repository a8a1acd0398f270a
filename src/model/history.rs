//! Combined spending history
//!
//! The history view merges scanned purchases and paid bills into one list.
//! Rather than duck-typed object shapes, the union is a tagged variant with
//! the shared display fields on every arm.

use crate::model::bill::Bill;
use crate::model::receipt::ReceiptWithItems;
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// One entry in the combined purchase/bill history
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum HistoryEntry {
    Purchase {
        id: Uuid,
        date: DateTime<Utc>,
        store: String,
        total: f64,
        /// Line-item names, for the chip row under each entry
        items: Vec<String>,
    },
    Bill {
        id: Uuid,
        date: DateTime<Utc>,
        supplier: String,
        total: f64,
        category: String,
        description: Option<String>,
    },
}

impl HistoryEntry {
    pub fn date(&self) -> DateTime<Utc> {
        match self {
            HistoryEntry::Purchase { date, .. } => *date,
            HistoryEntry::Bill { date, .. } => *date,
        }
    }

    pub fn total(&self) -> f64 {
        match self {
            HistoryEntry::Purchase { total, .. } => *total,
            HistoryEntry::Bill { total, .. } => *total,
        }
    }
}

impl From<&ReceiptWithItems> for HistoryEntry {
    fn from(r: &ReceiptWithItems) -> Self {
        HistoryEntry::Purchase {
            id: r.receipt.id,
            date: r.receipt.purchased_at,
            store: r.receipt.store_name.clone(),
            total: r.receipt.total_amount,
            items: r.items.iter().map(|item| item.name.clone()).collect(),
        }
    }
}

impl From<&Bill> for HistoryEntry {
    fn from(bill: &Bill) -> Self {
        HistoryEntry::Bill {
            id: bill.id,
            // Paid bills enter history at their payment instant; the due
            // date is only a deadline, not a spending event.
            date: bill.paid_at.unwrap_or(bill.created_at),
            supplier: bill.supplier_name.clone(),
            total: bill.amount,
            category: bill.category_name.clone(),
            description: bill.description.clone(),
        }
    }
}
