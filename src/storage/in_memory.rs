//! In-memory implementation of the storage traits for testing and development

use crate::core::period::TimeRange;
use crate::model::bill::{Bill, BillStatus};
use crate::model::receipt::{
    LineItem, NewReceipt, Receipt, ReceiptWithItems, UNIDENTIFIED_STORE,
};
use crate::storage::{BillStore, ReceiptStore};
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use uuid::Uuid;

#[derive(Default)]
struct StoreInner {
    receipts: HashMap<Uuid, Receipt>,
    /// Line items keyed by their owning receipt
    items: HashMap<Uuid, Vec<LineItem>>,
    bills: HashMap<Uuid, Bill>,
}

/// In-memory store implementing both service traits.
///
/// One RwLock guards all tables, so the receipt + line-items insert is a
/// single write section and can never be observed half-done.
#[derive(Clone)]
pub struct InMemoryStore {
    inner: Arc<RwLock<StoreInner>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(StoreInner::default())),
        }
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ReceiptStore for InMemoryStore {
    async fn insert_receipt(
        &self,
        owner_id: Uuid,
        receipt: NewReceipt,
        purchased_at: DateTime<Utc>,
    ) -> Result<ReceiptWithItems> {
        let mut inner = self
            .inner
            .write()
            .map_err(|e| anyhow!("failed to acquire write lock: {}", e))?;

        let stored = Receipt {
            id: Uuid::new_v4(),
            owner_id,
            store_name: receipt
                .store_name
                .unwrap_or_else(|| UNIDENTIFIED_STORE.to_string()),
            total_amount: receipt.total_amount.unwrap_or(0.0),
            purchased_at,
            created_at: purchased_at,
        };

        let items: Vec<LineItem> = receipt
            .items
            .into_iter()
            .map(|item| LineItem {
                id: Uuid::new_v4(),
                receipt_id: stored.id,
                name: item.name,
                unit_price: item.unit_price,
                line_total: item.line_total,
                quantity: item.quantity,
                unit: item.unit,
                keywords: item.keywords,
            })
            .collect();

        inner.receipts.insert(stored.id, stored.clone());
        inner.items.insert(stored.id, items.clone());

        Ok(ReceiptWithItems {
            receipt: stored,
            items,
        })
    }

    async fn get_receipt(&self, owner_id: Uuid, id: Uuid) -> Result<Option<ReceiptWithItems>> {
        let inner = self
            .inner
            .read()
            .map_err(|e| anyhow!("failed to acquire read lock: {}", e))?;

        Ok(inner
            .receipts
            .get(&id)
            .filter(|r| r.owner_id == owner_id)
            .map(|r| ReceiptWithItems {
                receipt: r.clone(),
                items: inner.items.get(&id).cloned().unwrap_or_default(),
            }))
    }

    async fn list_receipts(
        &self,
        owner_id: Uuid,
        range: &TimeRange,
    ) -> Result<Vec<ReceiptWithItems>> {
        let inner = self
            .inner
            .read()
            .map_err(|e| anyhow!("failed to acquire read lock: {}", e))?;

        let mut results: Vec<ReceiptWithItems> = inner
            .receipts
            .values()
            .filter(|r| r.owner_id == owner_id && range.contains(r.purchased_at))
            .map(|r| ReceiptWithItems {
                receipt: r.clone(),
                items: inner.items.get(&r.id).cloned().unwrap_or_default(),
            })
            .collect();

        // Newest first; id as tiebreaker keeps repeated reads identical.
        results.sort_by(|a, b| {
            b.receipt
                .purchased_at
                .cmp(&a.receipt.purchased_at)
                .then_with(|| a.receipt.id.cmp(&b.receipt.id))
        });

        Ok(results)
    }

    async fn delete_receipt(&self, owner_id: Uuid, id: Uuid) -> Result<bool> {
        let mut inner = self
            .inner
            .write()
            .map_err(|e| anyhow!("failed to acquire write lock: {}", e))?;

        let owned = inner
            .receipts
            .get(&id)
            .is_some_and(|r| r.owner_id == owner_id);
        if owned {
            inner.receipts.remove(&id);
            inner.items.remove(&id);
        }

        Ok(owned)
    }

    async fn rename_store(&self, owner_id: Uuid, from: &str, to: &str) -> Result<u64> {
        let mut inner = self
            .inner
            .write()
            .map_err(|e| anyhow!("failed to acquire write lock: {}", e))?;

        let mut renamed = 0;
        for receipt in inner.receipts.values_mut() {
            if receipt.owner_id == owner_id && receipt.store_name == from {
                receipt.store_name = to.to_string();
                renamed += 1;
            }
        }

        Ok(renamed)
    }
}

#[async_trait]
impl BillStore for InMemoryStore {
    async fn insert_bill(&self, bill: Bill) -> Result<Bill> {
        let mut inner = self
            .inner
            .write()
            .map_err(|e| anyhow!("failed to acquire write lock: {}", e))?;

        inner.bills.insert(bill.id, bill.clone());
        Ok(bill)
    }

    async fn get_bill(&self, owner_id: Uuid, id: Uuid) -> Result<Option<Bill>> {
        let inner = self
            .inner
            .read()
            .map_err(|e| anyhow!("failed to acquire read lock: {}", e))?;

        Ok(inner
            .bills
            .get(&id)
            .filter(|b| b.owner_id == owner_id)
            .cloned())
    }

    async fn list_bills(&self, owner_id: Uuid) -> Result<Vec<Bill>> {
        let inner = self
            .inner
            .read()
            .map_err(|e| anyhow!("failed to acquire read lock: {}", e))?;

        let mut bills: Vec<Bill> = inner
            .bills
            .values()
            .filter(|b| b.owner_id == owner_id)
            .cloned()
            .collect();

        bills.sort_by(|a, b| a.due_date.cmp(&b.due_date).then_with(|| a.id.cmp(&b.id)));

        Ok(bills)
    }

    async fn update_bill(&self, owner_id: Uuid, id: Uuid, bill: Bill) -> Result<Option<Bill>> {
        let mut inner = self
            .inner
            .write()
            .map_err(|e| anyhow!("failed to acquire write lock: {}", e))?;

        match inner.bills.get_mut(&id) {
            Some(existing) if existing.owner_id == owner_id => {
                *existing = bill.clone();
                Ok(Some(bill))
            }
            _ => Ok(None),
        }
    }

    async fn delete_bill(&self, owner_id: Uuid, id: Uuid) -> Result<bool> {
        let mut inner = self
            .inner
            .write()
            .map_err(|e| anyhow!("failed to acquire write lock: {}", e))?;

        let owned = inner.bills.get(&id).is_some_and(|b| b.owner_id == owner_id);
        if owned {
            inner.bills.remove(&id);
        }

        Ok(owned)
    }

    async fn mark_bill_paid(
        &self,
        owner_id: Uuid,
        id: Uuid,
        at: DateTime<Utc>,
    ) -> Result<Option<Bill>> {
        let mut inner = self
            .inner
            .write()
            .map_err(|e| anyhow!("failed to acquire write lock: {}", e))?;

        match inner.bills.get_mut(&id) {
            Some(bill) if bill.owner_id == owner_id => {
                bill.mark_paid(at);
                Ok(Some(bill.clone()))
            }
            _ => Ok(None),
        }
    }

    async fn list_paid_bills(&self, owner_id: Uuid, range: &TimeRange) -> Result<Vec<Bill>> {
        let inner = self
            .inner
            .read()
            .map_err(|e| anyhow!("failed to acquire read lock: {}", e))?;

        let mut bills: Vec<Bill> = inner
            .bills
            .values()
            .filter(|b| {
                b.owner_id == owner_id
                    && b.status == BillStatus::Paid
                    && b.paid_at.is_some_and(|at| range.contains(at))
            })
            .cloned()
            .collect();

        bills.sort_by(|a, b| b.paid_at.cmp(&a.paid_at).then_with(|| a.id.cmp(&b.id)));

        Ok(bills)
    }

    async fn rename_paid_supplier(&self, owner_id: Uuid, from: &str, to: &str) -> Result<u64> {
        let mut inner = self
            .inner
            .write()
            .map_err(|e| anyhow!("failed to acquire write lock: {}", e))?;

        let mut renamed = 0;
        for bill in inner.bills.values_mut() {
            if bill.owner_id == owner_id
                && bill.status == BillStatus::Paid
                && bill.supplier_name == from
            {
                bill.supplier_name = to.to_string();
                renamed += 1;
            }
        }

        Ok(renamed)
    }
}
