//! PostgreSQL storage backend using sqlx.
//!
//! Three owner-scoped tables: `receipts`, `line_items` (many-to-one via
//! `receipt_id`) and `bills`. The receipt + line-items insert runs in one
//! transaction.
//!
//! # Feature flag
//!
//! This module is gated behind the `postgres` feature flag:
//! ```toml
//! [dependencies]
//! spendscan = { version = "0.1", features = ["postgres"] }
//! ```

use crate::core::period::TimeRange;
use crate::model::bill::{Bill, BillStatus};
use crate::model::receipt::{
    LineItem, NewReceipt, Receipt, ReceiptWithItems, UNIDENTIFIED_STORE,
};
use crate::storage::{BillStore, ReceiptStore};
use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

/// PostgreSQL store implementing both service traits
#[derive(Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Connect and make sure the schema exists
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = PgPool::connect(database_url)
            .await
            .context("failed to connect to PostgreSQL")?;
        let store = Self { pool };
        store.ensure_schema().await?;
        Ok(store)
    }

    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn ensure_schema(&self) -> Result<()> {
        // raw_sql: the schema block is several statements, which prepared
        // queries cannot carry.
        sqlx::raw_sql(
            r#"
            CREATE TABLE IF NOT EXISTS receipts (
                id UUID PRIMARY KEY,
                owner_id UUID NOT NULL,
                store_name TEXT NOT NULL,
                total_amount DOUBLE PRECISION NOT NULL,
                purchased_at TIMESTAMPTZ NOT NULL,
                created_at TIMESTAMPTZ NOT NULL
            );
            CREATE INDEX IF NOT EXISTS receipts_owner_purchased
                ON receipts (owner_id, purchased_at);

            CREATE TABLE IF NOT EXISTS line_items (
                id UUID PRIMARY KEY,
                receipt_id UUID NOT NULL REFERENCES receipts (id) ON DELETE CASCADE,
                name TEXT NOT NULL,
                unit_price DOUBLE PRECISION,
                line_total DOUBLE PRECISION NOT NULL,
                quantity DOUBLE PRECISION NOT NULL,
                unit TEXT NOT NULL,
                keywords TEXT[] NOT NULL DEFAULT '{}'
            );
            CREATE INDEX IF NOT EXISTS line_items_receipt ON line_items (receipt_id);

            CREATE TABLE IF NOT EXISTS bills (
                id UUID PRIMARY KEY,
                owner_id UUID NOT NULL,
                supplier_name TEXT NOT NULL,
                amount DOUBLE PRECISION NOT NULL,
                issue_date DATE NOT NULL,
                competency_date DATE NOT NULL,
                due_date DATE NOT NULL,
                paid_at TIMESTAMPTZ,
                description TEXT,
                payment_method TEXT NOT NULL,
                account TEXT NOT NULL,
                category_name TEXT NOT NULL,
                document_number TEXT,
                status TEXT NOT NULL,
                created_at TIMESTAMPTZ NOT NULL
            );
            CREATE INDEX IF NOT EXISTS bills_owner_due ON bills (owner_id, due_date);
            "#,
        )
        .execute(&self.pool)
        .await
        .context("failed to create schema")?;

        Ok(())
    }

    fn receipt_from_row(row: &PgRow) -> Result<Receipt, sqlx::Error> {
        Ok(Receipt {
            id: row.try_get("id")?,
            owner_id: row.try_get("owner_id")?,
            store_name: row.try_get("store_name")?,
            total_amount: row.try_get("total_amount")?,
            purchased_at: row.try_get("purchased_at")?,
            created_at: row.try_get("created_at")?,
        })
    }

    fn item_from_row(row: &PgRow) -> Result<LineItem, sqlx::Error> {
        Ok(LineItem {
            id: row.try_get("id")?,
            receipt_id: row.try_get("receipt_id")?,
            name: row.try_get("name")?,
            unit_price: row.try_get("unit_price")?,
            line_total: row.try_get("line_total")?,
            quantity: row.try_get("quantity")?,
            unit: row.try_get("unit")?,
            keywords: row.try_get("keywords")?,
        })
    }

    fn bill_from_row(row: &PgRow) -> Result<Bill> {
        let status: String = row.try_get("status")?;
        Ok(Bill {
            id: row.try_get("id")?,
            owner_id: row.try_get("owner_id")?,
            supplier_name: row.try_get("supplier_name")?,
            amount: row.try_get("amount")?,
            issue_date: row.try_get("issue_date")?,
            competency_date: row.try_get("competency_date")?,
            due_date: row.try_get("due_date")?,
            paid_at: row.try_get("paid_at")?,
            description: row.try_get("description")?,
            payment_method: row.try_get("payment_method")?,
            account: row.try_get("account")?,
            category_name: row.try_get("category_name")?,
            document_number: row.try_get("document_number")?,
            status: BillStatus::parse(&status)
                .ok_or_else(|| anyhow!("unknown bill status '{}'", status))?,
            created_at: row.try_get("created_at")?,
        })
    }

    async fn items_for_receipt(&self, receipt_id: Uuid) -> Result<Vec<LineItem>> {
        let rows = sqlx::query(
            r#"
            SELECT id, receipt_id, name, unit_price, line_total, quantity, unit, keywords
            FROM line_items
            WHERE receipt_id = $1
            "#,
        )
        .bind(receipt_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| Self::item_from_row(row).map_err(Into::into))
            .collect()
    }
}

#[async_trait]
impl ReceiptStore for PostgresStore {
    async fn insert_receipt(
        &self,
        owner_id: Uuid,
        receipt: NewReceipt,
        purchased_at: DateTime<Utc>,
    ) -> Result<ReceiptWithItems> {
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

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO receipts (id, owner_id, store_name, total_amount, purchased_at, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(stored.id)
        .bind(stored.owner_id)
        .bind(&stored.store_name)
        .bind(stored.total_amount)
        .bind(stored.purchased_at)
        .bind(stored.created_at)
        .execute(&mut *tx)
        .await?;

        let mut items = Vec::with_capacity(receipt.items.len());
        for item in receipt.items {
            let stored_item = LineItem {
                id: Uuid::new_v4(),
                receipt_id: stored.id,
                name: item.name,
                unit_price: item.unit_price,
                line_total: item.line_total,
                quantity: item.quantity,
                unit: item.unit,
                keywords: item.keywords,
            };

            sqlx::query(
                r#"
                INSERT INTO line_items (id, receipt_id, name, unit_price, line_total, quantity, unit, keywords)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                "#,
            )
            .bind(stored_item.id)
            .bind(stored_item.receipt_id)
            .bind(&stored_item.name)
            .bind(stored_item.unit_price)
            .bind(stored_item.line_total)
            .bind(stored_item.quantity)
            .bind(&stored_item.unit)
            .bind(&stored_item.keywords)
            .execute(&mut *tx)
            .await?;

            items.push(stored_item);
        }

        tx.commit().await?;

        Ok(ReceiptWithItems {
            receipt: stored,
            items,
        })
    }

    async fn get_receipt(&self, owner_id: Uuid, id: Uuid) -> Result<Option<ReceiptWithItems>> {
        let row = sqlx::query(
            r#"
            SELECT id, owner_id, store_name, total_amount, purchased_at, created_at
            FROM receipts
            WHERE id = $1 AND owner_id = $2
            "#,
        )
        .bind(id)
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            None => Ok(None),
            Some(row) => {
                let receipt = Self::receipt_from_row(&row)?;
                let items = self.items_for_receipt(receipt.id).await?;
                Ok(Some(ReceiptWithItems { receipt, items }))
            }
        }
    }

    async fn list_receipts(
        &self,
        owner_id: Uuid,
        range: &TimeRange,
    ) -> Result<Vec<ReceiptWithItems>> {
        let rows = sqlx::query(
            r#"
            SELECT id, owner_id, store_name, total_amount, purchased_at, created_at
            FROM receipts
            WHERE owner_id = $1 AND purchased_at >= $2 AND purchased_at < $3
            ORDER BY purchased_at DESC, id
            "#,
        )
        .bind(owner_id)
        .bind(range.start)
        .bind(range.end)
        .fetch_all(&self.pool)
        .await?;

        let mut results = Vec::with_capacity(rows.len());
        for row in &rows {
            let receipt = Self::receipt_from_row(row)?;
            let items = self.items_for_receipt(receipt.id).await?;
            results.push(ReceiptWithItems { receipt, items });
        }

        Ok(results)
    }

    async fn delete_receipt(&self, owner_id: Uuid, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM receipts WHERE id = $1 AND owner_id = $2")
            .bind(id)
            .bind(owner_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn rename_store(&self, owner_id: Uuid, from: &str, to: &str) -> Result<u64> {
        let result = sqlx::query(
            "UPDATE receipts SET store_name = $1 WHERE owner_id = $2 AND store_name = $3",
        )
        .bind(to)
        .bind(owner_id)
        .bind(from)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}

#[async_trait]
impl BillStore for PostgresStore {
    async fn insert_bill(&self, bill: Bill) -> Result<Bill> {
        sqlx::query(
            r#"
            INSERT INTO bills (id, owner_id, supplier_name, amount, issue_date, competency_date,
                               due_date, paid_at, description, payment_method, account,
                               category_name, document_number, status, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
            "#,
        )
        .bind(bill.id)
        .bind(bill.owner_id)
        .bind(&bill.supplier_name)
        .bind(bill.amount)
        .bind(bill.issue_date)
        .bind(bill.competency_date)
        .bind(bill.due_date)
        .bind(bill.paid_at)
        .bind(&bill.description)
        .bind(&bill.payment_method)
        .bind(&bill.account)
        .bind(&bill.category_name)
        .bind(&bill.document_number)
        .bind(bill.status.as_str())
        .bind(bill.created_at)
        .execute(&self.pool)
        .await?;

        Ok(bill)
    }

    async fn get_bill(&self, owner_id: Uuid, id: Uuid) -> Result<Option<Bill>> {
        let row = sqlx::query("SELECT * FROM bills WHERE id = $1 AND owner_id = $2")
            .bind(id)
            .bind(owner_id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(Self::bill_from_row).transpose()
    }

    async fn list_bills(&self, owner_id: Uuid) -> Result<Vec<Bill>> {
        let rows = sqlx::query(
            "SELECT * FROM bills WHERE owner_id = $1 ORDER BY due_date, id",
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(Self::bill_from_row).collect()
    }

    async fn update_bill(&self, owner_id: Uuid, id: Uuid, bill: Bill) -> Result<Option<Bill>> {
        let result = sqlx::query(
            r#"
            UPDATE bills
            SET supplier_name = $1, amount = $2, issue_date = $3, competency_date = $4,
                due_date = $5, paid_at = $6, description = $7, payment_method = $8,
                account = $9, category_name = $10, document_number = $11, status = $12
            WHERE id = $13 AND owner_id = $14
            "#,
        )
        .bind(&bill.supplier_name)
        .bind(bill.amount)
        .bind(bill.issue_date)
        .bind(bill.competency_date)
        .bind(bill.due_date)
        .bind(bill.paid_at)
        .bind(&bill.description)
        .bind(&bill.payment_method)
        .bind(&bill.account)
        .bind(&bill.category_name)
        .bind(&bill.document_number)
        .bind(bill.status.as_str())
        .bind(id)
        .bind(owner_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        Ok(Some(bill))
    }

    async fn delete_bill(&self, owner_id: Uuid, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM bills WHERE id = $1 AND owner_id = $2")
            .bind(id)
            .bind(owner_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn mark_bill_paid(
        &self,
        owner_id: Uuid,
        id: Uuid,
        at: DateTime<Utc>,
    ) -> Result<Option<Bill>> {
        let row = sqlx::query(
            r#"
            UPDATE bills SET status = 'paid', paid_at = $1
            WHERE id = $2 AND owner_id = $3
            RETURNING *
            "#,
        )
        .bind(at)
        .bind(id)
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(Self::bill_from_row).transpose()
    }

    async fn list_paid_bills(&self, owner_id: Uuid, range: &TimeRange) -> Result<Vec<Bill>> {
        let rows = sqlx::query(
            r#"
            SELECT * FROM bills
            WHERE owner_id = $1 AND status = 'paid'
              AND paid_at >= $2 AND paid_at < $3
            ORDER BY paid_at DESC, id
            "#,
        )
        .bind(owner_id)
        .bind(range.start)
        .bind(range.end)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(Self::bill_from_row).collect()
    }

    async fn rename_paid_supplier(&self, owner_id: Uuid, from: &str, to: &str) -> Result<u64> {
        let result = sqlx::query(
            r#"
            UPDATE bills SET supplier_name = $1
            WHERE owner_id = $2 AND status = 'paid' AND supplier_name = $3
            "#,
        )
        .bind(to)
        .bind(owner_id)
        .bind(from)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}
