//! Payable bills
//!
//! Bills are tracked manually, independent of the receipt-scanning flow.
//! Open and Paid are the only persisted statuses; Overdue is derived at
//! read time by comparing the due date against the current date and is
//! never written back to storage.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Payment methods offered by bill forms. Advisory vocabulary only; the
/// persisted field stays free text.
pub const PAYMENT_METHODS: [&str; 7] = [
    "Dinheiro",
    "Cartão de Crédito",
    "Cartão de Débito",
    "PIX",
    "Boleto",
    "Transferência",
    "Cheque",
];

/// Financial accounts offered by bill forms. Advisory vocabulary only.
pub const ACCOUNTS: [&str; 5] = [
    "Caixa",
    "Banco",
    "Carteira Digital",
    "Conta Corrente",
    "Poupança",
];

/// Category applied when the form leaves it blank
pub const DEFAULT_CATEGORY: &str = "Sem categoria";

/// Bill lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BillStatus {
    Open,
    Paid,
    /// Derived view of an Open bill past its due date; never persisted
    Overdue,
}

impl BillStatus {
    pub fn parse(s: &str) -> Option<BillStatus> {
        match s {
            "open" => Some(BillStatus::Open),
            "paid" => Some(BillStatus::Paid),
            "overdue" => Some(BillStatus::Overdue),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BillStatus::Open => "open",
            BillStatus::Paid => "paid",
            BillStatus::Overdue => "overdue",
        }
    }
}

/// A manually tracked payable obligation to a supplier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bill {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub supplier_name: String,
    pub amount: f64,
    pub issue_date: NaiveDate,
    pub competency_date: NaiveDate,
    pub due_date: NaiveDate,
    pub paid_at: Option<DateTime<Utc>>,
    pub description: Option<String>,
    pub payment_method: String,
    pub account: String,
    pub category_name: String,
    pub document_number: Option<String>,
    /// Stored status: Open or Paid only
    pub status: BillStatus,
    pub created_at: DateTime<Utc>,
}

impl Bill {
    /// Status as displayed: an Open bill past its due date reads as
    /// Overdue without the stored field changing.
    pub fn effective_status(&self, today: NaiveDate) -> BillStatus {
        if self.status == BillStatus::Open && self.due_date < today {
            BillStatus::Overdue
        } else {
            self.status
        }
    }

    /// Transition to Paid, stamping the payment instant
    pub fn mark_paid(&mut self, at: DateTime<Utc>) {
        self.status = BillStatus::Paid;
        self.paid_at = Some(at);
    }
}

/// Form input for creating or editing a bill
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct BillDraft {
    #[validate(length(min = 1, message = "supplier name is required"))]
    pub supplier_name: String,

    #[validate(range(min = 0.01, message = "amount must be positive"))]
    pub amount: f64,

    pub issue_date: NaiveDate,

    /// Defaults to the issue date when absent
    pub competency_date: Option<NaiveDate>,

    pub due_date: NaiveDate,

    pub description: Option<String>,

    pub payment_method: Option<String>,

    pub account: Option<String>,

    pub category_name: Option<String>,

    pub document_number: Option<String>,

    /// Save-and-pay: the bill is created already Paid
    #[serde(default)]
    pub pay_now: bool,
}

impl BillDraft {
    /// Build a new bill for `owner_id`, applying the form defaults
    pub fn into_bill(self, owner_id: Uuid, now: DateTime<Utc>) -> Bill {
        let (status, paid_at) = if self.pay_now {
            (BillStatus::Paid, Some(now))
        } else {
            (BillStatus::Open, None)
        };

        Bill {
            id: Uuid::new_v4(),
            owner_id,
            competency_date: self.competency_date.unwrap_or(self.issue_date),
            supplier_name: self.supplier_name,
            amount: self.amount,
            issue_date: self.issue_date,
            due_date: self.due_date,
            paid_at,
            description: self.description.filter(|d| !d.is_empty()),
            payment_method: self
                .payment_method
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| PAYMENT_METHODS[0].to_string()),
            account: self
                .account
                .filter(|a| !a.is_empty())
                .unwrap_or_else(|| ACCOUNTS[0].to_string()),
            category_name: self
                .category_name
                .filter(|c| !c.is_empty())
                .unwrap_or_else(|| DEFAULT_CATEGORY.to_string()),
            document_number: self.document_number.filter(|n| !n.is_empty()),
            status,
            created_at: now,
        }
    }
}
