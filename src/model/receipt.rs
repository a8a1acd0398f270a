//! Receipts and their line items
//!
//! A receipt records one shopping transaction; its line items are created in
//! a batch alongside it and never individually updated. The receipt total is
//! extracted independently of the line items and is NOT reconciled against
//! their sum.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Store name used when extraction yields none
pub const UNIDENTIFIED_STORE: &str = "store not identified";

/// Line-item name used when extraction yields none
pub const UNNAMED_PRODUCT: &str = "unnamed product";

/// Unit of measure used when extraction yields none ("un" = unit count;
/// weight- and volume-based goods come back as "kg"/"g"/"l"/"ml")
pub const DEFAULT_UNIT: &str = "un";

/// A persisted record of one shopping transaction at a store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Receipt {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub store_name: String,
    pub total_amount: f64,
    /// Stamped at the moment of insertion, not read from the document
    pub purchased_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

/// One product entry within a receipt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    pub id: Uuid,
    pub receipt_id: Uuid,
    pub name: String,
    /// Price per unit when the model reported one; readers fall back to
    /// the line total when absent
    pub unit_price: Option<f64>,
    pub line_total: f64,
    /// Fractional for weight-based goods (e.g. 0.35 kg)
    pub quantity: f64,
    pub unit: String,
    /// Small set of search tokens the model derives from the name
    pub keywords: Vec<String>,
}

impl LineItem {
    /// Unit price with the line-total fallback applied
    pub fn effective_unit_price(&self) -> f64 {
        self.unit_price.unwrap_or(self.line_total)
    }
}

/// A receipt together with its line items, as returned to clients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReceiptWithItems {
    #[serde(flatten)]
    pub receipt: Receipt,
    pub items: Vec<LineItem>,
}

/// Normalized extraction output, ready for the persistence writer.
///
/// Store name and total stay optional here; the writer applies the
/// "store not identified" / zero defaults at insertion time.
#[derive(Debug, Clone, PartialEq)]
pub struct NewReceipt {
    pub store_name: Option<String>,
    pub total_amount: Option<f64>,
    pub items: Vec<NewLineItem>,
}

/// One line item of a [`NewReceipt`]; field defaults are already applied
/// by the normalizer
#[derive(Debug, Clone, PartialEq)]
pub struct NewLineItem {
    pub name: String,
    pub unit_price: Option<f64>,
    pub line_total: f64,
    pub quantity: f64,
    pub unit: String,
    pub keywords: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_effective_unit_price_prefers_reported_price() {
        let item = LineItem {
            id: Uuid::new_v4(),
            receipt_id: Uuid::new_v4(),
            name: "Arroz 5kg".to_string(),
            unit_price: Some(4.5),
            line_total: 9.0,
            quantity: 2.0,
            unit: "un".to_string(),
            keywords: vec!["arroz".to_string(), "grãos".to_string()],
        };
        assert_eq!(item.effective_unit_price(), 4.5);
    }

    #[test]
    fn test_effective_unit_price_falls_back_to_line_total() {
        let item = LineItem {
            id: Uuid::new_v4(),
            receipt_id: Uuid::new_v4(),
            name: "Pão".to_string(),
            unit_price: None,
            line_total: 10.5,
            quantity: 1.0,
            unit: "un".to_string(),
            keywords: vec![],
        };
        assert_eq!(item.effective_unit_price(), 10.5);
    }

    #[test]
    fn test_receipt_with_items_serializes_flattened() {
        let receipt = Receipt {
            id: Uuid::new_v4(),
            owner_id: Uuid::new_v4(),
            store_name: "Mercado X".to_string(),
            total_amount: 10.5,
            purchased_at: Utc::now(),
            created_at: Utc::now(),
        };
        let with_items = ReceiptWithItems {
            receipt,
            items: vec![],
        };

        let json = serde_json::to_value(&with_items).unwrap();
        assert_eq!(json["store_name"], "Mercado X");
        assert!(json["items"].is_array());
    }
}
