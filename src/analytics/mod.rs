//! Aggregation readers
//!
//! Pure functions over a slice of receipts (and, for the combined history,
//! paid bills): totals, arithmetic means, per-store and per-product
//! groupings and top-N rankings. Grouping uses `IndexMap`, so groups keep
//! the order in which they were first seen and ranking ties stay in source
//! order; re-running any of these over an unchanged data set yields
//! identical totals and rankings.

use crate::model::bill::Bill;
use crate::model::history::HistoryEntry;
use crate::model::receipt::ReceiptWithItems;
use chrono::{DateTime, Utc};
use indexmap::{IndexMap, IndexSet};
use serde::Serialize;
use std::cmp::Ordering;
use uuid::Uuid;

/// Per-store totals within the queried window
#[derive(Debug, Clone, Serialize)]
pub struct StoreBreakdown {
    pub name: String,
    pub total_spent: f64,
    pub purchase_count: usize,
}

/// Per-product totals within the queried window
#[derive(Debug, Clone, Serialize)]
pub struct ProductBreakdown {
    pub name: String,
    /// Sum of line totals
    pub total_spent: f64,
    /// Sum of quantities; fractional for weight-based goods
    pub quantity_bought: f64,
    /// Mean of unit prices, line total standing in where none was reported
    pub average_unit_price: f64,
    pub stores: Vec<String>,
    /// Union of the search tokens extracted for this product
    pub keywords: Vec<String>,
    pub last_purchased_at: DateTime<Utc>,
}

/// One row of the recent-purchases list
#[derive(Debug, Clone, Serialize)]
pub struct RecentPurchase {
    pub id: Uuid,
    pub date: DateTime<Utc>,
    pub store: String,
    pub total: f64,
}

/// Dashboard numbers for one owner and time window
#[derive(Debug, Clone, Serialize)]
pub struct SpendingSummary {
    pub total_spent: f64,
    pub purchase_count: usize,
    /// Arithmetic mean per purchase; zero when the window is empty
    pub average_purchase: f64,
    pub unique_stores: usize,
    pub unique_products: usize,
    pub top_stores: Vec<StoreBreakdown>,
    pub top_products: Vec<ProductBreakdown>,
    pub recent_purchases: Vec<RecentPurchase>,
}

/// One store's purchases broken down by product
#[derive(Debug, Clone, Serialize)]
pub struct StoreDetail {
    pub name: String,
    pub total_spent: f64,
    pub purchase_count: usize,
    pub products: Vec<ProductBreakdown>,
}

/// One product's purchases broken down by store
#[derive(Debug, Clone, Serialize)]
pub struct ProductDetail {
    pub name: String,
    pub total_spent: f64,
    pub quantity_bought: f64,
    pub average_unit_price: f64,
    pub stores: Vec<ProductStoreStat>,
}

/// Where a product was bought, and for how much
#[derive(Debug, Clone, Serialize)]
pub struct ProductStoreStat {
    pub store: String,
    pub purchase_count: usize,
    pub quantity: f64,
    pub total_spent: f64,
}

/// Descending by total; stable, so ties keep their source order
fn rank_desc<T>(entries: &mut [T], total: impl Fn(&T) -> f64) {
    entries.sort_by(|a, b| {
        total(b)
            .partial_cmp(&total(a))
            .unwrap_or(Ordering::Equal)
    });
}

/// Group receipts by store, ranked by total spent
pub fn stores_breakdown(receipts: &[ReceiptWithItems]) -> Vec<StoreBreakdown> {
    let mut groups: IndexMap<&str, (f64, usize)> = IndexMap::new();

    for r in receipts {
        let entry = groups.entry(r.receipt.store_name.as_str()).or_default();
        entry.0 += r.receipt.total_amount;
        entry.1 += 1;
    }

    let mut breakdown: Vec<StoreBreakdown> = groups
        .into_iter()
        .map(|(name, (total_spent, purchase_count))| StoreBreakdown {
            name: name.to_string(),
            total_spent,
            purchase_count,
        })
        .collect();

    rank_desc(&mut breakdown, |s| s.total_spent);
    breakdown
}

struct ProductAccumulator {
    total_spent: f64,
    quantity: f64,
    unit_price_sum: f64,
    unit_price_count: usize,
    stores: IndexSet<String>,
    keywords: IndexSet<String>,
    last_purchased_at: DateTime<Utc>,
}

/// Group line items by product name, ranked by total spent
pub fn products_breakdown(receipts: &[ReceiptWithItems]) -> Vec<ProductBreakdown> {
    let mut groups: IndexMap<&str, ProductAccumulator> = IndexMap::new();

    for r in receipts {
        for item in &r.items {
            let acc = groups
                .entry(item.name.as_str())
                .or_insert_with(|| ProductAccumulator {
                    total_spent: 0.0,
                    quantity: 0.0,
                    unit_price_sum: 0.0,
                    unit_price_count: 0,
                    stores: IndexSet::new(),
                    keywords: IndexSet::new(),
                    last_purchased_at: r.receipt.purchased_at,
                });
            acc.total_spent += item.line_total;
            acc.quantity += item.quantity;
            acc.unit_price_sum += item.effective_unit_price();
            acc.unit_price_count += 1;
            acc.stores.insert(r.receipt.store_name.clone());
            acc.keywords.extend(item.keywords.iter().cloned());
            if r.receipt.purchased_at > acc.last_purchased_at {
                acc.last_purchased_at = r.receipt.purchased_at;
            }
        }
    }

    let mut breakdown: Vec<ProductBreakdown> = groups
        .into_iter()
        .map(|(name, acc)| ProductBreakdown {
            name: name.to_string(),
            total_spent: acc.total_spent,
            quantity_bought: acc.quantity,
            average_unit_price: if acc.unit_price_count == 0 {
                0.0
            } else {
                acc.unit_price_sum / acc.unit_price_count as f64
            },
            stores: acc.stores.into_iter().collect(),
            keywords: acc.keywords.into_iter().collect(),
            last_purchased_at: acc.last_purchased_at,
        })
        .collect();

    rank_desc(&mut breakdown, |p| p.total_spent);
    breakdown
}

/// Compute the dashboard summary. `receipts` is expected newest first, as
/// the stores return it; the recent-purchases list is its head.
pub fn summarize(receipts: &[ReceiptWithItems], top_n: usize) -> SpendingSummary {
    let total_spent: f64 = receipts.iter().map(|r| r.receipt.total_amount).sum();
    let purchase_count = receipts.len();

    let mut top_stores = stores_breakdown(receipts);
    let mut top_products = products_breakdown(receipts);
    let unique_stores = top_stores.len();
    let unique_products = top_products.len();
    top_stores.truncate(top_n);
    top_products.truncate(top_n);

    SpendingSummary {
        total_spent,
        purchase_count,
        average_purchase: if purchase_count == 0 {
            0.0
        } else {
            total_spent / purchase_count as f64
        },
        unique_stores,
        unique_products,
        top_stores,
        top_products,
        recent_purchases: receipts
            .iter()
            .take(top_n)
            .map(|r| RecentPurchase {
                id: r.receipt.id,
                date: r.receipt.purchased_at,
                store: r.receipt.store_name.clone(),
                total: r.receipt.total_amount,
            })
            .collect(),
    }
}

/// One store's window: totals plus its products. None when the store does
/// not appear in the window.
pub fn store_detail(receipts: &[ReceiptWithItems], store_name: &str) -> Option<StoreDetail> {
    let in_store: Vec<ReceiptWithItems> = receipts
        .iter()
        .filter(|r| r.receipt.store_name == store_name)
        .cloned()
        .collect();

    if in_store.is_empty() {
        return None;
    }

    Some(StoreDetail {
        name: store_name.to_string(),
        total_spent: in_store.iter().map(|r| r.receipt.total_amount).sum(),
        purchase_count: in_store.len(),
        products: products_breakdown(&in_store),
    })
}

/// One product's window: totals plus the stores it was bought at. None when
/// the product does not appear in the window.
pub fn product_detail(receipts: &[ReceiptWithItems], product_name: &str) -> Option<ProductDetail> {
    let mut total_spent = 0.0;
    let mut quantity = 0.0;
    let mut unit_price_sum = 0.0;
    let mut unit_price_count = 0usize;
    let mut stores: IndexMap<&str, ProductStoreStat> = IndexMap::new();

    for r in receipts {
        for item in r.items.iter().filter(|i| i.name == product_name) {
            total_spent += item.line_total;
            quantity += item.quantity;
            unit_price_sum += item.effective_unit_price();
            unit_price_count += 1;

            let stat = stores
                .entry(r.receipt.store_name.as_str())
                .or_insert_with(|| ProductStoreStat {
                    store: r.receipt.store_name.clone(),
                    purchase_count: 0,
                    quantity: 0.0,
                    total_spent: 0.0,
                });
            stat.purchase_count += 1;
            stat.quantity += item.quantity;
            stat.total_spent += item.line_total;
        }
    }

    if unit_price_count == 0 {
        return None;
    }

    let mut store_stats: Vec<ProductStoreStat> = stores.into_values().collect();
    rank_desc(&mut store_stats, |s| s.total_spent);

    Some(ProductDetail {
        name: product_name.to_string(),
        total_spent,
        quantity_bought: quantity,
        average_unit_price: unit_price_sum / unit_price_count as f64,
        stores: store_stats,
    })
}

/// Merge purchases and paid bills into one history, newest first
pub fn history(receipts: &[ReceiptWithItems], paid_bills: &[Bill]) -> Vec<HistoryEntry> {
    let mut entries: Vec<HistoryEntry> = receipts
        .iter()
        .map(HistoryEntry::from)
        .chain(paid_bills.iter().map(HistoryEntry::from))
        .collect();

    entries.sort_by(|a, b| b.date().cmp(&a.date()));
    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::receipt::{LineItem, Receipt};
    use chrono::TimeZone;

    fn receipt_at(
        store: &str,
        total: f64,
        day: u32,
        items: Vec<(&str, f64, f64)>,
    ) -> ReceiptWithItems {
        let id = Uuid::new_v4();
        let purchased_at = Utc.with_ymd_and_hms(2024, 5, day, 12, 0, 0).unwrap();
        ReceiptWithItems {
            receipt: Receipt {
                id,
                owner_id: Uuid::new_v4(),
                store_name: store.to_string(),
                total_amount: total,
                purchased_at,
                created_at: purchased_at,
            },
            items: items
                .into_iter()
                .map(|(name, line_total, quantity)| LineItem {
                    id: Uuid::new_v4(),
                    receipt_id: id,
                    name: name.to_string(),
                    unit_price: None,
                    line_total,
                    quantity,
                    unit: "un".to_string(),
                    keywords: vec![],
                })
                .collect(),
        }
    }

    #[test]
    fn test_stores_breakdown_groups_and_ranks() {
        let receipts = vec![
            receipt_at("Mercado X", 10.0, 3, vec![]),
            receipt_at("Padaria", 50.0, 2, vec![]),
            receipt_at("Mercado X", 15.0, 1, vec![]),
        ];

        let breakdown = stores_breakdown(&receipts);
        assert_eq!(breakdown.len(), 2);
        assert_eq!(breakdown[0].name, "Padaria");
        assert_eq!(breakdown[0].total_spent, 50.0);
        assert_eq!(breakdown[1].name, "Mercado X");
        assert_eq!(breakdown[1].total_spent, 25.0);
        assert_eq!(breakdown[1].purchase_count, 2);
    }

    #[test]
    fn test_ranking_ties_stay_in_source_order() {
        let receipts = vec![
            receipt_at("First Seen", 20.0, 3, vec![]),
            receipt_at("Second Seen", 20.0, 2, vec![]),
            receipt_at("Third Seen", 20.0, 1, vec![]),
        ];

        let breakdown = stores_breakdown(&receipts);
        let names: Vec<&str> = breakdown.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["First Seen", "Second Seen", "Third Seen"]);
    }

    #[test]
    fn test_products_breakdown_accumulates_quantity_and_stores() {
        let receipts = vec![
            receipt_at("Mercado X", 9.0, 2, vec![("Arroz", 9.0, 2.0)]),
            receipt_at("Padaria", 4.5, 1, vec![("Arroz", 4.5, 1.0)]),
        ];

        let breakdown = products_breakdown(&receipts);
        assert_eq!(breakdown.len(), 1);

        let arroz = &breakdown[0];
        assert_eq!(arroz.total_spent, 13.5);
        assert_eq!(arroz.quantity_bought, 3.0);
        assert_eq!(arroz.stores, vec!["Mercado X", "Padaria"]);
        // Unit price fell back to the line total on both occurrences.
        assert_eq!(arroz.average_unit_price, (9.0 + 4.5) / 2.0);
        // Day 2 is the most recent of the two purchases.
        assert_eq!(
            arroz.last_purchased_at,
            Utc.with_ymd_and_hms(2024, 5, 2, 12, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_summarize_totals_and_mean() {
        let receipts = vec![
            receipt_at("A", 30.0, 3, vec![("x", 30.0, 1.0)]),
            receipt_at("B", 10.0, 2, vec![("y", 10.0, 1.0)]),
        ];

        let summary = summarize(&receipts, 5);
        assert_eq!(summary.total_spent, 40.0);
        assert_eq!(summary.purchase_count, 2);
        assert_eq!(summary.average_purchase, 20.0);
        assert_eq!(summary.unique_stores, 2);
        assert_eq!(summary.unique_products, 2);
        assert_eq!(summary.recent_purchases.len(), 2);
    }

    #[test]
    fn test_summarize_empty_window() {
        let summary = summarize(&[], 5);
        assert_eq!(summary.total_spent, 0.0);
        assert_eq!(summary.average_purchase, 0.0, "no division by zero");
        assert!(summary.top_stores.is_empty());
    }

    #[test]
    fn test_summarize_truncates_top_lists() {
        let receipts: Vec<ReceiptWithItems> = (1..=8)
            .map(|i| receipt_at(&format!("Store {}", i), i as f64, i, vec![]))
            .collect();

        let summary = summarize(&receipts, 5);
        assert_eq!(summary.top_stores.len(), 5);
        assert_eq!(summary.unique_stores, 8, "count is not truncated");
    }

    #[test]
    fn test_summarize_is_idempotent() {
        let receipts = vec![
            receipt_at("A", 30.0, 3, vec![("x", 30.0, 1.0)]),
            receipt_at("B", 30.0, 2, vec![("x", 10.0, 1.0), ("y", 20.0, 1.0)]),
        ];

        let first = serde_json::to_value(summarize(&receipts, 5)).unwrap();
        let second = serde_json::to_value(summarize(&receipts, 5)).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_store_detail_filters_to_one_store() {
        let receipts = vec![
            receipt_at("Mercado X", 9.0, 2, vec![("Arroz", 9.0, 2.0)]),
            receipt_at("Padaria", 4.5, 1, vec![("Pão", 4.5, 1.0)]),
        ];

        let detail = store_detail(&receipts, "Mercado X").expect("store exists");
        assert_eq!(detail.purchase_count, 1);
        assert_eq!(detail.total_spent, 9.0);
        assert_eq!(detail.products.len(), 1);
        assert_eq!(detail.products[0].name, "Arroz");

        assert!(store_detail(&receipts, "Farmácia").is_none());
    }

    #[test]
    fn test_product_detail_breaks_down_by_store() {
        let receipts = vec![
            receipt_at("Mercado X", 9.0, 2, vec![("Arroz", 9.0, 2.0)]),
            receipt_at("Padaria", 14.5, 1, vec![("Arroz", 4.5, 1.0), ("Pão", 10.0, 1.0)]),
        ];

        let detail = product_detail(&receipts, "Arroz").expect("product exists");
        assert_eq!(detail.total_spent, 13.5);
        assert_eq!(detail.stores.len(), 2);
        assert_eq!(detail.stores[0].store, "Mercado X", "bigger spend ranks first");

        assert!(product_detail(&receipts, "Feijão").is_none());
    }

    #[test]
    fn test_history_merges_newest_first() {
        use crate::model::bill::BillDraft;
        use chrono::NaiveDate;

        let receipts = vec![receipt_at("Mercado X", 10.0, 5, vec![])];

        let mut bill = BillDraft {
            supplier_name: "Energia SA".to_string(),
            amount: 150.0,
            issue_date: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            competency_date: None,
            due_date: NaiveDate::from_ymd_opt(2024, 5, 20).unwrap(),
            description: None,
            payment_method: None,
            account: None,
            category_name: None,
            document_number: None,
            pay_now: false,
        }
        .into_bill(Uuid::new_v4(), Utc::now());
        bill.mark_paid(Utc.with_ymd_and_hms(2024, 5, 10, 9, 0, 0).unwrap());

        let entries = history(&receipts, &[bill]);
        assert_eq!(entries.len(), 2);
        assert!(matches!(entries[0], HistoryEntry::Bill { .. }), "bill paid on day 10");
        assert!(matches!(entries[1], HistoryEntry::Purchase { .. }));
    }
}
