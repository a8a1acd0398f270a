//! Domain model: receipts with line items, payable bills, history entries

pub mod bill;
pub mod history;
pub mod receipt;

pub use bill::{Bill, BillDraft, BillStatus};
pub use history::HistoryEntry;
pub use receipt::{LineItem, NewLineItem, NewReceipt, Receipt, ReceiptWithItems};
