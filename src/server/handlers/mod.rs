//! HTTP handlers, one module per screen-facing resource

pub mod analytics;
pub mod bills;
pub mod products;
pub mod receipts;
pub mod scan;
pub mod stores;

use crate::core::error::AppError;
use crate::core::period::{Period, TimeRange};
use chrono::{DateTime, Utc};
use serde::Deserialize;

/// How many entries top-N rankings carry
pub const TOP_N: usize = 5;

/// Shared `?period=` / `?from=` / `?to=` query parameters
#[derive(Debug, Default, Deserialize)]
pub struct PeriodQuery {
    pub period: Option<String>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

impl PeriodQuery {
    /// Resolve to concrete half-open bounds relative to now
    pub fn resolve(&self) -> Result<TimeRange, AppError> {
        Period::from_query(self.period.as_deref(), self.from, self.to)
            .map(|p| p.bounds(Utc::now()))
    }
}
