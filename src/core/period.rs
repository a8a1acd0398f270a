//! Time windows for aggregation queries
//!
//! Every date-range filter in the service is a half-open interval
//! `[start, end)`: an item stamped exactly at `start` is included, an item
//! stamped exactly at `end` is excluded. Boundaries are computed in exactly
//! one place, in UTC (the timezone receipts are stored in), so the stored
//! instant and the range edges can never disagree and no second,
//! client-side re-filter is needed.

use crate::core::error::AppError;
use chrono::{DateTime, Duration, NaiveTime, Utc};

/// A half-open UTC time range `[start, end)`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeRange {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// Start inclusive, end exclusive
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start <= instant && instant < self.end
    }
}

/// Named time-window presets plus an explicit custom range
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Period {
    Today,
    Yesterday,
    Last7Days,
    Last30Days,
    Last90Days,
    Last180Days,
    Last365Days,
    Custom {
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    },
}

impl Period {
    /// Parse a preset identifier as used in query strings
    pub fn parse(s: &str) -> Option<Period> {
        match s {
            "today" => Some(Period::Today),
            "yesterday" => Some(Period::Yesterday),
            "7days" => Some(Period::Last7Days),
            "30days" => Some(Period::Last30Days),
            "90days" => Some(Period::Last90Days),
            "180days" => Some(Period::Last180Days),
            "365days" => Some(Period::Last365Days),
            _ => None,
        }
    }

    /// Resolve the period requested by `period` / `from` / `to` query
    /// parameters. An explicit `from`+`to` pair wins over a preset name;
    /// with neither present the default window is the last 30 days.
    pub fn from_query(
        period: Option<&str>,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> Result<Period, AppError> {
        match (from, to) {
            (Some(from), Some(to)) => {
                if to <= from {
                    return Err(AppError::input("'to' must be after 'from'"));
                }
                Ok(Period::Custom { from, to })
            }
            (Some(_), None) | (None, Some(_)) => {
                Err(AppError::input("custom range needs both 'from' and 'to'"))
            }
            (None, None) => match period {
                None => Ok(Period::Last30Days),
                Some(name) => Period::parse(name)
                    .ok_or_else(|| AppError::input(format!("unknown period '{}'", name))),
            },
        }
    }

    /// Compute the half-open bounds of this period relative to `now`.
    ///
    /// Day presets snap to UTC midnight. `LastNDays` windows end at the
    /// start of tomorrow, so the current (partial) day is included and the
    /// window spans N whole days.
    pub fn bounds(&self, now: DateTime<Utc>) -> TimeRange {
        let day_start = now.date_naive().and_time(NaiveTime::MIN).and_utc();
        let tomorrow = day_start + Duration::days(1);

        match self {
            Period::Today => TimeRange::new(day_start, tomorrow),
            Period::Yesterday => TimeRange::new(day_start - Duration::days(1), day_start),
            Period::Last7Days => TimeRange::new(tomorrow - Duration::days(7), tomorrow),
            Period::Last30Days => TimeRange::new(tomorrow - Duration::days(30), tomorrow),
            Period::Last90Days => TimeRange::new(tomorrow - Duration::days(90), tomorrow),
            Period::Last180Days => TimeRange::new(tomorrow - Duration::days(180), tomorrow),
            Period::Last365Days => TimeRange::new(tomorrow - Duration::days(365), tomorrow),
            Period::Custom { from, to } => TimeRange::new(*from, *to),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, 0).unwrap()
    }

    #[test]
    fn test_range_is_half_open() {
        let range = TimeRange::new(utc(2024, 1, 5, 0, 0), utc(2024, 1, 6, 0, 0));

        assert!(range.contains(utc(2024, 1, 5, 0, 0)), "start is included");
        assert!(range.contains(utc(2024, 1, 5, 23, 59)));
        assert!(!range.contains(utc(2024, 1, 6, 0, 0)), "end is excluded");
    }

    #[test]
    fn test_yesterday_excludes_todays_midnight() {
        // Receipts at 2024-01-05T10:00 and 2024-01-06T00:00, "yesterday"
        // relative to now = 2024-01-06T09:00: only the first is included.
        let now = utc(2024, 1, 6, 9, 0);
        let range = Period::Yesterday.bounds(now);

        assert_eq!(range.start, utc(2024, 1, 5, 0, 0));
        assert_eq!(range.end, utc(2024, 1, 6, 0, 0));
        assert!(range.contains(utc(2024, 1, 5, 10, 0)));
        assert!(!range.contains(utc(2024, 1, 6, 0, 0)));
    }

    #[test]
    fn test_today_includes_current_instant() {
        let now = utc(2024, 3, 10, 15, 30);
        let range = Period::Today.bounds(now);

        assert!(range.contains(now));
        assert_eq!(range.start, utc(2024, 3, 10, 0, 0));
        assert_eq!(range.end, utc(2024, 3, 11, 0, 0));
    }

    #[test]
    fn test_last_seven_days_spans_seven_whole_days() {
        let now = utc(2024, 3, 10, 15, 30);
        let range = Period::Last7Days.bounds(now);

        assert_eq!(range.end, utc(2024, 3, 11, 0, 0));
        assert_eq!(range.start, utc(2024, 3, 4, 0, 0));
        assert!(range.contains(now));
        // The same wall-clock moment seven days earlier is out.
        assert!(!range.contains(utc(2024, 3, 3, 15, 30)));
    }

    #[test]
    fn test_parse_presets() {
        assert_eq!(Period::parse("today"), Some(Period::Today));
        assert_eq!(Period::parse("yesterday"), Some(Period::Yesterday));
        assert_eq!(Period::parse("7days"), Some(Period::Last7Days));
        assert_eq!(Period::parse("365days"), Some(Period::Last365Days));
        assert_eq!(Period::parse("fortnight"), None);
    }

    #[test]
    fn test_from_query_defaults_to_thirty_days() {
        let period = Period::from_query(None, None, None).unwrap();
        assert_eq!(period, Period::Last30Days);
    }

    #[test]
    fn test_from_query_explicit_range_wins_over_preset() {
        let from = utc(2024, 1, 1, 0, 0);
        let to = utc(2024, 2, 1, 0, 0);
        let period = Period::from_query(Some("7days"), Some(from), Some(to)).unwrap();
        assert_eq!(period, Period::Custom { from, to });
    }

    #[test]
    fn test_from_query_rejects_inverted_range() {
        let from = utc(2024, 2, 1, 0, 0);
        let to = utc(2024, 1, 1, 0, 0);
        assert!(Period::from_query(None, Some(from), Some(to)).is_err());
    }

    #[test]
    fn test_from_query_rejects_half_a_custom_range() {
        assert!(Period::from_query(None, Some(utc(2024, 1, 1, 0, 0)), None).is_err());
        assert!(Period::from_query(None, None, Some(utc(2024, 1, 1, 0, 0))).is_err());
    }

    #[test]
    fn test_from_query_rejects_unknown_preset() {
        assert!(Period::from_query(Some("last_eon"), None, None).is_err());
    }
}
