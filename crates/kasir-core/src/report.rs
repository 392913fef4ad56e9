//! # Report Module
//!
//! Pure parts of the today report: the calendar-day window and the
//! best-seller ranking. Aggregation itself runs in kasir-db.
//!
//! ## Day Window
//! ```text
//! local day D at offset +07:00
//!
//!   D 00:00 +07:00                       D+1 00:00 +07:00
//!        │◄──────────── [start, end) ──────────►│
//!   (D-1) 17:00 UTC                          D 17:00 UTC
//! ```
//! The interval is half-open so a sale at exactly local midnight belongs to
//! the new day only.

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveTime, TimeZone, Utc};

use crate::error::ValidationError;
use crate::types::{BestsellingProduct, ProductSales, TodayReport};

/// Largest accepted distance from UTC, in minutes.
pub const MAX_UTC_OFFSET_MINUTES: i32 = 14 * 60;

/// Half-open UTC interval covering one local calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl ReportWindow {
    /// Window for local calendar day `date` at `offset`.
    pub fn for_date(date: NaiveDate, offset: FixedOffset) -> Self {
        let local_midnight = date.and_time(NaiveTime::MIN);
        let utc_midnight = local_midnight - Duration::seconds(i64::from(offset.local_minus_utc()));
        let start = Utc.from_utc_datetime(&utc_midnight);

        ReportWindow {
            start,
            end: start + Duration::days(1),
        }
    }

    /// Window for the local day containing `now`.
    ///
    /// ## Example
    /// ```rust
    /// use chrono::{FixedOffset, TimeZone, Utc};
    /// use kasir_core::report::ReportWindow;
    ///
    /// let offset = FixedOffset::east_opt(7 * 3600).unwrap();
    /// let now = Utc.with_ymd_and_hms(2024, 3, 10, 20, 0, 0).unwrap();
    /// let window = ReportWindow::containing(now, offset);
    ///
    /// assert_eq!(window.start, Utc.with_ymd_and_hms(2024, 3, 10, 17, 0, 0).unwrap());
    /// assert!(window.contains(now));
    /// ```
    pub fn containing(now: DateTime<Utc>, offset: FixedOffset) -> Self {
        let local_date = now.with_timezone(&offset).date_naive();
        Self::for_date(local_date, offset)
    }

    /// Checks whether `at` falls inside `[start, end)`.
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.start <= at && at < self.end
    }
}

/// Builds a fixed offset from minutes east of UTC.
pub fn utc_offset(minutes: i32) -> Result<FixedOffset, ValidationError> {
    let out_of_range = || ValidationError::OutOfRange {
        field: "utc_offset_minutes".to_string(),
        min: -i64::from(MAX_UTC_OFFSET_MINUTES),
        max: i64::from(MAX_UTC_OFFSET_MINUTES),
    };

    if minutes.abs() > MAX_UTC_OFFSET_MINUTES {
        return Err(out_of_range());
    }
    FixedOffset::east_opt(minutes * 60).ok_or_else(out_of_range)
}

/// Picks the best sellers out of per-product totals.
///
/// Every product tied at the highest quantity is returned, ordered by
/// ascending product id. With no sales the result is a single empty entry
/// (`name: ""`, `qty_sold: 0`), which clients rely on.
pub fn rank_bestsellers(mut sales: Vec<ProductSales>) -> Vec<BestsellingProduct> {
    sales.retain(|s| s.qty_sold > 0);

    let Some(top) = sales.iter().map(|s| s.qty_sold).max() else {
        return vec![BestsellingProduct::default()];
    };

    sales.retain(|s| s.qty_sold == top);
    sales.sort_by_key(|s| s.product_id);
    sales
        .into_iter()
        .map(|s| BestsellingProduct {
            name: s.name,
            qty_sold: s.qty_sold,
        })
        .collect()
}

impl TodayReport {
    /// Assembles a report from header totals and per-product sales.
    pub fn assemble(total_revenue: i64, total_transactions: i64, sales: Vec<ProductSales>) -> Self {
        TodayReport {
            total_revenue,
            total_transactions,
            bestselling_products: rank_bestsellers(sales),
        }
    }

    /// Report for a day without sales.
    pub fn empty() -> Self {
        Self::assemble(0, 0, Vec::new())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn sales(product_id: i64, name: &str, qty_sold: i64) -> ProductSales {
        ProductSales {
            product_id,
            name: name.to_string(),
            qty_sold,
        }
    }

    #[test]
    fn test_window_at_utc() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
        let window = ReportWindow::for_date(date, utc_offset(0).unwrap());

        assert_eq!(window.start, Utc.with_ymd_and_hms(2024, 3, 10, 0, 0, 0).unwrap());
        assert_eq!(window.end, Utc.with_ymd_and_hms(2024, 3, 11, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_window_is_half_open() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
        let window = ReportWindow::for_date(date, utc_offset(0).unwrap());

        assert!(window.contains(window.start));
        assert!(!window.contains(window.end));
        assert!(window.contains(window.end - Duration::seconds(1)));
    }

    #[test]
    fn test_window_with_positive_offset() {
        let offset = utc_offset(7 * 60).unwrap();
        let now = Utc.with_ymd_and_hms(2024, 3, 10, 16, 59, 0).unwrap();
        let window = ReportWindow::containing(now, offset);

        assert_eq!(window.start, Utc.with_ymd_and_hms(2024, 3, 9, 17, 0, 0).unwrap());
        assert_eq!(window.end, Utc.with_ymd_and_hms(2024, 3, 10, 17, 0, 0).unwrap());
    }

    #[test]
    fn test_utc_offset_bounds() {
        assert!(utc_offset(-14 * 60).is_ok());
        assert!(utc_offset(14 * 60).is_ok());
        assert!(utc_offset(14 * 60 + 1).is_err());
    }

    #[test]
    fn test_rank_single_winner() {
        let ranked = rank_bestsellers(vec![sales(1, "Kopi", 4), sales(2, "Teh", 9)]);
        assert_eq!(
            ranked,
            vec![BestsellingProduct {
                name: "Teh".to_string(),
                qty_sold: 9
            }]
        );
    }

    #[test]
    fn test_rank_ties_by_ascending_id() {
        let ranked = rank_bestsellers(vec![
            sales(7, "Roti", 5),
            sales(3, "Susu", 5),
            sales(4, "Teh", 2),
        ]);
        let names: Vec<&str> = ranked.iter().map(|b| b.name.as_str()).collect();
        assert_eq!(names, vec!["Susu", "Roti"]);
    }

    #[test]
    fn test_rank_empty_yields_sentinel() {
        assert_eq!(rank_bestsellers(Vec::new()), vec![BestsellingProduct::default()]);

        let report = TodayReport::empty();
        assert_eq!(report.total_revenue, 0);
        assert_eq!(report.total_transactions, 0);
        assert_eq!(report.bestselling_products.len(), 1);
        assert_eq!(report.bestselling_products[0].name, "");
    }
}
