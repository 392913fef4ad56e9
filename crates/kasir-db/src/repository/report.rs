//! # Report Repository
//!
//! Aggregates committed transactions into the today report.
//!
//! ## Queries
//! ```text
//! window = ReportWindow::containing(now, offset)      [start, end) in UTC
//!
//! BEGIN (read snapshot)
//!   ├── SUM(total_amount), COUNT(*)  FROM transactions        ← headers only
//!   └── SUM(quantity) per product_id FROM transaction_details ← names from the
//!                                                               latest detail
//! COMMIT
//!
//! rank_bestsellers(per-product totals) ──► ties by product id, or sentinel
//! ```
//!
//! Revenue sums headers, not a details join, so a multi-line sale counts
//! once. Both queries share one read transaction and therefore one snapshot.

use chrono::{FixedOffset, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use kasir_core::{ProductSales, ReportWindow, TodayReport};

/// Repository for sales reports.
#[derive(Debug, Clone)]
pub struct ReportRepository {
    pool: SqlitePool,
}

impl ReportRepository {
    /// Creates a new ReportRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ReportRepository { pool }
    }

    /// Report for the local calendar day containing now.
    pub async fn today(&self, offset: FixedOffset) -> DbResult<TodayReport> {
        self.for_window(ReportWindow::containing(Utc::now(), offset))
            .await
    }

    /// Report over an arbitrary half-open window.
    ///
    /// Never fails on empty data; an empty window yields zero totals and the
    /// empty best-seller entry.
    pub async fn for_window(&self, window: ReportWindow) -> DbResult<TodayReport> {
        debug!(start = %window.start, end = %window.end, "Building sales report");

        let mut tx = self.pool.begin().await?;

        let (total_revenue, total_transactions): (i64, i64) = sqlx::query_as(
            r#"
            SELECT COALESCE(SUM(total_amount), 0), COUNT(*)
            FROM transactions
            WHERE created_at >= ?1 AND created_at < ?2
            "#,
        )
        .bind(window.start)
        .bind(window.end)
        .fetch_one(&mut *tx)
        .await?;

        let sales = sqlx::query_as::<_, ProductSales>(
            r#"
            SELECT g.product_id, latest.product_name AS name, g.qty_sold
            FROM (
                SELECT d.product_id,
                       SUM(d.quantity) AS qty_sold,
                       MAX(d.id) AS last_detail_id
                FROM transaction_details d
                JOIN transactions t ON t.id = d.transaction_id
                WHERE t.created_at >= ?1 AND t.created_at < ?2
                GROUP BY d.product_id
            ) g
            JOIN transaction_details latest ON latest.id = g.last_detail_id
            "#,
        )
        .bind(window.start)
        .bind(window.end)
        .fetch_all(&mut *tx)
        .await?;

        tx.commit().await?;

        debug!(
            total_revenue = total_revenue,
            total_transactions = total_transactions,
            products = sales.len(),
            "Sales report built"
        );

        Ok(TodayReport::assemble(total_revenue, total_transactions, sales))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};
    use chrono::{DateTime, Duration, NaiveDate, TimeZone};
    use kasir_core::{BestsellingProduct, CheckoutItem, NewProduct};

    fn utc() -> FixedOffset {
        FixedOffset::east_opt(0).unwrap()
    }

    async fn product(db: &Database, name: &str, price: i64, stock: i64) -> i64 {
        db.products()
            .insert(&NewProduct {
                name: name.to_string(),
                price,
                stock,
                category_id: None,
            })
            .await
            .unwrap()
            .id
    }

    async fn backdated_sale(db: &Database, at: DateTime<Utc>, product_id: i64, name: &str, qty: i64) {
        let id: i64 = sqlx::query_scalar(
            "INSERT INTO transactions (total_amount, created_at) VALUES (?1, ?2) RETURNING id",
        )
        .bind(qty * 100)
        .bind(at)
        .fetch_one(db.pool())
        .await
        .unwrap();

        sqlx::query(
            "INSERT INTO transaction_details (transaction_id, product_id, product_name, quantity, subtotal)
             VALUES (?1, ?2, ?3, ?4, ?5)",
        )
        .bind(id)
        .bind(product_id)
        .bind(name)
        .bind(qty)
        .bind(qty * 100)
        .execute(db.pool())
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn test_empty_day() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let report = db.reports().today(utc()).await.unwrap();
        assert_eq!(report, TodayReport::empty());
        assert_eq!(
            report.bestselling_products,
            vec![BestsellingProduct {
                name: String::new(),
                qty_sold: 0
            }]
        );
    }

    #[tokio::test]
    async fn test_multi_line_sale_counts_once() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let kopi = product(&db, "Kopi", 100, 50).await;
        let teh = product(&db, "Teh", 80, 50).await;

        db.transactions()
            .checkout(&[
                CheckoutItem { product_id: kopi, quantity: 3 },
                CheckoutItem { product_id: teh, quantity: 1 },
            ])
            .await
            .unwrap();
        db.transactions()
            .checkout(&[CheckoutItem { product_id: teh, quantity: 1 }])
            .await
            .unwrap();

        let report = db.reports().today(utc()).await.unwrap();
        assert_eq!(report.total_revenue, 300 + 80 + 80);
        assert_eq!(report.total_transactions, 2);
        assert_eq!(
            report.bestselling_products,
            vec![BestsellingProduct {
                name: "Kopi".to_string(),
                qty_sold: 3
            }]
        );
    }

    #[tokio::test]
    async fn test_ties_and_latest_name_snapshot() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let kopi = product(&db, "Kopi", 100, 50).await;
        let teh = product(&db, "Teh", 100, 50).await;

        db.transactions()
            .checkout(&[CheckoutItem { product_id: teh, quantity: 2 }])
            .await
            .unwrap();

        let mut renamed = db.products().get_by_id(kopi).await.unwrap().unwrap();
        renamed.name = "Kopi Susu".to_string();
        db.products()
            .update(
                kopi,
                &NewProduct {
                    name: renamed.name.clone(),
                    price: renamed.price,
                    stock: renamed.stock,
                    category_id: None,
                },
            )
            .await
            .unwrap();
        db.transactions()
            .checkout(&[CheckoutItem { product_id: kopi, quantity: 2 }])
            .await
            .unwrap();

        let report = db.reports().today(utc()).await.unwrap();
        let names: Vec<&str> = report
            .bestselling_products
            .iter()
            .map(|b| b.name.as_str())
            .collect();
        assert_eq!(names, vec!["Kopi Susu", "Teh"]);
    }

    #[tokio::test]
    async fn test_window_bounds_are_half_open() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let kopi = product(&db, "Kopi", 100, 50).await;

        let date = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
        let window = ReportWindow::for_date(date, utc());

        backdated_sale(&db, window.start - Duration::seconds(1), kopi, "Kopi", 7).await;
        backdated_sale(&db, window.start, kopi, "Kopi", 2).await;
        backdated_sale(&db, window.end - Duration::milliseconds(1), kopi, "Kopi", 1).await;
        backdated_sale(&db, window.end, kopi, "Kopi", 9).await;

        let report = db.reports().for_window(window).await.unwrap();
        assert_eq!(report.total_transactions, 2);
        assert_eq!(report.total_revenue, 300);
        assert_eq!(report.bestselling_products[0].qty_sold, 3);
    }

    #[tokio::test]
    async fn test_offset_shifts_the_day() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let kopi = product(&db, "Kopi", 100, 50).await;

        // 2024-03-10 18:00 UTC is already 2024-03-11 in UTC+7.
        let at = Utc.with_ymd_and_hms(2024, 3, 10, 18, 0, 0).unwrap();
        backdated_sale(&db, at, kopi, "Kopi", 4).await;

        let wib = FixedOffset::east_opt(7 * 3600).unwrap();
        let march_10 = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
        let march_11 = NaiveDate::from_ymd_opt(2024, 3, 11).unwrap();

        let report = db
            .reports()
            .for_window(ReportWindow::for_date(march_10, wib))
            .await
            .unwrap();
        assert_eq!(report.total_transactions, 0);

        let report = db
            .reports()
            .for_window(ReportWindow::for_date(march_11, wib))
            .await
            .unwrap();
        assert_eq!(report.total_transactions, 1);
        assert_eq!(report.total_revenue, 400);
    }
}
