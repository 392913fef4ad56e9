//! # Transaction Repository
//!
//! The checkout unit of work and read access to committed sales.
//!
//! ## Checkout Unit of Work
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  validate_cart(items)             ← no connection taken on bad input    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  BEGIN ─────────────── tokio::time::timeout(checkout_timeout) ──────┐   │
//! │       │                                                             │   │
//! │       ▼  for each item, in order                                    │   │
//! │  UPDATE products SET stock = stock - qty                            │   │
//! │   WHERE id = ? AND is_active = 1 AND stock >= qty                   │   │
//! │   RETURNING name, price                                             │   │
//! │       │                                                             │   │
//! │       ├── row ──► CheckoutTally::add_line                           │   │
//! │       └── none ─► SELECT name, stock ──► ProductNotFound |          │   │
//! │                                          InsufficientStock (drop)   │   │
//! │       ▼                                                             │   │
//! │  INSERT transactions(total_amount, created_at) RETURNING id         │   │
//! │  INSERT transaction_details × n                                     │   │
//! │       │                                                             │   │
//! │       ▼                                                             │   │
//! │  COMMIT ────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The stock check and the decrement are one statement, so two concurrent
//! checkouts can never both pass the check against the same stale value.
//! The first statement is a write, so SQLite hands out its write lock at
//! once (or queues the caller on `busy_timeout`) instead of failing a later
//! read-to-write upgrade. Any early return drops the `sqlx::Transaction`,
//! which rolls back every decrement made so far.

use std::time::Duration;

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, info, warn};

use crate::error::{CheckoutError, CheckoutResult, DbError, DbResult};
use kasir_core::checkout::{reservation_failure, CheckoutTally};
use kasir_core::validation::validate_cart;
use kasir_core::{CheckoutItem, Money, Transaction, TransactionDetail};

/// Repository for transactions and their details.
#[derive(Debug, Clone)]
pub struct TransactionRepository {
    pool: SqlitePool,
    checkout_timeout: Duration,
}

impl TransactionRepository {
    /// Creates a new TransactionRepository.
    pub fn new(pool: SqlitePool, checkout_timeout: Duration) -> Self {
        TransactionRepository {
            pool,
            checkout_timeout,
        }
    }

    /// Converts a cart into a committed sale, all or nothing.
    ///
    /// ## Returns
    /// * `Ok(Transaction)` - committed sale with its details in input order
    /// * `Err(CheckoutError::Validation)` - bad cart, nothing touched
    /// * `Err(CheckoutError::ProductNotFound)` - unknown or deleted product
    /// * `Err(CheckoutError::InsufficientStock)` - some line exceeds stock
    /// * `Err(CheckoutError::Infrastructure)` - store failure or deadline
    ///
    /// On every error no stock changes and no rows are created.
    pub async fn checkout(&self, items: &[CheckoutItem]) -> CheckoutResult<Transaction> {
        validate_cart(items)?;

        debug!(lines = items.len(), "Starting checkout");

        let outcome = match tokio::time::timeout(self.checkout_timeout, self.run_checkout(items)).await {
            Ok(outcome) => outcome,
            Err(_) => Err(CheckoutError::Infrastructure(DbError::Timeout(
                self.checkout_timeout,
            ))),
        };

        match &outcome {
            Ok(transaction) => info!(
                transaction_id = transaction.id,
                total_amount = transaction.total_amount,
                lines = transaction.details.len(),
                "Checkout committed"
            ),
            Err(CheckoutError::Infrastructure(err)) => {
                warn!(error = %err, "Checkout aborted")
            }
            Err(err) => debug!(error = %err, "Checkout rejected"),
        }

        outcome
    }

    async fn run_checkout(&self, items: &[CheckoutItem]) -> CheckoutResult<Transaction> {
        let mut tx = self.pool.begin().await?;
        let mut tally = CheckoutTally::with_capacity(items.len());

        for item in items {
            let reserved: Option<(String, i64)> = sqlx::query_as(
                r#"
                UPDATE products
                SET stock = stock - ?1
                WHERE id = ?2 AND is_active = 1 AND stock >= ?1
                RETURNING name, price
                "#,
            )
            .bind(item.quantity)
            .bind(item.product_id)
            .fetch_optional(&mut *tx)
            .await?;

            let Some((name, price)) = reserved else {
                let current: Option<(String, i64)> = sqlx::query_as(
                    "SELECT name, stock FROM products WHERE id = ?1 AND is_active = 1",
                )
                .bind(item.product_id)
                .fetch_optional(&mut *tx)
                .await?;

                return Err(reservation_failure(item, current).into());
            };

            tally.add_line(item, &name, Money::from_units(price))?;
        }

        let created_at = Utc::now();
        let total_amount = tally.total().units();

        let transaction_id: i64 = sqlx::query_scalar(
            "INSERT INTO transactions (total_amount, created_at) VALUES (?1, ?2) RETURNING id",
        )
        .bind(total_amount)
        .bind(created_at)
        .fetch_one(&mut *tx)
        .await?;

        let mut details = Vec::with_capacity(items.len());
        for line in tally.into_lines() {
            let detail_id: i64 = sqlx::query_scalar(
                r#"
                INSERT INTO transaction_details
                    (transaction_id, product_id, product_name, quantity, subtotal)
                VALUES (?1, ?2, ?3, ?4, ?5)
                RETURNING id
                "#,
            )
            .bind(transaction_id)
            .bind(line.product_id)
            .bind(&line.product_name)
            .bind(line.quantity)
            .bind(line.subtotal.units())
            .fetch_one(&mut *tx)
            .await?;

            details.push(line.into_detail(detail_id, transaction_id));
        }

        tx.commit().await?;

        Ok(Transaction {
            id: transaction_id,
            total_amount,
            created_at,
            details,
        })
    }

    /// Gets a committed transaction with its details.
    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<Transaction>> {
        let header = sqlx::query_as::<_, Transaction>(
            "SELECT id, total_amount, created_at FROM transactions WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(mut transaction) = header else {
            return Ok(None);
        };

        transaction.details = self.details(id).await?;
        Ok(Some(transaction))
    }

    /// Details of one transaction in insertion order.
    pub async fn details(&self, transaction_id: i64) -> DbResult<Vec<TransactionDetail>> {
        let details = sqlx::query_as::<_, TransactionDetail>(
            r#"
            SELECT id, transaction_id, product_id, product_name, quantity, subtotal
            FROM transaction_details
            WHERE transaction_id = ?1
            ORDER BY id
            "#,
        )
        .bind(transaction_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(details)
    }

    /// Counts committed transactions (for diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM transactions")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};
    use kasir_core::{NewProduct, ValidationError};

    async fn seeded(stock: &[(i64, i64)]) -> (Database, Vec<i64>) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let mut ids = Vec::new();
        for (i, (price, stock)) in stock.iter().enumerate() {
            let product = db
                .products()
                .insert(&NewProduct {
                    name: format!("Produk {}", i + 1),
                    price: *price,
                    stock: *stock,
                    category_id: None,
                })
                .await
                .unwrap();
            ids.push(product.id);
        }
        (db, ids)
    }

    async fn stock_of(db: &Database, id: i64) -> i64 {
        db.products().get_by_id(id).await.unwrap().unwrap().stock
    }

    fn item(product_id: i64, quantity: i64) -> CheckoutItem {
        CheckoutItem {
            product_id,
            quantity,
        }
    }

    #[tokio::test]
    async fn test_checkout_commits_sale() {
        let (db, ids) = seeded(&[(100, 50), (250, 10)]).await;

        let tx = db
            .transactions()
            .checkout(&[item(ids[0], 3), item(ids[1], 2)])
            .await
            .unwrap();

        assert!(tx.id > 0);
        assert_eq!(tx.total_amount, 300 + 500);
        assert!(tx.is_balanced());
        assert_eq!(tx.details.len(), 2);
        assert_eq!(tx.details[0].product_name, "Produk 1");
        assert_eq!(tx.details[0].subtotal, 300);
        assert_eq!(stock_of(&db, ids[0]).await, 47);
        assert_eq!(stock_of(&db, ids[1]).await, 8);

        let stored = db.transactions().get_by_id(tx.id).await.unwrap().unwrap();
        assert_eq!(stored.details, tx.details);
        assert_eq!(stored.total_amount, tx.total_amount);
    }

    #[tokio::test]
    async fn test_repeated_product_lines_apply_in_order() {
        let (db, ids) = seeded(&[(100, 5)]).await;

        let tx = db
            .transactions()
            .checkout(&[item(ids[0], 3), item(ids[0], 2)])
            .await
            .unwrap();
        assert_eq!(tx.total_amount, 500);
        assert_eq!(stock_of(&db, ids[0]).await, 0);

        let err = db
            .transactions()
            .checkout(&[item(ids[0], 1)])
            .await
            .unwrap_err();
        assert!(matches!(err, CheckoutError::InsufficientStock { available: 0, .. }));
    }

    #[tokio::test]
    async fn test_insufficient_stock_rolls_back_earlier_lines() {
        let (db, ids) = seeded(&[(100, 50), (200, 4)]).await;

        let err = db
            .transactions()
            .checkout(&[item(ids[0], 3), item(ids[1], 5)])
            .await
            .unwrap_err();

        match err {
            CheckoutError::InsufficientStock {
                product_id,
                available,
                requested,
                ..
            } => {
                assert_eq!(product_id, ids[1]);
                assert_eq!(available, 4);
                assert_eq!(requested, 5);
            }
            other => panic!("unexpected error: {other:?}"),
        }

        assert_eq!(stock_of(&db, ids[0]).await, 50);
        assert_eq!(stock_of(&db, ids[1]).await, 4);
        assert_eq!(db.transactions().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_unknown_and_deleted_products() {
        let (db, ids) = seeded(&[(100, 5)]).await;

        let err = db
            .transactions()
            .checkout(&[item(ids[0], 1), item(9_999, 1)])
            .await
            .unwrap_err();
        assert!(matches!(err, CheckoutError::ProductNotFound { product_id: 9_999 }));
        assert_eq!(stock_of(&db, ids[0]).await, 5);

        db.products().soft_delete(ids[0]).await.unwrap();
        let err = db
            .transactions()
            .checkout(&[item(ids[0], 1)])
            .await
            .unwrap_err();
        assert!(matches!(err, CheckoutError::ProductNotFound { .. }));
    }

    #[tokio::test]
    async fn test_non_positive_product_id_is_not_found() {
        let (db, ids) = seeded(&[(100, 5)]).await;

        for bad_id in [0, -5] {
            let err = db
                .transactions()
                .checkout(&[item(ids[0], 2), item(bad_id, 1)])
                .await
                .unwrap_err();
            assert!(matches!(err, CheckoutError::ProductNotFound { product_id } if product_id == bad_id));
        }

        assert_eq!(stock_of(&db, ids[0]).await, 5);
        assert_eq!(db.transactions().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_invalid_cart_is_rejected() {
        let (db, ids) = seeded(&[(100, 5)]).await;

        let err = db.transactions().checkout(&[]).await.unwrap_err();
        assert!(matches!(err, CheckoutError::Validation(ValidationError::EmptyCart)));

        let err = db
            .transactions()
            .checkout(&[item(ids[0], 0)])
            .await
            .unwrap_err();
        assert!(matches!(err, CheckoutError::Validation(_)));
        assert_eq!(stock_of(&db, ids[0]).await, 5);
    }

    #[tokio::test]
    async fn test_total_overflow_is_rejected() {
        let (db, ids) = seeded(&[(i64::MAX / 2, 10)]).await;

        let err = db
            .transactions()
            .checkout(&[item(ids[0], 3)])
            .await
            .unwrap_err();
        assert!(matches!(err, CheckoutError::Validation(ValidationError::OutOfRange { .. })));
        assert_eq!(stock_of(&db, ids[0]).await, 10);
    }

    #[tokio::test]
    async fn test_missing_transaction() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        assert!(db.transactions().get_by_id(1).await.unwrap().is_none());
    }
}
