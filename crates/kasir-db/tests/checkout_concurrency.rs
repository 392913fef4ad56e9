//! Checkout against a file-backed database with a multi-connection pool.

use std::time::Duration;

use kasir_core::{CheckoutItem, NewProduct};
use kasir_db::{CheckoutError, Database, DbConfig, DbError};
use sqlx::sqlite::SqliteConnectOptions;
use sqlx::{ConnectOptions, Connection};
use tempfile::TempDir;

async fn file_db(max_connections: u32) -> (TempDir, Database) {
    let dir = tempfile::tempdir().unwrap();
    let config = DbConfig::new(dir.path().join("kasir.db"))
        .max_connections(max_connections)
        .busy_timeout(Duration::from_secs(10))
        .checkout_timeout(Duration::from_secs(30));
    let db = Database::new(config).await.unwrap();
    (dir, db)
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

async fn stock_of(db: &Database, id: i64) -> i64 {
    db.products().get_by_id(id).await.unwrap().unwrap().stock
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_checkouts_never_oversell() {
    const TASKS: usize = 20;
    const STOCK: i64 = 5;

    let (_dir, db) = file_db(5).await;
    let id = product(&db, "Kopi Susu", 100, STOCK).await;

    let mut handles = Vec::with_capacity(TASKS);
    for _ in 0..TASKS {
        let db = db.clone();
        handles.push(tokio::spawn(async move {
            db.transactions()
                .checkout(&[CheckoutItem {
                    product_id: id,
                    quantity: 1,
                }])
                .await
        }));
    }

    let mut committed = 0;
    let mut rejected = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => committed += 1,
            Err(CheckoutError::InsufficientStock { available, .. }) => {
                assert_eq!(available, 0);
                rejected += 1;
            }
            Err(other) => panic!("unexpected checkout failure: {other:?}"),
        }
    }

    assert_eq!(committed, STOCK as usize);
    assert_eq!(rejected, TASKS - STOCK as usize);
    assert_eq!(stock_of(&db, id).await, 0);
    assert_eq!(db.transactions().count().await.unwrap(), STOCK);

    let report = db
        .reports()
        .today(chrono::FixedOffset::east_opt(0).unwrap())
        .await
        .unwrap();
    assert_eq!(report.total_transactions, STOCK);
    assert_eq!(report.total_revenue, STOCK * 100);
    assert_eq!(report.bestselling_products[0].qty_sold, STOCK);
}

#[tokio::test]
async fn failed_checkout_is_repeatable_and_leaves_no_trace() {
    let (_dir, db) = file_db(2).await;
    let p1 = product(&db, "Kopi Susu", 100, 50).await;
    let p2 = product(&db, "Roti", 250, 4).await;

    let cart = [
        CheckoutItem {
            product_id: p1,
            quantity: 3,
        },
        CheckoutItem {
            product_id: p2,
            quantity: 5,
        },
    ];

    for _ in 0..2 {
        let err = db.transactions().checkout(&cart).await.unwrap_err();
        assert!(matches!(
            err,
            CheckoutError::InsufficientStock { product_id, available: 4, requested: 5, .. } if product_id == p2
        ));
        assert_eq!(stock_of(&db, p1).await, 50);
        assert_eq!(stock_of(&db, p2).await, 4);
    }

    assert_eq!(db.transactions().count().await.unwrap(), 0);
    let details: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM transaction_details")
        .fetch_one(db.pool())
        .await
        .unwrap();
    assert_eq!(details, 0);
}

#[tokio::test]
async fn sale_shows_up_in_today_report() {
    let (_dir, db) = file_db(2).await;
    let p1 = product(&db, "Kopi Susu", 100, 50).await;

    let sale = db
        .transactions()
        .checkout(&[CheckoutItem {
            product_id: p1,
            quantity: 3,
        }])
        .await
        .unwrap();

    assert_eq!(sale.total_amount, 300);
    assert_eq!(stock_of(&db, p1).await, 47);

    let report = db
        .reports()
        .today(chrono::FixedOffset::east_opt(0).unwrap())
        .await
        .unwrap();
    assert!(report.total_revenue >= 300);
    assert!(report.total_transactions >= 1);
    assert!(report
        .bestselling_products
        .iter()
        .any(|b| b.name == "Kopi Susu" && b.qty_sold >= 3));

    db.close().await;
}

#[tokio::test]
async fn checkout_deadline_aborts_without_changes() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("kasir.db");
    let config = DbConfig::new(path.clone())
        .max_connections(2)
        .busy_timeout(Duration::from_secs(3))
        .checkout_timeout(Duration::from_millis(300));
    let db = Database::new(config).await.unwrap();
    let id = product(&db, "Kopi Susu", 100, 5).await;

    // Another writer holds the SQLite write lock past the checkout deadline.
    let mut holder = SqliteConnectOptions::new()
        .filename(&path)
        .connect()
        .await
        .unwrap();
    sqlx::query("BEGIN IMMEDIATE")
        .execute(&mut holder)
        .await
        .unwrap();

    let err = db
        .transactions()
        .checkout(&[CheckoutItem {
            product_id: id,
            quantity: 2,
        }])
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        CheckoutError::Infrastructure(DbError::Timeout(after)) if after == Duration::from_millis(300)
    ));

    sqlx::query("ROLLBACK").execute(&mut holder).await.unwrap();
    holder.close().await.unwrap();

    assert_eq!(stock_of(&db, id).await, 5);
    assert_eq!(db.transactions().count().await.unwrap(), 0);

    db.close().await;
}
