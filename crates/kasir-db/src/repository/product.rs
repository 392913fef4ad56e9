//! # Product Repository
//!
//! Database operations for products.
//!
//! ## Key Operations
//! - Listing with an optional name filter
//! - CRUD operations
//! - Soft delete
//!
//! Stock is never written here except as a whole-value replacement from an
//! explicit product update. Sales decrement stock only through the checkout
//! unit of work in [`super::transaction`].

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use kasir_core::{NewProduct, Product};

/// Columns selected for every product read, with the joined category name.
const PRODUCT_SELECT: &str = r#"
    SELECT
        p.id,
        p.name,
        p.price,
        p.stock,
        p.category_id,
        COALESCE(c.name, '') AS category_name
    FROM products p
    LEFT JOIN categories c ON c.id = p.category_id
"#;

/// Repository for product database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = ProductRepository::new(pool);
///
/// let results = repo.list(Some("kopi")).await?;
/// let product = repo.get_by_id(7).await?;
/// ```
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Lists active products ordered by id.
    ///
    /// `name` filters by case-insensitive substring; blank means no filter.
    pub async fn list(&self, name: Option<&str>) -> DbResult<Vec<Product>> {
        let filter = name.map(str::trim).filter(|n| !n.is_empty());

        debug!(filter = ?filter, "Listing products");

        let sql = format!(
            "{PRODUCT_SELECT}
            WHERE p.is_active = 1
              AND (?1 IS NULL OR instr(lower(p.name), lower(?1)) > 0)
            ORDER BY p.id"
        );

        let products = sqlx::query_as::<_, Product>(&sql)
            .bind(filter)
            .fetch_all(&self.pool)
            .await?;

        debug!(count = products.len(), "Listed products");
        Ok(products)
    }

    /// Gets an active product by its ID.
    ///
    /// ## Returns
    /// * `Ok(Some(Product))` - Product found
    /// * `Ok(None)` - Product not found or soft-deleted
    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<Product>> {
        let sql = format!("{PRODUCT_SELECT} WHERE p.id = ?1 AND p.is_active = 1");

        let product = sqlx::query_as::<_, Product>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(product)
    }

    /// Inserts a new product.
    ///
    /// ## Returns
    /// * `Ok(Product)` - Inserted product with its id and category name
    /// * `Err(DbError::NotFound)` - `category_id` names no category
    pub async fn insert(&self, product: &NewProduct) -> DbResult<Product> {
        debug!(name = %product.name, "Inserting product");

        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO products (name, price, stock, category_id)
            VALUES (?1, ?2, ?3, ?4)
            RETURNING id
            "#,
        )
        .bind(product.name.trim())
        .bind(product.price)
        .bind(product.stock)
        .bind(product.category_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| category_violation(e.into(), product.category_id))?;

        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Product", id))
    }

    /// Replaces the editable fields of an active product.
    ///
    /// ## Returns
    /// * `Ok(Product)` - Product as stored after the update
    /// * `Err(DbError::NotFound)` - Product (or the new category) doesn't exist
    pub async fn update(&self, id: i64, product: &NewProduct) -> DbResult<Product> {
        debug!(id = id, "Updating product");

        let result = sqlx::query(
            r#"
            UPDATE products SET
                name = ?2,
                price = ?3,
                stock = ?4,
                category_id = ?5
            WHERE id = ?1 AND is_active = 1
            "#,
        )
        .bind(id)
        .bind(product.name.trim())
        .bind(product.price)
        .bind(product.stock)
        .bind(product.category_id)
        .execute(&self.pool)
        .await
        .map_err(|e| category_violation(e.into(), product.category_id))?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Product", id))
    }

    /// Soft-deletes a product by setting is_active = 0.
    ///
    /// Past transaction details keep their product id and name snapshot.
    /// The product disappears from listings and can no longer be sold.
    pub async fn soft_delete(&self, id: i64) -> DbResult<()> {
        debug!(id = id, "Soft-deleting product");

        let result = sqlx::query("UPDATE products SET is_active = 0 WHERE id = ?1 AND is_active = 1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        Ok(())
    }

    /// Counts active products (for diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products WHERE is_active = 1")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

/// A foreign key failure on a product write can only mean a missing category.
fn category_violation(err: DbError, category_id: Option<i64>) -> DbError {
    match (err, category_id) {
        (DbError::ForeignKeyViolation { .. }, Some(category_id)) => {
            DbError::not_found("Category", category_id)
        }
        (err, _) => err,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
