//! # Domain Types
//!
//! Core domain types used throughout the Kasir POS backend.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────────┐   │
//! │  │    Category     │   │    Product      │   │    Transaction      │   │
//! │  │  ─────────────  │◄──│  ─────────────  │   │  ─────────────────  │   │
//! │  │  id             │   │  id             │   │  id                 │   │
//! │  │  name           │   │  name, price    │   │  total_amount       │   │
//! │  │  description    │   │  stock          │   │  created_at         │   │
//! │  └─────────────────┘   │  category_id?   │   │  details[] ──┐      │   │
//! │                        └────────▲────────┘   └──────────────┼──────┘   │
//! │                                 │ weak (id only)            │ owns     │
//! │                        ┌────────┴──────────────────────────▼──────┐   │
//! │                        │          TransactionDetail               │   │
//! │                        │  product_id, product_name (snapshot)     │   │
//! │                        │  quantity, subtotal                      │   │
//! │                        └──────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Identities are database-assigned integers. The JSON field names are the
//! wire contract of the HTTP API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use ts_rs::TS;

use crate::money::Money;

// =============================================================================
// Category
// =============================================================================

/// A product category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
}

/// Payload for creating a category, and the merged row written on update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CategoryInput {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// Partial category update. Absent fields are kept; `"description": null`
/// clears the description.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CategoryUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "present")]
    pub description: Option<Option<String>>,
}

impl CategoryUpdate {
    /// Applies the update on top of an existing category.
    pub fn apply_to(&self, category: &Category) -> CategoryInput {
        CategoryInput {
            name: self.name.clone().unwrap_or_else(|| category.name.clone()),
            description: match &self.description {
                Some(description) => description.clone(),
                None => category.description.clone(),
            },
        }
    }
}

// =============================================================================
// Product
// =============================================================================

/// A product available for sale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Product {
    /// Database identity.
    pub id: i64,

    /// Display name, also frozen into sale details at checkout.
    pub name: String,

    /// Unit price in the smallest currency unit.
    pub price: i64,

    /// Units on hand. Never negative.
    pub stock: i64,

    /// Optional category (weak reference).
    pub category_id: Option<i64>,

    /// Category name, empty when uncategorized.
    #[serde(default)]
    pub category_name: String,
}

impl Product {
    /// Returns the price as a Money type.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_units(self.price)
    }
}

/// Payload for creating a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewProduct {
    pub name: String,
    pub price: i64,
    #[serde(default)]
    pub stock: i64,
    #[serde(default)]
    pub category_id: Option<i64>,
}

/// Partial product update.
///
/// Absent fields are left untouched. For `category_id`, an explicit `null`
/// clears the category while an absent key keeps it:
///
/// ```rust
/// use kasir_core::ProductUpdate;
///
/// let keep: ProductUpdate = serde_json::from_str(r#"{"price": 10}"#).unwrap();
/// assert_eq!(keep.category_id, None);
///
/// let clear: ProductUpdate = serde_json::from_str(r#"{"category_id": null}"#).unwrap();
/// assert_eq!(clear.category_id, Some(None));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ProductUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub price: Option<i64>,
    #[serde(default)]
    pub stock: Option<i64>,
    #[serde(default, deserialize_with = "present")]
    pub category_id: Option<Option<i64>>,
}

impl ProductUpdate {
    /// Applies the update on top of an existing product.
    pub fn apply_to(&self, product: &Product) -> NewProduct {
        NewProduct {
            name: self.name.clone().unwrap_or_else(|| product.name.clone()),
            price: self.price.unwrap_or(product.price),
            stock: self.stock.unwrap_or(product.stock),
            category_id: match self.category_id {
                Some(category_id) => category_id,
                None => product.category_id,
            },
        }
    }
}

/// Marks a key as present, keeping `null` distinguishable from absent.
fn present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

// =============================================================================
// Checkout
// =============================================================================

/// One cart line submitted for checkout. Never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CheckoutItem {
    pub product_id: i64,
    pub quantity: i64,
}

/// Body of `POST /checkout`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CheckoutRequest {
    pub items: Vec<CheckoutItem>,
}

// =============================================================================
// Transaction
// =============================================================================

/// A line of a committed sale.
/// Uses snapshot pattern to freeze the product name at time of sale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct TransactionDetail {
    pub id: i64,
    pub transaction_id: i64,
    pub product_id: i64,
    /// Product name at time of sale (frozen).
    pub product_name: String,
    pub quantity: i64,
    /// `price × quantity` at time of sale.
    pub subtotal: i64,
}

impl TransactionDetail {
    /// Returns the subtotal as Money.
    #[inline]
    pub fn subtotal(&self) -> Money {
        Money::from_units(self.subtotal)
    }
}

/// A committed sale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Transaction {
    pub id: i64,
    /// Sum of the details' subtotals.
    pub total_amount: i64,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[cfg_attr(feature = "sqlx", sqlx(skip))]
    #[serde(default)]
    pub details: Vec<TransactionDetail>,
}

impl Transaction {
    /// Returns the total as Money.
    #[inline]
    pub fn total_amount(&self) -> Money {
        Money::from_units(self.total_amount)
    }

    /// Checks that the header total matches its lines.
    pub fn is_balanced(&self) -> bool {
        self.details.iter().map(TransactionDetail::subtotal).sum::<Money>() == self.total_amount()
    }
}

// =============================================================================
// Report
// =============================================================================

/// Units sold of one product inside a report window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct ProductSales {
    pub product_id: i64,
    /// Most recent name snapshot.
    pub name: String,
    pub qty_sold: i64,
}

/// A best-selling product entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct BestsellingProduct {
    pub name: String,
    pub qty_sold: i64,
}

/// Sales summary for the current day. Derived on every request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TodayReport {
    pub total_revenue: i64,
    pub total_transactions: i64,
    pub bestselling_products: Vec<BestsellingProduct>,
}

// =============================================================================
// Unit Tests
// =============================================================================
