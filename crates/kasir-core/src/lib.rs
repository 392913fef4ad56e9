//! # kasir-core: Pure Business Logic for Kasir POS
//!
//! This crate holds the domain of the Kasir POS backend as pure functions
//! with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Kasir POS Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    apps/api (axum)                              │   │
//! │  │    /checkout, /report/today, /products, /categories            │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ kasir-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │ checkout  │  │  report   │  │   │
//! │  │   │  Product  │  │   Money   │  │  Tally    │  │  Window   │  │   │
//! │  │   │Transaction│  │           │  │           │  │  ranking  │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK                             │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    kasir-db (Database Layer)                    │   │
//! │  │              SQLite queries, migrations, repositories           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, Category, Transaction, TodayReport)
//! - [`money`] - Money type with integer arithmetic
//! - [`error`] - Domain error types
//! - [`validation`] - Input rules checked before any store access
//! - [`checkout`] - Line pricing and rejection mapping for checkout
//! - [`report`] - Day window and best-seller ranking
//!
//! ## Feature Flags
//!
//! - `sqlx` - derives `sqlx::FromRow` on the persisted types
//!
//! ## Example Usage
//!
//! ```rust
//! use kasir_core::{validation, CheckoutItem, Money};
//! use kasir_core::checkout::CheckoutTally;
//!
//! let items = [CheckoutItem { product_id: 1, quantity: 3 }];
//! validation::validate_cart(&items).unwrap();
//!
//! let mut tally = CheckoutTally::with_capacity(items.len());
//! tally.add_line(&items[0], "Kopi Susu", Money::from_units(100)).unwrap();
//! assert_eq!(tally.total().units(), 300);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod checkout;
pub mod error;
pub mod money;
pub mod report;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use report::ReportWindow;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum lines allowed in a single checkout.
///
/// Quantity per line is not capped; stock is the only bound.
pub const MAX_CART_ITEMS: usize = 100;
