//! # Checkout Tally
//!
//! Pure bookkeeping for one checkout: prices each cart line, accumulates the
//! running total and decides which rejection a failed stock reservation maps
//! to. The database layer drives it from inside its unit of work.
//!
//! ## Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  for each CheckoutItem (input order)                                    │
//! │     │                                                                   │
//! │     ├── kasir-db: guarded UPDATE ... stock >= qty RETURNING name, price │
//! │     │        │                                                          │
//! │     │        ├── row returned ──► CheckoutTally::add_line()  (THIS)     │
//! │     │        │                     subtotal = price × qty               │
//! │     │        │                     total   += subtotal                  │
//! │     │        │                                                          │
//! │     │        └── no row ──────► reservation_failure()        (THIS)     │
//! │     │                              ProductNotFound | InsufficientStock  │
//! │     ▼                                                                   │
//! │  header insert(total) ──► PendingDetail::into_detail(id, tx_id)         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::{CoreError, ValidationError};
use crate::money::Money;
use crate::types::{CheckoutItem, TransactionDetail};

/// A priced cart line waiting for its transaction id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingDetail {
    pub product_id: i64,
    pub product_name: String,
    pub quantity: i64,
    pub subtotal: Money,
}

impl PendingDetail {
    /// Binds the line to its persisted identity.
    pub fn into_detail(self, id: i64, transaction_id: i64) -> TransactionDetail {
        TransactionDetail {
            id,
            transaction_id,
            product_id: self.product_id,
            product_name: self.product_name,
            quantity: self.quantity,
            subtotal: self.subtotal.units(),
        }
    }
}

/// Running state of one checkout.
#[derive(Debug, Clone, Default)]
pub struct CheckoutTally {
    lines: Vec<PendingDetail>,
    total: Money,
}

impl CheckoutTally {
    /// Creates an empty tally sized for `items` lines.
    pub fn with_capacity(items: usize) -> Self {
        CheckoutTally {
            lines: Vec::with_capacity(items),
            total: Money::zero(),
        }
    }

    /// Prices one reserved line and adds it to the running total.
    ///
    /// ## Errors
    /// `ValidationError::OutOfRange` when `unit_price × quantity` or the
    /// running total overflows.
    ///
    /// ## Example
    /// ```rust
    /// use kasir_core::checkout::CheckoutTally;
    /// use kasir_core::{CheckoutItem, Money};
    ///
    /// let mut tally = CheckoutTally::with_capacity(1);
    /// let item = CheckoutItem { product_id: 1, quantity: 3 };
    /// tally.add_line(&item, "Kopi Susu", Money::from_units(100)).unwrap();
    /// assert_eq!(tally.total().units(), 300);
    /// ```
    pub fn add_line(
        &mut self,
        item: &CheckoutItem,
        product_name: &str,
        unit_price: Money,
    ) -> Result<(), ValidationError> {
        let overflow = || ValidationError::OutOfRange {
            field: "total_amount".to_string(),
            min: 0,
            max: i64::MAX,
        };

        let subtotal = unit_price
            .checked_mul_quantity(item.quantity)
            .ok_or_else(overflow)?;
        self.total = self.total.checked_add(subtotal).ok_or_else(overflow)?;

        self.lines.push(PendingDetail {
            product_id: item.product_id,
            product_name: product_name.to_string(),
            quantity: item.quantity,
            subtotal,
        });

        Ok(())
    }

    /// Sum of all line subtotals so far.
    pub fn total(&self) -> Money {
        self.total
    }

    /// Lines priced so far, in input order.
    pub fn lines(&self) -> &[PendingDetail] {
        &self.lines
    }

    /// Consumes the tally, yielding its lines.
    pub fn into_lines(self) -> Vec<PendingDetail> {
        self.lines
    }
}

/// Maps a reservation that touched no row to the matching rejection.
///
/// `current` is the product's `(name, stock)` as read inside the same unit of
/// work, or `None` when no active product has that id.
pub fn reservation_failure(item: &CheckoutItem, current: Option<(String, i64)>) -> CoreError {
    match current {
        None => CoreError::ProductNotFound {
            product_id: item.product_id,
        },
        Some((name, available)) => CoreError::InsufficientStock {
            product_id: item.product_id,
            name,
            available,
            requested: item.quantity,
        },
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
