//! # Validation Module
//!
//! Input validation for the Kasir POS backend.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: HTTP handler (axum)                                          │
//! │  └── JSON shape (deserialization) → Malformed                          │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  └── Business rules: non-empty cart, positive quantity, prices ≥ 0     │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── CHECK (stock >= 0), CHECK (price >= 0)                            │
//! │  └── Foreign key constraints                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Everything here runs before a database connection is acquired.

use crate::error::ValidationError;
use crate::types::{CategoryInput, CheckoutItem, NewProduct};
use crate::MAX_CART_ITEMS;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Longest accepted product or category name.
const MAX_NAME_LEN: usize = 200;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a product or category name.
///
/// ## Rules
/// - Must not be empty (after trimming)
/// - At most 200 characters
///
/// ## Example
/// ```rust
/// use kasir_core::validation::validate_name;
///
/// assert!(validate_name("name", "Kopi Susu").is_ok());
/// assert!(validate_name("name", "   ").is_err());
/// ```
pub fn validate_name(field: &str, name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if name.chars().count() > MAX_NAME_LEN {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: MAX_NAME_LEN,
        });
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a checkout quantity. Must be positive.
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    Ok(())
}

/// Validates a non-negative integer field such as `price` or `stock`.
///
/// ## Example
/// ```rust
/// use kasir_core::validation::validate_non_negative;
///
/// assert!(validate_non_negative("price", 0).is_ok());
/// assert!(validate_non_negative("price", -100).is_err());
/// ```
pub fn validate_non_negative(field: &str, value: i64) -> ValidationResult<()> {
    if value < 0 {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

/// Validates an entity id taken from a path or body.
pub fn validate_id(field: &str, id: i64) -> ValidationResult<()> {
    if id <= 0 {
        return Err(ValidationError::MustBePositive {
            field: field.to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Entity Validators
// =============================================================================

/// Validates a product payload before insert or update.
pub fn validate_new_product(product: &NewProduct) -> ValidationResult<()> {
    validate_name("name", &product.name)?;
    validate_non_negative("price", product.price)?;
    validate_non_negative("stock", product.stock)?;
    if let Some(category_id) = product.category_id {
        validate_id("category_id", category_id)?;
    }
    Ok(())
}

/// Validates a category payload before insert or update.
pub fn validate_category(category: &CategoryInput) -> ValidationResult<()> {
    validate_name("name", &category.name)
}

// =============================================================================
// Cart Validators
// =============================================================================

/// Validates a checkout cart.
///
/// ## Rules
/// - At least one item
/// - At most MAX_CART_ITEMS (100) lines
/// - Every quantity positive
///
/// Product ids are not checked here: an id that matches no active product,
/// including zero or a negative one, is reported as not found by checkout.
/// The same product may appear on several lines; each line is applied in
/// order against the stock left by the previous ones.
pub fn validate_cart(items: &[CheckoutItem]) -> ValidationResult<()> {
    if items.is_empty() {
        return Err(ValidationError::EmptyCart);
    }

    if items.len() > MAX_CART_ITEMS {
        return Err(ValidationError::CartTooLarge {
            max: MAX_CART_ITEMS,
        });
    }

    for item in items {
        validate_quantity(item.quantity)?;
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn item(product_id: i64, quantity: i64) -> CheckoutItem {
        CheckoutItem {
            product_id,
            quantity,
        }
    }

    #[test]
    fn test_validate_name() {
        assert!(validate_name("name", "Teh Botol").is_ok());
        assert!(validate_name("name", "").is_err());
        assert!(validate_name("name", &"A".repeat(300)).is_err());
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(10_000).is_ok());
        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-1).is_err());
    }

    #[test]
    fn test_validate_new_product() {
        let mut product = NewProduct {
            name: "Roti Tawar".to_string(),
            price: 15_000,
            stock: 10,
            category_id: None,
        };
        assert!(validate_new_product(&product).is_ok());

        product.price = -1;
        assert!(matches!(
            validate_new_product(&product),
            Err(ValidationError::OutOfRange { .. })
        ));

        product.price = 0;
        product.stock = -5;
        assert!(validate_new_product(&product).is_err());

        product.stock = 0;
        product.category_id = Some(0);
        assert!(validate_new_product(&product).is_err());
    }

    #[test]
    fn test_validate_cart() {
        assert_eq!(validate_cart(&[]), Err(ValidationError::EmptyCart));
        assert!(validate_cart(&[item(1, 3), item(1, 2)]).is_ok());
        assert!(validate_cart(&[item(1, 3), item(2, 0)]).is_err());
        assert!(validate_cart(&[item(0, 1)]).is_ok());
        assert!(validate_cart(&[item(-5, 1)]).is_ok());

        let too_many: Vec<CheckoutItem> = (1..=101).map(|id| item(id, 1)).collect();
        assert_eq!(
            validate_cart(&too_many),
            Err(ValidationError::CartTooLarge { max: 100 })
        );
    }
}
