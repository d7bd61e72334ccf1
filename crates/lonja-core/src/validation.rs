//! # Validation Module
//!
//! Field-level checks for order input before it reaches the database.
//! Every function returns the first failure it finds so the dashboard
//! can point at a concrete field instead of showing a generic error.
//!
//! ## Validation Flow
//! ```text
//! CreateOrder / UpdateOrder
//!        │
//!        ├── validate_customer_id      (required)
//!        └── validate_order_items      (non-empty)
//!                │
//!                └── validate_order_item    (per line)
//!                        ├── product_id     (required)
//!                        ├── quantity       (1..=MAX_LINE_QUANTITY)
//!                        ├── unit_price     (non-negative)
//!                        ├── discount_percent
//!                        └── tax_percent
//! ```
//!
//! Percentages are permissive by default: values above 100 pass, because
//! the business occasionally prices promotions that way. Strict mode
//! ([`ValidationOptions::strict`]) caps both rates at 100 for operators
//! who want the guard rail.

use crate::error::ValidationError;
use crate::money::{Money, Percent};
use crate::types::OrderItemInput;
use crate::MAX_LINE_QUANTITY;
use rust_decimal::Decimal;
use uuid::Uuid;

/// Result alias for validation checks.
pub type ValidationResult = Result<(), ValidationError>;

/// Maximum length for entity names (products, customers, vendors).
pub const MAX_NAME_LENGTH: usize = 200;

// =============================================================================
// Options
// =============================================================================

/// Tunable validation behavior.
///
/// The default is permissive about percentages over 100 because the raw
/// figures are operator-entered and over-100 promotions exist. Negative
/// rates are always rejected.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidationOptions {
    /// When set, discount and tax rates above 100% are rejected.
    pub reject_percent_over_100: bool,
}

impl ValidationOptions {
    /// Options that cap percentage rates at 100.
    pub fn strict() -> Self {
        ValidationOptions {
            reject_percent_over_100: true,
        }
    }
}

// =============================================================================
// Field Validators
// =============================================================================

/// Validates that a customer id is present.
pub fn validate_customer_id(id: &str) -> ValidationResult {
    if id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "customer_id".to_string(),
        });
    }
    Ok(())
}

/// Validates that a product id is present.
pub fn validate_product_id(id: &str) -> ValidationResult {
    if id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "product_id".to_string(),
        });
    }
    Ok(())
}

/// Validates an entity name: present and within length limits.
pub fn validate_name(field: &str, name: &str) -> ValidationResult {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }
    if trimmed.len() > MAX_NAME_LENGTH {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: MAX_NAME_LENGTH,
        });
    }
    Ok(())
}

/// Validates a line quantity: at least 1, at most [`MAX_LINE_QUANTITY`].
pub fn validate_quantity(quantity: i64) -> ValidationResult {
    if quantity < 1 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }
    if quantity > MAX_LINE_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_LINE_QUANTITY,
        });
    }
    Ok(())
}

/// Validates a unit price: zero is allowed (free samples), negative is not.
pub fn validate_unit_price(price: Money) -> ValidationResult {
    if price.is_negative() {
        return Err(ValidationError::MustBeNonNegative {
            field: "unit_price".to_string(),
        });
    }
    Ok(())
}

/// Validates a percentage rate for the given field.
///
/// Negative rates always fail. Rates above 100 fail only when
/// [`ValidationOptions::reject_percent_over_100`] is set.
pub fn validate_percent(
    field: &str,
    rate: Percent,
    options: &ValidationOptions,
) -> ValidationResult {
    if rate.is_negative() {
        return Err(ValidationError::MustBeNonNegative {
            field: field.to_string(),
        });
    }
    if options.reject_percent_over_100 && rate.value() > Decimal::ONE_HUNDRED {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: 100,
        });
    }
    Ok(())
}

/// Validates that a string is a well-formed UUID.
pub fn validate_uuid(field: &str, value: &str) -> ValidationResult {
    Uuid::parse_str(value).map_err(|_| ValidationError::InvalidFormat {
        field: field.to_string(),
        reason: "must be a valid UUID".to_string(),
    })?;
    Ok(())
}

// =============================================================================
// Composite Validators
// =============================================================================

/// Validates a single order line input.
pub fn validate_order_item(item: &OrderItemInput, options: &ValidationOptions) -> ValidationResult {
    validate_product_id(&item.product_id)?;
    validate_quantity(item.quantity)?;
    validate_unit_price(item.unit_price)?;
    validate_percent("discount_percent", item.discount_percent, options)?;
    validate_percent("tax_percent", item.tax_percent, options)?;
    Ok(())
}

/// Validates an order's item list: non-empty, every line valid.
pub fn validate_order_items(
    items: &[OrderItemInput],
    options: &ValidationOptions,
) -> ValidationResult {
    if items.is_empty() {
        return Err(ValidationError::MustNotBeEmpty {
            field: "items".to_string(),
        });
    }
    for item in items {
        validate_order_item(item, options)?;
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
