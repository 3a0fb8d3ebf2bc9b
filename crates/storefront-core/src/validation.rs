//! # Validation Module
//!
//! Input validation for cart operations and configuration.
//!
//! ## Where Validation Happens
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Points                                  │
//! │                                                                         │
//! │  add_item(qty)          → validate_quantity   (reject qty <= 0)        │
//! │  add_item(variant)      → parse_price         (regular price required) │
//! │  update_quantity(qty)   → no validation: qty <= 0 means "remove"       │
//! │  CartConfig::validate   → validate_storage_key                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use storefront_core::validation::{parse_price, validate_quantity};
//!
//! assert_eq!(parse_price("price", "19.99").unwrap().cents(), 1999);
//! assert!(validate_quantity(0).is_err());
//! ```

use crate::error::ValidationError;
use crate::money::{Money, ParseMoneyError};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Longest storage key accepted.
pub const MAX_STORAGE_KEY_LEN: usize = 100;

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a quantity being added to the cart.
///
/// ## Rules
/// - Must be positive (> 0)
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    Ok(())
}

/// Parses a string-encoded catalog price.
///
/// ## Rules
/// - Must not be empty
/// - Must be a decimal number (rounded to cents)
/// - Must be non-negative (zero is allowed: free items)
pub fn parse_price(field: &str, raw: &str) -> ValidationResult<Money> {
    let price = raw.parse::<Money>().map_err(|err| match err {
        ParseMoneyError::Empty => ValidationError::Required {
            field: field.to_string(),
        },
        other => ValidationError::InvalidFormat {
            field: field.to_string(),
            reason: other.to_string(),
        },
    })?;

    if price.is_negative() {
        return Err(ValidationError::InvalidFormat {
            field: field.to_string(),
            reason: "must not be negative".to_string(),
        });
    }

    Ok(price)
}

/// Parses an optional price, treating absent, empty and invalid values alike.
///
/// Used for prices where a bad value should fall back rather than fail
/// (promotional and compare-at prices).
pub fn parse_optional_price(field: &str, raw: Option<&str>) -> Option<Money> {
    raw.and_then(|value| parse_price(field, value).ok())
}

// =============================================================================
// String Validators
// =============================================================================

/// Validates the key a cart is persisted under.
///
/// ## Rules
/// - Must not be empty
/// - At most [`MAX_STORAGE_KEY_LEN`] characters
/// - No path separators or control characters (file-backed stores use the
///   key as a file name)
pub fn validate_storage_key(key: &str) -> ValidationResult<()> {
    if key.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "storage key".to_string(),
        });
    }

    if key.chars().count() > MAX_STORAGE_KEY_LEN {
        return Err(ValidationError::TooLong {
            field: "storage key".to_string(),
            max: MAX_STORAGE_KEY_LEN,
        });
    }

    if key
        .chars()
        .any(|c| c == '/' || c == '\\' || c.is_control())
    {
        return Err(ValidationError::InvalidFormat {
            field: "storage key".to_string(),
            reason: "must not contain path separators or control characters".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(999).is_ok());

        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-1).is_err());
    }

    #[test]
    fn test_parse_price() {
        assert_eq!(parse_price("price", "100.00").unwrap().cents(), 10000);
        assert_eq!(parse_price("price", "0").unwrap().cents(), 0);

        assert_eq!(
            parse_price("price", ""),
            Err(ValidationError::Required {
                field: "price".to_string()
            })
        );
        assert!(matches!(
            parse_price("price", "ten"),
            Err(ValidationError::InvalidFormat { .. })
        ));
        assert!(matches!(
            parse_price("price", "-1.00"),
            Err(ValidationError::InvalidFormat { .. })
        ));
    }

    #[test]
    fn test_parse_optional_price() {
        assert_eq!(
            parse_optional_price("promotional_price", Some("40.00")).map(|m| m.cents()),
            Some(4000)
        );
        assert_eq!(parse_optional_price("promotional_price", Some("")), None);
        assert_eq!(parse_optional_price("promotional_price", Some("n/a")), None);
        assert_eq!(parse_optional_price("promotional_price", None), None);
    }

    #[test]
    fn test_validate_storage_key() {
        assert!(validate_storage_key("tiendanube-cart").is_ok());

        assert!(validate_storage_key("").is_err());
        assert!(validate_storage_key("   ").is_err());
        assert!(validate_storage_key("../etc/passwd").is_err());
        assert!(validate_storage_key("a\\b").is_err());
        assert!(validate_storage_key("line\nbreak").is_err());
        assert!(validate_storage_key(&"k".repeat(101)).is_err());
    }
}
