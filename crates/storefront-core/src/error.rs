//! # Error Types
//!
//! Domain-specific error types for storefront-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  storefront-core errors (this file)                                    │
//! │  ├── CoreError        - Cart rule violations                           │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  storefront-cart errors (separate crate)                               │
//! │  ├── StorageError     - Key-value store failures (never surfaced       │
//! │  │                      by cart operations, only logged)               │
//! │  └── ConfigError      - Configuration loading failures                 │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → caller of add_item                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Only `add_item` can return an error to its caller. Everything else in the
//! cart absorbs failures internally.

use thiserror::Error;

use crate::types::VariantId;

// =============================================================================
// Core Error
// =============================================================================

/// Cart rule violations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The variant's regular price could not be read as a decimal amount.
    ///
    /// ## When This Occurs
    /// - Catalog returned `price: ""` or a non-numeric string
    /// - Price is negative
    ///
    /// A broken promotional price does NOT raise this; the cart falls back
    /// to the regular price instead.
    #[error("Variant {variant_id} has an invalid price: '{value}'")]
    InvalidPrice { variant_id: VariantId, value: String },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., non-numeric price).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
