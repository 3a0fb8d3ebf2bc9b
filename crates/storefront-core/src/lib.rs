//! # storefront-core: Pure Cart Logic
//!
//! This crate is the **heart** of the storefront cart. It contains the cart
//! aggregate, money handling and catalog types as pure code with zero I/O.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Storefront Cart Architecture                       │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │              Hosts (CLI, UI bridges, page scripts)              │   │
//! │  │    product page ──► add to cart ──► cart drawer ──► checkout    │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ subscribe / mutate                    │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               storefront-cart (CartEngine)                      │   │
//! │  │         load → mutate → persist → notify                        │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ storefront-core (THIS CRATE) ★                  │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │   cart    │  │ validation│  │   │
//! │  │   │  Product  │  │   Money   │  │   Cart    │  │   rules   │  │   │
//! │  │   │  Variant  │  │  parsing  │  │ CartLine  │  │  checks   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO STORAGE • NO NETWORK • PURE FUNCTIONS            │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`cart`] - The `Cart` aggregate and `CartLine`
//! - [`types`] - Catalog types (Product, ProductVariant, LocalizedText)
//! - [`money`] - Money type with integer arithmetic
//! - [`error`] - Domain error types
//! - [`validation`] - Quantity, price and storage key rules
//!
//! ## Example Usage
//!
//! ```rust
//! use storefront_core::{Cart, Money, ProductVariant};
//!
//! let mut cart = Cart::new();
//! let variant = ProductVariant::new(1, "100.00");
//!
//! cart.add_item(10, &variant, "Shirt", None, 2).unwrap();
//!
//! assert_eq!(cart.item_count(), 2);
//! assert_eq!(cart.total(), Money::from_cents(20000));
//! assert_eq!(cart.lines()[0].id, "10-1");
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod error;
pub mod money;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use cart::{Cart, CartLine, Normalization, QuantityChange};
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Key the cart snapshot is stored under unless configured otherwise.
///
/// Matches the key existing storefront pages already write to, so carts
/// saved before this crate was introduced are picked up.
pub const DEFAULT_STORAGE_KEY: &str = "tiendanube-cart";
