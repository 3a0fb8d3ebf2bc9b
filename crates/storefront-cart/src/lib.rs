//! # storefront-cart: Cart Engine
//!
//! Owns the shopping cart of a browsing session: restores it from local
//! storage, applies mutations through [`storefront_core::Cart`], saves the
//! result and tells every subscriber about it.
//!
//! ## Data Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Cart Data Flow                                   │
//! │                                                                         │
//! │  ┌───────────────┐   add_item / update_quantity / remove_item / clear │
//! │  │  Host (CLI,   │ ───────────────────────────────┐                    │
//! │  │  UI bridge)   │                                │                    │
//! │  └───────▲───────┘                                ▼                    │
//! │          │                              ┌───────────────────┐          │
//! │          │ listener(&Cart)              │    CartEngine     │          │
//! │          │                              │  Cart (in memory) │          │
//! │  ┌───────┴───────┐      notify          │  authoritative    │          │
//! │  │   Listeners   │ ◄─────────────────── └─────────┬─────────┘          │
//! │  └───────────────┘                                │ save (best effort) │
//! │                                                   ▼                    │
//! │                                      ┌────────────────────────┐       │
//! │                                      │  dyn KeyValueStore     │       │
//! │                                      │  FileStore/MemoryStore │       │
//! │                                      └────────────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`engine`] - `CartEngine`, the load → mutate → persist → notify loop
//! - [`listeners`] - Subscribe/unsubscribe registry
//! - [`storage`] - `KeyValueStore` trait with file and memory backends
//! - [`config`] - TOML/env configuration and currency formatting
//! - [`shared`] - `SharedCart`, a cloneable locked handle for hosts
//! - [`error`] - Storage and configuration errors
//!
//! ## Example Usage
//!
//! ```rust
//! use storefront_cart::{CartEngine, MemoryStore};
//! use storefront_core::ProductVariant;
//!
//! let mut engine = CartEngine::with_default_key(MemoryStore::new());
//! let _sub = engine.subscribe(|cart| println!("{} items", cart.item_count()));
//!
//! let variant = ProductVariant::new(1, "100.00");
//! engine.add_item(10, &variant, "Shirt", None, 2).unwrap();
//!
//! assert_eq!(engine.item_quantity(1), 2);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod config;
pub mod engine;
pub mod error;
pub mod listeners;
pub mod shared;
pub mod storage;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use config::{CartConfig, DisplaySettings, StorageBackend, StorageSettings};
pub use engine::CartEngine;
pub use error::{ConfigError, ConfigResult, StorageError, StorageResult};
pub use listeners::{Listener, Listeners, Subscription};
pub use shared::SharedCart;
pub use storage::{FileStore, KeyValueStore, MemoryStore};
