//! # Cart Engine
//!
//! Single source of truth for the shopping cart during a browsing session.
//!
//! ## Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Engine Lifecycle                                │
//! │                                                                         │
//! │  new(store, key)                                                       │
//! │     │  store.get(key)                                                  │
//! │     ├── None ─────────────────► empty cart                             │
//! │     ├── Err  ─── warn! ───────► empty cart                             │
//! │     ├── bad JSON ─ error! ────► empty cart                             │
//! │     └── snapshot ─ normalize ─► restored cart                          │
//! │                                                                         │
//! │  add_item / update_quantity / remove_item / clear                      │
//! │     │                                                                   │
//! │     ▼                                                                   │
//! │  mutate Cart (totals recomputed) ──► store.set(key, json) ──► notify   │
//! │                                      (failure: warn!, carry on)        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Re-entrancy
//! Mutations take `&mut self`, so a listener cannot call back into the
//! engine that is notifying it. [`SharedCart`](crate::SharedCart) runs its
//! own listeners after releasing the engine lock; listeners registered here
//! directly still run under that lock.

use std::fmt;

use tracing::{debug, error, info, warn};

use storefront_core::{
    Cart, CoreResult, ProductId, ProductVariant, QuantityChange, VariantId, DEFAULT_STORAGE_KEY,
};

use crate::listeners::{Listeners, Subscription};
use crate::storage::KeyValueStore;

/// Owns one cart, persists it after every change and notifies listeners.
pub struct CartEngine {
    cart: Cart,
    storage_key: String,
    store: Box<dyn KeyValueStore>,
    listeners: Listeners,
    revision: u64,
}

impl CartEngine {
    /// Creates an engine, restoring whatever `store` holds under `storage_key`.
    ///
    /// Never fails: a missing, unreadable or corrupt snapshot yields an
    /// empty cart (logged).
    pub fn new<S>(store: S, storage_key: impl Into<String>) -> Self
    where
        S: KeyValueStore + 'static,
    {
        let storage_key = storage_key.into();
        let store: Box<dyn KeyValueStore> = Box::new(store);
        let cart = restore(store.as_ref(), &storage_key);

        info!(
            key = %storage_key,
            lines = cart.distinct_lines(),
            item_count = cart.item_count(),
            "Cart engine initialized"
        );

        CartEngine {
            cart,
            storage_key,
            store,
            listeners: Listeners::new(),
            revision: 0,
        }
    }

    /// Creates an engine using [`DEFAULT_STORAGE_KEY`].
    pub fn with_default_key<S>(store: S) -> Self
    where
        S: KeyValueStore + 'static,
    {
        Self::new(store, DEFAULT_STORAGE_KEY)
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Adds `quantity` units of a variant.
    ///
    /// ## Behavior
    /// - Variant already in cart: quantity increases; name, image and prices
    ///   of the existing line are kept
    /// - Otherwise: new line `"{product_id}-{variant_id}"` priced at the
    ///   promotional price if usable, else the regular price
    ///
    /// ## Errors
    /// Rejected requests (quantity <= 0, unusable regular price) leave the
    /// cart untouched: nothing is persisted and nobody is notified.
    pub fn add_item(
        &mut self,
        product_id: ProductId,
        variant: &ProductVariant,
        name: impl Into<String>,
        image: Option<String>,
        quantity: i64,
    ) -> CoreResult<&Cart> {
        debug!(product_id, variant_id = variant.id, quantity, "add_item");

        if let Err(err) = self
            .cart
            .add_item(product_id, variant, name, image, quantity)
        {
            warn!(product_id, variant_id = variant.id, %err, "add_item rejected");
            return Err(err);
        }

        Ok(self.commit())
    }

    /// Sets a line's quantity (absolute).
    ///
    /// ## Behavior
    /// - quantity <= 0: same as [`remove_item`](Self::remove_item)
    /// - Variant not in cart: no-op, no persist, no notification
    pub fn update_quantity(&mut self, variant_id: VariantId, quantity: i64) -> &Cart {
        debug!(variant_id, quantity, "update_quantity");

        if quantity <= 0 {
            return self.remove_item(variant_id);
        }

        match self.cart.update_quantity(variant_id, quantity) {
            QuantityChange::Updated => self.commit(),
            QuantityChange::Removed | QuantityChange::NotInCart => {
                debug!(variant_id, "Variant not in cart, nothing to update");
                &self.cart
            }
        }
    }

    /// Removes a variant's line.
    ///
    /// Always persists and notifies, even when the variant was not in the
    /// cart; the totals are unchanged in that case.
    pub fn remove_item(&mut self, variant_id: VariantId) -> &Cart {
        let removed = self.cart.remove_item(variant_id);
        debug!(variant_id, removed, "remove_item");
        self.commit()
    }

    /// Empties the cart.
    pub fn clear(&mut self) -> &Cart {
        debug!("clear");
        self.cart.clear();
        self.commit()
    }

    /// Re-reads the persisted snapshot, replacing the in-memory cart.
    ///
    /// Same recovery rules as [`new`](Self::new). Listeners are notified
    /// with the reloaded cart; nothing is written back.
    pub fn reload(&mut self) -> &Cart {
        self.cart = restore(self.store.as_ref(), &self.storage_key);
        debug!(lines = self.cart.distinct_lines(), "Cart reloaded");
        self.revision += 1;
        self.listeners.notify(&self.cart);
        &self.cart
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Returns a copy of the current cart.
    pub fn cart(&self) -> Cart {
        self.cart.clone()
    }

    /// Quantity of a variant, 0 when absent.
    pub fn item_quantity(&self, variant_id: VariantId) -> i64 {
        self.cart.quantity_of(variant_id)
    }

    /// Whether a variant is in the cart.
    pub fn has_item(&self, variant_id: VariantId) -> bool {
        self.cart.contains(variant_id)
    }

    /// Key the cart is persisted under.
    pub fn storage_key(&self) -> &str {
        &self.storage_key
    }

    /// Number of changes listeners have been told about so far.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    // =========================================================================
    // Listeners
    // =========================================================================

    /// Registers a callback invoked with the full cart after every mutation.
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&Cart) + Send + Sync + 'static,
    {
        self.listeners.subscribe(listener)
    }

    /// Number of live subscriptions.
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn commit(&mut self) -> &Cart {
        self.persist();
        self.revision += 1;
        self.listeners.notify(&self.cart);
        &self.cart
    }

    /// One best-effort save; failures are logged and otherwise ignored.
    fn persist(&self) {
        let json = match serde_json::to_string(&self.cart) {
            Ok(json) => json,
            Err(err) => {
                warn!(key = %self.storage_key, %err, "Failed to serialize cart, save skipped");
                return;
            }
        };

        if let Err(err) = self.store.set(&self.storage_key, &json) {
            warn!(key = %self.storage_key, %err, "Failed to save cart, save skipped");
        }
    }
}

impl fmt::Debug for CartEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CartEngine")
            .field("storage_key", &self.storage_key)
            .field("cart", &self.cart)
            .field("revision", &self.revision)
            .field("listeners", &self.listeners)
            .finish_non_exhaustive()
    }
}

/// Reads and repairs the persisted cart, falling back to an empty one.
fn restore(store: &dyn KeyValueStore, key: &str) -> Cart {
    let raw = match store.get(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => {
            debug!(key, "No persisted cart");
            return Cart::new();
        }
        Err(err) => {
            warn!(key, %err, "Failed to load cart, starting empty");
            return Cart::new();
        }
    };

    let mut cart = match serde_json::from_str::<Cart>(&raw) {
        Ok(cart) => cart,
        Err(err) => {
            error!(key, %err, "Persisted cart is corrupt, starting empty");
            return Cart::new();
        }
    };

    let report = cart.normalize();
    if !report.is_clean() {
        warn!(
            key,
            dropped = report.dropped_lines,
            merged = report.merged_lines,
            relabeled = report.relabeled_lines,
            "Repaired persisted cart"
        );
    }
    cart
}

// =============================================================================
// Unit Tests
// =============================================================================
