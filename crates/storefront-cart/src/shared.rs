//! # Shared Cart Handle
//!
//! Hosts that need the engine from several places (UI bridges, request
//! handlers, background tasks) build one [`CartEngine`] at startup and hand
//! out clones of a [`SharedCart`]. There is no global instance.
//!
//! ## Locking Rule
//! ```text
//! with_engine_mut(f)
//!   lock ──► f(&mut engine) ──► revision changed? copy cart ──► unlock
//!                                                                 │
//!                     newest revision seen so far? ──► notify ◄───┘
//! ```
//! Listeners registered with [`SharedCart::subscribe`] run after the lock is
//! released, so they may call back into the handle. A closure that commits
//! several changes produces one notification with the final cart.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use storefront_core::Cart;

use crate::engine::CartEngine;
use crate::listeners::{Listeners, Subscription};

/// Cloneable, thread-safe handle to one [`CartEngine`].
///
/// ## Thread Safety
/// Uses `Arc<Mutex<CartEngine>>` because:
/// - `Arc`: Allows shared ownership across threads
/// - `Mutex`: Every engine operation mutates and persists as one step
///
/// ## Why Not RwLock?
/// Reads are a clone of a small struct and most calls mutate.
#[derive(Debug, Clone)]
pub struct SharedCart {
    engine: Arc<Mutex<CartEngine>>,
    listeners: Listeners,
    notified: Arc<AtomicU64>,
}

impl SharedCart {
    /// Wraps an engine.
    pub fn new(engine: CartEngine) -> Self {
        let notified = Arc::new(AtomicU64::new(engine.revision()));
        SharedCart {
            engine: Arc::new(Mutex::new(engine)),
            listeners: Listeners::new(),
            notified,
        }
    }

    /// Executes a function with read access to the engine.
    ///
    /// ## Usage
    /// ```rust,ignore
    /// let qty = shared.with_engine(|engine| engine.item_quantity(variant_id));
    /// ```
    pub fn with_engine<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&CartEngine) -> R,
    {
        let engine = self.lock();
        f(&engine)
    }

    /// Executes a function with write access to the engine.
    ///
    /// ## Usage
    /// ```rust,ignore
    /// shared.with_engine_mut(|engine| engine.add_item(10, &variant, "Shirt", None, 1).cloned())?;
    /// ```
    pub fn with_engine_mut<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut CartEngine) -> R,
    {
        let (result, changed) = {
            let mut engine = self.lock();
            let before = engine.revision();
            let result = f(&mut engine);
            let revision = engine.revision();
            let changed = (revision != before).then(|| (revision, engine.cart()));
            (result, changed)
        };

        if let Some((revision, cart)) = changed {
            // A racing caller may already have delivered a newer cart.
            if self.notified.fetch_max(revision, Ordering::SeqCst) < revision {
                self.listeners.notify(&cart);
            }
        }
        result
    }

    /// Copy of the current cart.
    pub fn snapshot(&self) -> Cart {
        self.with_engine(CartEngine::cart)
    }

    /// Registers a listener called with the cart after every
    /// [`with_engine_mut`](Self::with_engine_mut) that changed it.
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&Cart) + Send + Sync + 'static,
    {
        self.listeners.subscribe(listener)
    }

    // A panic inside a previous caller's closure leaves the cart itself
    // consistent (every Cart mutation recomputes before returning).
    fn lock(&self) -> MutexGuard<'_, CartEngine> {
        self.engine.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicI64;
    use std::thread;

    use storefront_core::{Money, ProductVariant};

    use crate::storage::MemoryStore;

    fn shared() -> SharedCart {
        SharedCart::new(CartEngine::new(MemoryStore::new(), "tiendanube-cart"))
    }

    #[test]
    fn test_clones_share_one_cart() {
        let cart = shared();
        let other = cart.clone();
        let variant = ProductVariant::new(1, "100.00");

        cart.with_engine_mut(|engine| engine.add_item(10, &variant, "Shirt", None, 2).map(|_| ()))
            .unwrap();

        assert_eq!(other.with_engine(|engine| engine.item_quantity(1)), 2);
        assert_eq!(other.snapshot().total(), Money::from_cents(20000));
    }

    #[test]
    fn test_concurrent_adds_are_serialized() {
        let cart = shared();
        let variant = ProductVariant::new(1, "1.00");

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let cart = cart.clone();
                let variant = variant.clone();
                thread::spawn(move || {
                    for _ in 0..25 {
                        cart.with_engine_mut(|engine| {
                            engine.add_item(10, &variant, "Pin", None, 1).map(|_| ())
                        })
                        .unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let snapshot = cart.snapshot();
        assert_eq!(snapshot.item_count(), 200);
        assert_eq!(snapshot.total(), Money::from_cents(20000));
        assert_eq!(snapshot.lines().len(), 1);
    }

    #[test]
    fn test_subscribe_through_handle() {
        let cart = shared();
        let last_count = Arc::new(AtomicI64::new(-1));
        let sink = Arc::clone(&last_count);
        let sub = cart.subscribe(move |cart| sink.store(cart.item_count(), Ordering::SeqCst));

        let variant = ProductVariant::new(5, "3.00");
        cart.with_engine_mut(|engine| engine.add_item(1, &variant, "Tag", None, 4).map(|_| ()))
            .unwrap();
        assert_eq!(last_count.load(Ordering::SeqCst), 4);

        assert!(sub.unsubscribe());
        cart.with_engine_mut(|engine| {
            engine.clear();
        });
        assert_eq!(last_count.load(Ordering::SeqCst), 4);
    }

    #[test]
    fn test_listener_may_read_through_the_handle() {
        let cart = shared();
        let handle = cart.clone();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let _sub = cart.subscribe(move |notified| {
            let current = handle.snapshot();
            sink.lock().unwrap().push((notified.item_count(), current.item_count()));
        });

        let variant = ProductVariant::new(1, "10.00");
        cart.with_engine_mut(|engine| engine.add_item(10, &variant, "Pin", None, 2).map(|_| ()))
            .unwrap();
        cart.with_engine_mut(|engine| {
            engine.update_quantity(1, 5);
        });

        assert_eq!(*seen.lock().unwrap(), vec![(2, 2), (5, 5)]);
    }

    #[test]
    fn test_one_notification_per_changing_call() {
        let cart = shared();
        let calls = Arc::new(AtomicI64::new(0));
        let counter = Arc::clone(&calls);
        let _sub = cart.subscribe(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        let variant = ProductVariant::new(1, "10.00");

        cart.with_engine_mut(|engine| {
            engine.add_item(10, &variant, "Pin", None, 1).unwrap();
            engine.add_item(10, &variant, "Pin", None, 1).unwrap();
        });
        cart.with_engine_mut(|engine| {
            engine.update_quantity(99, 3);
        });
        cart.with_engine(|engine| engine.item_quantity(1));

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(cart.snapshot().item_count(), 2);
    }

    #[test]
    fn test_poisoned_lock_is_recovered() {
        let cart = shared();
        let poisoner = cart.clone();

        let result = thread::spawn(move || {
            poisoner.with_engine(|_| panic!("host closure failed"));
        })
        .join();
        assert!(result.is_err());

        assert!(cart.snapshot().is_empty());
        assert_eq!(cart.with_engine(|engine| engine.listener_count()), 0);
    }
}
