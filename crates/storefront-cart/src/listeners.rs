//! # Change Listeners
//!
//! Subscribe/unsubscribe registry for cart change notifications.
//!
//! ## Notification Rules
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    notify(&cart)                                        │
//! │                                                                         │
//! │  1. Lock registry, clone the listener list, unlock                     │
//! │  2. Call each listener in registration order with the full cart        │
//! │                                                                         │
//! │  • subscribe/unsubscribe from inside a listener is allowed; it takes   │
//! │    effect from the next notification                                  │
//! │  • a panicking listener is logged; the others still run                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use tracing::error;

use storefront_core::Cart;

/// A registered change callback.
pub type Listener = Arc<dyn Fn(&Cart) + Send + Sync>;

#[derive(Default)]
struct Registry {
    next_id: u64,
    entries: Vec<(u64, Listener)>,
}

fn lock(registry: &Mutex<Registry>) -> MutexGuard<'_, Registry> {
    registry.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Ordered set of cart listeners.
#[derive(Clone, Default)]
pub struct Listeners {
    registry: Arc<Mutex<Registry>>,
}

impl Listeners {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a listener. Keep the returned handle to unsubscribe later.
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&Cart) + Send + Sync + 'static,
    {
        let mut registry = lock(&self.registry);
        let id = registry.next_id;
        registry.next_id += 1;
        registry.entries.push((id, Arc::new(listener)));

        Subscription {
            id,
            registry: Arc::downgrade(&self.registry),
        }
    }

    /// Calls every listener with `cart`, in registration order.
    pub fn notify(&self, cart: &Cart) {
        let snapshot: Vec<(u64, Listener)> = lock(&self.registry).entries.clone();

        for (id, listener) in snapshot {
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| listener(cart)));
            if outcome.is_err() {
                error!(listener_id = id, "Cart listener panicked");
            }
        }
    }

    /// Number of registered listeners.
    pub fn len(&self) -> usize {
        lock(&self.registry).entries.len()
    }

    /// True when nobody is listening.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Debug for Listeners {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listeners")
            .field("len", &self.len())
            .finish()
    }
}

/// Handle returned by [`Listeners::subscribe`].
///
/// Dropping the handle does NOT unsubscribe; call [`Subscription::unsubscribe`].
#[derive(Debug)]
#[must_use = "keep the Subscription to be able to unsubscribe"]
pub struct Subscription {
    id: u64,
    registry: Weak<Mutex<Registry>>,
}

impl Subscription {
    /// Removes this listener. Returns whether it was still registered.
    ///
    /// Idempotent, and safe to call from inside a listener.
    pub fn unsubscribe(&self) -> bool {
        let Some(registry) = self.registry.upgrade() else {
            return false;
        };
        let mut registry = lock(&registry);
        let before = registry.entries.len();
        registry.entries.retain(|(id, _)| *id != self.id);
        registry.entries.len() != before
    }

    /// Registry-unique id of this subscription.
    pub fn id(&self) -> u64 {
        self.id
    }
}
