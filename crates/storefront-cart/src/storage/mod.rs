//! # Key-Value Storage
//!
//! The only stateful boundary of the cart: a local, non-transactional
//! string store, modeled on browser local storage.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Storage Backends                                   │
//! │                                                                         │
//! │   CartEngine ──► dyn KeyValueStore ──┬──► FileStore   <dir>/<key>.json  │
//! │                                      └──► MemoryStore HashMap           │
//! │                                                                         │
//! │   get(key)  → Option<String>   missing key is Ok(None), not an error   │
//! │   set(key)  → overwrite        last writer wins                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod file;
mod memory;

use std::sync::Arc;

pub use file::FileStore;
pub use memory::MemoryStore;

use crate::error::StorageResult;

/// A local string key-value store.
///
/// Implementations use interior mutability so one store can back several
/// engines (e.g. a fresh engine re-reading what a previous one saved).
pub trait KeyValueStore: Send + Sync {
    /// Reads a value; `Ok(None)` when the key was never written.
    fn get(&self, key: &str) -> StorageResult<Option<String>>;

    /// Writes a value, replacing any previous one.
    fn set(&self, key: &str, value: &str) -> StorageResult<()>;
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for Arc<T> {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        (**self).set(key, value)
    }
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for Box<T> {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        (**self).set(key, value)
    }
}
