//! String-keyed, string-valued persistence used by the catalog.
//!
//! Production code uses the LMDB-backed [`crate::local_db_state::AppDbState`];
//! [`MemoryStore`] backs tests and throwaway instances.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use crate::errors::{StoreError, StoreResult};

pub trait StoreAdapter {
    /// Returns `None` when nothing was ever written under `key`.
    fn read(&self, key: &str) -> StoreResult<Option<String>>;
    /// Replaces the value under `key` wholesale.
    fn write(&self, key: &str, value: &str) -> StoreResult<()>;
    /// Removes `key`; returns whether it existed.
    fn remove(&self, key: &str) -> StoreResult<bool>;
    /// Removes every key; returns how many were removed.
    fn clear(&self) -> StoreResult<usize>;
}

impl<S: StoreAdapter + ?Sized> StoreAdapter for &S {
    fn read(&self, key: &str) -> StoreResult<Option<String>> {
        (**self).read(key)
    }

    fn write(&self, key: &str, value: &str) -> StoreResult<()> {
        (**self).write(key, value)
    }

    fn remove(&self, key: &str) -> StoreResult<bool> {
        (**self).remove(key)
    }

    fn clear(&self) -> StoreResult<usize> {
        (**self).clear()
    }
}

impl<S: StoreAdapter + ?Sized> StoreAdapter for std::sync::Arc<S> {
    fn read(&self, key: &str) -> StoreResult<Option<String>> {
        (**self).read(key)
    }

    fn write(&self, key: &str, value: &str) -> StoreResult<()> {
        (**self).write(key, value)
    }

    fn remove(&self, key: &str) -> StoreResult<bool> {
        (**self).remove(key)
    }

    fn clear(&self) -> StoreResult<usize> {
        (**self).clear()
    }
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn values(&self) -> StoreResult<MutexGuard<'_, HashMap<String, String>>> {
        self.values.lock().map_err(|_| StoreError::Closed)
    }
}

impl StoreAdapter for MemoryStore {
    fn read(&self, key: &str) -> StoreResult<Option<String>> {
        Ok(self.values()?.get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> StoreResult<()> {
        self.values()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> StoreResult<bool> {
        Ok(self.values()?.remove(key).is_some())
    }

    fn clear(&self) -> StoreResult<usize> {
        let mut values = self.values()?;
        let count = values.len();
        values.clear();
        Ok(count)
    }
}
