//! In-process memoization of git queries

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Arc, Mutex};

use crate::error::{Error, Result};

/// Thread-safe memo table.
///
/// History discovery asks git for the same file's last-modified date many
/// times (once per comparison while sorting); this keeps each answer after
/// the first.
#[derive(Debug)]
pub struct QueryCache<K, V> {
    cache: Arc<Mutex<HashMap<K, V>>>,
}

impl<K, V> Clone for QueryCache<K, V> {
    fn clone(&self) -> Self {
        Self {
            cache: Arc::clone(&self.cache),
        }
    }
}

impl<K, V> Default for QueryCache<K, V> {
    fn default() -> Self {
        Self {
            cache: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}

impl<K, V> QueryCache<K, V>
where
    K: Eq + Hash,
    V: Clone,
{
    /// Create a new empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a cached value, or compute and cache it if not present.
    ///
    /// The lock is not held while `compute` runs, so two threads may both
    /// compute a missing key; the later insert wins and both see a valid value.
    pub fn get_or_compute<F>(&self, key: K, compute: F) -> Result<V>
    where
        F: FnOnce() -> Result<V>,
    {
        {
            let cache = self.lock()?;
            if let Some(cached) = cache.get(&key) {
                return Ok(cached.clone());
            }
        }

        let value = compute()?;
        self.lock()?.insert(key, value.clone());
        Ok(value)
    }

    /// Check if a key is cached
    pub fn contains(&self, key: &K) -> Result<bool> {
        Ok(self.lock()?.contains_key(key))
    }

    /// Number of cached entries
    pub fn len(&self) -> Result<usize> {
        Ok(self.lock()?.len())
    }

    /// Whether nothing is cached yet
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.lock()?.is_empty())
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<K, V>>> {
        self.cache.lock().map_err(|_| Error::LockPoisoned {
            context: "query cache".to_string(),
        })
    }
}
