use super::{RateLimitEntry, Store};

#[cfg(feature = "ahash")]
use ahash::AHashMap as HashMap;
#[cfg(not(feature = "ahash"))]
use std::collections::HashMap;

// Configuration constants
const DEFAULT_CAPACITY: usize = 1000;
const CAPACITY_OVERHEAD_FACTOR: f64 = 1.3;

/// In-memory hash map store
///
/// Entries live until they are reset or swept. The store never evicts on
/// its own, so long-running hosts should call
/// [`FixedWindowLimiter::sweep_expired`](crate::FixedWindowLimiter::sweep_expired)
/// periodically to bound memory.
///
/// # Example
///
/// ```
/// use windowcrab::{FixedWindowLimiter, MemoryStore};
///
/// let store = MemoryStore::builder().capacity(10_000).build();
/// let mut limiter = FixedWindowLimiter::new(store);
/// ```
pub struct MemoryStore {
    data: HashMap<String, RateLimitEntry>,
}

/// Builder for configuring a MemoryStore
///
/// # Example
///
/// ```
/// use windowcrab::MemoryStore;
///
/// let store = MemoryStore::builder().capacity(100_000).build();
/// ```
pub struct MemoryStoreBuilder {
    capacity: usize,
}

impl MemoryStore {
    /// Create a new MemoryStore with the default capacity of 1000 entries
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Create a new MemoryStore with specified capacity
    ///
    /// The store will allocate 30% more space to reduce rehashing.
    pub fn with_capacity(capacity: usize) -> Self {
        MemoryStore {
            data: HashMap::with_capacity((capacity as f64 * CAPACITY_OVERHEAD_FACTOR) as usize),
        }
    }

    /// Create a new builder for configuring a MemoryStore
    pub fn builder() -> MemoryStoreBuilder {
        MemoryStoreBuilder::default()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl Store for MemoryStore {
    fn get(&self, key: &str) -> Option<RateLimitEntry> {
        self.data.get(key).copied()
    }

    fn get_mut(&mut self, key: &str) -> Option<&mut RateLimitEntry> {
        self.data.get_mut(key)
    }

    fn insert(&mut self, key: &str, entry: RateLimitEntry) {
        self.data.insert(key.to_string(), entry);
    }

    fn remove(&mut self, key: &str) -> Option<RateLimitEntry> {
        self.data.remove(key)
    }

    fn clear(&mut self) {
        self.data.clear();
    }

    fn retain<F>(&mut self, mut keep: F) -> usize
    where
        F: FnMut(&str, &RateLimitEntry) -> bool,
    {
        let before_count = self.data.len();
        self.data.retain(|key, entry| keep(key, entry));
        before_count.saturating_sub(self.data.len())
    }

    fn len(&self) -> usize {
        self.data.len()
    }
}

impl Default for MemoryStoreBuilder {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
        }
    }
}

impl MemoryStoreBuilder {
    /// Create a new builder with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the expected capacity (number of unique keys)
    pub fn capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Build the MemoryStore with the configured settings
    pub fn build(self) -> MemoryStore {
        MemoryStore::with_capacity(self.capacity)
    }
}
