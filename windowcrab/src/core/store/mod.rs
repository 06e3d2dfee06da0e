//! Storage backends for fixed-window state
//!
//! The limiter keeps one [`RateLimitEntry`] per `action:identifier` key.
//! Stores only hold entries; all window arithmetic lives in the limiter.


mod memory;

pub use memory::{MemoryStore, MemoryStoreBuilder};

/// Counter state for a single key
///
/// `count` is the number of admitted requests in the current window and
/// `reset_at` is the window end in epoch milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitEntry {
    /// Admitted requests observed in the current window
    pub count: u32,
    /// Epoch milliseconds at which the window ends
    pub reset_at: u64,
}

impl RateLimitEntry {
    /// Start a new window at `now_ms` with one admitted request
    pub fn start(now_ms: u64, window_seconds: u64) -> Self {
        RateLimitEntry {
            count: 1,
            reset_at: now_ms.saturating_add(window_seconds.saturating_mul(1000)),
        }
    }

    /// Whether the window has ended at `now_ms`
    pub fn is_expired(&self, now_ms: u64) -> bool {
        now_ms >= self.reset_at
    }
}

/// Store trait for rate limiter state storage
pub trait Store {
    /// Get a copy of the entry for `key`
    fn get(&self, key: &str) -> Option<RateLimitEntry>;

    /// Get the entry for `key` for in-place mutation
    fn get_mut(&mut self, key: &str) -> Option<&mut RateLimitEntry>;

    /// Insert or replace the entry for `key`
    fn insert(&mut self, key: &str, entry: RateLimitEntry);

    /// Remove the entry for `key`, returning it if present
    fn remove(&mut self, key: &str) -> Option<RateLimitEntry>;

    /// Remove every entry
    fn clear(&mut self);

    /// Keep only entries for which `keep` returns true, returning how many were removed
    fn retain<F>(&mut self, keep: F) -> usize
    where
        F: FnMut(&str, &RateLimitEntry) -> bool;

    /// Number of tracked keys
    fn len(&self) -> usize;

    /// Whether no keys are tracked
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
