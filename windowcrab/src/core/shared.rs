//! Thread-safe wrapper around [`FixedWindowLimiter`]

use super::limiter::{FixedWindowLimiter, RateLimitResult};
use super::store::{MemoryStore, Store};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::SystemTime;

/// A [`FixedWindowLimiter`] that can be cloned and shared between threads
///
/// Every operation takes the lock for its whole lookup, compare and
/// increment, so concurrent callers never admit more than `max_requests`
/// per window for a key.
///
/// # Example
///
/// ```
/// use windowcrab::SharedLimiter;
/// use std::time::SystemTime;
///
/// let limiter: SharedLimiter = SharedLimiter::default();
///
/// let worker = limiter.clone();
/// std::thread::spawn(move || {
///     worker.is_allowed("10.0.0.1", "login", 5, 60, SystemTime::now());
/// })
/// .join()
/// .unwrap();
///
/// assert_eq!(limiter.remaining_requests("10.0.0.1", "login", 5, SystemTime::now()), 4);
/// ```
pub struct SharedLimiter<S: Store = MemoryStore> {
    inner: Arc<Mutex<FixedWindowLimiter<S>>>,
}

impl<S: Store> Clone for SharedLimiter<S> {
    fn clone(&self) -> Self {
        SharedLimiter {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S: Store> SharedLimiter<S> {
    /// Wrap a store in a shared limiter
    pub fn new(store: S) -> Self {
        Self::from_limiter(FixedWindowLimiter::new(store))
    }

    /// Wrap an existing limiter
    pub fn from_limiter(limiter: FixedWindowLimiter<S>) -> Self {
        SharedLimiter {
            inner: Arc::new(Mutex::new(limiter)),
        }
    }

    /// Run `f` with exclusive access to the inner limiter
    ///
    /// Useful for several operations that must see the same state.
    pub fn with_limiter<R>(&self, f: impl FnOnce(&mut FixedWindowLimiter<S>) -> R) -> R {
        f(&mut self.lock())
    }

    // A panic while holding the lock leaves at worst one counter stale.
    fn lock(&self) -> MutexGuard<'_, FixedWindowLimiter<S>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// See [`FixedWindowLimiter::is_allowed`]
    pub fn is_allowed(
        &self,
        identifier: &str,
        action: &str,
        max_requests: u32,
        window_seconds: u64,
        now: SystemTime,
    ) -> bool {
        self.lock()
            .is_allowed(identifier, action, max_requests, window_seconds, now)
    }

    /// See [`FixedWindowLimiter::check`]
    pub fn check(
        &self,
        identifier: &str,
        action: &str,
        max_requests: u32,
        window_seconds: u64,
        now: SystemTime,
    ) -> (bool, RateLimitResult) {
        self.lock()
            .check(identifier, action, max_requests, window_seconds, now)
    }

    /// See [`FixedWindowLimiter::remaining_requests`]
    pub fn remaining_requests(
        &self,
        identifier: &str,
        action: &str,
        max_requests: u32,
        now: SystemTime,
    ) -> u32 {
        self.lock()
            .remaining_requests(identifier, action, max_requests, now)
    }

    /// See [`FixedWindowLimiter::reset`]
    pub fn reset(&self, identifier: &str, action: &str) -> bool {
        self.lock().reset(identifier, action)
    }

    /// See [`FixedWindowLimiter::reset_all`]
    pub fn reset_all(&self) {
        self.lock().reset_all()
    }

    /// See [`FixedWindowLimiter::sweep_expired`]
    pub fn sweep_expired(&self, now: SystemTime) -> usize {
        self.lock().sweep_expired(now)
    }

    /// Number of tracked keys
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether no keys are tracked
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

impl Default for SharedLimiter<MemoryStore> {
    fn default() -> Self {
        Self::new(MemoryStore::new())
    }
}
