//! Fixed-window rate limiter implementation
//!
//! This module provides the main [`FixedWindowLimiter`] struct. Each
//! `action:identifier` key gets a counter and a window end. The first
//! request at or after the window end starts a new window with a count of 1.

use super::Quota;
use super::store::{MemoryStore, RateLimitEntry, Store};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Result of a rate limit check
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitResult {
    /// The maximum number of requests admitted per window
    pub limit: u32,
    /// The number of requests remaining in the current window
    pub remaining: u32,
    /// Time until the current window ends
    pub reset_after: Duration,
    /// Time to wait before the next request will be admitted (0 if admitted)
    pub retry_after: Duration,
}

/// Build the store key for an action and identifier
///
/// Distinct actions never share quota for the same identifier.
///
/// ```
/// assert_eq!(windowcrab::limit_key("1.2.3.4", "create-idea"), "create-idea:1.2.3.4");
/// ```
pub fn limit_key(identifier: &str, action: &str) -> String {
    let mut key = String::with_capacity(action.len() + 1 + identifier.len());
    key.push_str(action);
    key.push(':');
    key.push_str(identifier);
    key
}

// Times before the epoch count as the epoch itself.
fn epoch_millis(now: SystemTime) -> u64 {
    now.duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// Fixed-window rate limiter
///
/// Admits up to `max_requests` per key within a window of `window_seconds`
/// that starts at the first request. Because windows are fixed, a burst at
/// the end of one window followed by a burst at the start of the next can
/// admit up to `2 × max_requests` in a short interval.
///
/// State is process-local. If the host runs several instances, each one
/// enforces its quota independently and the effective global quota is
/// `max_requests × instances`.
///
/// All operations take `&mut self`. To share one limiter between threads use
/// [`SharedLimiter`](crate::SharedLimiter).
///
/// # Example
///
/// ```
/// use windowcrab::{FixedWindowLimiter, MemoryStore};
/// use std::time::SystemTime;
///
/// let mut limiter = FixedWindowLimiter::new(MemoryStore::new());
///
/// // 3 ideas per minute per IP
/// let now = SystemTime::now();
/// for _ in 0..3 {
///     assert!(limiter.is_allowed("1.2.3.4", "create-idea", 3, 60, now));
/// }
/// assert!(!limiter.is_allowed("1.2.3.4", "create-idea", 3, 60, now));
/// assert_eq!(limiter.remaining_requests("1.2.3.4", "create-idea", 3, now), 0);
/// ```
pub struct FixedWindowLimiter<S: Store = MemoryStore> {
    store: S,
}

impl<S: Store> FixedWindowLimiter<S> {
    /// Create a new rate limiter with the specified store
    pub fn new(store: S) -> Self {
        FixedWindowLimiter { store }
    }

    /// Check whether a request may proceed, counting it if so
    ///
    /// Never fails. A `max_requests` of 0 denies every call; a
    /// `window_seconds` of 0 admits every call since each one starts a new
    /// window.
    pub fn is_allowed(
        &mut self,
        identifier: &str,
        action: &str,
        max_requests: u32,
        window_seconds: u64,
        now: SystemTime,
    ) -> bool {
        self.check(identifier, action, max_requests, window_seconds, now)
            .0
    }

    /// Check whether a request may proceed and report the window state
    ///
    /// # Returns
    ///
    /// Returns a tuple of:
    /// - `bool`: Whether the request is admitted
    /// - [`RateLimitResult`]: Window state after this request
    ///
    /// A `max_requests` of zero denies every request. No retry can succeed,
    /// so `retry_after` and `reset_after` are both zero.
    ///
    /// # Example
    ///
    /// ```
    /// use windowcrab::FixedWindowLimiter;
    /// use std::time::SystemTime;
    ///
    /// let mut limiter: FixedWindowLimiter = FixedWindowLimiter::default();
    ///
    /// match limiter.check("user:42", "password-reset", 3, 3600, SystemTime::now()) {
    ///     (true, result) => println!("Admitted, {} remaining", result.remaining),
    ///     (false, result) => println!("Retry after {}s", result.retry_after.as_secs()),
    /// }
    /// ```
    pub fn check(
        &mut self,
        identifier: &str,
        action: &str,
        max_requests: u32,
        window_seconds: u64,
        now: SystemTime,
    ) -> (bool, RateLimitResult) {
        if max_requests == 0 {
            return (
                false,
                RateLimitResult {
                    limit: 0,
                    remaining: 0,
                    reset_after: Duration::ZERO,
                    retry_after: Duration::ZERO,
                },
            );
        }

        let key = limit_key(identifier, action);
        let now_ms = epoch_millis(now);

        if let Some(entry) = self.store.get_mut(&key) {
            if !entry.is_expired(now_ms) {
                let reset_after = Duration::from_millis(entry.reset_at - now_ms);

                if entry.count < max_requests {
                    entry.count += 1;
                    return (
                        true,
                        RateLimitResult {
                            limit: max_requests,
                            remaining: max_requests - entry.count,
                            reset_after,
                            retry_after: Duration::ZERO,
                        },
                    );
                }

                return (
                    false,
                    RateLimitResult {
                        limit: max_requests,
                        remaining: 0,
                        reset_after,
                        retry_after: reset_after,
                    },
                );
            }
        }

        let entry = RateLimitEntry::start(now_ms, window_seconds);
        self.store.insert(&key, entry);

        (
            true,
            RateLimitResult {
                limit: max_requests,
                remaining: max_requests - 1,
                reset_after: Duration::from_millis(entry.reset_at - now_ms),
                retry_after: Duration::ZERO,
            },
        )
    }

    /// [`check`](Self::check) with a validated [`Quota`]
    pub fn check_quota(
        &mut self,
        identifier: &str,
        action: &str,
        quota: &Quota,
        now: SystemTime,
    ) -> (bool, RateLimitResult) {
        self.check(
            identifier,
            action,
            quota.max_requests(),
            quota.window_seconds(),
            now,
        )
    }

    /// Requests left in the current window without counting one
    ///
    /// Returns `max_requests` when the key has no live window.
    pub fn remaining_requests(
        &self,
        identifier: &str,
        action: &str,
        max_requests: u32,
        now: SystemTime,
    ) -> u32 {
        let now_ms = epoch_millis(now);
        match self.store.get(&limit_key(identifier, action)) {
            Some(entry) if !entry.is_expired(now_ms) => max_requests.saturating_sub(entry.count),
            _ => max_requests,
        }
    }

    /// Forget the window for one key, returning whether it existed
    pub fn reset(&mut self, identifier: &str, action: &str) -> bool {
        self.store.remove(&limit_key(identifier, action)).is_some()
    }

    /// Forget every window
    pub fn reset_all(&mut self) {
        self.store.clear();
    }

    /// Remove entries whose window ended at or before `now`
    ///
    /// The limiter never schedules this itself; hosts call it periodically
    /// to bound memory. Returns the number of removed entries.
    pub fn sweep_expired(&mut self, now: SystemTime) -> usize {
        let now_ms = epoch_millis(now);
        self.store.retain(|_, entry| !entry.is_expired(now_ms))
    }

    /// Current entry for a key, if any
    pub fn entry(&self, identifier: &str, action: &str) -> Option<RateLimitEntry> {
        self.store.get(&limit_key(identifier, action))
    }

    /// Number of tracked keys, expired or not
    pub fn len(&self) -> usize {
        self.store.len()
    }

    /// Whether no keys are tracked
    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }
}

impl Default for FixedWindowLimiter<MemoryStore> {
    fn default() -> Self {
        Self::new(MemoryStore::new())
    }
}
