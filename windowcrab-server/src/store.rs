//! Store factory for creating rate limiter instances
//!
//! The server keeps all windows in one [`MemoryStore`] owned by the actor.
//! State is per process: running several server instances gives each its
//! own quota.

use crate::actor::{RateLimiterActor, RateLimiterHandle};
use crate::config::StoreConfig;
use windowcrab::MemoryStore;

/// Create a rate limiter actor with the configured store
///
/// # Parameters
///
/// - `config`: Store configuration
/// - `buffer_size`: Channel buffer size for actor communication
///
/// # Example
///
/// ```ignore
/// let config = StoreConfig {
///     capacity: 100_000,
///     sweep_interval: 60,
/// };
/// let limiter = create_rate_limiter(&config, 10_000);
/// ```
pub fn create_rate_limiter(config: &StoreConfig, buffer_size: usize) -> RateLimiterHandle {
    let store = MemoryStore::builder().capacity(config.capacity).build();
    RateLimiterActor::spawn(buffer_size, store)
}
