//! Transport layer for the rate limiting server
//!
//! Transports accept client requests, forward them to the rate limiter
//! actor and send responses back. All transports share the same limiter
//! state through the actor handle.
//!
//! # Available Transports
//!
//! - [`http`]: REST API with JSON

pub mod http;

#[cfg(test)]
mod http_test;

use crate::actor::RateLimiterHandle;
use anyhow::Result;
use async_trait::async_trait;

/// Common interface for all transport implementations
#[async_trait]
pub trait Transport {
    /// Start the transport server
    ///
    /// Binds to the configured address and serves requests using the
    /// provided rate limiter. Runs until an error occurs.
    async fn start(self, limiter: RateLimiterHandle) -> Result<()>;
}
