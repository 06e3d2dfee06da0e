//! Core components of the windowcrab rate limiting library
//!
//! This module contains the fundamental building blocks:
//! - [`limiter`]: The fixed-window rate limiter
//! - [`quota`]: Validated request quotas
//! - [`shared`]: Mutex-guarded limiter for multi-threaded hosts
//! - [`store`]: Storage backends for rate limit state

pub mod limiter;
pub mod quota;
pub mod shared;
pub mod store;

pub use limiter::{FixedWindowLimiter, RateLimitResult, limit_key};
pub use quota::Quota;
pub use shared::SharedLimiter;
pub use store::{MemoryStore, MemoryStoreBuilder, RateLimitEntry, Store};

use std::error::Error;
use std::fmt;

/// Errors raised when building a [`Quota`]
///
/// The limiter itself never fails; these only surface when configuration
/// is validated explicitly.
///
/// # Example
///
/// ```
/// use windowcrab::{Quota, QuotaError};
///
/// match Quota::new(0, 60) {
///     Err(QuotaError::ZeroRequests) => println!("quota must admit at least one request"),
///     _ => {}
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuotaError {
    /// `max_requests` was 0, which would deny every request
    ZeroRequests,
    /// `window_seconds` was 0, which would never count past one request
    ZeroWindow,
    /// A quota string could not be parsed
    Parse(String),
}

impl fmt::Display for QuotaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuotaError::ZeroRequests => write!(f, "max_requests must be at least 1"),
            QuotaError::ZeroWindow => write!(f, "window_seconds must be at least 1"),
            QuotaError::Parse(input) => {
                write!(f, "invalid quota '{input}', expected <max>/<seconds>")
            }
        }
    }
}

impl Error for QuotaError {}
