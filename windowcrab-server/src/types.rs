//! Common types used across the server
//!
//! These are the request and response shapes shared between the HTTP
//! transport and the actor. The transport resolves quotas and timestamps
//! before building a [`CheckRequest`], so the actor never sees partial
//! input.

use serde::{Deserialize, Serialize};
use std::time::SystemTime;
use windowcrab::{Quota, RateLimitResult};

/// User-facing message for denied requests
pub const RATE_LIMITED_MESSAGE: &str = "Too many requests, please wait before trying again";

/// Internal rate limit check
///
/// # Fields
///
/// - `identifier`: Who is acting (e.g. "203.0.113.7", "user:42")
/// - `action`: What is being done (e.g. "create-idea")
/// - `quota`: Validated requests-per-window limit
/// - `timestamp`: Request time used for window arithmetic
#[derive(Debug, Clone)]
pub struct CheckRequest {
    /// Who is acting
    pub identifier: String,
    /// What is being done
    pub action: String,
    /// Requests admitted per window
    pub quota: Quota,
    /// Request timestamp
    pub timestamp: SystemTime,
}

/// Rate limit check response
///
/// # Example
///
/// ```json
/// {
///   "allowed": true,
///   "limit": 3,
///   "remaining": 2,
///   "reset_after": 60,
///   "retry_after": 0
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckResponse {
    /// Whether the request is allowed
    pub allowed: bool,
    /// Requests admitted per window
    pub limit: u32,
    /// Requests left in the current window
    pub remaining: u32,
    /// Seconds until the current window ends
    pub reset_after: u64,
    /// Seconds until the next request can be made (0 if allowed)
    pub retry_after: u64,
}

impl From<(bool, RateLimitResult)> for CheckResponse {
    fn from((allowed, result): (bool, RateLimitResult)) -> Self {
        CheckResponse {
            allowed,
            limit: result.limit,
            remaining: result.remaining,
            reset_after: ceil_secs(result.reset_after),
            retry_after: ceil_secs(result.retry_after),
        }
    }
}

// Round up so a client waiting `retry_after` seconds never arrives early.
fn ceil_secs(duration: std::time::Duration) -> u64 {
    let secs = duration.as_secs();
    if duration.subsec_nanos() > 0 {
        secs + 1
    } else {
        secs
    }
}

/// Body returned with `429 Too Many Requests`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitRejection {
    /// User-facing message
    pub error: String,
    /// Seconds until the next request can be made
    pub retry_after: u64,
}

impl RateLimitRejection {
    /// Build a rejection from a denied check
    pub fn from_response(response: &CheckResponse) -> Self {
        RateLimitRejection {
            error: RATE_LIMITED_MESSAGE.to_string(),
            retry_after: response.retry_after,
        }
    }
}

/// Snapshot of limiter state for metrics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LimiterStats {
    /// Number of tracked keys
    pub active_keys: usize,
}
