//! Quota definitions for fixed-window limiting
//!
//! A [`Quota`] is the validated pair of "how many requests" and "per how
//! many seconds". The raw limiter methods accept unvalidated numbers and
//! degrade quietly; a `Quota` rejects malformed configuration up front.

use super::QuotaError;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Maximum requests admitted per fixed window
///
/// # Examples
///
/// ```
/// use windowcrab::Quota;
/// use std::time::Duration;
///
/// // 3 requests per minute
/// let quota = Quota::per_minute(3).unwrap();
/// assert_eq!(quota.window(), Duration::from_secs(60));
///
/// // Parsed from configuration
/// let quota: Quota = "5/3600".parse().unwrap();
/// assert_eq!(quota.max_requests(), 5);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quota {
    max_requests: u32,
    window_seconds: u64,
}

impl Quota {
    /// Creates a quota of `max_requests` per `window_seconds`
    ///
    /// # Errors
    ///
    /// - [`QuotaError::ZeroRequests`] if `max_requests` is 0
    /// - [`QuotaError::ZeroWindow`] if `window_seconds` is 0
    pub fn new(max_requests: u32, window_seconds: u64) -> Result<Self, QuotaError> {
        if max_requests == 0 {
            return Err(QuotaError::ZeroRequests);
        }
        if window_seconds == 0 {
            return Err(QuotaError::ZeroWindow);
        }
        Ok(Quota {
            max_requests,
            window_seconds,
        })
    }

    /// Creates a quota of n requests per minute
    pub fn per_minute(n: u32) -> Result<Self, QuotaError> {
        Self::new(n, 60)
    }

    /// Creates a quota of n requests per hour
    pub fn per_hour(n: u32) -> Result<Self, QuotaError> {
        Self::new(n, 3600)
    }

    /// Maximum admitted requests per window
    pub fn max_requests(&self) -> u32 {
        self.max_requests
    }

    /// Window length in seconds
    pub fn window_seconds(&self) -> u64 {
        self.window_seconds
    }

    /// Window length as a [`Duration`]
    pub fn window(&self) -> Duration {
        Duration::from_secs(self.window_seconds)
    }
}

impl fmt::Display for Quota {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}s", self.max_requests, self.window_seconds)
    }
}

impl FromStr for Quota {
    type Err = QuotaError;

    /// Parses `"<max>/<secs>"`, with an optional trailing `s` on the window
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parse_error = || QuotaError::Parse(s.to_string());

        let (max, window) = s.trim().split_once('/').ok_or_else(parse_error)?;
        let window = window.trim();
        let window = window.strip_suffix('s').unwrap_or(window);

        let max_requests = max.trim().parse::<u32>().map_err(|_| parse_error())?;
        let window_seconds = window.parse::<u64>().map_err(|_| parse_error())?;

        Self::new(max_requests, window_seconds)
    }
}
