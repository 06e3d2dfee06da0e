//! # windowcrab
//!
//! A small fixed-window rate limiter library for Rust.
//!
//! ## Overview
//!
//! Every request is identified by an `action` (what is being done, e.g.
//! `"create-idea"`) and an `identifier` (who is doing it, e.g. an IP
//! address). Each `action:identifier` pair gets a counter and a window
//! end time:
//!
//! - The first request opens a window of `window_seconds` with a count of 1
//! - Later requests in the window are admitted while the count is below `max_requests`
//! - The first request at or after the window end opens a fresh window
//!
//! This is a fixed window, not a sliding one: a burst at the end of one
//! window and another at the start of the next are both admitted.
//!
//! ## Quick Start
//!
//! ```
//! use windowcrab::{FixedWindowLimiter, MemoryStore};
//! use std::time::SystemTime;
//!
//! let mut limiter = FixedWindowLimiter::new(MemoryStore::new());
//!
//! // 3 ideas per minute per IP address
//! if limiter.is_allowed("203.0.113.7", "create-idea", 3, 60, SystemTime::now()) {
//!     println!("Request allowed!");
//! } else {
//!     println!("Too many requests, please wait");
//! }
//! ```
//!
//! ## Validated Quotas
//!
//! The raw methods never fail: a `max_requests` of 0 simply denies every
//! call. Use [`Quota`] to reject such configuration up front.
//!
//! ```
//! use windowcrab::{FixedWindowLimiter, Quota};
//! use std::time::SystemTime;
//!
//! let quota: Quota = "5/3600".parse()?;
//! let mut limiter: FixedWindowLimiter = FixedWindowLimiter::default();
//! let (allowed, result) = limiter.check_quota("user:456", "password-reset", &quota, SystemTime::now());
//! assert!(allowed);
//! assert_eq!(result.remaining, 4);
//! # Ok::<(), windowcrab::QuotaError>(())
//! ```
//!
//! ## Memory
//!
//! Entries are never evicted on their own. Call
//! [`FixedWindowLimiter::sweep_expired`] from a periodic task to drop
//! windows that have ended.
//!
//! ## Thread Safety
//!
//! [`FixedWindowLimiter`] takes `&mut self`. For concurrent access use
//! [`SharedLimiter`], which runs each check under a mutex:
//!
//! ```
//! use windowcrab::SharedLimiter;
//!
//! let limiter: SharedLimiter = SharedLimiter::default();
//! let for_worker = limiter.clone();
//! ```
//!
//! State is per process. Several instances of a host each enforce their
//! own quota, so the effective limit is `max_requests × instances`.
//!
//! ## Features
//!
//! - `ahash` (default): Use AHash for faster hashing

pub mod core;

pub use core::{
    FixedWindowLimiter, MemoryStore, MemoryStoreBuilder, Quota, QuotaError, RateLimitEntry,
    RateLimitResult, SharedLimiter, Store, limit_key,
};

// Re-export the store module so benchmarks can access it
pub use crate::core::store;
