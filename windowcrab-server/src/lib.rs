//! # windowcrab server
//!
//! A standalone service around the [`windowcrab`] fixed-window rate limiter.
//!
//! ## Purpose
//!
//! Web applications call the service before running a guarded operation
//! (submitting a form, registering for an event, voting) and turn a denial
//! into a "too many requests, please wait" message for the user.
//!
//! ## Quick Start
//!
//! ```bash
//! # Default quota of 10 requests per 60 seconds on port 8080
//! windowcrab
//!
//! # Per-action quotas
//! windowcrab --preset create-idea=3/60 --preset login=5/300
//!
//! # List all available environment variables
//! windowcrab --list-env-vars
//! ```
//!
//! ### Checking a request
//!
//! ```bash
//! curl -X POST http://localhost:8080/check \
//!   -H "Content-Type: application/json" \
//!   -d '{"identifier": "203.0.113.7", "action": "create-idea"}'
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐   ┌─────────────┐
//! │    HTTP     │   │   Sweeper   │
//! │  Transport  │   │  (interval) │
//! └──────┬──────┘   └──────┬──────┘
//!        │                 │
//!        └────────┬────────┘
//!                 │
//!           ┌─────▼─────┐
//!           │   Actor   │
//!           │  (single  │
//!           │   owner)  │
//!           └─────┬─────┘
//!                 │
//!        ┌────────▼─────────┐
//!        │FixedWindowLimiter│
//!        │   MemoryStore    │
//!        └──────────────────┘
//! ```
//!
//! The actor handles one message at a time, so each check-and-count is
//! never interleaved with another.
//!
//! ## Limitations
//!
//! State lives in process memory. Several server instances each enforce
//! their own quota, so the effective limit is `max_requests × instances`.

pub mod actor;
pub mod config;
pub mod metrics;
pub mod store;
pub mod sweeper;
pub mod transport;
pub mod types;
