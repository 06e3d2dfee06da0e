//! Periodic removal of expired windows
//!
//! The limiter never schedules cleanup on its own. This task asks the actor
//! to sweep on a fixed interval so memory stays bounded by the number of
//! live windows.

use crate::actor::RateLimiterHandle;
use crate::metrics::Metrics;
use std::sync::Arc;
use std::time::{Duration, SystemTime};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Spawn the sweeper task
///
/// The task stops once the actor has shut down.
pub fn spawn_sweeper(
    limiter: RateLimiterHandle,
    metrics: Arc<Metrics>,
    interval: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately
        ticker.tick().await;

        loop {
            ticker.tick().await;

            if let Err(e) = sweep_once(&limiter, &metrics).await {
                tracing::warn!("Stopping sweeper: {}", e);
                break;
            }
        }
    })
}

/// Run a single sweep and record it
pub async fn sweep_once(limiter: &RateLimiterHandle, metrics: &Metrics) -> anyhow::Result<usize> {
    let removed = limiter.sweep(SystemTime::now()).await?;
    let stats = limiter.stats().await?;

    metrics.record_sweep(removed, stats.active_keys);
    tracing::debug!(removed, active_keys = stats.active_keys, "Swept expired windows");

    Ok(removed)
}
