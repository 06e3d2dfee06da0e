mod actor;
mod config;
mod metrics;
mod store;
mod sweeper;
mod transport;
mod types;

#[cfg(test)]
mod actor_tests;

use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;

use crate::config::Config;
use crate::metrics::Metrics;
use crate::transport::{Transport, http::HttpTransport};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse configuration from environment variables and CLI arguments
    let config = Config::from_env_and_args()?;

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(format!("windowcrab={}", config.log_level).parse()?)
                .add_directive(format!("windowcrab_server={}", config.log_level).parse()?),
        )
        .init();

    let metrics = Arc::new(Metrics::new());

    // Create the rate limiter actor with the configured store
    let limiter = store::create_rate_limiter(&config.store, config.buffer_size);

    if config.store.sweep_interval > 0 {
        sweeper::spawn_sweeper(
            limiter.clone(),
            Arc::clone(&metrics),
            Duration::from_secs(config.store.sweep_interval),
        );
    } else {
        tracing::warn!("Sweeping disabled, expired windows will accumulate until reset");
    }

    tracing::info!(
        "windowcrab started with default quota {} and {} action presets",
        config.quotas.default,
        config.quotas.presets.len()
    );
    for (action, quota) in &config.quotas.presets {
        tracing::info!("Preset {}: {}", action, quota);
    }
    tracing::info!(
        "Store capacity: {}, Buffer size: {}, Sweep interval: {}s",
        config.store.capacity,
        config.buffer_size,
        config.store.sweep_interval
    );

    tracing::info!(
        "Starting HTTP transport on {}:{}",
        config.http.host,
        config.http.port
    );
    let transport = HttpTransport::new(
        &config.http.host,
        config.http.port,
        config.quotas.clone(),
        Arc::clone(&metrics),
    );

    if let Err(e) = transport.start(limiter).await {
        tracing::error!("HTTP transport failed: {}", e);
        return Err(e);
    }

    Ok(())
}
