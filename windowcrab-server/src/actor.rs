use crate::types::{CheckRequest, CheckResponse, LimiterStats};
use anyhow::Result;
use std::time::SystemTime;
use tokio::sync::{mpsc, oneshot};
use windowcrab::{FixedWindowLimiter, MemoryStore};

/// Message types for the rate limiter actor
pub enum RateLimiterMessage {
    Check {
        request: CheckRequest,
        response_tx: oneshot::Sender<CheckResponse>,
    },
    Remaining {
        identifier: String,
        action: String,
        max_requests: u32,
        timestamp: SystemTime,
        response_tx: oneshot::Sender<u32>,
    },
    Reset {
        identifier: String,
        action: String,
        response_tx: oneshot::Sender<bool>,
    },
    ResetAll {
        response_tx: oneshot::Sender<()>,
    },
    Sweep {
        now: SystemTime,
        response_tx: oneshot::Sender<usize>,
    },
    Stats {
        response_tx: oneshot::Sender<LimiterStats>,
    },
}

/// Handle to communicate with the rate limiter actor
#[derive(Clone)]
pub struct RateLimiterHandle {
    tx: mpsc::Sender<RateLimiterMessage>,
}

impl RateLimiterHandle {
    async fn request<T>(
        &self,
        build: impl FnOnce(oneshot::Sender<T>) -> RateLimiterMessage,
    ) -> Result<T> {
        let (response_tx, response_rx) = oneshot::channel();

        self.tx
            .send(build(response_tx))
            .await
            .map_err(|_| anyhow::anyhow!("Rate limiter actor has shut down"))?;

        response_rx
            .await
            .map_err(|_| anyhow::anyhow!("Rate limiter actor dropped response channel"))
    }

    /// Check and count a request
    pub async fn check(&self, request: CheckRequest) -> Result<CheckResponse> {
        self.request(|response_tx| RateLimiterMessage::Check {
            request,
            response_tx,
        })
        .await
    }

    /// Requests left in the current window without counting one
    pub async fn remaining(
        &self,
        identifier: String,
        action: String,
        max_requests: u32,
        timestamp: SystemTime,
    ) -> Result<u32> {
        self.request(|response_tx| RateLimiterMessage::Remaining {
            identifier,
            action,
            max_requests,
            timestamp,
            response_tx,
        })
        .await
    }

    /// Forget the window for one key
    pub async fn reset(&self, identifier: String, action: String) -> Result<bool> {
        self.request(|response_tx| RateLimiterMessage::Reset {
            identifier,
            action,
            response_tx,
        })
        .await
    }

    /// Forget every window
    pub async fn reset_all(&self) -> Result<()> {
        self.request(|response_tx| RateLimiterMessage::ResetAll { response_tx })
            .await
    }

    /// Remove windows that ended at or before `now`
    pub async fn sweep(&self, now: SystemTime) -> Result<usize> {
        self.request(|response_tx| RateLimiterMessage::Sweep { now, response_tx })
            .await
    }

    /// Current limiter statistics
    pub async fn stats(&self) -> Result<LimiterStats> {
        self.request(|response_tx| RateLimiterMessage::Stats { response_tx })
            .await
    }
}

/// The rate limiter actor
///
/// One task owns the limiter and handles messages in order, so every
/// check-and-count runs without interleaving.
pub struct RateLimiterActor;

impl RateLimiterActor {
    /// Spawn a new rate limiter actor over a memory store
    pub fn spawn(buffer_size: usize, store: MemoryStore) -> RateLimiterHandle {
        let (tx, rx) = mpsc::channel(buffer_size);

        tokio::spawn(async move {
            run_actor(rx, FixedWindowLimiter::new(store)).await;
        });

        RateLimiterHandle { tx }
    }
}

async fn run_actor(
    mut rx: mpsc::Receiver<RateLimiterMessage>,
    mut limiter: FixedWindowLimiter<MemoryStore>,
) {
    // Send errors are ignored below: the caller may have given up waiting
    while let Some(msg) = rx.recv().await {
        match msg {
            RateLimiterMessage::Check {
                request,
                response_tx,
            } => {
                let response = handle_check(&mut limiter, request);
                let _ = response_tx.send(response);
            }
            RateLimiterMessage::Remaining {
                identifier,
                action,
                max_requests,
                timestamp,
                response_tx,
            } => {
                let remaining =
                    limiter.remaining_requests(&identifier, &action, max_requests, timestamp);
                let _ = response_tx.send(remaining);
            }
            RateLimiterMessage::Reset {
                identifier,
                action,
                response_tx,
            } => {
                let removed = limiter.reset(&identifier, &action);
                tracing::debug!(%identifier, %action, removed, "Reset rate limit window");
                let _ = response_tx.send(removed);
            }
            RateLimiterMessage::ResetAll { response_tx } => {
                let cleared = limiter.len();
                limiter.reset_all();
                tracing::info!(cleared, "Reset all rate limit windows");
                let _ = response_tx.send(());
            }
            RateLimiterMessage::Sweep { now, response_tx } => {
                let removed = limiter.sweep_expired(now);
                let _ = response_tx.send(removed);
            }
            RateLimiterMessage::Stats { response_tx } => {
                let _ = response_tx.send(LimiterStats {
                    active_keys: limiter.len(),
                });
            }
        }
    }

    tracing::info!("Rate limiter actor shutting down");
}

fn handle_check(
    limiter: &mut FixedWindowLimiter<MemoryStore>,
    request: CheckRequest,
) -> CheckResponse {
    let result = limiter.check_quota(
        &request.identifier,
        &request.action,
        &request.quota,
        request.timestamp,
    );

    if !result.0 {
        tracing::debug!(
            identifier = %request.identifier,
            action = %request.action,
            quota = %request.quota,
            "Request denied"
        );
    }

    CheckResponse::from(result)
}
