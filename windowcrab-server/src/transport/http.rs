//! HTTP/JSON transport
//!
//! # API Endpoints
//!
//! ## POST /check
//!
//! Check and count a request.
//!
//! ```json
//! {
//!   "identifier": "203.0.113.7",
//!   "action": "create-idea",
//!   "max_requests": 3,
//!   "window_seconds": 60,
//!   "timestamp": 1700000000000
//! }
//! ```
//!
//! - `max_requests` and `window_seconds` are optional and fall back to the
//!   action's preset, then to the default quota
//! - `timestamp` is optional (epoch milliseconds, defaults to now). Values
//!   more than [`MAX_CLOCK_SKEW`] ahead of the server clock get `400`
//!
//! Allowed requests get `200` with a [`CheckResponse`]. Denied requests get
//! `429 Too Many Requests` with a `Retry-After` header and a
//! [`RateLimitRejection`] body.
//!
//! ## GET /remaining?identifier=..&action=..&max_requests=..&timestamp=..
//!
//! Requests left in the current window, without counting one. Quota and
//! timestamp are validated the same way as for `/check`.
//!
//! ## DELETE /limits/{action}/{identifier}
//!
//! Forget one window. Returns `{"removed": true|false}`.
//!
//! ## DELETE /limits
//!
//! Forget every window. Returns `204 No Content`.
//!
//! ## GET /health, GET /metrics
//!
//! Liveness check and Prometheus metrics.

use super::Transport;
use crate::actor::RateLimiterHandle;
use crate::config::QuotaConfig;
use crate::metrics::Metrics;
use crate::types::{CheckRequest, CheckResponse, RateLimitRejection};
use anyhow::Result;
use async_trait::async_trait;
use axum::{
    Router,
    extract::{Path, Query, State},
    http::{StatusCode, header},
    response::{IntoResponse, Json, Response},
    routing::{delete, get, post},
};
use serde::{Deserialize, Serialize};
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

/// How far ahead of the server clock a client timestamp may be
pub const MAX_CLOCK_SKEW: Duration = Duration::from_secs(5);

/// HTTP request format for a rate limit check
#[derive(Debug, Serialize, Deserialize)]
pub struct HttpCheckRequest {
    /// Who is acting (e.g. an IP address)
    pub identifier: String,
    /// What is being done
    pub action: String,
    /// Requests per window (optional, defaults from configuration)
    pub max_requests: Option<u32>,
    /// Window length in seconds (optional, defaults from configuration)
    pub window_seconds: Option<u64>,
    /// Unix timestamp in milliseconds (optional, defaults to current time)
    pub timestamp: Option<u64>,
}

/// Query parameters for `GET /remaining`
#[derive(Debug, Serialize, Deserialize)]
pub struct RemainingQuery {
    /// Who is acting
    pub identifier: String,
    /// What is being done
    pub action: String,
    /// Requests per window (optional, defaults from configuration)
    pub max_requests: Option<u32>,
    /// Unix timestamp in milliseconds (optional, defaults to current time)
    pub timestamp: Option<u64>,
}

/// Response for `GET /remaining`
#[derive(Debug, Serialize, Deserialize)]
pub struct RemainingResponse {
    /// Requests per window the answer was computed for
    pub limit: u32,
    /// Requests left before the next denial
    pub remaining: u32,
}

/// Response for `DELETE /limits/{action}/{identifier}`
#[derive(Debug, Serialize, Deserialize)]
pub struct ResetResponse {
    /// Whether a window existed for the key
    pub removed: bool,
}

/// Error response format
#[derive(Debug, Serialize, Deserialize)]
pub struct HttpErrorResponse {
    /// Error message
    pub error: String,
}

/// HTTP transport implementation
pub struct HttpTransport {
    host: String,
    port: u16,
    quotas: QuotaConfig,
    metrics: Arc<Metrics>,
}

impl HttpTransport {
    pub fn new(host: &str, port: u16, quotas: QuotaConfig, metrics: Arc<Metrics>) -> Self {
        Self {
            host: host.to_string(),
            port,
            quotas,
            metrics,
        }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn start(self, limiter: RateLimiterHandle) -> Result<()> {
        let ip: IpAddr = self.host.parse()?;
        let addr = SocketAddr::new(ip, self.port);

        let app = router(limiter, self.quotas, self.metrics);

        let listener = tokio::net::TcpListener::bind(addr).await?;
        tracing::info!("HTTP server listening on {}", addr);
        axum::serve(listener, app).await?;

        Ok(())
    }
}

struct AppState {
    limiter: RateLimiterHandle,
    quotas: QuotaConfig,
    metrics: Arc<Metrics>,
}

/// Build the HTTP router
pub fn router(limiter: RateLimiterHandle, quotas: QuotaConfig, metrics: Arc<Metrics>) -> Router {
    let app_state = Arc::new(AppState {
        limiter,
        quotas,
        metrics,
    });

    Router::new()
        .route("/check", post(handle_check))
        .route("/remaining", get(handle_remaining))
        .route("/limits", delete(handle_reset_all))
        .route("/limits/{action}/{identifier}", delete(handle_reset))
        .route("/health", get(|| async { "OK" }))
        .route("/metrics", get(handle_metrics))
        .with_state(app_state)
}

fn error_response(status: StatusCode, error: impl Into<String>) -> Response {
    (
        status,
        Json(HttpErrorResponse {
            error: error.into(),
        }),
    )
        .into_response()
}

fn internal_error(e: anyhow::Error) -> Response {
    tracing::error!("Rate limiter error: {}", e);
    error_response(
        StatusCode::INTERNAL_SERVER_ERROR,
        format!("Internal server error: {e}"),
    )
}

fn require_non_empty(identifier: &str, action: &str) -> Result<(), Response> {
    if identifier.is_empty() || action.is_empty() {
        return Err(error_response(
            StatusCode::BAD_REQUEST,
            "identifier and action must not be empty",
        ));
    }
    Ok(())
}

fn resolve_timestamp(millis: Option<u64>) -> Result<SystemTime, Response> {
    let now = SystemTime::now();
    let Some(millis) = millis else {
        return Ok(now);
    };

    match UNIX_EPOCH.checked_add(Duration::from_millis(millis)) {
        Some(timestamp) if timestamp <= now + MAX_CLOCK_SKEW => Ok(timestamp),
        _ => Err(error_response(
            StatusCode::BAD_REQUEST,
            "timestamp is too far in the future",
        )),
    }
}

async fn handle_check(
    State(state): State<Arc<AppState>>,
    Json(req): Json<HttpCheckRequest>,
) -> Response {
    let start = Instant::now();

    if let Err(response) = require_non_empty(&req.identifier, &req.action) {
        return response;
    }

    let quota = match state
        .quotas
        .resolve(&req.action, req.max_requests, req.window_seconds)
    {
        Ok(quota) => quota,
        Err(e) => return error_response(StatusCode::BAD_REQUEST, e.to_string()),
    };

    let timestamp = match resolve_timestamp(req.timestamp) {
        Ok(timestamp) => timestamp,
        Err(response) => return response,
    };

    let request = CheckRequest {
        identifier: req.identifier,
        action: req.action,
        quota,
        timestamp,
    };

    match state.limiter.check(request).await {
        Ok(response) => {
            let latency_us = start.elapsed().as_micros() as u64;
            state.metrics.record_request(latency_us, response.allowed);
            check_response(response)
        }
        Err(e) => {
            let latency_us = start.elapsed().as_micros() as u64;
            state.metrics.record_error(latency_us);
            internal_error(e)
        }
    }
}

fn check_response(response: CheckResponse) -> Response {
    if response.allowed {
        return (StatusCode::OK, Json(response)).into_response();
    }

    (
        StatusCode::TOO_MANY_REQUESTS,
        [(header::RETRY_AFTER, response.retry_after.to_string())],
        Json(RateLimitRejection::from_response(&response)),
    )
        .into_response()
}

async fn handle_remaining(
    State(state): State<Arc<AppState>>,
    Query(query): Query<RemainingQuery>,
) -> Response {
    if let Err(response) = require_non_empty(&query.identifier, &query.action) {
        return response;
    }

    let limit = match state.quotas.resolve(&query.action, query.max_requests, None) {
        Ok(quota) => quota.max_requests(),
        Err(e) => return error_response(StatusCode::BAD_REQUEST, e.to_string()),
    };
    let timestamp = match resolve_timestamp(query.timestamp) {
        Ok(timestamp) => timestamp,
        Err(response) => return response,
    };

    match state
        .limiter
        .remaining(query.identifier, query.action, limit, timestamp)
        .await
    {
        Ok(remaining) => Json(RemainingResponse { limit, remaining }).into_response(),
        Err(e) => internal_error(e),
    }
}

async fn handle_reset(
    State(state): State<Arc<AppState>>,
    Path((action, identifier)): Path<(String, String)>,
) -> Response {
    match state.limiter.reset(identifier, action).await {
        Ok(removed) => {
            state.metrics.record_reset();
            Json(ResetResponse { removed }).into_response()
        }
        Err(e) => internal_error(e),
    }
}

async fn handle_reset_all(State(state): State<Arc<AppState>>) -> Response {
    match state.limiter.reset_all().await {
        Ok(()) => {
            state.metrics.record_reset();
            state.metrics.update_active_keys(0);
            StatusCode::NO_CONTENT.into_response()
        }
        Err(e) => internal_error(e),
    }
}

async fn handle_metrics(State(state): State<Arc<AppState>>) -> Response {
    match state.limiter.stats().await {
        Ok(stats) => {
            state.metrics.update_active_keys(stats.active_keys);
            (
                [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
                state.metrics.export_prometheus(),
            )
                .into_response()
        }
        Err(e) => internal_error(e),
    }
}
