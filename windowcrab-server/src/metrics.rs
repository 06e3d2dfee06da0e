//! Simple metrics collection for observability
//!
//! Lightweight atomic counters, exported in Prometheus text format on
//! `GET /metrics`.

use std::fmt::Write;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::Instant;

/// Core metrics collected by the server
pub struct Metrics {
    /// Server start time
    start_time: Instant,

    /// Total checks received
    pub total_requests: AtomicU64,

    /// Rate limiting decisions
    pub requests_allowed: AtomicU64,
    pub requests_denied: AtomicU64,
    pub requests_errors: AtomicU64,

    /// Check latency buckets (in microseconds)
    pub latency_under_1ms: AtomicU64,
    pub latency_under_10ms: AtomicU64,
    pub latency_under_100ms: AtomicU64,
    pub latency_under_1s: AtomicU64,
    pub latency_over_1s: AtomicU64,

    /// Histogram support
    pub latency_sum_micros: AtomicU64,
    pub latency_count: AtomicU64,

    /// Store metrics
    pub active_keys: AtomicUsize,
    pub swept_entries: AtomicU64,
    pub sweeps: AtomicU64,
    pub resets: AtomicU64,
}

impl Metrics {
    /// Create a new metrics instance
    pub fn new() -> Self {
        Self {
            start_time: Instant::now(),
            total_requests: AtomicU64::new(0),
            requests_allowed: AtomicU64::new(0),
            requests_denied: AtomicU64::new(0),
            requests_errors: AtomicU64::new(0),
            latency_under_1ms: AtomicU64::new(0),
            latency_under_10ms: AtomicU64::new(0),
            latency_under_100ms: AtomicU64::new(0),
            latency_under_1s: AtomicU64::new(0),
            latency_over_1s: AtomicU64::new(0),
            latency_sum_micros: AtomicU64::new(0),
            latency_count: AtomicU64::new(0),
            active_keys: AtomicUsize::new(0),
            swept_entries: AtomicU64::new(0),
            sweeps: AtomicU64::new(0),
            resets: AtomicU64::new(0),
        }
    }

    /// Record a check and its latency
    pub fn record_request(&self, latency_us: u64, allowed: bool) {
        self.total_requests.fetch_add(1, Ordering::Relaxed);

        if allowed {
            self.requests_allowed.fetch_add(1, Ordering::Relaxed);
        } else {
            self.requests_denied.fetch_add(1, Ordering::Relaxed);
        }

        self.record_latency(latency_us);
    }

    /// Record an internal error
    pub fn record_error(&self, latency_us: u64) {
        self.total_requests.fetch_add(1, Ordering::Relaxed);
        self.requests_errors.fetch_add(1, Ordering::Relaxed);

        // Errors still count toward latency
        self.record_latency(latency_us);
    }

    fn record_latency(&self, latency_us: u64) {
        match latency_us {
            0..=999 => self.latency_under_1ms.fetch_add(1, Ordering::Relaxed),
            1000..=9999 => self.latency_under_10ms.fetch_add(1, Ordering::Relaxed),
            10000..=99999 => self.latency_under_100ms.fetch_add(1, Ordering::Relaxed),
            100000..=999999 => self.latency_under_1s.fetch_add(1, Ordering::Relaxed),
            _ => self.latency_over_1s.fetch_add(1, Ordering::Relaxed),
        };

        self.latency_sum_micros
            .fetch_add(latency_us, Ordering::Relaxed);
        self.latency_count.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a completed sweep
    pub fn record_sweep(&self, removed: usize, active_keys: usize) {
        self.sweeps.fetch_add(1, Ordering::Relaxed);
        self.swept_entries
            .fetch_add(removed as u64, Ordering::Relaxed);
        self.active_keys.store(active_keys, Ordering::Relaxed);
    }

    /// Record a reset of one or all windows
    pub fn record_reset(&self) {
        self.resets.fetch_add(1, Ordering::Relaxed);
    }

    /// Update active keys count
    pub fn update_active_keys(&self, count: usize) {
        self.active_keys.store(count, Ordering::Relaxed);
    }

    /// Get server uptime in seconds
    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    /// Percentage of checks that were denied
    pub fn denial_rate_percent(&self) -> f64 {
        let allowed = self.requests_allowed.load(Ordering::Relaxed);
        let denied = self.requests_denied.load(Ordering::Relaxed);
        let decided = allowed + denied;
        if decided == 0 {
            0.0
        } else {
            denied as f64 * 100.0 / decided as f64
        }
    }

    /// Export metrics in Prometheus text format
    pub fn export_prometheus(&self) -> String {
        let mut output = String::with_capacity(2048);

        // Writing to a String cannot fail
        let _ = self.write_prometheus(&mut output);

        output
    }

    fn write_prometheus(&self, output: &mut String) -> std::fmt::Result {
        let load = |counter: &AtomicU64| counter.load(Ordering::Relaxed);

        writeln!(output, "# HELP windowcrab_uptime_seconds Time since server start in seconds")?;
        writeln!(output, "# TYPE windowcrab_uptime_seconds gauge")?;
        writeln!(output, "windowcrab_uptime_seconds {}\n", self.uptime_seconds())?;

        writeln!(output, "# HELP windowcrab_requests_total Total number of checks processed")?;
        writeln!(output, "# TYPE windowcrab_requests_total counter")?;
        writeln!(output, "windowcrab_requests_total {}\n", load(&self.total_requests))?;

        writeln!(output, "# HELP windowcrab_requests_allowed Total checks allowed")?;
        writeln!(output, "# TYPE windowcrab_requests_allowed counter")?;
        writeln!(output, "windowcrab_requests_allowed {}\n", load(&self.requests_allowed))?;

        writeln!(output, "# HELP windowcrab_requests_denied Total checks denied")?;
        writeln!(output, "# TYPE windowcrab_requests_denied counter")?;
        writeln!(output, "windowcrab_requests_denied {}\n", load(&self.requests_denied))?;

        writeln!(output, "# HELP windowcrab_requests_errors Total internal errors")?;
        writeln!(output, "# TYPE windowcrab_requests_errors counter")?;
        writeln!(output, "windowcrab_requests_errors {}\n", load(&self.requests_errors))?;

        writeln!(output, "# HELP windowcrab_denial_rate_percent Share of checks denied")?;
        writeln!(output, "# TYPE windowcrab_denial_rate_percent gauge")?;
        writeln!(output, "windowcrab_denial_rate_percent {:.2}\n", self.denial_rate_percent())?;

        // Latency distribution, cumulative per Prometheus histogram rules
        let under_1ms = load(&self.latency_under_1ms);
        let under_10ms = under_1ms + load(&self.latency_under_10ms);
        let under_100ms = under_10ms + load(&self.latency_under_100ms);
        let under_1s = under_100ms + load(&self.latency_under_1s);

        writeln!(output, "# HELP windowcrab_request_duration Check latency distribution")?;
        writeln!(output, "# TYPE windowcrab_request_duration histogram")?;
        writeln!(output, "windowcrab_request_duration_bucket{{le=\"0.001\"}} {under_1ms}")?;
        writeln!(output, "windowcrab_request_duration_bucket{{le=\"0.01\"}} {under_10ms}")?;
        writeln!(output, "windowcrab_request_duration_bucket{{le=\"0.1\"}} {under_100ms}")?;
        writeln!(output, "windowcrab_request_duration_bucket{{le=\"1\"}} {under_1s}")?;
        writeln!(
            output,
            "windowcrab_request_duration_bucket{{le=\"+Inf\"}} {}",
            load(&self.latency_count)
        )?;
        let latency_sum_seconds = load(&self.latency_sum_micros) as f64 / 1_000_000.0;
        writeln!(output, "windowcrab_request_duration_sum {latency_sum_seconds:.6}")?;
        writeln!(output, "windowcrab_request_duration_count {}\n", load(&self.latency_count))?;

        writeln!(output, "# HELP windowcrab_active_keys Number of tracked rate limit windows")?;
        writeln!(output, "# TYPE windowcrab_active_keys gauge")?;
        writeln!(
            output,
            "windowcrab_active_keys {}\n",
            self.active_keys.load(Ordering::Relaxed)
        )?;

        writeln!(output, "# HELP windowcrab_sweeps_total Number of completed sweeps")?;
        writeln!(output, "# TYPE windowcrab_sweeps_total counter")?;
        writeln!(output, "windowcrab_sweeps_total {}\n", load(&self.sweeps))?;

        writeln!(output, "# HELP windowcrab_swept_entries_total Expired windows removed by sweeps")?;
        writeln!(output, "# TYPE windowcrab_swept_entries_total counter")?;
        writeln!(output, "windowcrab_swept_entries_total {}\n", load(&self.swept_entries))?;

        writeln!(output, "# HELP windowcrab_resets_total Manual window resets")?;
        writeln!(output, "# TYPE windowcrab_resets_total counter")?;
        writeln!(output, "windowcrab_resets_total {}", load(&self.resets))?;

        Ok(())
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::Ordering;

    #[test]
    fn test_metrics_creation() {
        let metrics = Metrics::new();
        assert_eq!(metrics.total_requests.load(Ordering::Relaxed), 0);
        assert_eq!(metrics.requests_allowed.load(Ordering::Relaxed), 0);
        assert_eq!(metrics.requests_denied.load(Ordering::Relaxed), 0);
        assert_eq!(metrics.requests_errors.load(Ordering::Relaxed), 0);
        assert_eq!(metrics.denial_rate_percent(), 0.0);
    }

    #[test]
    fn test_record_request() {
        let metrics = Metrics::new();

        metrics.record_request(500, true);

        assert_eq!(metrics.total_requests.load(Ordering::Relaxed), 1);
        assert_eq!(metrics.requests_allowed.load(Ordering::Relaxed), 1);
        assert_eq!(metrics.requests_denied.load(Ordering::Relaxed), 0);
        assert_eq!(metrics.latency_under_1ms.load(Ordering::Relaxed), 1);

        metrics.record_request(50000, false);

        assert_eq!(metrics.total_requests.load(Ordering::Relaxed), 2);
        assert_eq!(metrics.requests_allowed.load(Ordering::Relaxed), 1);
        assert_eq!(metrics.requests_denied.load(Ordering::Relaxed), 1);
        assert_eq!(metrics.latency_under_100ms.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn test_latency_buckets() {
        let metrics = Metrics::new();

        metrics.record_request(500, true); // < 1ms
        metrics.record_request(5000, true); // < 10ms
        metrics.record_request(50000, true); // < 100ms
        metrics.record_request(500000, true); // < 1s
        metrics.record_error(5000000); // > 1s

        assert_eq!(metrics.latency_under_1ms.load(Ordering::Relaxed), 1);
        assert_eq!(metrics.latency_under_10ms.load(Ordering::Relaxed), 1);
        assert_eq!(metrics.latency_under_100ms.load(Ordering::Relaxed), 1);
        assert_eq!(metrics.latency_under_1s.load(Ordering::Relaxed), 1);
        assert_eq!(metrics.latency_over_1s.load(Ordering::Relaxed), 1);
        assert_eq!(metrics.latency_count.load(Ordering::Relaxed), 5);
    }

    #[test]
    fn test_sweep_and_reset_tracking() {
        let metrics = Metrics::new();

        metrics.record_sweep(10, 90);
        metrics.record_sweep(5, 85);
        metrics.record_reset();

        assert_eq!(metrics.sweeps.load(Ordering::Relaxed), 2);
        assert_eq!(metrics.swept_entries.load(Ordering::Relaxed), 15);
        assert_eq!(metrics.active_keys.load(Ordering::Relaxed), 85);
        assert_eq!(metrics.resets.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn test_prometheus_export() {
        let metrics = Metrics::new();

        metrics.record_request(500, true);
        metrics.record_request(1500, false);
        metrics.record_sweep(3, 7);

        let output = metrics.export_prometheus();

        assert!(output.contains("windowcrab_uptime_seconds"));
        assert!(output.contains("windowcrab_requests_total 2"));
        assert!(output.contains("windowcrab_requests_allowed 1"));
        assert!(output.contains("windowcrab_requests_denied 1"));
        assert!(output.contains("windowcrab_denial_rate_percent 50.00"));
        assert!(output.contains("windowcrab_request_duration_bucket{le=\"0.001\"} 1"));
        assert!(output.contains("windowcrab_request_duration_bucket{le=\"0.01\"} 2"));
        assert!(output.contains("windowcrab_active_keys 7"));
        assert!(output.contains("windowcrab_swept_entries_total 3"));
    }
}
