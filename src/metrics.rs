//! Observability metrics for the exporter
//!
//! Counters and histograms for API calls, 429 responses, retries, throttle
//! widening, and exported principals.
//!
//! ## Architecture
//!
//! - Uses `metrics` crate for low-overhead metric collection
//! - Optional Prometheus exporter for a scrape endpoint (`--metrics-addr`)
//! - Every recording call is a no-op until a recorder is installed

use metrics::{
    counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram, Unit,
};
use metrics_exporter_prometheus::PrometheusBuilder;
use once_cell::sync::Lazy;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::api::ApiError;

/// Global metrics registry initialization flag
static METRICS_INITIALIZED: Lazy<Arc<RwLock<bool>>> = Lazy::new(|| Arc::new(RwLock::new(false)));

/// Metrics setup failure
#[derive(Debug, thiserror::Error)]
#[error("failed to install Prometheus exporter on {addr}: {message}")]
pub struct MetricsError {
    addr: SocketAddr,
    message: String,
}

/// Initialize the Prometheus exporter.
///
/// Idempotent: later calls are ignored once a recorder is installed.
pub async fn init_metrics(addr: SocketAddr) -> Result<(), MetricsError> {
    let mut initialized = METRICS_INITIALIZED.write().await;
    if *initialized {
        debug!("Metrics already initialized, skipping");
        return Ok(());
    }

    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| MetricsError {
            addr,
            message: e.to_string(),
        })?;

    describe_counter!(
        "api_requests_total",
        Unit::Count,
        "Total number of Management API calls"
    );
    describe_counter!(
        "api_rate_limit_hits_total",
        Unit::Count,
        "Total number of rate-limit failures (HTTP 429)"
    );
    describe_counter!(
        "api_retries_total",
        Unit::Count,
        "Total number of retry attempts"
    );
    describe_histogram!(
        "api_request_duration_seconds",
        Unit::Seconds,
        "Management API call duration in seconds"
    );
    describe_histogram!(
        "retry_backoff_duration_seconds",
        Unit::Seconds,
        "Duration of retry backoff in seconds"
    );
    describe_gauge!(
        "throttle_min_interval_seconds",
        Unit::Seconds,
        "Current minimum spacing between API calls"
    );
    describe_gauge!(
        "api_rate_limit_remaining",
        Unit::Count,
        "Last X-RateLimit-Remaining value reported by the tenant"
    );
    describe_counter!(
        "principals_exported_total",
        Unit::Count,
        "Total number of users aggregated into export records"
    );
    describe_counter!(
        "mutations_total",
        Unit::Count,
        "Role and membership mutations by action and outcome"
    );

    *initialized = true;
    info!("Metrics endpoint listening on {}", addr);
    Ok(())
}

/// Check if metrics system is initialized
pub async fn is_initialized() -> bool {
    *METRICS_INITIALIZED.read().await
}

/// Timing and outcome of one API attempt.
pub struct ApiRequestMetrics {
    operation: &'static str,
    attempt: u32,
    start_time: Instant,
}

impl ApiRequestMetrics {
    /// Start recording an attempt (1-based).
    pub fn start(operation: &'static str, attempt: u32) -> Self {
        Self {
            operation,
            attempt,
            start_time: Instant::now(),
        }
    }

    /// Record a successful attempt.
    pub fn record_success(&self, rate_limit_remaining: Option<u32>) {
        self.record("ok");
        if let Some(remaining) = rate_limit_remaining {
            gauge!("api_rate_limit_remaining").set(remaining as f64);
        }
    }

    /// Record a failed attempt.
    pub fn record_error(&self, error: &ApiError) {
        let status = error
            .status()
            .map(|s| s.to_string())
            .unwrap_or_else(|| "error".to_string());
        self.record(&status);

        if error.is_rate_limit() {
            counter!(
                "api_rate_limit_hits_total",
                "operation" => self.operation,
            )
            .increment(1);
        }
    }

    fn record(&self, status: &str) {
        let duration = self.start_time.elapsed();

        counter!(
            "api_requests_total",
            "operation" => self.operation,
            "status" => status.to_string(),
        )
        .increment(1);

        histogram!(
            "api_request_duration_seconds",
            "operation" => self.operation,
        )
        .record(duration.as_secs_f64());

        debug!(
            operation = self.operation,
            attempt = self.attempt,
            status = status,
            duration_ms = duration.as_millis() as u64,
            "API call completed"
        );
    }
}

/// Record retry backoff duration
pub fn record_retry_backoff(duration: Duration, attempt: u32) {
    counter!(
        "api_retries_total",
        "attempt" => attempt.to_string(),
    )
    .increment(1);

    histogram!("retry_backoff_duration_seconds").record(duration.as_secs_f64());
}

/// Record the throttle interval after a change.
pub fn record_throttle_interval(interval: Duration) {
    gauge!("throttle_min_interval_seconds").set(interval.as_secs_f64());
}

/// Record a principal aggregated into an export record.
pub fn record_principal_exported() {
    counter!("principals_exported_total").increment(1);
}

/// Record a mutation outcome.
pub fn record_mutation(action: &'static str, success: bool) {
    counter!(
        "mutations_total",
        "action" => action,
        "outcome" => if success { "success" } else { "failure" },
    )
    .increment(1);
}

/// Whole-run export metrics
pub struct ExportMetrics {
    kind: &'static str,
    start_time: Instant,
}

impl ExportMetrics {
    /// Start tracking an export run.
    pub fn start(kind: &'static str) -> Self {
        info!(kind = kind, "Export started");
        Self {
            kind,
            start_time: Instant::now(),
        }
    }

    /// Record successful completion.
    pub fn record_success(&self, users: usize, rows: usize) {
        info!(
            kind = self.kind,
            users = users,
            rows = rows,
            duration_secs = self.start_time.elapsed().as_secs(),
            "Export completed"
        );
    }

    /// Record an aborted run.
    pub fn record_failure(&self, error: &str) {
        warn!(
            kind = self.kind,
            error = %error,
            duration_secs = self.start_time.elapsed().as_secs(),
            "Export failed"
        );
    }
}
