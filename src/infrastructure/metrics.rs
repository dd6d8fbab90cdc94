//! Application Metrics
//!
//! Process-wide collection of the service's counters and histograms,
//! exposed in the Prometheus text format. The registry is an explicit value
//! injected through application state rather than a global.

use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry, TextEncoder,
};

/// Latency buckets for `http_request_duration_seconds`, in seconds.
const DURATION_BUCKETS: &[f64] = &[0.1, 0.5, 1.0, 1.5];

/// The service metrics and their registry.
///
/// Counter and histogram cells are internally atomic, so concurrent request
/// flows record observations without external locking. Label combinations
/// materialize on first use and live for the process lifetime.
pub struct AppMetrics {
    registry: Registry,
    pub http_request_duration_seconds: HistogramVec,
    pub http_requests_total: IntCounterVec,
    pub vendas_total: IntCounterVec,
}

impl AppMetrics {
    /// Build a fresh registry holding the application metrics plus the
    /// default process metrics (CPU, memory, uptime). Registering the same
    /// metric name twice fails with `prometheus::Error::AlreadyReg`.
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let http_request_duration_seconds = HistogramVec::new(
            HistogramOpts::new(
                "http_request_duration_seconds",
                "HTTP request duration in seconds",
            )
            .buckets(DURATION_BUCKETS.to_vec()),
            &["method", "route", "status_code"],
        )?;

        let http_requests_total = IntCounterVec::new(
            Opts::new("http_requests_total", "Total number of HTTP requests"),
            &["method", "route", "status_code"],
        )?;

        let vendas_total = IntCounterVec::new(
            Opts::new("sweetcontrol_vendas_total", "Total recorded sales"),
            &["categoria"],
        )?;

        registry.register(Box::new(http_request_duration_seconds.clone()))?;
        registry.register(Box::new(http_requests_total.clone()))?;
        registry.register(Box::new(vendas_total.clone()))?;

        #[cfg(target_os = "linux")]
        registry.register(Box::new(
            prometheus::process_collector::ProcessCollector::for_self(),
        ))?;

        Ok(Self {
            registry,
            http_request_duration_seconds,
            http_requests_total,
            vendas_total,
        })
    }

    /// Record one completed request. Recording problems are logged and
    /// swallowed; they must never surface in the client response.
    pub fn observe_request(&self, method: &str, route: &str, status_code: u16, elapsed_secs: f64) {
        let status = status_code.to_string();
        let labels = [method, route, status.as_str()];

        match self
            .http_request_duration_seconds
            .get_metric_with_label_values(&labels)
        {
            Ok(histogram) => histogram.observe(elapsed_secs),
            Err(e) => tracing::error!(error = %e, "failed to record request duration"),
        }
        match self.http_requests_total.get_metric_with_label_values(&labels) {
            Ok(counter) => counter.inc(),
            Err(e) => tracing::error!(error = %e, "failed to count request"),
        }
    }

    /// Count one recorded sale for a category.
    pub fn record_sale(&self, categoria: &str) {
        match self.vendas_total.get_metric_with_label_values(&[categoria]) {
            Ok(counter) => counter.inc(),
            Err(e) => tracing::error!(error = %e, "failed to count sale"),
        }
    }

    /// Serialize every registered metric in the exposition text format,
    /// returning the body and its content type.
    pub fn snapshot(&self) -> Result<(Vec<u8>, String), prometheus::Error> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        encoder.encode(&self.registry.gather(), &mut buffer)?;
        Ok((buffer, encoder.format_type().to_string()))
    }
}
