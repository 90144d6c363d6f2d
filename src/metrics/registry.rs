//! HTTP Metrics Registry
//!
//! Owns the two collectors every request updates: a response counter and a
//! latency histogram, both labeled by status code and HTTP method.

use prometheus::{Encoder, HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry, TextEncoder};
use tracing::debug;

use crate::error::{Error, Result};

// =============================================================================
// Metric Names
// =============================================================================

/// Metric namespace shared by all collectors
const NAMESPACE: &str = "cloud_native_app";

/// Metric subsystem shared by all collectors
const SUBSYSTEM: &str = "http_server";

/// Label names, in the order values are passed
const LABELS: [&str; 2] = ["code", "method"];

const RESPONSES_TOTAL: &str = "http_responses_total";
const RESPONSE_LATENCIES: &str = "http_response_latencies";

// =============================================================================
// HttpMetrics
// =============================================================================

/// Per-request counters and latency histograms.
///
/// Cheap to share behind an `Arc`; both collectors are safe to update from
/// any number of connections at once.
pub struct HttpMetrics {
    registry: Registry,
    responses_total: IntCounterVec,
    response_latencies: HistogramVec,
}

impl HttpMetrics {
    /// Create the collectors and register them in a fresh registry
    pub fn new() -> Result<Self> {
        Self::with_registry(Registry::new())
    }

    /// Create the collectors and register them in `registry`.
    ///
    /// On Linux the process collector is registered alongside them.
    /// Fails if the registry already holds collectors with the same names.
    pub fn with_registry(registry: Registry) -> Result<Self> {
        let responses_total = IntCounterVec::new(
            Opts::new(
                RESPONSES_TOTAL,
                "The count of http responses issued, classified by code and method.",
            )
            .namespace(NAMESPACE)
            .subsystem(SUBSYSTEM),
            &LABELS,
        )?;

        let response_latencies = HistogramVec::new(
            HistogramOpts::new(
                RESPONSE_LATENCIES,
                "Distribution of http response latencies (ms), classified by code and method.",
            )
            .namespace(NAMESPACE)
            .subsystem(SUBSYSTEM),
            &LABELS,
        )?;

        registry.register(Box::new(responses_total.clone()))?;
        registry.register(Box::new(response_latencies.clone()))?;

        // CPU, memory and file descriptor usage of this process
        #[cfg(target_os = "linux")]
        registry.register(Box::new(
            prometheus::process_collector::ProcessCollector::for_self(),
        ))?;

        debug!("Registered http server metrics");

        Ok(Self {
            registry,
            responses_total,
            response_latencies,
        })
    }

    /// Count one response
    pub fn increment_counter(&self, status: &str, method: &str) {
        self.responses_total
            .with_label_values(&[status, method])
            .inc();
    }

    /// Record the latency of one response, in milliseconds
    pub fn observe_latency(&self, status: &str, method: &str, value_ms: f64) {
        self.response_latencies
            .with_label_values(&[status, method])
            .observe(value_ms);
    }

    /// Responses counted so far for a label combination
    pub fn responses_total(&self, status: &str, method: &str) -> u64 {
        self.responses_total
            .with_label_values(&[status, method])
            .get()
    }

    /// Latency observations recorded so far for a label combination
    pub fn latency_sample_count(&self, status: &str, method: &str) -> u64 {
        self.response_latencies
            .with_label_values(&[status, method])
            .get_sample_count()
    }

    /// Content type of the exposition produced by [`HttpMetrics::encode`]
    pub fn content_type(&self) -> String {
        TextEncoder::new().format_type().to_string()
    }

    /// Render all registered collectors in the Prometheus text format
    pub fn encode(&self) -> Result<Vec<u8>> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder
            .encode(&metric_families, &mut buffer)
            .map_err(|e| Error::MetricsEncoding(e.to_string()))?;
        Ok(buffer)
    }
}

impl std::fmt::Debug for HttpMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpMetrics")
            .field("namespace", &NAMESPACE)
            .field("subsystem", &SUBSYSTEM)
            .finish()
    }
}
