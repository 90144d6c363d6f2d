//! Metrics module
//!
//! Provides the request counters and latency histograms exposed at `/metrics`.

mod registry;

pub use registry::HttpMetrics;
