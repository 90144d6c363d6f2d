//! Cloud Native App
//!
//! A small HTTP service for exercising a cluster's plumbing: it reports the
//! host and node that served each request, optionally fans out to two peer
//! services, and exposes Prometheus metrics about its own responses.
//!
//! # Architecture
//!
//! ```text
//! request → Instrumented (metrics + access log) → App router → handler
//!                                                          └→ DownstreamClient
//! ```
//!
//! # Modules
//!
//! - [`downstream`] - Client for the peer services
//! - [`environment`] - Host identity and service environment variables
//! - [`error`] - Error types
//! - [`metrics`] - Response counters and latency histograms
//! - [`server`] - Router, handlers, instrumentation and accept loop

pub mod downstream;
pub mod environment;
pub mod error;
pub mod metrics;
pub mod server;

// Re-export commonly used types
pub use downstream::{DownstreamClient, ServiceResponseBody};
pub use environment::{Environment, NodeIdentity, ProcessEnvironment, StaticEnvironment};
pub use error::{Error, Result};
pub use metrics::HttpMetrics;
pub use server::{App, Instrumented};
