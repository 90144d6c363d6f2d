//! Error types for the cloud native app

use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in the cloud native app
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Listen address could not be parsed
    #[error("Invalid listen address {addr}: {reason}")]
    InvalidAddress { addr: String, reason: String },

    /// Listener could not be bound
    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    /// Collector registration failed (duplicate name, bad descriptor)
    #[error("Metrics registration failed: {0}")]
    MetricsRegistration(#[from] prometheus::Error),

    /// Metrics exposition could not be encoded
    #[error("Metrics encoding failed: {0}")]
    MetricsEncoding(String),

    /// Downstream peer could not be reached
    #[error("Request to downstream service {address} failed: {source}")]
    DownstreamRequest {
        address: String,
        #[source]
        source: reqwest::Error,
    },

    /// Downstream peer answered with something other than the expected JSON
    #[error("Failed to decode response from downstream service {address}: {source}")]
    DownstreamDecode {
        address: String,
        #[source]
        source: serde_json::Error,
    },
}
