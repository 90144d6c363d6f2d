//! Downstream Client
//!
//! Fetches the `{message, version}` record a peer service serves at `/`.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::error::{Error, Result};

/// Body a downstream peer answers `GET /` with
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceResponseBody {
    pub message: String,
    pub version: String,
}

/// Blocking call-and-decode helper for downstream peers.
///
/// No timeout and no retries: a peer that never answers holds the calling
/// request open.
#[derive(Debug, Clone)]
pub struct DownstreamClient {
    client: Client,
}

impl DownstreamClient {
    /// Create a client with its own connection pool
    pub fn new() -> Self {
        Self {
            client: Client::new(),
        }
    }

    /// GET `http://{address}` and decode the JSON record
    #[instrument(skip(self))]
    pub async fn fetch(&self, address: &str) -> Result<ServiceResponseBody> {
        let url = format!("http://{}", address);
        let request_error = |source| Error::DownstreamRequest {
            address: address.to_string(),
            source,
        };

        let response = self.client.get(&url).send().await.map_err(request_error)?;
        let body = response.bytes().await.map_err(request_error)?;

        debug!("Received {} bytes from {}", body.len(), address);

        serde_json::from_slice(&body).map_err(|source| Error::DownstreamDecode {
            address: address.to_string(),
            source,
        })
    }
}

impl Default for DownstreamClient {
    fn default() -> Self {
        Self::new()
    }
}
