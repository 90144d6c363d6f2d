//! Route handlers
//!
//! Each handler turns a request into a complete response. None of them keep
//! state between requests.

use bytes::Bytes;
use http_body_util::Full;
use hyper::header::{HeaderValue, CONTENT_TYPE, LOCATION};
use hyper::{Response, StatusCode};
use tracing::{error, info, warn};

use crate::downstream::{DownstreamClient, ServiceResponseBody};
use crate::environment::{Environment, NodeIdentity};
use crate::error::Result;
use crate::metrics::HttpMetrics;

/// Response body type used by every handler
pub type Body = Full<Bytes>;

const TEXT_PLAIN: &str = "text/plain; charset=utf-8";
const TEXT_HTML: &str = "text/html; charset=utf-8";

/// Body of the forced 500
pub const CAUSE_500_BODY: &str = "Intentionally caused a 500 error.";

fn text_response(status: StatusCode, content_type: &'static str, body: impl Into<Bytes>) -> Response<Body> {
    let mut response = Response::new(Full::new(body.into()));
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
    response
}

/// 404 for any path nothing serves
pub fn not_found() -> Response<Body> {
    text_response(StatusCode::NOT_FOUND, TEXT_PLAIN, "404 page not found\n")
}

// =============================================================================
// Home
// =============================================================================

/// Identity page, enriched with whatever the configured peers report
pub async fn home(path: &str, env: &dyn Environment, downstream: &DownstreamClient) -> Response<Body> {
    if path != "/" {
        return not_found();
    }

    let identity = NodeIdentity::load(env);

    let foo = match &identity.foo_service_addr {
        Some(addr) => Some(call_peer("foo", addr, downstream).await),
        None => None,
    };

    let bar = match &identity.bar_service_addr {
        Some(addr) => Some(call_peer("bar", addr, downstream).await),
        None => None,
    };

    let body = render_home(&identity, foo.as_ref(), bar.as_ref());
    text_response(StatusCode::OK, TEXT_PLAIN, body)
}

async fn call_peer(
    name: &str,
    addr: &str,
    downstream: &DownstreamClient,
) -> Result<ServiceResponseBody> {
    info!("Calling {} service at {}", name, addr);
    let outcome = downstream.fetch(addr).await;
    if let Err(e) = &outcome {
        warn!("{} service call failed: {}", name, e);
    }
    outcome
}

/// Build the home page text.
///
/// A peer that was not configured gets no section at all; a peer that failed
/// gets a section carrying the error instead of its record.
pub fn render_home(
    identity: &NodeIdentity,
    foo: Option<&Result<ServiceResponseBody>>,
    bar: Option<&Result<ServiceResponseBody>>,
) -> String {
    let mut body = format!(
        "You've hit the home page of the cloud native app with hostname \"{}\" on node \"{}\".\n",
        identity.hostname, identity.node_name
    );

    for (name, outcome) in [("foo", foo), ("bar", bar)] {
        let Some(outcome) = outcome else {
            continue;
        };

        match outcome {
            Ok(record) => body.push_str(&format!(
                "{} response:\n message -> {}\n version -> {}\n",
                name, record.message, record.version
            )),
            Err(e) => body.push_str(&format!("{} response:\n error -> {}\n", name, e)),
        }
    }

    body
}

// =============================================================================
// Fixed Responses
// =============================================================================

/// Always 500, to exercise error-path alerting
pub fn cause_500() -> Response<Body> {
    text_response(StatusCode::INTERNAL_SERVER_ERROR, TEXT_PLAIN, CAUSE_500_BODY)
}

/// Always 302 to the home page
pub fn redirect_me() -> Response<Body> {
    let mut response = text_response(StatusCode::FOUND, TEXT_HTML, "<a href=\"/\">Found</a>.\n\n");
    response
        .headers_mut()
        .insert(LOCATION, HeaderValue::from_static("/"));
    response
}

// =============================================================================
// Metrics
// =============================================================================

/// Prometheus text exposition of the registry
pub fn metrics(registry: &HttpMetrics) -> Response<Body> {
    match registry.encode() {
        Ok(buffer) => {
            let mut response = Response::new(Full::new(Bytes::from(buffer)));
            if let Ok(value) = HeaderValue::from_str(&registry.content_type()) {
                response.headers_mut().insert(CONTENT_TYPE, value);
            }
            response
        }
        Err(e) => {
            error!("Failed to encode metrics: {}", e);
            text_response(StatusCode::INTERNAL_SERVER_ERROR, TEXT_PLAIN, e.to_string())
        }
    }
}
