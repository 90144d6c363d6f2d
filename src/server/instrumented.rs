//! Instrumented service wrapper
//!
//! Decorates any request-handling service with response counting, latency
//! observation and an access log line, without changing what it returns.

use std::future::Future;
use std::net::SocketAddr;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Instant;

use hyper::service::Service;
use hyper::{Request, Response};
use tracing::info;

use crate::metrics::HttpMetrics;

/// Wraps an inner service and records every response it produces.
///
/// One instance per connection: it carries the peer address for the log
/// line, while the metrics are shared by all connections.
#[derive(Debug, Clone)]
pub struct Instrumented<S> {
    inner: S,
    metrics: Arc<HttpMetrics>,
    remote_addr: SocketAddr,
}

impl<S> Instrumented<S> {
    /// Wrap `inner`, recording into `metrics`
    pub fn new(inner: S, metrics: Arc<HttpMetrics>, remote_addr: SocketAddr) -> Self {
        Self {
            inner,
            metrics,
            remote_addr,
        }
    }
}

impl<S, B, R> Service<Request<B>> for Instrumented<S>
where
    S: Service<Request<B>, Response = Response<R>>,
    S::Future: Send + 'static,
    S::Error: Send + 'static,
    R: Send + 'static,
{
    type Response = Response<R>;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn call(&self, req: Request<B>) -> Self::Future {
        let method = req.method().clone();
        let uri = req.uri().clone();
        let metrics = self.metrics.clone();
        let remote_addr = self.remote_addr;

        let start = Instant::now();
        let fut = self.inner.call(req);

        Box::pin(async move {
            let result = fut.await;

            // Errors are the inner service's to report; only responses count
            if let Ok(response) = &result {
                let elapsed_ms = start.elapsed().as_millis() as u64;
                let status = response.status();
                let code = status.as_u16().to_string();

                metrics.increment_counter(&code, method.as_str());
                metrics.observe_latency(&code, method.as_str(), elapsed_ms as f64);

                info!(
                    remote_addr = %remote_addr,
                    path = %uri,
                    status = status.as_u16(),
                    method = %method,
                    elapsed_ms,
                    "Handled request"
                );
            }

            result
        })
    }
}
