//! HTTP Server
//!
//! Routes requests to the handlers, wraps every connection in the
//! [`Instrumented`] decorator and runs the accept loop.

pub mod handlers;
mod instrumented;
#[cfg(test)]
mod proptest;

pub use instrumented::Instrumented;

use std::convert::Infallible;
use std::future::Future;
use std::net::SocketAddr;
use std::pin::Pin;
use std::sync::Arc;

use hyper::server::conn::http1;
use hyper::service::Service;
use hyper::{Request, Response};
use hyper_util::rt::TokioIo;
use tokio::net::TcpListener;
use tracing::{error, info};

use crate::downstream::DownstreamClient;
use crate::environment::Environment;
use crate::error::{Error, Result};
use crate::metrics::HttpMetrics;
use handlers::Body;

// =============================================================================
// Router
// =============================================================================

/// The application's request router.
///
/// `/metrics`, `/cause_500` and `/redirect_me` are matched exactly; every
/// other path goes to the home handler.
#[derive(Clone)]
pub struct App {
    metrics: Arc<HttpMetrics>,
    downstream: DownstreamClient,
    env: Arc<dyn Environment>,
}

impl App {
    /// Create a router over the given registry, peer client and environment
    pub fn new(
        metrics: Arc<HttpMetrics>,
        downstream: DownstreamClient,
        env: Arc<dyn Environment>,
    ) -> Self {
        Self {
            metrics,
            downstream,
            env,
        }
    }

    /// Registry shared with the instrumentation
    pub fn metrics(&self) -> &Arc<HttpMetrics> {
        &self.metrics
    }
}

impl std::fmt::Debug for App {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("App")
            .field("metrics", &self.metrics)
            .finish_non_exhaustive()
    }
}

impl<B> Service<Request<B>> for App {
    type Response = Response<Body>;
    type Error = Infallible;
    type Future = Pin<Box<dyn Future<Output = std::result::Result<Response<Body>, Infallible>> + Send>>;

    fn call(&self, req: Request<B>) -> Self::Future {
        let path = req.uri().path().to_string();
        let app = self.clone();

        Box::pin(async move {
            let response = match path.as_str() {
                "/metrics" => handlers::metrics(&app.metrics),
                "/cause_500" => handlers::cause_500(),
                "/redirect_me" => handlers::redirect_me(),
                _ => handlers::home(&path, app.env.as_ref(), &app.downstream).await,
            };
            Ok(response)
        })
    }
}

// =============================================================================
// Listener
// =============================================================================

/// Bind `0.0.0.0:{port}`
pub async fn bind(port: &str) -> Result<TcpListener> {
    let addr = format!("0.0.0.0:{}", port);
    let socket_addr: SocketAddr = addr.parse().map_err(|e: std::net::AddrParseError| {
        Error::InvalidAddress {
            addr: addr.clone(),
            reason: e.to_string(),
        }
    })?;

    TcpListener::bind(socket_addr)
        .await
        .map_err(|source| Error::Bind { addr, source })
}

/// Accept connections forever, one task per connection
pub async fn serve(listener: TcpListener, app: App) -> Result<()> {
    info!("Starting web server on {}", listener.local_addr()?);

    loop {
        let (stream, remote_addr) = listener.accept().await?;

        let io = TokioIo::new(stream);
        let service = Instrumented::new(app.clone(), app.metrics().clone(), remote_addr);

        tokio::spawn(async move {
            if let Err(e) = http1::Builder::new().serve_connection(io, service).await {
                error!("Connection error from {}: {}", remote_addr, e);
            }
        });
    }
}
