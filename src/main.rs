//! Cloud Native App
//!
//! Serves the identity page, the forced-error and redirect endpoints and
//! `/metrics` on a single port.

use std::sync::Arc;

use clap::Parser;
use tracing::{error, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cloud_native_app::error::Result;
use cloud_native_app::server::{self, App};
use cloud_native_app::{DownstreamClient, HttpMetrics, ProcessEnvironment};

// =============================================================================
// CLI Arguments
// =============================================================================

/// Cloud native demo app
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// The port number to run the http server on
    #[arg(long, default_value = "8080")]
    port: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Output logs as JSON
    #[arg(long, env = "LOG_JSON")]
    log_json: bool,
}

// =============================================================================
// Main
// =============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(&args);

    let metrics = HttpMetrics::new().map_err(|e| {
        error!("Failed to register metrics: {}", e);
        e
    })?;

    let app = App::new(
        Arc::new(metrics),
        DownstreamClient::new(),
        Arc::new(ProcessEnvironment),
    );

    let listener = server::bind(&args.port).await.map_err(|e| {
        error!("{}", e);
        e
    })?;

    server::serve(listener, app).await.map_err(|e| {
        error!("Web server error: {}", e);
        e
    })
}

// =============================================================================
// Logging Setup
// =============================================================================

fn init_logging(args: &Args) {
    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let mut filter = EnvFilter::from_default_env().add_directive(level.into());
    for directive in ["hyper=warn", "reqwest=warn"] {
        if let Ok(directive) = directive.parse() {
            filter = filter.add_directive(directive);
        }
    }

    if args.log_json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(true))
            .init();
    }
}
