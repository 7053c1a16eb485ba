//! kube-inspector: probe and identity service.
//!
//! This is the application entry point. It initializes tracing, loads
//! configuration from an optional TOML file and the environment, loads the
//! dashboard templates, sets up the Axum router and starts the HTTP server.

use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use kube_inspector::clock::ProcessClock;
use kube_inspector::config::{AppConfig, DEFAULT_LOG_FILTER};
use kube_inspector::http::start_server;
use kube_inspector::identity::{IdentityResolver, ProcessEnv};
use kube_inspector::readiness::ReadinessGate;
use kube_inspector::routes::create_router;
use kube_inspector::state::AppState;
use kube_inspector::templates::init_templates;

/// kube-inspector: probes, identity and a per-instance counter
#[derive(Parser, Debug)]
#[command(name = "kube-inspector", version, about)]
struct Args {
    /// Path to an optional TOML configuration file
    #[arg(short, long)]
    config: Option<String>,

    /// Log level filter (e.g., "kube_inspector=debug,tower_http=info")
    #[arg(short, long)]
    log_level: Option<String>,

    /// Listen host (overrides http.host)
    #[arg(long)]
    host: Option<String>,

    /// Listen port (overrides http.port)
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let clock = ProcessClock::start();
    let args = Args::parse();

    let mut config = AppConfig::from_file(args.config.as_deref())?;

    // Initialize tracing with priority: CLI > env > default
    let log_filter = args
        .log_level
        .or_else(|| std::env::var("RUST_LOG").ok())
        .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string());

    let registry =
        tracing_subscriber::registry().with(tracing_subscriber::EnvFilter::new(&log_filter));
    if config.logging.is_json() {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    config.apply_env(&ProcessEnv);
    if let Some(host) = args.host {
        config.http.host = host;
    }
    if let Some(port) = args.port {
        config.http.port = port;
    }
    let addr = config.http.socket_addr()?;

    let identity = IdentityResolver::system();
    let hostname = identity
        .hostname()
        .unwrap_or_else(|e| format!("<unavailable: {}>", e));

    tracing::info!("Application starting up");
    tracing::info!(ready_after_secs = config.readiness.delay_secs, "Readiness delay configured");
    tracing::info!(%hostname, "Running on hostname");
    tracing::info!(cors = ?config.cors, "CORS policy configured");

    let tera = init_templates(&config.templates.glob)?;
    tracing::info!(glob = %config.templates.glob, "Initialized templates");

    let readiness = ReadinessGate::new(Arc::new(clock), config.readiness);
    let state = AppState::new(
        config,
        tera,
        readiness,
        identity,
        std::env::args().collect(),
        clock.started_at(),
    );

    let app = create_router(state);
    start_server(app, addr).await?;

    Ok(())
}
