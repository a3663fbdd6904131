//! Exporter binary entry point.
//!
//! Core functionality lives in the `dump1090_exporter` library crate;
//! this binary wires configuration, the upstream source, and the HTTP
//! listener together.

use std::net::SocketAddr;
use std::sync::Arc;

use clap::Parser;
use dump1090_exporter::{
    collector::Exporter,
    config::{ConfigError, ExporterConfig},
    feed::{DataSource, FileSource, HttpSource},
    server::{create_router, AppState},
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Prometheus exporter for dump1090 ADS-B feeds.
#[derive(Parser, Debug)]
#[command(name = "dump1090-exporter", version, about, long_about = None)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, env = "DUMP1090_EXPORTER_CONFIG")]
    config: Option<String>,

    /// Server bind address (overrides config file)
    #[arg(long, env = "DUMP1090_EXPORTER_BIND")]
    web_bind: Option<String>,

    /// Server port (overrides config file)
    #[arg(long, env = "DUMP1090_EXPORTER_PORT")]
    web_port: Option<u16>,

    /// Path under which to expose metrics (overrides config file)
    #[arg(long, env = "DUMP1090_EXPORTER_TELEMETRY_PATH")]
    telemetry_path: Option<String>,

    /// Base URL of the dump1090 instance, e.g. http://localhost/dump1090/data
    #[arg(long, env = "DUMP1090_URL")]
    dump1090_url: Option<String>,

    /// Path template for dump1090 JSON files, e.g. /run/dump1090/{}
    #[arg(long, env = "DUMP1090_FILES")]
    dump1090_files: Option<String>,

    /// Comma-separated compass point labels, one per sector
    #[arg(long, env = "DUMP1090_COMPASS_POINTS")]
    compass_points: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,dump1090_exporter=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path);
            ExporterConfig::load(path)?
        }
        None => ExporterConfig::default(),
    };

    // Apply CLI/env overrides (CLI > ENV > config file)
    if let Some(bind) = cli.web_bind {
        config.server.bind = bind;
    }
    if let Some(port) = cli.web_port {
        config.server.port = port;
    }
    if let Some(path) = cli.telemetry_path {
        config.server.telemetry_path = path;
    }
    if let Some(url) = cli.dump1090_url {
        config.source.url = Some(url);
    }
    if let Some(files) = cli.dump1090_files {
        config.source.files = Some(files);
    }
    if let Some(points) = cli.compass_points {
        let points: Vec<String> = points.split(',').map(|p| p.trim().to_string()).collect();
        config.compass.sectors = points.len();
        config.compass.points = points;
    }

    config.validate()?;

    tracing::info!("Starting dump1090-exporter");
    tracing::info!(compass_points = ?config.compass.points, "Compass sectors");

    let source = build_source(&config)?;
    let exporter = Arc::new(Exporter::new(source, config.compass.points.clone()));

    let app = create_router(AppState {
        exporter,
        telemetry_path: config.server.telemetry_path.clone(),
    });

    let addr: SocketAddr = format!("{}:{}", config.server.bind, config.server.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!(
        "Metrics exposed on: http://{}{}",
        addr,
        config.server.telemetry_path
    );
    tracing::info!("Press Ctrl+C to shutdown");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

/// Build the upstream data source selected by configuration.
fn build_source(config: &ExporterConfig) -> Result<Arc<dyn DataSource>, Box<dyn std::error::Error>> {
    match (&config.source.url, &config.source.files) {
        (Some(url), None) => {
            tracing::info!("Fetching from dump1090 at: {}", url);
            Ok(Arc::new(HttpSource::new(url, config.source.timeout)?))
        }
        (None, Some(template)) => {
            tracing::info!("Reading dump1090 JSON files from: {}", template);
            Ok(Arc::new(FileSource::new(template)))
        }
        _ => Err(Box::new(ConfigError::Validation(
            "exactly one of source.url and source.files must be set".to_string(),
        ))),
    }
}

/// Setup graceful shutdown signal handler.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, shutting down");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, shutting down");
        }
    }
}
