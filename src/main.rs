//! DB Scanner service
//!
//! Serves the one-hop foreign-key neighborhood of any table in a PostgreSQL
//! schema over HTTP.
//!
//! ```bash
//! export DATABASE_URL=postgres://scanner@localhost/shop
//! cargo run -- --port 5000
//! curl 'http://localhost:5000/metadata?table_name=orders'
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use dbscan_core::{DbScanConfig, MetadataStore};
use dbscan_engine::NeighborhoodService;
use dbscan_server::create_router;
use dbscan_store::PostgresMetadataStore;
use dbscan_telemetry::{init_telemetry, shutdown_telemetry};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Debug, Parser)]
#[command(name = "dbscanner", version, about = "Inspect a table's schema neighborhood")]
struct Cli {
    /// Path to the configuration file (default: dbscanner.toml, searched upward)
    #[arg(short, long, env = "DBSCAN_CONFIG")]
    config: Option<PathBuf>,

    /// Address to bind, overrides server.host
    #[arg(long)]
    host: Option<String>,

    /// Port to bind, overrides server.port
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env file is fine
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let mut config = DbScanConfig::load(cli.config.as_deref())?;
    if let Some(host) = cli.host {
        config.server.host = host;
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }

    init_telemetry(&config.observability)?;
    tracing::info!("Logger initialized successfully!");
    match &config.source {
        Some(path) => tracing::info!(path = %path.display(), "Loaded configuration"),
        None => tracing::info!("No dbscanner.toml found, using defaults"),
    }

    let store: Arc<dyn MetadataStore> = Arc::new(
        PostgresMetadataStore::connect(&config.database)
            .await
            .context("Failed to connect to the metadata store")?,
    );
    let service = Arc::new(NeighborhoodService::new(store, &config.neighborhood));
    let app = create_router(service);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    tracing::info!(address = %addr, "DB Scanner listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    shutdown_telemetry();
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}
