// GymFlow - Web Server
// REST API over the JSON store, plus the prebuilt frontend

use anyhow::{Context, Result};
use clap::Parser;
use gymflow::{Repository, ServerConfig, VERSION};
use std::sync::Arc;
use tracing::info;

fn init_logging() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,tower_http=debug"));
    let json = std::env::var("GYMFLOW_LOG_JSON").ok().as_deref() == Some("1");
    if json {
        tracing_subscriber::fmt().with_env_filter(filter).json().with_target(true).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).with_target(true).init();
    }
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();
    let config = ServerConfig::parse();

    // Load once up front: a missing or corrupt data file is replaced here
    // rather than on the first request
    let repo = Arc::new(Repository::open(&config.data_file));
    let store = repo
        .load()
        .with_context(|| format!("Failed to initialize store at {:?}", config.data_file))?;
    info!(
        backend = %repo.backend().describe(),
        members = store.members.len(),
        classes = store.classes.len(),
        staff = store.staff.len(),
        invoices = store.invoices.len(),
        "store ready"
    );

    if !config.index_file().exists() {
        tracing::warn!(path = ?config.index_file(), "frontend entry document not found");
    }

    let app = gymflow::http::router(repo, &config);

    let addr = config.listen_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    info!(version = VERSION, bind = %addr, "GymFlow backend running at http://localhost:{}", config.port);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    Ok(())
}
