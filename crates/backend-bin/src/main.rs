//! Tokio / Axum entry-point for the Spice Paradise server.
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use spice_backend::{
    auth::{spawn_sweeper, CredentialStore, MemoryCredentialStore, SqliteCredentialStore},
    config::{Settings, DEFAULT_CONFIG_PATH},
    router, AppState,
};

#[derive(Debug, Parser)]
#[command(name = "spice-server", about = "Spice Paradise restaurant web server")]
struct Cli {
    /// Configuration file (TOML)
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Override the bind address
    #[arg(long)]
    bind: Option<SocketAddr>,

    /// Override the accounts database path
    #[arg(long)]
    database: Option<PathBuf>,

    /// Keep accounts in memory instead of SQLite (lost on exit)
    #[arg(long, conflicts_with = "database")]
    in_memory: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut settings = Settings::load_from(&cli.config)
        .with_context(|| format!("loading {}", cli.config.display()))?;
    if let Some(bind) = cli.bind {
        settings.bind_addr = bind;
    }
    if let Some(database) = cli.database {
        settings.database_path = database;
    }

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(settings.log_level.as_str())),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let store: Arc<dyn CredentialStore> = if cli.in_memory {
        tracing::warn!("accounts are kept in memory and will be lost on exit");
        Arc::new(MemoryCredentialStore::new())
    } else {
        let store = SqliteCredentialStore::open(&settings.database_path).with_context(|| {
            format!("opening database {}", settings.database_path.display())
        })?;
        tracing::info!(path = %settings.database_path.display(), "credential store ready");
        Arc::new(store)
    };

    let addr = settings.bind_addr;
    let sweep_interval = settings.sweep_interval();
    let state = AppState::new(store, settings).context("building application state")?;

    let sweeper = sweep_interval.map(|every| spawn_sweeper(state.sessions.clone(), every));

    let app = router::create_router(state);

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    tracing::info!("listening on http://{addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(sweeper) = sweeper {
        sweeper.abort();
    }
    // sessions are in memory only; they go with the process
    tracing::info!("server stopped, all sessions discarded");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}
