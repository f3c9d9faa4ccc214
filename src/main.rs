//! Command line interface for operating the service. Supports initializing
//! the store, ingesting event files through the full normalization pipeline,
//! and serving the HTTP API.

mod booking;
mod config;
mod db;
mod error;
mod event;
mod normalize;
mod server;
mod slug;
mod store;

use std::{fs, net::SocketAddr, path::Path};

use clap::{Parser, Subcommand};
use tokio::signal;
use tracing::info;
use tracing_subscriber::EnvFilter;

use config::Settings;
use store::Store;

/// Command line interface entry point.
#[derive(Parser)]
#[command(
    name = "billet",
    author,
    version,
    about = "Event listing and booking service"
)]
struct Cli {
    /// Path to the `.env` configuration file.
    #[arg(long, default_value = ".env")]
    env: String,
    /// Subcommand to execute.
    #[command(subcommand)]
    command: Commands,
}

/// Supported CLI subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Initialize the store directory tree at `DATABASE_URL`.
    Init,
    /// Normalize and ingest one or more event JSON files.
    Ingest {
        /// Paths to JSON event files to ingest.
        #[arg(required = true)]
        files: Vec<String>,
    },
    /// Launch the HTTP service.
    Serve,
}

/// Execute the selected CLI subcommand.
async fn run(cli: Cli) -> anyhow::Result<()> {
    ensure_env_file(&cli.env)?;
    let cfg = Settings::from_env(&cli.env)?;
    match cli.command {
        Commands::Init => {
            // Create the on-disk directory structure.
            Store::open(cfg.database_url.clone())?;
        }
        Commands::Ingest { files } => {
            let store = Store::open(cfg.database_url.clone())?;
            for f in files {
                let data = fs::read_to_string(&f)?;
                let input: event::EventInput = serde_json::from_str(&data)?;
                let record = event::EventRecord::create(input, &store)?;
                store.save_event(&record)?;
                println!("{f} -> {}", record.slug);
            }
        }
        Commands::Serve => {
            tracing_subscriber::fmt()
                .with_env_filter(EnvFilter::from_default_env())
                .init();
            let addr: SocketAddr = cfg.bind_http.parse()?;
            let db = db::Database::new(cfg.database_url.clone());
            server::serve_http(addr, db, shutdown_signal()).await?;
        }
    }
    Ok(())
}

/// Resolve when the process receives Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if signal::ctrl_c().await.is_ok() {
            info!("received Ctrl+C, shutting down");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut term) => {
                term.recv().await;
                info!("received terminate signal, shutting down");
            }
            Err(_) => std::future::pending().await,
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

/// Create a default `.env` file if one is not already present at `path`.
fn ensure_env_file(path: &str) -> anyhow::Result<()> {
    let env_path = Path::new(path);
    if env_path.exists() {
        return Ok(());
    }
    if let Some(parent) = env_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let base_dir = match env_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => std::env::current_dir()?,
    };
    let store_root = base_dir.join("billet-data");
    let mut content = String::new();
    content.push_str(&format!(
        "DATABASE_URL={}\n",
        store_root.to_string_lossy()
    ));
    content.push_str("BIND_HTTP=127.0.0.1:7070\n");
    fs::write(env_path, content)?;
    Ok(())
}

#[cfg(not(test))]
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    run(cli).await
}
