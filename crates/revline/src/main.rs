// SPDX-FileCopyrightText: 2026 Revline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Revline - lead intake, notification and operator service.
//!
//! This is the binary entry point.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod serve;
mod shutdown;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use revline_config::RevlineConfig;
use revline_core::StorageAdapter;
use revline_storage::SqliteStorage;

/// Revline - lead intake, notification and operator service.
#[derive(Parser, Debug)]
#[command(name = "revline", version, about, long_about = None)]
struct Cli {
    /// Read configuration from this file instead of the standard locations.
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the HTTP server.
    Serve,
    /// Validate configuration and exit.
    CheckConfig,
    /// Create or upgrade the database schema and exit.
    Migrate,
}

fn load_config(path: Option<&PathBuf>) -> RevlineConfig {
    let loaded = match path {
        Some(path) => revline_config::load_and_validate_path(path),
        None => revline_config::load_and_validate(),
    };
    match loaded {
        Ok(config) => config,
        Err(errors) => {
            revline_config::render_errors(&errors);
            std::process::exit(1);
        }
    }
}

fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("revline={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}

async fn migrate(config: &RevlineConfig) -> Result<(), revline_core::RevlineError> {
    let storage = SqliteStorage::new(config.storage.clone());
    storage.initialize().await?;
    storage.close().await?;
    tracing::info!(path = %config.storage.database_path, "database schema is up to date");
    Ok(())
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_ref());
    init_tracing(&config.logging.level);

    let result = match cli.command {
        Some(Commands::Serve) => serve::run_serve(config).await,
        Some(Commands::CheckConfig) => {
            println!(
                "revline: configuration is valid (listen {}:{}, database {})",
                config.server.host, config.server.port, config.storage.database_path
            );
            Ok(())
        }
        Some(Commands::Migrate) => migrate(&config).await,
        None => {
            println!("revline: use --help for available commands");
            Ok(())
        }
    };

    if let Err(e) = result {
        tracing::error!(error = %e, "revline exited with an error");
        eprintln!("revline: {e}");
        std::process::exit(1);
    }
}
