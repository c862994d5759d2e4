use std::env;
use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, ValueEnum};
use tokio::task::spawn;
use tracing_error::ErrorLayer;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

use dockyard::api::v1::cleanup::CleanupRequest;
use dockyard_director::{cleanup, config};

/// Deployment director with scheduled artifact cleanup.
#[derive(Debug, Parser)]
#[clap(version)]
#[clap(propagate_version = true)]
struct Opts {
    /// Path to the config file.
    #[clap(short = 'f', long)]
    config: Option<PathBuf>,

    /// Mode to run.
    #[clap(long, default_value = "monolithic")]
    mode: ServerMode,

    /// Whether a one-off cleanup removes everything unused.
    ///
    /// Only used with `--mode cleanup-once`.
    #[clap(long)]
    remove_all: bool,

    /// Whether to enable tokio-console.
    ///
    /// The console server will listen on its default port.
    #[clap(long)]
    tokio_console: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ServerMode {
    /// Run all components.
    Monolithic,

    /// Run the artifact cleanup periodically.
    Cleanup,

    /// Run one artifact cleanup then exit.
    CleanupOnce,

    /// Run the database migrations then exit.
    DbMigrations,

    /// Check the configuration then exit.
    CheckConfig,
}

#[tokio::main]
async fn main() -> Result<()> {
    let opts = Opts::parse();

    init_logging(opts.tokio_console);
    dump_version();

    let config = config::load_config(opts.config.as_deref())?;

    match opts.mode {
        ServerMode::Monolithic => {
            dockyard_director::run_migrations(config.clone()).await?;
            dockyard_director::run_director(config).await?;
        }
        ServerMode::Cleanup => {
            cleanup::run_cleanup(config).await;
        }
        ServerMode::CleanupOnce => {
            let request = CleanupRequest {
                remove_all: opts.remove_all,
            };
            let summary = cleanup::run_cleanup_once(config, request).await?;
            eprintln!("{}", summary);
        }
        ServerMode::DbMigrations => {
            dockyard_director::run_migrations(config).await?;
        }
        ServerMode::CheckConfig => {
            // config is valid, let's just exit :)
        }
    }

    Ok(())
}

fn init_logging(tokio_console: bool) {
    let env_filter = EnvFilter::from_default_env();
    let fmt_layer = tracing_subscriber::fmt::layer().with_filter(env_filter);

    let error_layer = ErrorLayer::default();

    let console_layer = if tokio_console {
        let (layer, server) = console_subscriber::ConsoleLayer::new();
        spawn(server.serve());
        Some(layer)
    } else {
        None
    };

    tracing_subscriber::registry()
        .with(fmt_layer)
        .with(error_layer)
        .with(console_layer)
        .init();

    if tokio_console {
        eprintln!("Note: tokio-console is enabled");
    }
}

fn dump_version() {
    #[cfg(debug_assertions)]
    eprintln!("Dockyard Director {} (debug)", env!("CARGO_PKG_VERSION"));

    #[cfg(not(debug_assertions))]
    eprintln!("Dockyard Director {} (release)", env!("CARGO_PKG_VERSION"));
}
