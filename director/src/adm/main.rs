mod command;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use enum_as_inner::EnumAsInner;
use tracing_subscriber::EnvFilter;

use command::cleanup::{self, Cleanup};
use command::show_cleanable::{self, ShowCleanable};
use dockyard_director::config;

/// Dockyard Director administration utilities.
#[derive(Debug, Parser)]
#[clap(version)]
#[clap(propagate_version = true)]
pub struct Opts {
    /// Path to the config file.
    #[clap(short = 'f', long)]
    config: Option<PathBuf>,

    /// The sub-command.
    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand, EnumAsInner)]
pub enum Command {
    Cleanup(Cleanup),
    ShowCleanable(ShowCleanable),
}

#[tokio::main]
async fn main() -> Result<()> {
    let opts = Opts::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let config = config::load_config(opts.config.as_deref())?;

    match opts.command {
        Command::Cleanup(_) => cleanup::run(config, opts).await?,
        Command::ShowCleanable(_) => show_cleanable::run(config, opts).await?,
    }

    Ok(())
}
