use anyhow::Result;
use clap::Parser;

use crate::Opts;
use dockyard::api::v1::cleanup::CleanupRequest;
use dockyard_director::cleanup::show_cleanable;
use dockyard_director::config::Config;

/// Show what a cleanup would delete.
///
/// The artifacts are printed as JSON. Nothing is deleted.
#[derive(Debug, Parser)]
pub struct ShowCleanable {
    /// Show what `cleanup --all` would delete.
    #[clap(long)]
    all: bool,
}

pub async fn run(config: Config, opts: Opts) -> Result<()> {
    let sub = opts.command.as_show_cleanable().unwrap();
    let request = CleanupRequest { remove_all: sub.all };

    let cleanable = show_cleanable(config, request).await?;
    println!("{}", serde_json::to_string_pretty(&cleanable)?);

    Ok(())
}
