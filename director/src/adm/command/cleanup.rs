use anyhow::Result;
use clap::Parser;

use crate::Opts;
use dockyard::api::v1::cleanup::CleanupRequest;
use dockyard_director::cleanup::run_cleanup_once;
use dockyard_director::config::Config;

/// Delete unused releases, stemcells and other artifacts.
///
/// By default, the most recent unused versions of each release and
/// stemcell are kept, and orphaned disks and VMs are left alone.
#[derive(Debug, Parser)]
pub struct Cleanup {
    /// Remove everything that is not in use.
    #[clap(long)]
    all: bool,
}

pub async fn run(config: Config, opts: Opts) -> Result<()> {
    let sub = opts.command.as_cleanup().unwrap();
    let request = CleanupRequest { remove_all: sub.all };

    let summary = run_cleanup_once(config, request).await?;
    println!("{}", summary);

    Ok(())
}
