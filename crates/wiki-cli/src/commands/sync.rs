use anyhow::Result;
use clap::Args;
use tracing_subscriber::EnvFilter;
use wiki_protocol::Node;

use super::{open_repo, parse_key};

#[derive(Args)]
pub struct SyncArgs {
    /// Port to publish on
    port: u16,

    /// This node's secret key in hex
    secret: String,
}

pub fn run(args: &SyncArgs) -> Result<i32> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let repo = open_repo()?;
    let secret = parse_key(&args.secret)?;
    let node = Node::new(repo, args.port, secret);

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let local = tokio::task::LocalSet::new();
    runtime.block_on(local.run_until(node.run()))?;
    Ok(0)
}
