use anyhow::{anyhow, Result};
use clap::Args;
use wiki_merge::MergeEngine;

use super::open_repo;

#[derive(Args)]
pub struct MergeArgs {
    /// Branch to merge into the active one
    branch_name: String,
}

pub fn run(args: &MergeArgs) -> Result<i32> {
    let repo = open_repo()?;

    let active = repo.refs().active_branch()?;
    let local_tip = repo
        .refs()
        .branch_tip(&active)?
        .ok_or_else(|| anyhow!("branch {active} has no commits"))?;
    let merge_tip = repo
        .refs()
        .branch_tip(&args.branch_name)?
        .ok_or_else(|| anyhow!("no such branch: {}", args.branch_name))?;

    let ident = MergeEngine::new(&repo).merge(&local_tip, &merge_tip)?;
    println!("{ident}");
    Ok(0)
}
