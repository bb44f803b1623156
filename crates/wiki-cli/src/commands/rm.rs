use std::path::Path;

use anyhow::Result;
use clap::Args;

use super::open_repo;

#[derive(Args)]
pub struct RmArgs {
    /// File to unstage
    filename: String,
}

pub fn run(args: &RmArgs) -> Result<i32> {
    let repo = open_repo()?;
    let rel = repo.relative_path(Path::new(&args.filename))?;
    repo.index().remove(&rel)?;
    Ok(0)
}
