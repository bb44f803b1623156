use std::path::Path;

use anyhow::Result;
use clap::Args;

use super::open_repo;

#[derive(Args)]
pub struct AddArgs {
    /// File to stage
    filename: String,
}

pub fn run(args: &AddArgs) -> Result<i32> {
    let repo = open_repo()?;
    let rel = repo.relative_path(Path::new(&args.filename))?;
    repo.add_file(&rel)?;
    Ok(0)
}
