use anyhow::Result;
use clap::Args;

use super::open_repo;

#[derive(Args)]
pub struct AddObjectArgs {
    /// File whose bytes to store
    filename: String,
}

pub fn run(args: &AddObjectArgs) -> Result<i32> {
    let data = std::fs::read(&args.filename)?;
    let repo = open_repo()?;
    let ident = repo.store().add_blob(&data)?;
    println!("{ident}");
    Ok(0)
}
