use anyhow::Result;
use clap::Args;

use super::open_repo;

#[derive(Args)]
pub struct CommitArgs {
    /// Re-stage every tracked file that changed on disk first
    #[arg(short = 'a', long = "all")]
    all: bool,
}

pub fn run(args: &CommitArgs) -> Result<i32> {
    let repo = open_repo()?;
    if args.all {
        repo.add_changed_files()?;
    }
    let ident = repo.commit(None)?;
    println!("{ident}");
    Ok(0)
}
