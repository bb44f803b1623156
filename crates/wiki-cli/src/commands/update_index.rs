use anyhow::{bail, Result};
use clap::Args;

use super::{open_repo, resolve_ident};

#[derive(Args)]
pub struct UpdateIndexArgs {
    /// Empty the index
    #[arg(long)]
    clear: bool,

    /// Stage an entry directly: MODE IDENT PATH
    #[arg(long, num_args = 3, value_names = ["MODE", "IDENT", "PATH"])]
    cacheinfo: Vec<String>,
}

pub fn run(args: &UpdateIndexArgs) -> Result<i32> {
    let repo = open_repo()?;

    if args.clear {
        repo.index().clear()?;
        return Ok(0);
    }

    if args.cacheinfo.len() != 3 {
        bail!("update-index needs --clear or --cacheinfo MODE IDENT PATH");
    }
    let mode = &args.cacheinfo[0];
    let ident = resolve_ident(&repo, &args.cacheinfo[1])?;
    let path = &args.cacheinfo[2];
    repo.index().update(mode, ident, path)?;
    Ok(0)
}
