use anyhow::Result;
use clap::Args;

use super::{open_repo, resolve_ident};

const GREEN: &str = "\x1b[32m";
const RESET: &str = "\x1b[0m";

#[derive(Args)]
pub struct BranchArgs {
    /// Branch to switch to; omit to list branches
    branch_name: Option<String>,

    /// Commit to point the branch at, may be a unique prefix
    commit_ident: Option<String>,
}

pub fn run(args: &BranchArgs) -> Result<i32> {
    let repo = open_repo()?;

    let Some(name) = &args.branch_name else {
        display_branches(&repo)?;
        return Ok(0);
    };

    let ident = match &args.commit_ident {
        Some(prefix) => Some(resolve_ident(&repo, prefix)?),
        None => None,
    };
    repo.switch_branch(name, ident)?;
    Ok(0)
}

fn display_branches(repo: &wiki_repository::Repository) -> Result<()> {
    let active = repo.refs().active_branch()?;
    for branch in repo.refs().local_branches()? {
        if branch == active {
            println!("* {GREEN}{branch}{RESET}");
        } else {
            println!("  {branch}");
        }
    }
    Ok(())
}
