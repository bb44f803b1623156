use std::io::IsTerminal;

use anyhow::Result;
use clap::Args;
use wiki_diff::color::render_runs;
use wiki_diff::{CommitSource, DifferenceEngine, FileSource, IndexSource, WorktreeSource};

use super::open_repo;

#[derive(Args)]
pub struct DiffArgs {
    /// Compare a commit against the index instead of the working tree
    #[arg(long)]
    cached: bool,

    /// Commit to diff from, may be a unique prefix (default: current tip)
    commit_ident: Option<String>,
}

pub fn run(args: &DiffArgs) -> Result<i32> {
    let repo = open_repo()?;
    let commit_prefix = args.commit_ident.as_deref();

    let results = if args.cached {
        let commit = CommitSource::new(&repo, commit_prefix)?;
        let index = IndexSource::new(&repo);
        DifferenceEngine::new(&commit, &index).results()?
    } else {
        let worktree = WorktreeSource::new(&repo)?;
        // With an explicit commit diff from it; otherwise from the index.
        let side1: Box<dyn FileSource + '_> = match commit_prefix {
            Some(_) => Box::new(CommitSource::new(&repo, commit_prefix)?),
            None => Box::new(IndexSource::new(&repo)),
        };
        DifferenceEngine::new(side1.as_ref(), &worktree).results()?
    };

    let colored = std::io::stdout().is_terminal();
    for (path, runs) in results {
        println!("--- {path}");
        print!("{}", render_runs(&runs, colored));
    }
    Ok(0)
}
