pub mod add;
pub mod add_object;
pub mod authorize;
pub mod branch;
pub mod commit;
pub mod diff;
pub mod init;
pub mod list;
pub mod log;
pub mod merge;
pub mod random_secret;
pub mod read_index;
pub mod rm;
pub mod show;
pub mod sync;
pub mod to_public;
pub mod update_index;
pub mod write_tree;

use anyhow::{anyhow, Result};
use clap::Subcommand;
use wiki_hash::Ident;
use wiki_repository::Repository;

use crate::Cli;

#[derive(Subcommand)]
pub enum Commands {
    /// Create an empty repository in the current directory
    Init,
    /// Store a file's bytes as a blob without touching the index
    AddObject(add_object::AddObjectArgs),
    /// Stage a file
    Add(add::AddArgs),
    /// Unstage a file
    Rm(rm::RmArgs),
    /// List all stored object identifiers
    List,
    /// Manipulate the index directly
    UpdateIndex(update_index::UpdateIndexArgs),
    /// Print the staged entries
    ReadIndex,
    /// Assemble the index into tree objects and print the root identifier
    WriteTree,
    /// Print an object's contents
    Show(show::ShowArgs),
    /// Print an object's kind
    Type(show::TypeArgs),
    /// Record the staged tree as a new commit
    Commit(commit::CommitArgs),
    /// Print the commit chain of the current branch
    Log,
    /// Compare commits, the index, and the working tree
    Diff(diff::DiffArgs),
    /// List branches or switch to one
    Branch(branch::BranchArgs),
    /// Merge a branch into the active one
    Merge(merge::MergeArgs),
    /// Generate a fresh secret key
    RandomSecret,
    /// Derive the public key for a secret
    ToPublic(to_public::ToPublicArgs),
    /// Authorize a peer's public key
    Authorize(authorize::AuthorizeArgs),
    /// Run the synchronization node
    Sync(sync::SyncArgs),
}

pub fn run(cli: Cli) -> Result<i32> {
    match &cli.command {
        Commands::Init => init::run(),
        Commands::AddObject(args) => add_object::run(args),
        Commands::Add(args) => add::run(args),
        Commands::Rm(args) => rm::run(args),
        Commands::List => list::run(),
        Commands::UpdateIndex(args) => update_index::run(args),
        Commands::ReadIndex => read_index::run(),
        Commands::WriteTree => write_tree::run(),
        Commands::Show(args) => show::run(args),
        Commands::Type(args) => show::run_type(args),
        Commands::Commit(args) => commit::run(args),
        Commands::Log => log::run(),
        Commands::Diff(args) => diff::run(args),
        Commands::Branch(args) => branch::run(args),
        Commands::Merge(args) => merge::run(args),
        Commands::RandomSecret => random_secret::run(),
        Commands::ToPublic(args) => to_public::run(args),
        Commands::Authorize(args) => authorize::run(args),
        Commands::Sync(args) => sync::run(args),
    }
}

/// Open the repository containing the current directory.
pub(crate) fn open_repo() -> Result<Repository> {
    Ok(Repository::discover()?)
}

/// Resolve an ident prefix or fail the way the CLI reports misses.
pub(crate) fn resolve_ident(repo: &Repository, prefix: &str) -> Result<Ident> {
    repo.store()
        .fuzzy_match(prefix)?
        .ok_or_else(|| anyhow!("ident not found"))
}

/// Decode a 64-character hex key argument.
pub(crate) fn parse_key(hex: &str) -> Result<[u8; 32]> {
    let bytes = wiki_hash::hex::hex_to_bytes(hex)?;
    let key: [u8; 32] = bytes
        .try_into()
        .map_err(|_| anyhow!("expected a 64-character hex key"))?;
    Ok(key)
}
