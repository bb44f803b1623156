use anyhow::Result;
use clap::Args;
use wiki_protocol::Keyring;

use super::{open_repo, parse_key};

#[derive(Args)]
pub struct AuthorizeArgs {
    /// Peer public key in hex
    public: String,
}

pub fn run(args: &AuthorizeArgs) -> Result<i32> {
    let repo = open_repo()?;
    let public = parse_key(&args.public)?;
    Keyring::open(repo.dot_path()).add_public_key(&public)?;
    Ok(0)
}
