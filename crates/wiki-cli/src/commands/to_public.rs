use anyhow::Result;
use clap::Args;
use wiki_hash::hex::hex_to_string;

use super::parse_key;

#[derive(Args)]
pub struct ToPublicArgs {
    /// Secret key in hex
    secret: String,
}

pub fn run(args: &ToPublicArgs) -> Result<i32> {
    let secret = parse_key(&args.secret)?;
    let public = wiki_crypto::secret_to_public(&secret);
    println!("{}", hex_to_string(&public));
    Ok(0)
}
