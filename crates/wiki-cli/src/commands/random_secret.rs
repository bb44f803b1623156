use anyhow::Result;
use wiki_hash::hex::hex_to_string;

pub fn run() -> Result<i32> {
    let secret = wiki_crypto::random_secret();
    println!("{}", hex_to_string(&secret));
    Ok(0)
}
