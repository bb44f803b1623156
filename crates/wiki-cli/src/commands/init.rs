use anyhow::Result;
use wiki_repository::Repository;

pub fn run() -> Result<i32> {
    let dir = std::env::current_dir()?;
    Repository::init(&dir)?;
    Ok(0)
}
