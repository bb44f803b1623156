use anyhow::Result;

use super::open_repo;

pub fn run() -> Result<i32> {
    let repo = open_repo()?;
    for entry in repo.index().read()? {
        println!("{} {} {}", entry.mode, entry.ident, entry.path);
    }
    Ok(0)
}
