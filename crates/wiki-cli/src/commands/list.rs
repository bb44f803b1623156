use anyhow::Result;

use super::open_repo;

pub fn run() -> Result<i32> {
    let repo = open_repo()?;
    for ident in repo.store().list()? {
        println!("{ident}");
    }
    Ok(0)
}
