use anyhow::Result;

use super::open_repo;

pub fn run() -> Result<i32> {
    let repo = open_repo()?;
    let ident = repo.write_tree()?;
    println!("{ident}");
    Ok(0)
}
