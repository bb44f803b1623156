use anyhow::Result;

use super::open_repo;

pub fn run() -> Result<i32> {
    let repo = open_repo()?;
    for (ident, record) in repo.log()? {
        println!("{ident}");
        println!("{} {:+}", record.timestamp, record.utc_offset);
        println!();
    }
    Ok(0)
}
