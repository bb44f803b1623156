use anyhow::Result;
use clap::Args;
use wiki_object::Object;

use super::{open_repo, resolve_ident};

#[derive(Args)]
pub struct ShowArgs {
    /// Object identifier, may be a unique prefix
    ident: String,
}

#[derive(Args)]
pub struct TypeArgs {
    /// Object identifier, may be a unique prefix
    ident: String,
}

pub fn run(args: &ShowArgs) -> Result<i32> {
    let repo = open_repo()?;
    let ident = resolve_ident(&repo, &args.ident)?;

    match repo.store().fetch(&ident)? {
        Object::Blob(data) => {
            println!("{}", String::from_utf8(data)?);
        }
        Object::Tree(entries) => {
            for entry in entries {
                println!("{} {} {} {}", entry.mode, entry.kind, entry.ident, entry.name);
            }
        }
        Object::Commit(record) => {
            println!("{}", serde_json::to_string_pretty(&record)?);
        }
    }
    Ok(0)
}

pub fn run_type(args: &TypeArgs) -> Result<i32> {
    let repo = open_repo()?;
    let ident = resolve_ident(&repo, &args.ident)?;
    println!("{}", repo.store().object_kind(&ident)?);
    Ok(0)
}
