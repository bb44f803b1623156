mod commands;

use std::process;

use anyhow::Result;
use clap::Parser;

use commands::Commands;

#[derive(Parser)]
#[command(name = "darkwiki", about = "A distributed content-addressed wiki engine")]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

fn main() {
    let cli = Cli::parse();
    match run(cli) {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("darkwiki: {e}");
            process::exit(255);
        }
    }
}

fn run(cli: Cli) -> Result<i32> {
    commands::run(cli)
}
