use anyhow::Result;
use clap::Parser;
use gitcontrib::cli::Cli;

fn main() -> Result<()> {
    let cli = Cli::parse();
    cli.execute()
}
