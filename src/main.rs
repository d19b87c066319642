use anyhow::Result;
use clap::Parser;
use gitpulse::cli::Cli;

fn main() -> Result<()> {
    let cli = Cli::parse();
    cli.execute()
}
