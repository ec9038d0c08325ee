use anyhow::Result;
use clap::Parser;
use plata::cli::Cli;

fn main() -> Result<()> {
    let cli = Cli::parse();
    cli.run()
}
