use clap::Parser;
use miette::Result;
use ltx::cli::{Cli, Commands};

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Dump(args) => ltx::cli::dump::run(args)?,
        Commands::Get(args) => ltx::cli::get::run(args)?,
        Commands::Loot(args) => ltx::cli::loot::run(args)?,
        Commands::Check(args) => ltx::cli::check::run(args)?,
        Commands::Completions(args) => ltx::cli::completions::run(args)?,
    }

    Ok(())
}
