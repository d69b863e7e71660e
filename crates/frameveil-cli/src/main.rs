use clap::Parser;

mod cli;
mod commands;

use cli::{CliArgs, Commands};

pub(crate) type CliResult<T> = frameveil_core::Result<T>;

fn main() -> CliResult<()> {
    env_logger::init();

    let args = CliArgs::parse();
    let options = args.options();

    match args.command {
        Commands::Embed(embed) => embed.run(options),
        Commands::Extract(extract) => extract.run(options),
    }
}
