mod cli;
mod commands;
mod logging;
mod styles;

use clap::Parser;
use cli::{Cli, Command};
use std::process;

fn main() {
    logging::init_tracing();

    let cli = Cli::parse();
    let result = match &cli.command {
        Command::Identity(args) => commands::identity(args),
        Command::Symbols(args) => commands::symbols(args),
        Command::Sections(args) => commands::sections(args),
        Command::Notes(args) => commands::notes(args),
        Command::Header(args) => commands::header(args),
    };
    if let Err(err) = result {
        styles::warn(&err.to_string());
        process::exit(1);
    }
}
