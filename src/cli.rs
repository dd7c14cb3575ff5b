//! Command line arguments.
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(version, about = "Show build ids, debug links, and exported symbols of ELF files", long_about = None)]
#[command(infer_subcommands(true))] // allow abreviations
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Show the build id, debug link, and number of external symbols
    Identity(IdentityArgs),

    /// Show external symbols and the address ranges they cover
    Symbols(SymbolsArgs),

    /// Show section headers
    Sections(TableArgs),

    /// Show the notes in note sections
    Notes(TableArgs),

    /// Show the ELF header
    Header(ExplainArgs),
}

#[derive(Args)]
pub struct ExplainArgs {
    /// Path to an executable, shared object, or core file
    pub path: PathBuf,

    /// Explain columns, fields, etc.
    #[arg(short, long)]
    pub explain: bool,
}

#[derive(Args)]
pub struct TableArgs {
    /// Path to an executable, shared object, or core file
    pub path: PathBuf,

    /// Explain columns, fields, etc.
    #[arg(short, long)]
    pub explain: bool,

    /// Add column headers
    #[arg(short, long)]
    pub titles: bool,
}

#[derive(Args)]
pub struct IdentityArgs {
    /// Path to an executable or shared object
    pub path: PathBuf,

    /// Symbol table to read: 0 for none, 1 prefers .dynsym, 2 prefers .symtab
    #[arg(short, long, default_value_t = 2, allow_negative_numbers = true)]
    pub level: i32,

    /// Explain columns, fields, etc.
    #[arg(short, long)]
    pub explain: bool,
}

#[derive(Args)]
pub struct SymbolsArgs {
    /// Path to an executable or shared object
    pub path: PathBuf,

    /// Symbol table to read: 0 for none, 1 prefers .dynsym, 2 prefers .symtab
    #[arg(short, long, default_value_t = 2, allow_negative_numbers = true)]
    pub level: i32,

    /// Max number of symbols to report, 0 for unlimited
    #[arg(short, long, default_value_t = 0)]
    pub max_results: usize,

    /// Explain columns, fields, etc.
    #[arg(short, long)]
    pub explain: bool,

    /// Add column headers
    #[arg(short, long)]
    pub titles: bool,
}
