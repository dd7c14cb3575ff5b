//! Handlers for the subcommands, e.g. `elfsym symbols`.
pub mod elf;
pub mod module;
pub mod tables;

pub use elf::*;
pub use module::*;
