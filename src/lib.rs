//! Reads the identity of ELF modules: the GNU build id, the .gnu_debuglink file name,
//! and the address ranges of externally visible symbols. These are what a debugger
//! needs to find separate debug info and to map addresses to names before it has
//! parsed any DWARF.
//!
//! ```no_run
//! let identity = elfsym::read_module_identity("/usr/lib/libc.so.6", 1)?;
//! println!("build id: {}", identity.build_id_hex());
//! for symbol in identity.symbols.iter().take(5) {
//!     println!("{} {:x}..{:x}", symbol.name, symbol.low_pc, symbol.high_pc);
//! }
//! # Ok::<(), elfsym::Error>(())
//! ```
pub mod debug;
pub mod elf;
pub mod error;
mod utils;

#[cfg(test)]
mod testing;

pub use debug::{
    DebugLink, ModuleIdentity, SymbolLevel, SymbolRecord, SymbolVector,
    collect_external_symbols, read_module_identity,
};
pub use error::{Error, Result};
