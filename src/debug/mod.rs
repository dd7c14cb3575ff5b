//! Extracts the information a debugger needs before it reads any DWARF: the module's
//! build id and debug link (used to find a separate debug file) and the address ranges
//! of the symbols it exports. Everything here sits on top of the ELF walker in
//! crate::elf and returns owned values.
pub mod extract;
pub mod identity;
pub mod module;
pub mod symbols;

pub use extract::*;
pub use identity::*;
pub use module::*;
pub use symbols::*;
