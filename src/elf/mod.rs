//! Generic ELF file support for executables and shared objects. This module knows how
//! to walk the structure of a file but not what the debugger wants out of it, see the
//! debug module for that.
//! Quick ELF reference: https://gist.github.com/x0nu11byt3/bcb35c3de461e5fb66173071a2379779
//!
//! ELF files start with an ELF header which includes:
//! * A magic number to identify the file as an ELF file.
//! * The class (32 or 64-bit) and byte order.
//! * The offset to and number of program headers.
//! * The offset to and number of section headers.
//!
//! Section headers identify sections. Sections are used for static linking and by
//! debuggers. Section headers have name, type, vaddr, offset, size, etc. The ones used
//! here are the symbol tables, their string tables, and notes.
//!
//! Program headers identify segments which the OS uses to load the file. Notes can
//! also be found through them.
//!
//! Every offset and size in these tables comes from the file and may be garbage, so
//! all reads go through the bounds checked Reader.
pub mod elf_file;
pub mod header;
pub mod io;
pub mod notes;
pub mod primitives;
pub mod sections;
pub mod segments;

pub use elf_file::*;
pub use header::*;
pub use io::*;
pub use notes::*;
pub use primitives::*;
pub use sections::*;
pub use segments::*;
