//! The two entry points. Each call opens and maps the file, extracts what was asked
//! for into owned values, and drops the mapping before returning.
use crate::debug::{SymbolLevel, SymbolVector, collect_symbols, find_build_id, find_debug_link};
use crate::elf::ElfFile;
use crate::error::Result;
use std::path::Path;

/// What a debugger needs to identify a loaded module and find its debug info.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ModuleIdentity {
    /// Lowercase hex of the GNU build id note.
    pub build_id: Option<String>,

    /// File name from .gnu_debuglink.
    pub debug_link: Option<String>,

    /// CRC32 of the debug file, as recorded in .gnu_debuglink. Not verified.
    pub debug_link_crc: Option<u32>,

    /// External symbols from the table selected by the mode.
    pub symbols: SymbolVector,
}

impl ModuleIdentity {
    /// The build id, or an empty string if there isn't one.
    pub fn build_id_hex(&self) -> &str {
        self.build_id.as_deref().unwrap_or("")
    }

    /// The debug link file name, or an empty string if there isn't one.
    pub fn debug_link_name(&self) -> &str {
        self.debug_link.as_deref().unwrap_or("")
    }
}

/// Reads the build id, debug link, and external symbols of an ELF file. Mode picks the
/// symbol table: 0 for none, 1 prefers .dynsym, 2 prefers .symtab. Either falls back to
/// the other table when the preferred one is missing. Other modes are rejected before
/// the file is touched.
pub fn read_module_identity<P: AsRef<Path>>(path: P, mode: i32) -> Result<ModuleIdentity> {
    let level = SymbolLevel::try_from(mode)?;
    let file = ElfFile::new(path.as_ref())?;

    let build_id = find_build_id(&file)?.map(hex::encode);
    let (debug_link, debug_link_crc) = match find_debug_link(&file)? {
        Some(link) => (Some(link.file_name), link.crc),
        None => (None, None),
    };
    let symbols = collect_symbols(&file, level)?;
    tracing::debug!(
        path = %file.path.display(),
        %level,
        build_id = build_id.as_deref().unwrap_or("none"),
        symbols = symbols.len(),
        "read module identity"
    );

    Ok(ModuleIdentity {
        build_id,
        debug_link,
        debug_link_crc,
        symbols,
    })
}

/// Returns only the external symbols, skipping the note and debug link lookups. Uses
/// the same modes as read_module_identity.
pub fn collect_external_symbols<P: AsRef<Path>>(path: P, mode: i32) -> Result<SymbolVector> {
    let level = SymbolLevel::try_from(mode)?;
    let file = ElfFile::new(path.as_ref())?;
    collect_symbols(&file, level)
}
