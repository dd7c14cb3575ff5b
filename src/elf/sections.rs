//! Used by the linker and debugger. Also see segments.
use super::{ElfClass, Stream};
use crate::elf::{Bytes, SectionIndex, StringIndex, VirtualAddr};
use crate::error::Result;

const WRITE_FLAG: u64 = 1 << 0; // Writable
const ALLOC_FLAG: u64 = 1 << 1; // Occupies memory during execution
const EXECINSTR_FLAG: u64 = 1 << 2; // Executable
const MERGE_FLAG: u64 = 1 << 4; // Might be merged
const STRINGS_FLAG: u64 = 1 << 5; // Contains nul-terminated strings
const INFO_LINK_FLAG: u64 = 1 << 6; // `sh_info' contains SHT index
const LINK_ORDER_FLAG: u64 = 1 << 7; // Preserve order after combining
const OS_NONCONFORMING_FLAG: u64 = 1 << 8; // Non-standard OS specific handling required
const GROUP_FLAG: u64 = 1 << 9; // Section is member of a group.
const TLS_FLAG: u64 = 1 << 10; // Section hold thread-local data.
const COMPRESSED_FLAG: u64 = 1 << 11; // Section with compressed data.

/// Reads one section header at the stream's offset.
pub type SectionDecoder = fn(&mut Stream) -> Result<SectionHeader>;

/// Describes a section.
#[derive(Clone, Debug)]
pub struct SectionHeader {
    // Elf32_Shdr or Elf64_Shdr, see https://gist.github.com/x0nu11byt3/bcb35c3de461e5fb66173071a2379779
    /// Position within the section table.
    pub index: SectionIndex,

    /// Index into the section name string table. Zero means no name.
    pub name_index: StringIndex,

    /// The resolved name, empty if the section has no name or the file has no section
    /// name string table.
    pub name: String,

    /// Type of the section.
    pub stype: SectionType,

    /// Write, alloc, and/or exec.
    pub flags: u64,

    /// Addressing for the bytes in the section using offsets from the start of the ELF file.
    pub obytes: Bytes,

    /// Address of the section at execution (zero if it isn't loaded).
    pub vaddr: VirtualAddr,

    /// Link to another section with related information, usually a string
    /// or symbol table.
    pub link: SectionIndex,

    /// Additional section info.
    pub info: u32,

    /// Section alignment.
    pub align: u64,

    /// Set if the section holds a table of entries.
    pub entry_size: u64,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SectionType {
    /// Dynamic linking information.
    Dynamic,

    /// Dynamic linker symbol table.
    DynamicSymbolTable,

    /// Array of pointers to termination functions.
    FiniArray,

    /// GNU style hash table.
    GnuHash,

    /// Section group.
    Group,

    /// Array of pointers to initialization functions.
    InitArray,

    /// Uninitialized data. These occupy no space in the file.
    NoBits,

    /// Arbitrary metadata.
    Note,

    /// Not to be used.
    Null,

    /// Array of pointers to functions to be called before the regular
    /// initialization functions.
    PreinitArray,

    /// CPU instructions or constant data.
    ProgBits,

    /// Relocation entries with addends.
    RelocationsWith,

    /// Relocation entries without addends.
    RelocationsWithout,

    /// Strings for use by the linker and debugger.
    StringTable,

    /// Symbol hash table.
    SymbolHashTable,

    /// The full symbol table. Usually removed when a binary is stripped.
    SymbolTable,

    /// Extended section indices for a symbol table.
    SymbolTableIndices,

    /// GNU symbol versions that are provided.
    VerDef,

    /// GNU symbol versions that are required.
    VerNeed,

    /// GNU symbol version table.
    VerSym,

    /// OS or processor specific.
    Other(u32),
}

impl SectionType {
    pub fn from_u32(value: u32) -> Self {
        match value {
            0x0 => SectionType::Null, // see https://android.googlesource.com/platform/art/+/e34fa1d/runtime/elf.h
            0x1 => SectionType::ProgBits,
            0x2 => SectionType::SymbolTable,
            0x3 => SectionType::StringTable,
            0x4 => SectionType::RelocationsWith,
            0x5 => SectionType::SymbolHashTable,
            0x6 => SectionType::Dynamic,
            0x7 => SectionType::Note,
            0x8 => SectionType::NoBits,
            0x9 => SectionType::RelocationsWithout,
            0xb => SectionType::DynamicSymbolTable,
            0xe => SectionType::InitArray,
            0xf => SectionType::FiniArray,
            0x10 => SectionType::PreinitArray,
            0x11 => SectionType::Group,
            0x12 => SectionType::SymbolTableIndices,
            0x6ffffff6 => SectionType::GnuHash,
            0x6ffffffd => SectionType::VerDef,
            0x6ffffffe => SectionType::VerNeed,
            0x6fffffff => SectionType::VerSym,
            _ => SectionType::Other(value),
        }
    }
}

impl SectionHeader {
    /// Picks the decoder for the file's class. Field sizes differ between 32-bit and
    /// 64-bit files but, unlike symbols, the order is the same.
    pub fn decoder(class: ElfClass) -> SectionDecoder {
        match class {
            ElfClass::Elf32 => SectionHeader::read32,
            ElfClass::Elf64 => SectionHeader::read64,
        }
    }

    fn read64(s: &mut Stream) -> Result<Self> {
        let name = s.read_word()?;
        let stype = SectionType::from_u32(s.read_word()?);
        let flags = s.read_xword()?;
        let vaddr = s.read_xword()?;
        let offset = s.read_xword()?;
        let size = s.read_xword()?;
        let link = s.read_word()?;
        let info = s.read_word()?;
        let align = s.read_xword()?;
        let entry_size = s.read_xword()?;
        Ok(SectionHeader {
            index: SectionIndex(0),
            name_index: StringIndex(name),
            name: String::new(),
            stype,
            flags,
            obytes: Bytes::from_raw(offset, size),
            vaddr: VirtualAddr(vaddr),
            link: SectionIndex(link),
            info,
            align,
            entry_size,
        })
    }

    fn read32(s: &mut Stream) -> Result<Self> {
        let name = s.read_word()?;
        let stype = SectionType::from_u32(s.read_word()?);
        let flags = s.read_word_as_xword()?;
        let vaddr = s.read_word_as_xword()?;
        let offset = s.read_word_as_xword()?;
        let size = s.read_word_as_xword()?;
        let link = s.read_word()?;
        let info = s.read_word()?;
        let align = s.read_word_as_xword()?;
        let entry_size = s.read_word_as_xword()?;
        Ok(SectionHeader {
            index: SectionIndex(0),
            name_index: StringIndex(name),
            name: String::new(),
            stype,
            flags,
            obytes: Bytes::from_raw(offset, size),
            vaddr: VirtualAddr(vaddr),
            link: SectionIndex(link),
            info,
            align,
            entry_size,
        })
    }

    /// True if the section has bytes in the file. NoBits sections (e.g. .bss) have a
    /// size but no contents.
    pub fn has_contents(&self) -> bool {
        self.stype != SectionType::NoBits && self.stype != SectionType::Null
    }

    pub fn flags(flags: u64) -> String {
        let mut result = Vec::new();
        if flags & WRITE_FLAG != 0 {
            result.push("WRITE");
        }
        if flags & ALLOC_FLAG != 0 {
            result.push("ALLOC");
        }
        if flags & EXECINSTR_FLAG != 0 {
            result.push("EXEC");
        }
        if flags & MERGE_FLAG != 0 {
            result.push("MERGE");
        }
        if flags & STRINGS_FLAG != 0 {
            result.push("STRINGS");
        }
        if flags & INFO_LINK_FLAG != 0 {
            result.push("INFO");
        }
        if flags & LINK_ORDER_FLAG != 0 {
            result.push("LINK");
        }
        if flags & OS_NONCONFORMING_FLAG != 0 {
            result.push("OS_NONCONFORMING");
        }
        if flags & GROUP_FLAG != 0 {
            result.push("GROUP");
        }
        if flags & TLS_FLAG != 0 {
            result.push("TLS");
        }
        if flags & COMPRESSED_FLAG != 0 {
            result.push("COMPRESSED");
        }
        if result.is_empty() {
            result.push("none");
        }
        result.join(" ")
    }
}
