use crate::elf::{ElfClass, ElfFile, SectionHeader, SectionIndex, SectionType, Stream, StringIndex};
use crate::error::Result;
use crate::utils;

/// Reads one symbol table entry at the stream's offset.
pub type SymbolDecoder = fn(&mut Stream) -> Result<SymbolTableEntry>;

/// Lazily iterates over the entries in a symbol table. Created with
/// ElfFile::symbol_table.
pub struct SymbolTable<'a> {
    file: &'a ElfFile,
    pub section: &'a SectionHeader,
    pub strings: &'a SectionHeader,
    pub dynamic: bool,
    decode: SymbolDecoder,
    entry_size: u64,
    offset: u64,
    end: u64,
}

#[derive(Clone, Debug)]
pub struct SymbolTableEntry {
    // see https://refspecs.linuxbase.org/elf/gabi4+/ch4.symtab.html
    /// Index into the symbol string table.
    pub name: StringIndex,

    /// Can be an address, absolute value, etc.
    pub value: u64,

    /// Size of the symbol. Zero if the symbol has no or unknown size.
    pub size: u64,

    pub stype: SymbolType,

    pub binding: SymbolBinding,

    pub visibility: SymbolVisibility,

    pub index: SymbolIndex,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SymbolIndex {
    /// Symbol has an absolute value that will not change with relocation.
    Abs,

    /// A common block that has not yet been allocated. Value has alignment.
    Common,

    /// Symbol value refers to another section at this index.
    Index(SectionIndex),

    /// Value is undefined, i.e. the symbol is imported from another module.
    Undef,

    /// Used when Index overflows. Related section will be of type SHT_SYMTAB_SHNDX.
    XIndex,

    /// For use by OS or CPU.
    Reserved(u16),
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SymbolVisibility {
    /// Visibility is per binding.
    Default,

    /// Visible only within its object file. CPU may special case this.
    Internal,

    /// Visible only within its object file.
    Hidden,

    /// Visible to other object files but cannot be prempted.
    Protected,
}

/// Linkage visibility and behavior
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SymbolBinding {
    /// Symbol is not visible outside the object file containing its definition. These
    /// will appear before global and weak symbols in the table.
    Local,

    /// Visible to all object files.
    Global,

    /// Similar to Global but has lower precedence. These can be preempted by a Global.
    Weak,

    /// A global that the dynamic linker guarantees is unique within the process.
    GnuUnique,

    /// For use by OS or CPU.
    Reserved(u8),
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SymbolType {
    None,

    /// A data object, variable, array, etc.
    Object,

    /// Function or other executable code.
    Func,

    /// Another section. Used for relocation.
    Section,

    /// Source file associated with the symbol table.
    File,

    /// Uninitialized common blocks. Used by the linker.
    Common,

    /// Thread Local Storage data. Value is an offset to the data.
    Tls,

    /// A function whose real address is picked by a resolver at load time, e.g.
    /// glibc's memcpy.
    GnuIndirectFunc,

    /// For use by OS or CPU.
    Reserved(u8),
}

impl<'a> SymbolTable<'a> {
    pub fn new(file: &'a ElfFile, section: &'a SectionHeader) -> Result<Self> {
        utils::require(
            matches!(
                section.stype,
                SectionType::SymbolTable | SectionType::DynamicSymbolTable
            ),
            &format!("section {} is not a symbol table", section.index.0),
        )?;

        let class = file.reader.class;
        let entry_size = if section.entry_size == 0 {
            class.symbol_size()
        } else {
            section.entry_size
        };
        utils::require(
            entry_size >= class.symbol_size(),
            &format!(
                "symbol table {} has entry size {entry_size}, expected at least {}",
                section.name,
                class.symbol_size()
            ),
        )?;

        // Checks the whole range up front so the iterator can't run off the file.
        file.section_data(section)?;
        let strings = file.section(section.link)?;
        utils::require(
            strings.stype == SectionType::StringTable,
            &format!(
                "symbol table {} links to section {} which is not a string table",
                section.name, strings.index.0
            ),
        )?;
        file.section_data(strings)?;

        let start = section.obytes.start.0;
        let count = section.obytes.size / entry_size;
        Ok(SymbolTable {
            file,
            section,
            strings,
            dynamic: section.stype == SectionType::DynamicSymbolTable,
            decode: SymbolTableEntry::decoder(class),
            entry_size,
            offset: start,
            end: start + count * entry_size,
        })
    }

    /// Number of entries left, including the null entry if iteration hasn't started.
    pub fn remaining(&self) -> usize {
        ((self.end - self.offset) / self.entry_size) as usize
    }

    /// Resolves an entry's name using the table's string table.
    pub fn name(&self, entry: &SymbolTableEntry) -> Result<String> {
        let bytes = self.file.find_string(self.strings, entry.name)?;
        Ok(String::from_utf8_lossy(bytes).into_owned())
    }
}

impl Iterator for SymbolTable<'_> {
    type Item = Result<SymbolTableEntry>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.offset >= self.end {
            return None;
        }
        let mut s = Stream::new(&self.file.reader, self.offset);
        let result = (self.decode)(&mut s);
        self.offset = match result {
            Ok(_) => self.offset + self.entry_size,
            Err(_) => self.end,
        };
        Some(result)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.remaining();
        (n, Some(n))
    }
}

impl SymbolTableEntry {
    /// Field order is different so we need both cases.
    pub fn decoder(class: ElfClass) -> SymbolDecoder {
        match class {
            ElfClass::Elf32 => SymbolTableEntry::read32,
            ElfClass::Elf64 => SymbolTableEntry::read64,
        }
    }

    fn read64(s: &mut Stream) -> Result<Self> {
        let name = s.read_word()?; // 4
        let info = s.read_byte()?; // 1
        let other = s.read_byte()?; // 1
        let index = s.read_half()?; // 2
        let value = s.read_xword()?; // 8
        let size = s.read_xword()?; // 8
        Ok(SymbolTableEntry::from_fields(name, value, size, info, other, index))
    }

    fn read32(s: &mut Stream) -> Result<Self> {
        let name = s.read_word()?;
        let value = s.read_word_as_xword()?;
        let size = s.read_word_as_xword()?;
        let info = s.read_byte()?;
        let other = s.read_byte()?;
        let index = s.read_half()?;
        Ok(SymbolTableEntry::from_fields(name, value, size, info, other, index))
    }

    fn from_fields(name: u32, value: u64, size: u64, info: u8, other: u8, index: u16) -> Self {
        SymbolTableEntry {
            name: StringIndex(name),
            value,
            size,
            stype: SymbolType::from_u8(info),
            binding: SymbolBinding::from_u8(info),
            visibility: SymbolVisibility::from_u8(other),
            index: SymbolIndex::from_u16(index),
        }
    }

    /// True if the symbol is defined in this module, as opposed to imported from
    /// another one.
    pub fn is_defined(&self) -> bool {
        self.index != SymbolIndex::Undef
    }
}

impl SymbolIndex {
    pub fn from_u16(value: u16) -> Self {
        match value {
            0 => SymbolIndex::Undef,
            0xfff1 => SymbolIndex::Abs,
            0xfff2 => SymbolIndex::Common,
            0xffff => SymbolIndex::XIndex,
            0xff00.. => SymbolIndex::Reserved(value),
            _ => SymbolIndex::Index(SectionIndex(value as u32)),
        }
    }
}

impl SymbolVisibility {
    pub fn from_u8(value: u8) -> Self {
        match value & 0x3 {
            0 => SymbolVisibility::Default,
            1 => SymbolVisibility::Internal,
            2 => SymbolVisibility::Hidden,
            _ => SymbolVisibility::Protected,
        }
    }
}

impl SymbolBinding {
    pub fn from_u8(value: u8) -> Self {
        match value >> 4 {
            0 => SymbolBinding::Local,
            1 => SymbolBinding::Global,
            2 => SymbolBinding::Weak,
            10 => SymbolBinding::GnuUnique,
            other => SymbolBinding::Reserved(other),
        }
    }
}

impl SymbolType {
    pub fn from_u8(value: u8) -> Self {
        match value & 0xf {
            0 => SymbolType::None,
            1 => SymbolType::Object,
            2 => SymbolType::Func,
            3 => SymbolType::Section,
            4 => SymbolType::File,
            5 => SymbolType::Common,
            6 => SymbolType::Tls,
            10 => SymbolType::GnuIndirectFunc,
            other => SymbolType::Reserved(other),
        }
    }
}
