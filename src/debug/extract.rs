//! Filters symbol tables down to the symbols other modules can see: defined, named,
//! global (or weak or unique) code and data.
use crate::debug::{SymbolBinding, SymbolTableEntry, SymbolType};
use crate::elf::{ElfFile, SectionHeader, SectionType};
use crate::error::{Error, Result};
use std::fmt;
use std::ops::Range;

/// Which symbol tables to read. Converted from the integer mode passed to the public
/// operations.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SymbolLevel {
    /// Don't read any symbols.
    None,

    /// .dynsym, i.e. what the loader can resolve. Falls back to .symtab for files
    /// without a dynamic symbol table (e.g. static executables).
    Dynamic,

    /// .symtab, which is a superset of .dynsym. Falls back to .dynsym for stripped
    /// files.
    Full,
}

impl TryFrom<i32> for SymbolLevel {
    type Error = Error;

    fn try_from(mode: i32) -> Result<Self> {
        match mode {
            0 => Ok(SymbolLevel::None),
            1 => Ok(SymbolLevel::Dynamic),
            2 => Ok(SymbolLevel::Full),
            _ => Err(Error::InvalidArgument(mode)),
        }
    }
}

impl fmt::Display for SymbolLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SymbolLevel::None => "none",
            SymbolLevel::Dynamic => "dynamic",
            SymbolLevel::Full => "full",
        };
        write!(f, "{name}")
    }
}

/// An externally visible symbol and the address range it covers. Addresses are the
/// raw st_value, i.e. they have not been relocated.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct SymbolRecord {
    pub name: String,
    pub low_pc: u64,

    /// One past the last byte, saturating at u64::MAX. Equal to low_pc for zero sized
    /// symbols.
    pub high_pc: u64,
}

pub type SymbolVector = Vec<SymbolRecord>;

impl SymbolRecord {
    pub fn size(&self) -> u64 {
        self.high_pc.saturating_sub(self.low_pc)
    }

    pub fn range(&self) -> Range<u64> {
        self.low_pc..self.high_pc
    }

    pub fn contains(&self, addr: u64) -> bool {
        self.range().contains(&addr)
    }
}

/// True for the entries callers want: visible outside the module, code or data, and
/// defined here. The name is checked separately since it needs the string table.
pub fn is_external(entry: &SymbolTableEntry) -> bool {
    matches!(
        entry.binding,
        SymbolBinding::Global | SymbolBinding::Weak | SymbolBinding::GnuUnique
    ) && matches!(
        entry.stype,
        SymbolType::Func | SymbolType::Object | SymbolType::GnuIndirectFunc
    ) && entry.is_defined()
}

/// Returns the section to read symbols from. Only one table is read so symbols that
/// are in both tables aren't reported twice.
fn select_table(file: &ElfFile, level: SymbolLevel) -> Option<&SectionHeader> {
    let dynamic = || file.find_section(".dynsym", SectionType::DynamicSymbolTable);
    let full = || file.find_section(".symtab", SectionType::SymbolTable);
    match level {
        SymbolLevel::None => None,
        SymbolLevel::Dynamic => dynamic().or_else(full),
        SymbolLevel::Full => full().or_else(dynamic),
    }
}

/// Returns the external symbols from the table selected by level, in table order.
pub fn collect_symbols(file: &ElfFile, level: SymbolLevel) -> Result<SymbolVector> {
    let Some(section) = select_table(file, level) else {
        return Ok(Vec::new());
    };

    let mut symbols = Vec::new();
    let mut table = file.symbol_table(section)?;
    while let Some(entry) = table.next() {
        let entry = entry?;
        if !is_external(&entry) {
            continue;
        }
        let name = table.name(&entry)?;
        if name.is_empty() {
            continue;
        }
        symbols.push(SymbolRecord {
            name,
            low_pc: entry.value,
            high_pc: entry.value.saturating_add(entry.size),
        });
    }
    tracing::debug!(
        path = %file.path.display(),
        %level,
        table = %section.name,
        kept = symbols.len(),
        "read symbol table"
    );
    Ok(symbols)
}
