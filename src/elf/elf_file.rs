//! An opened and validated ELF file along with its section table.
use super::{ElfHeader, Notes, ProgramHeader, Reader, SectionHeader, SectionType, Stream};
use crate::debug::SymbolTable;
use crate::elf::{Bytes, SectionIndex, StringIndex};
use crate::error::{Error, Result};
use crate::utils;
use memmap2::Mmap;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

/// Section index used when the real value doesn't fit into the header.
const SHN_XINDEX: u16 = 0xffff;

pub struct ElfFile {
    pub header: ElfHeader,
    pub path: PathBuf,
    pub reader: Reader,
    sections: Vec<SectionHeader>,
}

impl ElfFile {
    /// Opens the file, validates the header, and reads the section table. Anything
    /// wrong with those is an error. Other structures are only checked when they are
    /// used.
    pub fn new(path: &Path) -> Result<Self> {
        let not_found = |source| Error::NotFound {
            path: path.to_path_buf(),
            source,
        };
        let file = File::open(path).map_err(not_found)?;
        let metadata = file.metadata()?;
        if !metadata.is_file() {
            let source = io::Error::new(io::ErrorKind::InvalidInput, "not a regular file");
            return Err(not_found(source));
        }
        utils::require(metadata.len() > 0, "file is empty")?;

        // This is unsafe because it has undefined behavior if the underlying file is
        // modified while the memory map is in use.
        let bytes = unsafe { Mmap::map(&file) }?;
        let reader = Reader::new(bytes)?;
        let header = ElfHeader::new(&reader)?;
        let sections = ElfFile::load_sections(&reader, &header)?;
        tracing::trace!(path = %path.display(), sections = sections.len(), "opened ELF file");
        Ok(ElfFile {
            path: path.to_path_buf(),
            reader,
            header,
            sections,
        })
    }

    pub fn sections(&self) -> &[SectionHeader] {
        &self.sections
    }

    /// Returns the section at index, e.g. for a section's link field.
    pub fn section(&self, index: SectionIndex) -> Result<&SectionHeader> {
        self.sections.get(index.0 as usize).ok_or_else(|| {
            Error::Format(format!(
                "bad section index {} (there are {} sections)",
                index.0,
                self.sections.len()
            ))
        })
    }

    /// Finds a section using its conventional name, e.g. ".dynsym". If there is no
    /// section with that name and type then the first section with the type is used:
    /// sections can be renamed but the linker and loader only care about the type.
    pub fn find_section(&self, name: &str, stype: SectionType) -> Option<&SectionHeader> {
        self.sections
            .iter()
            .find(|s| s.name == name && s.stype == stype)
            .or_else(|| self.find_section_by_type(stype))
    }

    pub fn find_section_by_name(&self, name: &str) -> Option<&SectionHeader> {
        self.sections.iter().find(|s| s.name == name)
    }

    pub fn find_section_by_type(&self, stype: SectionType) -> Option<&SectionHeader> {
        self.sections.iter().find(|s| s.stype == stype)
    }

    /// Returns the bytes of a section. Fails if the header says the section extends past
    /// the end of the file.
    pub fn section_data(&self, section: &SectionHeader) -> Result<&[u8]> {
        if !section.has_contents() {
            return Ok(&[]);
        }
        let what = format!("section {} ({})", section.index.0, section.name);
        self.reader
            .slice_of(&what, section.obytes.start.0, section.obytes.size)
    }

    /// Returns a string from a string table section. Note that index can point into
    /// the middle of a string.
    pub fn find_string(&self, table: &SectionHeader, index: StringIndex) -> Result<&[u8]> {
        utils::require(
            table.stype == SectionType::StringTable,
            &format!("section {} is not a string table", table.index.0),
        )?;
        let limit = table
            .obytes
            .end()
            .ok_or_else(|| Error::format("string table size overflows"))?;
        let offset = table
            .obytes
            .start
            .0
            .checked_add(index.0 as u64)
            .ok_or_else(|| Error::format("string offset overflows"))?;
        self.reader.read_cstr(offset, limit.0)
    }

    /// Returns the notes in a note section or segment. The range is checked here, the
    /// individual notes as they are iterated over.
    pub fn notes(&self, range: Bytes, align: u64) -> Result<Notes<'_>> {
        self.reader.slice_of("notes", range.start.0, range.size)?;
        Notes::new(&self.reader, range, align)
    }

    /// Returns an iterator over the entries of a SymbolTable or DynamicSymbolTable
    /// section. The table range and its paired string table are validated here.
    pub fn symbol_table<'a>(&'a self, section: &'a SectionHeader) -> Result<SymbolTable<'a>> {
        SymbolTable::new(self, section)
    }

    /// Reads the program header table. Unlike sections these aren't needed for the
    /// required path so they are loaded on demand.
    pub fn segments(&self) -> Result<Vec<ProgramHeader>> {
        let header = &self.header;
        if header.ph_offset == 0 || header.num_ph_entries == 0 {
            return Ok(Vec::new());
        }

        let entry_size = header.ph_entry_size as u64;
        utils::require(
            entry_size >= self.reader.class.program_header_size(),
            &format!("program header entry size {entry_size} is too small"),
        )?;
        let table_size = entry_size * header.num_ph_entries as u64;
        self.reader
            .slice_of("program header table", header.ph_offset, table_size)?;

        let decode = ProgramHeader::decoder(self.reader.class);
        (0..header.num_ph_entries as u64)
            .map(|i| decode(&mut Stream::new(&self.reader, header.ph_offset + i * entry_size)))
            .collect()
    }
}

impl ElfFile {
    fn load_sections(reader: &Reader, header: &ElfHeader) -> Result<Vec<SectionHeader>> {
        if header.section_offset == 0 {
            return Ok(Vec::new());
        }

        let decode = SectionHeader::decoder(reader.class);
        let entry_size = header.section_entry_size as u64;
        utils::require(
            entry_size >= reader.class.section_header_size(),
            &format!("section header entry size {entry_size} is too small"),
        )?;

        // With extended numbering the real count and string table index are stored in
        // the first section header.
        let mut count = header.num_section_entries as u64;
        let mut names_index = header.string_table_index as u32;
        if count == 0 || names_index == SHN_XINDEX as u32 {
            reader.slice_of("section header table", header.section_offset, entry_size)?;
            let first = decode(&mut Stream::new(reader, header.section_offset))?;
            if count == 0 {
                count = first.obytes.size;
            }
            if names_index == SHN_XINDEX as u32 {
                names_index = first.link.0;
            }
        }

        let table_size = count
            .checked_mul(entry_size)
            .ok_or_else(|| Error::format("section header table size overflows"))?;
        reader.slice_of("section header table", header.section_offset, table_size)?;

        let mut sections = Vec::with_capacity(count as usize);
        for i in 0..count {
            let mut h = decode(&mut Stream::new(reader, header.section_offset + i * entry_size))?;
            h.index = SectionIndex(i as u32);
            sections.push(h);
        }

        if names_index != 0 {
            let names = sections.get(names_index as usize).cloned().ok_or_else(|| {
                Error::Format(format!(
                    "section name string table index {names_index} is out of range"
                ))
            })?;
            utils::require(
                names.stype == SectionType::StringTable,
                "section name string table has the wrong type",
            )?;
            let limit = names
                .obytes
                .end()
                .ok_or_else(|| Error::format("section name string table size overflows"))?;
            for section in sections.iter_mut() {
                let offset = names
                    .obytes
                    .start
                    .0
                    .checked_add(section.name_index.0 as u64)
                    .ok_or_else(|| Error::format("section name offset overflows"))?;
                let name = reader.read_cstr(offset, limit.0)?;
                section.name = String::from_utf8_lossy(name).into_owned();
            }
        }
        Ok(sections)
    }
}
