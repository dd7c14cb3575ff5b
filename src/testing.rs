//! Builds small but well formed ELF images in memory so tests don't depend on whatever
//! compiler happens to be installed.
use crate::elf::SectionType;
use memmap2::{Mmap, MmapOptions};
use std::io::Write;
use tempfile::NamedTempFile;

pub const STB_LOCAL: u8 = 0;
pub const STB_GLOBAL: u8 = 1;
pub const STB_WEAK: u8 = 2;
pub const STB_GNU_UNIQUE: u8 = 10;

pub const STT_NOTYPE: u8 = 0;
pub const STT_OBJECT: u8 = 1;
pub const STT_FUNC: u8 = 2;
pub const STT_SECTION: u8 = 3;
pub const STT_FILE: u8 = 4;
pub const STT_TLS: u8 = 6;
pub const STT_GNU_IFUNC: u8 = 10;

pub const SHN_UNDEF: u16 = 0;
pub const SHN_ABS: u16 = 0xfff1;

/// Index of the .text section, which every image has.
pub const TEXT_INDEX: u16 = 1;

const PT_NOTE: u32 = 4;
const NT_GNU_BUILD_ID: u32 = 3;

/// One symbol table entry. The name is added to the paired string table unless
/// name_offset overrides where the entry points.
#[derive(Clone, Debug)]
pub struct SymbolSpec {
    pub name: String,
    pub name_offset: Option<u32>,
    pub value: u64,
    pub size: u64,
    pub binding: u8,
    pub stype: u8,
    pub shndx: u16,
}

impl SymbolSpec {
    pub fn new(name: &str, binding: u8, stype: u8, value: u64, size: u64) -> Self {
        SymbolSpec {
            name: name.to_string(),
            name_offset: None,
            value,
            size,
            binding,
            stype,
            shndx: TEXT_INDEX,
        }
    }

    pub fn global_func(name: &str, value: u64, size: u64) -> Self {
        SymbolSpec::new(name, STB_GLOBAL, STT_FUNC, value, size)
    }

    pub fn global_object(name: &str, value: u64, size: u64) -> Self {
        SymbolSpec::new(name, STB_GLOBAL, STT_OBJECT, value, size)
    }

    pub fn local_func(name: &str, value: u64, size: u64) -> Self {
        SymbolSpec::new(name, STB_LOCAL, STT_FUNC, value, size)
    }

    pub fn local_file(name: &str) -> Self {
        SymbolSpec {
            shndx: SHN_ABS,
            ..SymbolSpec::new(name, STB_LOCAL, STT_FILE, 0, 0)
        }
    }

    pub fn undefined(name: &str) -> Self {
        SymbolSpec {
            shndx: SHN_UNDEF,
            ..SymbolSpec::new(name, STB_GLOBAL, STT_FUNC, 0, 0)
        }
    }

    fn info(&self) -> u8 {
        self.binding << 4 | (self.stype & 0xf)
    }
}

/// The bytes of a built image plus where the section header table starts.
pub struct Image {
    pub bytes: Vec<u8>,
    pub section_table: usize,
    little_endian: bool,
}

impl Image {
    pub fn patch_u16(&mut self, offset: usize, value: u16) {
        let bytes = if self.little_endian {
            value.to_le_bytes()
        } else {
            value.to_be_bytes()
        };
        self.bytes[offset..offset + 2].copy_from_slice(&bytes);
    }
}

/// Section layout is: null, .text, .note.gnu.build-id, .gnu_debuglink, .dynsym,
/// .dynstr, .symtab, .strtab, sections added with `section`, .shstrtab. Optional
/// sections are only present when something was added to them.
pub struct ElfBuilder {
    is64: bool,
    little_endian: bool,
    dynsyms: Vec<SymbolSpec>,
    symtab: Vec<SymbolSpec>,
    build_id: Option<Vec<u8>>,
    segment_build_id: Option<Vec<u8>>,
    debug_link: Option<(String, Option<u32>)>,
    extras: Vec<(String, u32, Vec<u8>)>,
    section_headers: bool,
    extended: bool,
    renames: Vec<(String, String)>,
    entry_sizes: Vec<(String, u64)>,
    links: Vec<(String, String)>,
    sizes: Vec<(String, u64)>,
}

struct Section {
    name: String,
    stype: u32,
    flags: u64,
    addr: u64,
    data: Vec<u8>,
    link: u32,
    info: u32,
    align: u64,
    entry_size: u64,
    offset: u64,
    size: u64,
}

impl Section {
    fn new(name: &str, stype: u32, data: Vec<u8>) -> Self {
        Section {
            name: name.to_string(),
            stype,
            flags: 0,
            addr: 0,
            size: data.len() as u64,
            data,
            link: 0,
            info: 0,
            align: 1,
            entry_size: 0,
            offset: 0,
        }
    }
}

impl ElfBuilder {
    pub fn new64() -> Self {
        ElfBuilder::new(true)
    }

    pub fn new32() -> Self {
        ElfBuilder::new(false)
    }

    fn new(is64: bool) -> Self {
        ElfBuilder {
            is64,
            little_endian: true,
            dynsyms: Vec::new(),
            symtab: Vec::new(),
            build_id: None,
            segment_build_id: None,
            debug_link: None,
            extras: Vec::new(),
            section_headers: true,
            extended: false,
            renames: Vec::new(),
            entry_sizes: Vec::new(),
            links: Vec::new(),
            sizes: Vec::new(),
        }
    }

    pub fn big_endian(mut self) -> Self {
        self.little_endian = false;
        self
    }

    /// Adds a global function to .dynsym.
    pub fn dynsym(self, name: &str, value: u64, size: u64) -> Self {
        self.dynsym_entry(SymbolSpec::global_func(name, value, size))
    }

    pub fn dynsym_entry(mut self, spec: SymbolSpec) -> Self {
        self.dynsyms.push(spec);
        self
    }

    /// Adds a global function to .symtab.
    pub fn symtab(self, name: &str, value: u64, size: u64) -> Self {
        self.symtab_entry(SymbolSpec::global_func(name, value, size))
    }

    pub fn symtab_entry(mut self, spec: SymbolSpec) -> Self {
        self.symtab.push(spec);
        self
    }

    pub fn build_id(mut self, id: &[u8]) -> Self {
        self.build_id = Some(id.to_vec());
        self
    }

    /// Adds a PT_NOTE segment with a build id that isn't covered by any section.
    pub fn build_id_in_segment_only(mut self, id: &[u8]) -> Self {
        self.segment_build_id = Some(id.to_vec());
        self
    }

    pub fn debug_link(mut self, file_name: &str, crc: Option<u32>) -> Self {
        self.debug_link = Some((file_name.to_string(), crc));
        self
    }

    /// Adds an arbitrary section after the standard ones.
    pub fn section(mut self, name: &str, stype: SectionType, data: &[u8]) -> Self {
        self.extras
            .push((name.to_string(), section_type(stype), data.to_vec()));
        self
    }

    pub fn without_section_headers(mut self) -> Self {
        self.section_headers = false;
        self
    }

    /// Stores the section count and name table index in section zero.
    pub fn extended_numbering(mut self) -> Self {
        self.extended = true;
        self
    }

    /// Changes the name written for a section. Other overrides still use the old name.
    pub fn rename(mut self, old: &str, new: &str) -> Self {
        self.renames.push((old.to_string(), new.to_string()));
        self
    }

    pub fn entry_size(mut self, section: &str, size: u64) -> Self {
        self.entry_sizes.push((section.to_string(), size));
        self
    }

    pub fn link(mut self, section: &str, target: &str) -> Self {
        self.links.push((section.to_string(), target.to_string()));
        self
    }

    /// Overrides the size written into the section header. The data is unchanged.
    pub fn section_size(mut self, section: &str, size: u64) -> Self {
        self.sizes.push((section.to_string(), size));
        self
    }

    pub fn build(&self) -> Image {
        let mut sections = self.sections();
        let mut out = Writer {
            bytes: Vec::new(),
            is64: self.is64,
            little_endian: self.little_endian,
        };
        let header_size = if self.is64 { 64 } else { 52 };
        let phdr_size = if self.is64 { 56 } else { 32 };
        let num_phdrs = usize::from(self.segment_build_id.is_some());
        out.bytes.resize(header_size + num_phdrs * phdr_size, 0);

        let segment_note = self.segment_build_id.as_ref().map(|id| {
            let note = note_with("GNU", NT_GNU_BUILD_ID, id, true, self.little_endian);
            let offset = out.append(&note, 8);
            (offset, note.len() as u64)
        });
        for section in sections.iter_mut().skip(1) {
            section.offset = out.append(&section.data, 8);
        }

        // Overrides are applied once everything has been laid out.
        for (name, target) in &self.links {
            let (i, target) = (index_of(&sections, name), index_of(&sections, target));
            sections[i].link = target as u32;
        }
        for (name, size) in &self.entry_sizes {
            let i = index_of(&sections, name);
            sections[i].entry_size = *size;
        }
        for (name, size) in &self.sizes {
            let i = index_of(&sections, name);
            sections[i].size = *size;
        }

        // Names are resolved last so renames don't break the overrides above.
        let mut names = vec![0];
        let mut name_offsets = Vec::new();
        for section in &sections {
            let name = self
                .renames
                .iter()
                .find(|(old, _)| *old == section.name)
                .map_or(section.name.as_str(), |(_, new)| new.as_str());
            if name.is_empty() {
                name_offsets.push(0);
            } else {
                name_offsets.push(names.len() as u32);
                names.extend_from_slice(name.as_bytes());
                names.push(0);
            }
        }
        let shstrndx = sections.len() - 1;
        let last = &mut sections[shstrndx];
        last.size = names.len() as u64;
        last.offset = out.append(&names, 1);

        let section_table = if self.section_headers {
            let offset = out.append(&[], 8);
            for (i, section) in sections.iter().enumerate() {
                let (size, link) = if i == 0 && self.extended {
                    (sections.len() as u64, shstrndx as u32)
                } else {
                    (section.size, section.link)
                };
                out.word(name_offsets[i]);
                out.word(section.stype);
                out.addr(section.flags);
                out.addr(section.addr);
                out.addr(section.offset);
                out.addr(size);
                out.word(link);
                out.word(section.info);
                out.addr(section.align);
                out.addr(section.entry_size);
            }
            offset
        } else {
            out.bytes.len() as u64
        };

        let (shoff, shnum, shstrndx) = match (self.section_headers, self.extended) {
            (false, _) => (0, 0, 0),
            (true, true) => (section_table, 0, 0xffff),
            (true, false) => (section_table, sections.len() as u16, shstrndx as u16),
        };
        let phoff = if num_phdrs > 0 { header_size as u64 } else { 0 };
        let mut header = Writer {
            bytes: Vec::new(),
            is64: self.is64,
            little_endian: self.little_endian,
        };
        header.bytes.extend_from_slice(&[0x7f, b'E', b'L', b'F']);
        header.bytes.push(if self.is64 { 2 } else { 1 });
        header.bytes.push(if self.little_endian { 1 } else { 2 });
        header.bytes.push(1);
        header.bytes.resize(16, 0);
        header.half(3); // ET_DYN
        header.half(if self.is64 { 62 } else { 3 });
        header.word(1);
        header.addr(0x1000);
        header.addr(phoff);
        header.addr(shoff);
        header.word(0);
        header.half(header_size as u16);
        header.half(phdr_size as u16);
        header.half(num_phdrs as u16);
        header.half(if self.is64 { 64 } else { 40 });
        header.half(shnum);
        header.half(shstrndx);
        if let Some((offset, size)) = segment_note {
            header.word(PT_NOTE);
            if self.is64 {
                header.word(4); // PF_R
            }
            header.addr(offset);
            header.addr(offset);
            header.addr(offset);
            header.addr(size);
            header.addr(size);
            if !self.is64 {
                header.word(4);
            }
            header.addr(4);
        }
        out.bytes[..header.bytes.len()].copy_from_slice(&header.bytes);

        Image {
            bytes: out.bytes,
            section_table: section_table as usize,
            little_endian: self.little_endian,
        }
    }

    fn sections(&self) -> Vec<Section> {
        let mut sections = vec![Section::new("", 0, Vec::new())];

        let mut text = Section::new(".text", 1, vec![0xc3; 16]);
        text.flags = 0x6; // ALLOC | EXEC
        text.addr = 0x1000;
        text.align = 16;
        sections.push(text);

        if let Some(id) = &self.build_id {
            let data = note_with("GNU", NT_GNU_BUILD_ID, id, true, self.little_endian);
            let mut note = Section::new(".note.gnu.build-id", 7, data);
            note.flags = 0x2;
            note.align = 4;
            sections.push(note);
        }

        if let Some((file_name, crc)) = &self.debug_link {
            let mut data = file_name.as_bytes().to_vec();
            data.push(0);
            if let Some(crc) = crc {
                data.resize(data.len().next_multiple_of(4), 0);
                data.extend(if self.little_endian {
                    crc.to_le_bytes()
                } else {
                    crc.to_be_bytes()
                });
            }
            let mut link = Section::new(".gnu_debuglink", 1, data);
            link.align = 4;
            sections.push(link);
        }

        if !self.dynsyms.is_empty() {
            self.push_symbols(&mut sections, ".dynsym", 11, ".dynstr", &self.dynsyms);
        }
        if !self.symtab.is_empty() {
            self.push_symbols(&mut sections, ".symtab", 2, ".strtab", &self.symtab);
        }

        for (name, stype, data) in &self.extras {
            let mut section = Section::new(name, *stype, data.clone());
            if *stype == 7 {
                section.align = 4;
            }
            sections.push(section);
        }

        // Contents are filled in by build once the other names are known.
        sections.push(Section::new(".shstrtab", 3, Vec::new()));
        sections
    }

    fn push_symbols(
        &self,
        sections: &mut Vec<Section>,
        name: &str,
        stype: u32,
        strings_name: &str,
        specs: &[SymbolSpec],
    ) {
        let mut strings = vec![0];
        let mut table = Writer {
            bytes: Vec::new(),
            is64: self.is64,
            little_endian: self.little_endian,
        };
        table.symbol(0, &SymbolSpec::new("", STB_LOCAL, STT_NOTYPE, 0, 0), SHN_UNDEF);
        for spec in specs {
            let offset = match spec.name_offset {
                Some(offset) => offset,
                None if spec.name.is_empty() => 0,
                None => {
                    let offset = strings.len() as u32;
                    strings.extend_from_slice(spec.name.as_bytes());
                    strings.push(0);
                    offset
                }
            };
            table.symbol(offset, spec, spec.shndx);
        }

        let strings_index = sections.len() as u32 + 1;
        let mut symbols = Section::new(name, stype, table.bytes);
        symbols.link = strings_index;
        symbols.info = 1 + specs.iter().filter(|s| s.binding == STB_LOCAL).count() as u32;
        symbols.align = 8;
        symbols.entry_size = if self.is64 { 24 } else { 16 };
        if stype == 11 {
            symbols.flags = 0x2;
        }
        sections.push(symbols);
        sections.push(Section::new(strings_name, 3, strings));
    }
}

struct Writer {
    bytes: Vec<u8>,
    is64: bool,
    little_endian: bool,
}

impl Writer {
    fn half(&mut self, value: u16) {
        if self.little_endian {
            self.bytes.extend(value.to_le_bytes());
        } else {
            self.bytes.extend(value.to_be_bytes());
        }
    }

    fn word(&mut self, value: u32) {
        if self.little_endian {
            self.bytes.extend(value.to_le_bytes());
        } else {
            self.bytes.extend(value.to_be_bytes());
        }
    }

    fn xword(&mut self, value: u64) {
        if self.little_endian {
            self.bytes.extend(value.to_le_bytes());
        } else {
            self.bytes.extend(value.to_be_bytes());
        }
    }

    /// A class sized address, offset, or size.
    fn addr(&mut self, value: u64) {
        if self.is64 {
            self.xword(value);
        } else {
            self.word(value as u32);
        }
    }

    fn symbol(&mut self, name: u32, spec: &SymbolSpec, shndx: u16) {
        self.word(name);
        if self.is64 {
            self.bytes.push(spec.info());
            self.bytes.push(0);
            self.half(shndx);
            self.xword(spec.value);
            self.xword(spec.size);
        } else {
            self.word(spec.value as u32);
            self.word(spec.size as u32);
            self.bytes.push(spec.info());
            self.bytes.push(0);
            self.half(shndx);
        }
    }

    /// Pads to align and then appends data, returning the offset it was written at.
    fn append(&mut self, data: &[u8], align: usize) -> u64 {
        let offset = self.bytes.len().next_multiple_of(align);
        self.bytes.resize(offset, 0);
        self.bytes.extend_from_slice(data);
        offset as u64
    }
}

fn index_of(sections: &[Section], name: &str) -> usize {
    sections
        .iter()
        .position(|s| s.name == name)
        .unwrap_or_else(|| panic!("override names a missing section {name}"))
}

fn section_type(stype: SectionType) -> u32 {
    match stype {
        SectionType::Null => 0,
        SectionType::ProgBits => 1,
        SectionType::SymbolTable => 2,
        SectionType::StringTable => 3,
        SectionType::Note => 7,
        SectionType::NoBits => 8,
        SectionType::DynamicSymbolTable => 11,
        SectionType::Other(value) => value,
        other => panic!("no test encoding for {other:?}"),
    }
}

/// Encodes a little endian note. If pad_final is false the descriptor isn't padded,
/// which some linkers do for the last note in a section.
pub fn note_bytes(name: &str, ntype: u32, desc: &[u8], pad_final: bool) -> Vec<u8> {
    note_with(name, ntype, desc, pad_final, true)
}

fn note_with(name: &str, ntype: u32, desc: &[u8], pad_final: bool, little_endian: bool) -> Vec<u8> {
    let word = |value: u32| {
        if little_endian {
            value.to_le_bytes()
        } else {
            value.to_be_bytes()
        }
    };
    let mut bytes = Vec::new();
    bytes.extend(word(name.len() as u32 + 1));
    bytes.extend(word(desc.len() as u32));
    bytes.extend(word(ntype));
    bytes.extend_from_slice(name.as_bytes());
    bytes.push(0);
    bytes.resize(bytes.len().next_multiple_of(4), 0);
    bytes.extend_from_slice(desc);
    if pad_final {
        bytes.resize(bytes.len().next_multiple_of(4), 0);
    }
    bytes
}

/// Returns a read-only anonymous mapping holding bytes.
pub fn map_bytes(bytes: &[u8]) -> Mmap {
    let mut map = MmapOptions::new()
        .len(bytes.len().max(1))
        .map_anon()
        .expect("anonymous mapping");
    map[..bytes.len()].copy_from_slice(bytes);
    map.make_read_only().expect("read-only mapping")
}

pub fn write_temp(bytes: &[u8]) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("temp file");
    file.write_all(bytes).expect("temp file write");
    file.flush().expect("temp file flush");
    file
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notes_are_padded_to_words() {
        let note = note_bytes("GNU", 3, &[1, 2, 3, 4, 5], true);
        assert_eq!(note.len(), 12 + 4 + 8);
        assert_eq!(&note[12..16], b"GNU\0");
        assert_eq!(note_bytes("GNU", 3, &[1, 2, 3, 4, 5], false).len(), 21);
    }

    #[test]
    fn header_fields_land_at_fixed_offsets() {
        let image = ElfBuilder::new64().dynsym("foo", 0x1000, 4).build();
        let half = |offset: usize| u16::from_le_bytes([image.bytes[offset], image.bytes[offset + 1]]);
        assert_eq!(half(0x3a), 64);
        assert_eq!(half(0x3c), 5);
        assert_eq!(half(0x3e), 4);
        assert_eq!(image.bytes.len(), image.section_table + 5 * 64);
    }
}
