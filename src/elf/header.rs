//! The ELF header which appears at the very start of the file.
use super::{ElfClass, Reader, Stream};
use crate::error::Result;
use crate::utils;

const ET_REL: u16 = 1;
const ET_EXEC: u16 = 2;
const ET_DYN: u16 = 3;
const ET_CORE: u16 = 4;

pub struct ElfHeader {
    // Elf32_Ehdr or Elf64_Ehdr, see https://gist.github.com/x0nu11byt3/bcb35c3de461e5fb66173071a2379779
    /// Relocatable, executable, shared object, or core.
    pub etype: u16,

    /// Target architecture.
    pub machine: u16,

    pub osabi: u8,
    pub abiversion: u8,

    /// Virtual address of the entry point, zero if none.
    pub entry: u64,

    pub ph_offset: u64,
    pub ph_entry_size: u16,
    pub num_ph_entries: u16,

    pub section_offset: u64,
    pub section_entry_size: u16,

    /// Zero can mean either no sections or extended numbering, see ElfFile.
    pub num_section_entries: u16,

    /// Section index of the section name string table. SHN_XINDEX means that the real
    /// index is stored in the link field of section zero.
    pub string_table_index: u16,

    pub flags: u32,
}

impl ElfHeader {
    pub fn new(reader: &Reader) -> Result<Self> {
        utils::require(
            reader.len() as u64 >= reader.class.header_size(),
            "file is truncated before the end of the ELF header",
        )?;

        let mut s = Stream::new(reader, 16);
        let etype = s.read_half()?;
        let machine = s.read_half()?;
        let _version = s.read_word()?;
        let (entry, ph_offset, section_offset) = match reader.class {
            ElfClass::Elf32 => (
                s.read_word_as_xword()?,
                s.read_word_as_xword()?,
                s.read_word_as_xword()?,
            ),
            ElfClass::Elf64 => (s.read_xword()?, s.read_xword()?, s.read_xword()?),
        };
        let flags = s.read_word()?;
        let _header_size = s.read_half()?;
        let ph_entry_size = s.read_half()?;
        let num_ph_entries = s.read_half()?;
        let section_entry_size = s.read_half()?;
        let num_section_entries = s.read_half()?;
        let string_table_index = s.read_half()?;

        utils::require(
            matches!(etype, ET_REL | ET_EXEC | ET_DYN | ET_CORE),
            &format!("bad elf type {etype}: not an object, exe, shared lib, or core"),
        )?;

        Ok(ElfHeader {
            etype,
            machine,
            osabi: reader.read_byte(7)?,
            abiversion: reader.read_byte(8)?,
            entry,
            ph_offset,
            ph_entry_size,
            num_ph_entries,
            section_offset,
            section_entry_size,
            num_section_entries,
            string_table_index,
            flags,
        })
    }

    pub fn stype(&self) -> &'static str {
        match self.etype {
            ET_REL => "relocatable",
            ET_EXEC => "executable",
            ET_DYN => "shared object",
            ET_CORE => "core",
            _ => "unknown",
        }
    }

    pub fn machine(&self) -> &'static str {
        // see https://llvm.org/doxygen/BinaryFormat_2ELF_8h_source.html
        match self.machine {
            0x03 => "x86",
            0x08 => "MIPS",
            0x14 => "PowerPC",
            0x15 => "PowerPC 64",
            0x16 => "S390",
            0x28 => "ARM",
            0x2b => "SPARC v9",
            0x3e => "x86-64",
            0xb7 => "AArch64",
            0xf3 => "RISC-V",
            0x102 => "LoongArch",
            _ => "unknown",
        }
    }

    pub fn abi(&self) -> &'static str {
        match self.osabi {
            0 => "System V",
            3 => "Linux",
            6 => "Solaris",
            9 => "FreeBSD",
            12 => "OpenBSD",
            _ => "unknown",
        }
    }
}
