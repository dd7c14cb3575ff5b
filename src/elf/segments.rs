//! Used by the run-time loader. Also see sections. Only note segments matter here:
//! they are a second place to find the build id when section headers are missing.
use super::{ElfClass, Stream};
use crate::elf::Bytes;
use crate::error::Result;

/// Reads one program header at the stream's offset.
pub type SegmentDecoder = fn(&mut Stream) -> Result<ProgramHeader>;

/// Describes a segment.
pub struct ProgramHeader {
    // Elf64_Phdr or Elf32_Phdr, see https://llvm.org/doxygen/BinaryFormat_2ELF_8h_source.html
    pub stype: SegmentType,

    /// Addressing for the bytes in the segment using offsets from the start of the ELF
    /// file (p_offset and p_filesz).
    pub obytes: Bytes,

    /// Virtual address of the first byte in the segment.
    pub vaddr: u64,

    /// Number of bytes in the segment in memory.
    pub mem_size: u64,

    /// Read/Write/Execute flags.
    pub flags: u32,

    pub align: u64,
}

#[derive(Debug, Eq, PartialEq)]
pub enum SegmentType {
    /// Not to be used: either it's a segment that is intended to be not used or one
    /// that is not recognized.
    Null,

    /// A loadable segment, described by p_filesz and p_memsz.
    Load,

    /// Specifies dynamic linking information.
    Dynamic,

    /// Location and size of a null-terminated path name to invoke as an interpreter.
    Interpreter,

    /// The location and size of auxiliary information.
    Note,

    /// Reserved but has unspecified semantics.
    Shlib,

    /// The location and size of the program header table itself.
    Phdr,

    // The Thread-Local Storage template.
    Tls,
}

impl SegmentType {
    pub fn from_u32(value: u32) -> Self {
        match value {
            1 => SegmentType::Load,
            2 => SegmentType::Dynamic,
            3 => SegmentType::Interpreter,
            4 => SegmentType::Note,
            5 => SegmentType::Shlib,
            6 => SegmentType::Phdr,
            7 => SegmentType::Tls,
            _ => SegmentType::Null, // includes OS and processor specific types
        }
    }
}

impl ProgramHeader {
    /// Field sizes and order differ between 32-bit and 64-bit ELF files,
    /// see https://llvm.org/doxygen/BinaryFormat_2ELF_8h_source.html.
    pub fn decoder(class: ElfClass) -> SegmentDecoder {
        match class {
            ElfClass::Elf32 => ProgramHeader::read32,
            ElfClass::Elf64 => ProgramHeader::read64,
        }
    }

    fn read64(s: &mut Stream) -> Result<Self> {
        let p_type = SegmentType::from_u32(s.read_word()?);
        let p_flags = s.read_word()?;
        let p_offset = s.read_xword()?;
        let p_vaddr = s.read_xword()?;
        let _p_paddr = s.read_xword()?;
        let p_filesz = s.read_xword()?;
        let p_memsz = s.read_xword()?;
        let p_align = s.read_xword()?;
        Ok(ProgramHeader {
            stype: p_type,
            flags: p_flags,
            obytes: Bytes::from_raw(p_offset, p_filesz),
            vaddr: p_vaddr,
            mem_size: p_memsz,
            align: p_align,
        })
    }

    fn read32(s: &mut Stream) -> Result<Self> {
        let p_type = SegmentType::from_u32(s.read_word()?);
        let p_offset = s.read_word_as_xword()?;
        let p_vaddr = s.read_word_as_xword()?;
        let _p_paddr = s.read_word_as_xword()?;
        let p_filesz = s.read_word_as_xword()?;
        let p_memsz = s.read_word_as_xword()?;
        let p_flags = s.read_word()?;
        let p_align = s.read_word_as_xword()?;
        Ok(ProgramHeader {
            stype: p_type,
            flags: p_flags,
            obytes: Bytes::from_raw(p_offset, p_filesz),
            vaddr: p_vaddr,
            mem_size: p_memsz,
            align: p_align,
        })
    }
}
