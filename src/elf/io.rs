use crate::error::{Error, Result};
use crate::utils;
use memmap2::Mmap;

const EI_NIDENT: usize = 16;

/// ELF files come in two flavors which differ in the size of addresses and in the
/// layout of most of the tables. This is decided once when the file is opened and the
/// table readers pick their decoders based on it.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ElfClass {
    Elf32,
    Elf64,
}

impl ElfClass {
    fn from_u8(value: u8) -> Result<Self> {
        match value {
            1 => Ok(ElfClass::Elf32),
            2 => Ok(ElfClass::Elf64),
            _ => Err(Error::Format(format!("bad elf class: {value}"))),
        }
    }

    pub fn header_size(self) -> u64 {
        match self {
            ElfClass::Elf32 => 52,
            ElfClass::Elf64 => 64,
        }
    }

    pub fn section_header_size(self) -> u64 {
        match self {
            ElfClass::Elf32 => 40,
            ElfClass::Elf64 => 64,
        }
    }

    pub fn program_header_size(self) -> u64 {
        match self {
            ElfClass::Elf32 => 32,
            ElfClass::Elf64 => 56,
        }
    }

    pub fn symbol_size(self) -> u64 {
        match self {
            ElfClass::Elf32 => 16,
            ElfClass::Elf64 => 24,
        }
    }
}

pub struct Reader {
    pub little_endian: bool,
    pub class: ElfClass,
    bytes: Mmap,
}

impl Reader {
    /// Validates the identification bytes. Everything else in the file is checked as
    /// it is read: all of the read functions fail (rather than panic) when asked for
    /// bytes past the end of the file.
    pub fn new(bytes: Mmap) -> Result<Self> {
        // see https://en.wikipedia.org/wiki/Executable_and_Linkable_Format
        utils::require(bytes.len() >= EI_NIDENT, "file is too small to be an ELF file")?;
        utils::require(
            bytes[0..4] == [0x7f, b'E', b'L', b'F'],
            "not an ELF file (bad magic)",
        )?;

        let class = ElfClass::from_u8(bytes[4])?;
        let ei_data = bytes[5];
        let ei_version = bytes[6];
        utils::require(
            ei_data == 1 || ei_data == 2,
            &format!("bad elf data encoding: {ei_data}"),
        )?;
        utils::require(ei_version == 1, &format!("bad elf version: {ei_version}"))?;

        Ok(Reader {
            bytes,
            class,
            little_endian: ei_data == 1,
        })
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn slice(&self, offset: u64, size: u64) -> Result<&[u8]> {
        self.checked_slice(offset, size)
            .ok_or_else(|| Error::out_of_bounds("read", offset, size, self.len()))
    }

    /// Like slice but with a better description of what was being read.
    pub fn slice_of(&self, what: &str, offset: u64, size: u64) -> Result<&[u8]> {
        self.checked_slice(offset, size)
            .ok_or_else(|| Error::out_of_bounds(what, offset, size, self.len()))
    }

    pub fn read_byte(&self, offset: u64) -> Result<u8> {
        Ok(self.slice(offset, 1)?[0])
    }

    pub fn read_half(&self, offset: u64) -> Result<u16> {
        let bytes: [u8; 2] = self.array(offset)?;
        if self.little_endian {
            Ok(u16::from_le_bytes(bytes))
        } else {
            Ok(u16::from_be_bytes(bytes))
        }
    }

    pub fn read_word(&self, offset: u64) -> Result<u32> {
        let bytes: [u8; 4] = self.array(offset)?;
        if self.little_endian {
            Ok(u32::from_le_bytes(bytes))
        } else {
            Ok(u32::from_be_bytes(bytes))
        }
    }

    pub fn read_xword(&self, offset: u64) -> Result<u64> {
        let bytes: [u8; 8] = self.array(offset)?;
        if self.little_endian {
            Ok(u64::from_le_bytes(bytes))
        } else {
            Ok(u64::from_be_bytes(bytes))
        }
    }

    /// Returns the bytes of a null-terminated string starting at offset. The string
    /// (including the terminator) must end before limit, which is normally the end of
    /// the string table the string lives in.
    pub fn read_cstr(&self, offset: u64, limit: u64) -> Result<&[u8]> {
        if offset >= limit {
            return Err(Error::Format(format!(
                "string at offset 0x{offset:x} starts past the end of its table (0x{limit:x})"
            )));
        }
        let bytes = self.slice_of("string table", offset, limit - offset)?;
        match bytes.iter().position(|&b| b == 0) {
            Some(len) => Ok(&bytes[..len]),
            None => Err(Error::Format(format!(
                "string at offset 0x{offset:x} isn't null terminated"
            ))),
        }
    }

    /// Decode a value using the file's byte order. Useful for data that has already
    /// been sliced out of the file, e.g. the CRC in a debug link.
    pub fn word_from(&self, bytes: [u8; 4]) -> u32 {
        if self.little_endian {
            u32::from_le_bytes(bytes)
        } else {
            u32::from_be_bytes(bytes)
        }
    }

    fn checked_slice(&self, offset: u64, size: u64) -> Option<&[u8]> {
        let start = usize::try_from(offset).ok()?;
        let end = start.checked_add(usize::try_from(size).ok()?)?;
        self.bytes.get(start..end)
    }

    fn array<const N: usize>(&self, offset: u64) -> Result<[u8; N]> {
        let slice = self.slice(offset, N as u64)?;
        let mut bytes = [0; N];
        bytes.copy_from_slice(slice);
        Ok(bytes)
    }
}

/// Sequential reads from a Reader. The offset is only advanced when a read succeeds.
pub struct Stream<'a> {
    pub reader: &'a Reader,
    pub offset: u64,
}

impl<'a> Stream<'a> {
    pub fn new(reader: &'a Reader, offset: u64) -> Self {
        Stream { reader, offset }
    }

    pub fn read_byte(&mut self) -> Result<u8> {
        let byte = self.reader.read_byte(self.offset)?;
        self.offset += 1;
        Ok(byte)
    }

    pub fn read_half(&mut self) -> Result<u16> {
        let half = self.reader.read_half(self.offset)?;
        self.offset += 2;
        Ok(half)
    }

    pub fn read_word(&mut self) -> Result<u32> {
        let word = self.reader.read_word(self.offset)?;
        self.offset += 4;
        Ok(word)
    }

    pub fn read_xword(&mut self) -> Result<u64> {
        let xword = self.reader.read_xword(self.offset)?;
        self.offset += 8;
        Ok(xword)
    }

    /// Reads a 32-bit word and widens it. Used for ELF32 addresses, offsets, and sizes.
    pub fn read_word_as_xword(&mut self) -> Result<u64> {
        Ok(self.read_word()? as u64)
    }
}
