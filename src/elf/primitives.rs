use std::fmt;

/// Index into the section table.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd)]
pub struct SectionIndex(pub u32);

/// Index into a string table.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd)]
pub struct StringIndex(pub u32);

/// An index into a byte within an ELF file.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd)]
pub struct Offset(pub u64);

/// A link-time virtual address. Callers add the load bias to get a runtime address.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd)]
pub struct VirtualAddr(pub u64);

/// A range of bytes within an ELF file. These come straight from headers so nothing
/// guarantees that they are inside the file, see Reader::slice.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Bytes {
    pub start: Offset,
    pub size: u64,
}

impl Bytes {
    pub fn from_raw(start: u64, size: u64) -> Self {
        Bytes {
            start: Offset(start),
            size,
        }
    }

    /// One past the last byte, or None if a corrupted header made this overflow.
    pub fn end(&self) -> Option<Offset> {
        self.start.0.checked_add(self.size).map(Offset)
    }

    pub fn contains(&self, offset: Offset) -> bool {
        match self.end() {
            Some(end) => offset >= self.start && offset < end,
            None => false,
        }
    }
}

impl fmt::LowerHex for Offset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::LowerHex::fmt(&self.0, f)
    }
}

impl fmt::LowerHex for VirtualAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::LowerHex::fmt(&self.0, f)
    }
}
