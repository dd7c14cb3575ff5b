//! Notes are small tagged records stored in note sections and note segments. The ones
//! we care about are the GNU notes in executables and shared objects, in particular the
//! build id.
use super::{Reader, Stream};
use crate::elf::Bytes;
use crate::error::{Error, Result};
use crate::utils;

/// Size of the namesz, descsz, and type fields.
const NOTE_HEADER_SIZE: u64 = 12;

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum NoteType {
    /// The OS and minimum kernel version the binary was built for.
    GnuAbiTag,

    /// Hardware capabilities.
    GnuHwCap,

    /// Bytes that uniquely identify a build. Used to find the matching debug file.
    GnuBuildId,

    /// Version of the gold linker.
    GnuGoldVersion,

    /// Properties such as CET/BTI support.
    GnuProperty,

    /// Everything else, including all non-GNU notes.
    Other(u32),
}

impl NoteType {
    pub fn new(name: &str, ntype: u32) -> Self {
        if name != "GNU" {
            return NoteType::Other(ntype);
        }
        match ntype {
            1 => NoteType::GnuAbiTag, // see https://refspecs.linuxfoundation.org/LSB_1.2.0/gLSB/noteabitag.html
            2 => NoteType::GnuHwCap,
            3 => NoteType::GnuBuildId,
            4 => NoteType::GnuGoldVersion,
            5 => NoteType::GnuProperty,
            _ => NoteType::Other(ntype),
        }
    }
}

#[derive(Debug)]
pub struct Note {
    /// Owner of the note, e.g. "GNU".
    pub name: String,

    pub ntype: NoteType,

    /// The descriptor bytes.
    pub contents: Bytes,
}

/// Iterates over the notes within a note section or segment. Iteration stops after the
/// first error.
pub struct Notes<'a> {
    stream: Stream<'a>,
    end: u64,
    align: u64,
}

impl<'a> Notes<'a> {
    /// The range must already have been checked against the file. Records are padded
    /// to four bytes unless the section or segment says eight.
    pub fn new(reader: &'a Reader, range: Bytes, align: u64) -> Result<Self> {
        let end = range
            .end()
            .ok_or_else(|| Error::format("note range overflows"))?;
        Ok(Notes {
            stream: Stream::new(reader, range.start.0),
            end: end.0,
            align: if align == 8 { 8 } else { 4 },
        })
    }
}

impl Iterator for Notes<'_> {
    type Item = Result<Note>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.stream.offset >= self.end {
            return None;
        }
        let result = read_note(&mut self.stream, self.end, self.align);
        if result.is_err() {
            self.stream.offset = self.end;
        }
        Some(result)
    }
}

/// Reads the note at the stream's offset and advances past it (and its padding). All of
/// the note, apart from trailing padding, has to be before end.
pub fn read_note(s: &mut Stream, end: u64, align: u64) -> Result<Note> {
    let start = s.offset;
    utils::require(
        end.saturating_sub(start) >= NOTE_HEADER_SIZE,
        &format!("truncated note header at offset 0x{start:x}"),
    )?;
    let n_namesz = s.read_word()? as u64;
    let n_descsz = s.read_word()? as u64;
    let n_type = s.read_word()?;

    let name_offset = s.offset;
    let desc_offset = utils::align_up(name_offset + n_namesz, align)
        .ok_or_else(|| Error::format("note name size overflows"))?;
    let desc_end = desc_offset
        .checked_add(n_descsz)
        .ok_or_else(|| Error::format("note descriptor size overflows"))?;
    utils::require(
        desc_end <= end,
        &format!("note at offset 0x{start:x} extends past the end of its section"),
    )?;

    let name_bytes = s.reader.slice_of("note name", name_offset, n_namesz)?;
    let name_len = name_bytes
        .iter()
        .position(|&b| b == 0)
        .unwrap_or(name_bytes.len());
    let name = String::from_utf8_lossy(&name_bytes[..name_len]).into_owned();

    // The last note's padding may be missing.
    s.offset = utils::align_up(desc_end, align)
        .unwrap_or(end)
        .min(end);

    Ok(Note {
        ntype: NoteType::new(&name, n_type),
        name,
        contents: Bytes::from_raw(desc_offset, n_descsz),
    })
}
