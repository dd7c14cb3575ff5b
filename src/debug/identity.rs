//! Metadata used to find the separate debug file for a stripped module: the GNU build
//! id note and the .gnu_debuglink section. Both are optional and most binaries lack at
//! least one of them.
use crate::elf::{Bytes, ElfFile, NoteType, SectionHeader, SectionType, SegmentType};
use crate::error::{Error, Result};
use crate::utils;

const BUILD_ID_SECTION: &str = ".note.gnu.build-id";
const DEBUG_LINK_SECTION: &str = ".gnu_debuglink";

/// Parsed contents of the .gnu_debuglink section.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DebugLink {
    /// Name of the debug file, without any directories.
    pub file_name: String,

    /// CRC32 of the debug file, None if the section was too short to hold one.
    pub crc: Option<u32>,
}

/// Returns the descriptor bytes of the GNU build id note, or None if there isn't one.
///
/// The conventional section is checked first and anything wrong with it is an error.
/// Then the other note sections are scanned, and if there are no note sections at all
/// (e.g. the section headers were stripped), the note segments. Problems with those are
/// logged and skipped.
pub fn find_build_id(file: &ElfFile) -> Result<Option<Vec<u8>>> {
    let named = file
        .find_section_by_name(BUILD_ID_SECTION)
        .filter(|s| s.stype == SectionType::Note);
    if let Some(section) = named {
        if let Some(id) = build_id_in(file, section.obytes, section.align)? {
            return Ok(Some(id));
        }
    }

    let mut have_note_sections = named.is_some();
    for section in file.sections() {
        if section.stype != SectionType::Note || Some(section.index) == named.map(|s| s.index) {
            continue;
        }
        have_note_sections = true;
        match build_id_in(file, section.obytes, section.align) {
            Ok(Some(id)) => return Ok(Some(id)),
            Ok(None) => (),
            Err(err) => warn_skipped(file, &section.name, &err),
        }
    }
    if have_note_sections {
        return Ok(None);
    }

    let segments = match file.segments() {
        Ok(segments) => segments,
        Err(err) => {
            warn_skipped(file, "program headers", &err);
            return Ok(None);
        }
    };
    for segment in segments.iter().filter(|s| s.stype == SegmentType::Note) {
        match build_id_in(file, segment.obytes, segment.align) {
            Ok(Some(id)) => return Ok(Some(id)),
            Ok(None) => (),
            Err(err) => warn_skipped(file, "note segment", &err),
        }
    }
    Ok(None)
}

/// Returns the contents of the .gnu_debuglink section, or None if there isn't one. The
/// format is a file name, a zero byte, padding to a four-byte boundary, and a CRC32 in
/// the file's byte order.
///
/// Files written by objcopy --only-keep-debug keep the section header but not the
/// contents. Those count as having no link.
pub fn find_debug_link(file: &ElfFile) -> Result<Option<DebugLink>> {
    let section = file
        .find_section_by_name(DEBUG_LINK_SECTION)
        .filter(|s| s.has_contents());
    let Some(section) = section else {
        return Ok(None);
    };
    parse_debug_link(file, section).map(Some)
}

fn parse_debug_link(file: &ElfFile, section: &SectionHeader) -> Result<DebugLink> {
    let data = file.section_data(section)?;
    let Some(len) = data.iter().position(|&b| b == 0) else {
        return Err(Error::format("debug link file name isn't null terminated"));
    };
    let file_name = String::from_utf8_lossy(&data[..len]).into_owned();

    let crc = utils::align_up(len as u64 + 1, 4)
        .and_then(|start| data.get(start as usize..start as usize + 4))
        .map(|bytes| {
            let mut word = [0; 4];
            word.copy_from_slice(bytes);
            file.reader.word_from(word)
        });
    Ok(DebugLink { file_name, crc })
}

fn build_id_in(file: &ElfFile, range: Bytes, align: u64) -> Result<Option<Vec<u8>>> {
    for note in file.notes(range, align)? {
        let note = note?;
        if note.ntype == NoteType::GnuBuildId {
            let desc = file
                .reader
                .slice_of("build id", note.contents.start.0, note.contents.size)?;
            return Ok(Some(desc.to_vec()));
        }
    }
    Ok(None)
}

fn warn_skipped(file: &ElfFile, what: &str, err: &Error) {
    tracing::warn!(
        path = %file.path.display(),
        "skipping {what} while looking for a build id: {err}"
    );
}
