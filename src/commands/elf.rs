//! Low level views of the ELF structures the identity and symbol lookups are built on.
use super::tables::{SimpleTableBuilder, TableBuilder, add_field, add_simple};
use crate::cli::{ExplainArgs, TableArgs};
use crate::styles::{Styling, warn};
use elfsym::Result;
use elfsym::elf::{ElfClass, ElfFile, NoteType, SectionHeader, SectionType};

pub fn header(args: &ExplainArgs) -> Result {
    let file = ElfFile::new(&args.path)?;
    header_table(&file).println(args.explain);
    Ok(())
}

pub fn sections(args: &TableArgs) -> Result {
    let file = ElfFile::new(&args.path)?;
    sections_table(&file).println(args.titles, args.explain);
    Ok(())
}

pub fn notes(args: &TableArgs) -> Result {
    let file = ElfFile::new(&args.path)?;
    let builder = notes_table(&file);
    if builder.num_rows() == 0 {
        println!("no note sections");
    } else {
        builder.println(args.titles, args.explain);
    }
    Ok(())
}

fn header_table(file: &ElfFile) -> SimpleTableBuilder {
    let mut b = SimpleTableBuilder::new();
    let header = &file.header;
    add_simple!(b, "type", header.stype(), "type of ELF file");
    add_simple!(
        b,
        "little endian",
        file.reader.little_endian,
        "true if the least significant byte of words comes first"
    );
    let pointers = match file.reader.class {
        ElfClass::Elf32 => "pointers and offsets are four bytes",
        ElfClass::Elf64 => "pointers and offsets are eight bytes",
    };
    add_simple!(
        b,
        "64-bit",
        file.reader.class == ElfClass::Elf64,
        pointers
    );
    add_simple!(b, "osabi", header.abi(), "the OS the binary was compiled for");
    add_simple!(b, "abiversion", header.abiversion, "zero for Linux");
    add_simple!(b, "machine", header.machine(), "CPU architecture");
    add_simple!(b, "entry", "{:x}", header.entry, "address of the entry point (hex)");
    add_simple!(b, "flags", header.flags, "processor specific flags");
    add_simple!(
        b,
        "ph_offset",
        "{:x}",
        header.ph_offset,
        "offset in the ELF file to the program header table (hex)"
    );
    add_simple!(
        b,
        "num_ph_entries",
        header.num_ph_entries,
        "number of entries in the program header table"
    );
    add_simple!(
        b,
        "section_offset",
        "{:x}",
        header.section_offset,
        "offset in the ELF file to the section header table (hex)"
    );
    add_simple!(
        b,
        "num_sections",
        file.sections().len(),
        "number of sections, including any stored in section zero"
    );
    add_simple!(
        b,
        "string_table_index",
        header.string_table_index,
        "section index containing section names, 65535 if stored in section zero"
    );
    b
}

fn sections_table(file: &ElfFile) -> TableBuilder {
    let mut builder = TableBuilder::new();
    builder.add_col_r("index", "index into sections");
    builder.add_col_l("name", "from the section name string table");
    builder.add_col_l("type", "type of the section");
    builder.add_col_r("vaddr", "virtual address at execution (hex)");
    builder.add_col_r("offset", "offset into the ELF file for the start of the section (hex)");
    builder.add_col_r("size", "section size in bytes (hex)");
    builder.add_col_r("entry_size", "set if the section holds a table of entries");
    builder.add_col_r("align", "section alignment");
    builder.add_col_r(
        "link",
        "link to another section with related information, usually a string or symbol table",
    );
    builder.add_col_l("flags", "write, alloc, and/or exec");

    // Sections are referenced by index so these aren't sorted.
    for section in file.sections() {
        add_field!(builder, "index", section.index.0);
        add_field!(builder, "name", section.name);
        add_field!(builder, "type", "{:?}", section.stype);
        add_field!(builder, "vaddr", "{:x}", section.vaddr);
        add_field!(builder, "offset", "{:x}", section.obytes.start);
        add_field!(builder, "size", "{:x}", section.obytes.size);
        add_field!(builder, "entry_size", section.entry_size);
        add_field!(builder, "align", section.align);
        add_field!(builder, "link", section.link.0);
        add_field!(builder, "flags", SectionHeader::flags(section.flags));
    }
    builder
}

fn notes_table(file: &ElfFile) -> TableBuilder {
    let mut builder = TableBuilder::new();
    builder.add_col_l("section", "the note section");
    builder.add_col_l("name", "owner of the note");
    builder.add_col_l("type", "the type of the note");
    builder.add_col_r("offset", "offset into the ELF file of the descriptor (hex)");
    builder.add_col_r("size", "size of the descriptor");
    builder.add_col_l("contents", "the descriptor for build ids");

    let sections = file
        .sections()
        .iter()
        .filter(|s| s.stype == SectionType::Note);
    for section in sections {
        let notes = match file.notes(section.obytes, section.align) {
            Ok(notes) => notes,
            Err(err) => {
                warn(&format!("skipping {}: {err}", section.name));
                continue;
            }
        };
        for note in notes {
            let note = match note {
                Ok(note) => note,
                Err(err) => {
                    warn(&format!("bad note in {}: {err}", section.name));
                    break;
                }
            };
            let contents = match note.ntype {
                NoteType::GnuBuildId => file
                    .reader
                    .slice(note.contents.start.0, note.contents.size)
                    .map(hex::encode)
                    .unwrap_or_default(),
                _ => String::new(),
            };
            add_field!(builder, "section", section.name);
            add_field!(builder, "name", note.name);
            add_field!(builder, "type", "{:?}", note.ntype);
            add_field!(builder, "offset", "{:x}", note.contents.start);
            add_field!(builder, "size", note.contents.size);
            add_field!(builder, "contents", contents);
        }
    }
    builder
}
