//! Helpers for building tables using the tabled crate.
use crate::styles::Styling;
use tabled::{
    builder::Builder,
    settings::{Alignment, Padding, Style, object::Columns},
};

struct TableCol {
    header: String,
    align: Alignment,
    help: String,
    fields: Vec<String>,
}

/// General table. They look like this:
/// name      low_pc  high_pc  size     if titles
/// ----      ------  -------  ----
/// foo         1000     1020    20
/// bar         1100     1108     8
///
/// name: the symbol name                 if explain
/// low_pc: address of the first byte
/// ...
pub struct TableBuilder {
    cols: Vec<TableCol>,
}

impl TableBuilder {
    pub fn new() -> TableBuilder {
        TableBuilder { cols: Vec::new() }
    }

    /// Left aligned column
    pub fn add_col_l(&mut self, header: &str, help: &str) {
        self.add_col(header, Alignment::left(), help);
    }

    /// Right aligned column
    pub fn add_col_r(&mut self, header: &str, help: &str) {
        self.add_col(header, Alignment::right(), help);
    }

    /// Typically add_field! is used instead.
    pub fn add_str_field(&mut self, header: &str, value: String) {
        let col = self.find_col(header);
        if value.is_empty() {
            // Empty fields screw up tabled formatting.
            col.fields.push(" ".to_string());
        } else {
            col.fields.push(value);
        }
    }

    pub fn num_rows(&self) -> usize {
        self.cols.first().map_or(0, |c| c.fields.len())
    }

    pub fn println(&self, titles: bool, explain: bool) {
        println!("{}", self.render(titles, explain));
    }

    pub fn render(&self, titles: bool, explain: bool) -> String {
        let mut text = self.table_str(titles);
        if explain {
            text.push_str("\n\n");
            text.push_str(&self.explain_str());
        }
        text
    }

    fn add_col(&mut self, header: &str, align: Alignment, help: &str) {
        debug_assert!(!self.cols.iter().any(|c| c.header == header));
        self.cols.push(TableCol {
            header: header.to_string(),
            align,
            help: help.to_string(),
            fields: Vec::new(),
        });
    }

    // Columns have to stay in the order they were added so this is a linear search.
    fn find_col(&mut self, header: &str) -> &mut TableCol {
        self.cols
            .iter_mut()
            .find(|c| c.header == header)
            .unwrap_or_else(|| panic!("no {header} column")) // programmer error
    }

    fn table_str(&self, titles: bool) -> String {
        let height = self.num_rows();
        let mut builder = Builder::with_capacity(height + 2, self.cols.len());
        if titles {
            let header: Vec<String> = self
                .cols
                .iter()
                .map(|c| c.header.as_str().table_header())
                .collect();
            let dashes: Vec<String> = self
                .cols
                .iter()
                .map(|c| "-".repeat(c.header.len()).table_sep())
                .collect();
            builder.push_record(header);
            builder.push_record(dashes);
        }
        for i in 0..height {
            let row: Vec<String> = self.cols.iter().map(|c| c.fields[i].clone()).collect();
            builder.push_record(row);
        }

        let mut table = builder.build();
        for (i, col) in self.cols.iter().enumerate() {
            table.modify(Columns::one(i), col.align);
        }
        table.modify(Columns::first(), Padding::new(0, 1, 0, 0));
        table.with(Style::empty());
        table.to_string()
    }

    fn explain_str(&self) -> String {
        let explains: Vec<String> = self
            .cols
            .iter()
            .map(|c| {
                format!(
                    "{}: {}",
                    c.header.as_str().explain_title(),
                    c.help.as_str().explain_text()
                )
            })
            .collect();
        explains.join("\n")
    }
}

macro_rules! add_field {
    ($builder:ident, $header:literal, $value:expr) => {
        let s = format!("{}", $value);
        $builder.add_str_field($header, s.table_field());
    };
    ($builder:ident, $header:literal, $format:literal, $value:expr) => {
        let s = format!($format, $value);
        $builder.add_str_field($header, s.table_field());
    };
}
pub(crate) use add_field;

struct SimpleRow {
    name: String,
    value: String,
    help: String,
}

/// Table with just name and value columns. They look like this:
/// build id     deadbeef                these have no titles
/// debug link   libfoo.so.debug
///
/// build id: blah blah                  if explain
/// debug link: name of the separate debug file
pub struct SimpleTableBuilder {
    rows: Vec<SimpleRow>,
}

impl SimpleTableBuilder {
    pub fn new() -> SimpleTableBuilder {
        SimpleTableBuilder { rows: Vec::new() }
    }

    /// Typically add_simple! is used instead.
    pub fn add_str_row(&mut self, name: &str, value: String, help: &str) {
        self.rows.push(SimpleRow {
            name: name.to_string(),
            value,
            help: help.to_string(),
        });
    }

    pub fn println(&self, explain: bool) {
        println!("{}", self.render(explain));
    }

    pub fn render(&self, explain: bool) -> String {
        let mut text = self.table_str();
        if explain {
            text.push_str("\n\n");
            text.push_str(&self.explain_str());
        }
        text
    }

    fn table_str(&self) -> String {
        let mut builder = Builder::with_capacity(self.rows.len(), 2);
        for row in self.rows.iter() {
            builder.push_record([row.name.clone(), row.value.clone()]);
        }

        let mut table = builder.build();
        table.modify(Columns::one(0), Alignment::left());
        table.modify(Columns::one(1), Alignment::left());
        table.modify(Columns::first(), Padding::new(0, 1, 0, 0));
        table.with(Style::empty());
        table.to_string()
    }

    fn explain_str(&self) -> String {
        let explains: Vec<String> = self
            .rows
            .iter()
            .map(|r| {
                format!(
                    "{}: {}",
                    r.name.as_str().explain_title(),
                    r.help.as_str().explain_text()
                )
            })
            .collect();
        explains.join("\n")
    }
}

macro_rules! add_simple {
    ($builder:ident, $name:literal, $value:expr, $help:expr) => {
        let s = format!("{}", $value);
        $builder.add_str_row($name, s.table_field(), $help);
    };
    ($builder:ident, $name:literal, $format:literal, $value:expr, $help:expr) => {
        let s = format!($format, $value);
        $builder.add_str_row($name, s.table_field(), $help);
    };
}
pub(crate) use add_simple;

/// Splits rendered table output into whitespace separated cells, which keeps tests
/// independent of column widths.
#[cfg(test)]
pub fn cells(text: &str) -> Vec<Vec<String>> {
    crate::styles::strip_escapes(text)
        .lines()
        .map(|line| line.split_whitespace().map(str::to_string).collect())
        .collect()
}
