//! Canonical text output for specifications and concept files.
//!
//! Formatting a parsed document and parsing the output again yields the
//! same document, so formatting twice is the same as formatting once.

use std::fmt::Write as _;

use speclang_core::{
    arg::ArgType,
    concept::Concept,
    spec::{Comment, DataTable, Item, Specification, Tags},
    step::{Fragment, Step, escape_static},
    table::{CellType, Table},
};

/// Default number of spaces before each table line.
pub const DEFAULT_TABLE_INDENT: usize = 5;

/// Writes documents back as text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Formatter {
    table_indent: usize,
}

impl Default for Formatter {
    fn default() -> Self {
        Self {
            table_indent: DEFAULT_TABLE_INDENT,
        }
    }
}

impl Formatter {
    pub fn new(table_indent: usize) -> Self {
        Self { table_indent }
    }

    pub fn table_indent(&self) -> usize {
        self.table_indent
    }

    /// Formats a specification. The heading always comes first.
    pub fn format_specification(&self, spec: &Specification) -> String {
        let mut out = String::new();
        if let Some(heading) = spec.heading() {
            let _ = writeln!(out, "# {}", heading.value().trim());
        }
        for item in spec.items() {
            self.write_item(&mut out, item);
        }
        out
    }

    /// Formats the concepts of one concept file, in order.
    pub fn format_concepts<'a>(&self, concepts: impl IntoIterator<Item = &'a Concept>) -> String {
        let mut out = String::new();
        for concept in concepts {
            for comment in concept.pre_comments() {
                write_comment(&mut out, comment);
            }
            let _ = writeln!(out, "# {}", concept.heading().parameterized_text());
            for item in concept.items() {
                self.write_item(&mut out, item);
            }
        }
        out
    }

    /// Formats a single step with its trailing table or multiline block.
    pub fn format_step(&self, step: &Step) -> String {
        let mut out = String::new();
        self.write_step(&mut out, step);
        out
    }

    /// Formats a table with padded columns and a separator row.
    pub fn format_table(&self, table: &Table) -> String {
        let mut out = String::new();
        self.write_table(&mut out, table);
        out
    }

    fn write_item(&self, out: &mut String, item: &Item) {
        match item {
            Item::Comment(comment) => write_comment(out, comment),
            Item::Step(step) => self.write_step(out, step),
            Item::Tags(tags) => write_tags(out, tags),
            Item::DataTable(data_table) => self.write_data_table(out, data_table),
            Item::TearDown(teardown) => {
                let _ = writeln!(out, "{}", teardown.value());
            }
            Item::Scenario(scenario) => {
                let _ = writeln!(out, "## {}", scenario.heading().value().trim());
                for item in scenario.items() {
                    self.write_item(out, item);
                }
            }
        }
    }

    fn write_step(&self, out: &mut String, step: &Step) {
        let mut text = String::with_capacity(step.value().len());
        let mut trailing = Vec::new();

        for fragment in step.fragments() {
            match fragment {
                Fragment::Text(piece) => escape_reserved(&mut text, piece),
                Fragment::Param(arg) if arg.is_multiline() || arg.arg_type() == ArgType::Table => {
                    trailing.push(arg);
                }
                Fragment::Param(arg) => match arg.arg_type() {
                    ArgType::Static => {
                        let _ = write!(text, "\"{}\"", escape_static(arg.value()));
                    }
                    ArgType::Dynamic => {
                        let _ = write!(text, "<{}>", arg.value());
                    }
                    ArgType::SpecialString | ArgType::SpecialTable | ArgType::Table => {
                        let _ = write!(text, "<{}>", arg.name());
                    }
                },
            }
        }

        let _ = writeln!(out, "* {}", text.trim_end());
        for arg in trailing {
            match arg.table_value() {
                Some(table) => self.write_table(out, table),
                None => {
                    let _ = writeln!(out, "\"\"\"\n{}\n\"\"\"", arg.value());
                }
            }
        }
    }

    fn write_data_table(&self, out: &mut String, data_table: &DataTable) {
        match data_table.reference() {
            Some(path) => {
                let _ = writeln!(out, "table: {path}");
            }
            None => self.write_table(out, data_table.table()),
        }
    }

    fn write_table(&self, out: &mut String, table: &Table) {
        if !table.is_initialized() {
            return;
        }

        let headers: Vec<String> = table.headers().map(escape_cell).collect();
        let rows: Vec<Vec<String>> = table
            .rows()
            .map(|row| {
                row.into_iter()
                    .map(|cell| match cell.cell_type() {
                        CellType::Static => escape_cell(cell.value()),
                        CellType::Dynamic | CellType::SpecialString => {
                            format!("<{}>", escape_cell(cell.value()))
                        }
                    })
                    .collect()
            })
            .collect();

        let widths: Vec<usize> = headers
            .iter()
            .enumerate()
            .map(|(index, header)| {
                rows.iter()
                    .filter_map(|row| row.get(index))
                    .map(|cell| cell.chars().count())
                    .fold(header.chars().count(), usize::max)
            })
            .collect();

        let indent = " ".repeat(self.table_indent);
        write_row(out, &indent, &headers, &widths);
        let separator: Vec<String> = widths.iter().map(|width| "-".repeat(*width)).collect();
        write_row(out, &indent, &separator, &widths);
        for row in &rows {
            write_row(out, &indent, row, &widths);
        }
    }
}

fn write_row(out: &mut String, indent: &str, cells: &[String], widths: &[usize]) {
    out.push_str(indent);
    out.push('|');
    for (cell, width) in cells.iter().zip(widths) {
        let _ = write!(out, "{cell:<width$}|");
    }
    out.push('\n');
}

fn write_comment(out: &mut String, comment: &Comment) {
    if comment.is_blank_line() {
        out.push('\n');
    } else {
        let _ = writeln!(out, "{}", comment.value());
    }
}

fn write_tags(out: &mut String, tags: &Tags) {
    let _ = writeln!(out, "tags: {}", tags.values().join(", "));
}

fn escape_reserved(out: &mut String, text: &str) {
    for c in text.chars() {
        if matches!(c, '{' | '}') {
            out.push('\\');
        }
        out.push(c);
    }
}

fn escape_cell(value: &str) -> String {
    value.replace('\\', "\\\\").replace('|', "\\|")
}

/// Formats `spec` with the default table indent.
pub fn format_specification(spec: &Specification) -> String {
    Formatter::default().format_specification(spec)
}

/// Formats concepts with the default table indent.
pub fn format_concepts<'a>(concepts: impl IntoIterator<Item = &'a Concept>) -> String {
    Formatter::default().format_concepts(concepts)
}
