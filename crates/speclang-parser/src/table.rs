//! Scanning of `|`-delimited table lines.

use std::collections::HashSet;

use winnow::{
    Parser as _,
    combinator::{alt, preceded, repeat, terminated},
    error::{ContextError, ErrMode},
    token::{any, none_of},
};

use crate::error::{Diagnostic, ErrorCode};

type IResult<O> = std::result::Result<O, ErrMode<ContextError>>;

/// One cell: characters up to an unescaped `|`. A backslash keeps the
/// character after it.
fn table_cell(input: &mut &str) -> IResult<String> {
    terminated(
        repeat(0.., alt((preceded('\\', any), none_of(['|', '\\'])))),
        '|',
    )
    .map(|cell: String| cell.trim().to_string())
    .parse_next(input)
}

fn table_cells(input: &mut &str) -> IResult<Vec<String>> {
    preceded('|', repeat(0.., table_cell)).parse_next(input)
}

/// Returns `true` if `line` looks like a table line, `|...|`.
pub(crate) fn is_table_line(line: &str) -> bool {
    line.len() > 1 && line.starts_with('|') && line.ends_with('|')
}

/// Splits a trimmed table line into its trimmed cells.
///
/// Text after the last unescaped `|` (possible when the closing bar is
/// escaped) becomes a final cell.
pub(crate) fn split_cells(line: &str) -> Vec<String> {
    let mut input = line;
    let Ok(mut cells) = table_cells(&mut input) else {
        return Vec::new();
    };

    let tail = input.replace("\\|", "|");
    let tail = tail.trim();
    if !tail.is_empty() {
        cells.push(tail.to_string());
    }
    cells
}

/// Checks the cells of a table header.
pub(crate) fn validate_header(cells: &[String]) -> Result<(), Diagnostic> {
    if cells.iter().any(|cell| cell.is_empty()) {
        return Err(Diagnostic::error("Table header should not be blank")
            .with_code(ErrorCode::E006)
            .with_help("give every column a name"));
    }

    let mut seen = HashSet::with_capacity(cells.len());
    if let Some(duplicate) = cells.iter().find(|cell| !seen.insert(cell.as_str())) {
        return Err(
            Diagnostic::error("Table header cannot have repeated column values")
                .with_code(ErrorCode::E007)
                .with_help(format!("rename one of the `{duplicate}` columns")),
        );
    }
    Ok(())
}

/// Returns `true` for a row that only underlines the header, `|---|---|`.
pub(crate) fn is_separator_row(cells: &[String]) -> bool {
    !cells.is_empty() && cells.iter().all(|cell| is_underline(cell, '-'))
}

/// Returns `true` if `text` is made only of `marker`.
pub(crate) fn is_underline(text: &str, marker: char) -> bool {
    !text.is_empty() && text.chars().all(|c| c == marker)
}
