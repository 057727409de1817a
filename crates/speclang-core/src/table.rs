//! Tabular values used by data tables, inline step tables and CSV-backed
//! special parameters.
//!
//! A [`Table`] keeps its columns in header insertion order. Every column has
//! the same length; rows shorter than the header are padded with empty
//! static cells when they are added.
//!
//! # Example
//!
//! ```
//! # use speclang_core::table::{Table, TableCell};
//! let mut table = Table::new(3);
//! table.add_headers(["id", "name"]);
//! table.add_row_values(["1", "alice"]);
//! table.add_row(vec![TableCell::dynamic("user")]);
//!
//! assert_eq!(table.row_count(), 2);
//! assert_eq!(table.get("name").unwrap()[1].value(), "");
//! ```

use std::fmt;

use indexmap::IndexMap;
use thiserror::Error;

/// Errors raised when querying a [`Table`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TableError {
    #[error("Table column {0} not found")]
    ColumnNotFound(String),

    #[error("Table row {index} out of range, table has {rows} rows")]
    RowOutOfRange { index: usize, rows: usize },
}

/// How a table cell's value is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CellType {
    /// The cell holds a literal value.
    #[default]
    Static,
    /// The cell names a parameter resolved from the enclosing lookup.
    Dynamic,
    /// The cell holds a `file:path` special parameter, without brackets.
    SpecialString,
}

/// A single cell of a [`Table`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TableCell {
    value: String,
    cell_type: CellType,
}

impl TableCell {
    /// Creates a cell with an explicit type.
    pub fn new(value: impl Into<String>, cell_type: CellType) -> Self {
        Self {
            value: value.into(),
            cell_type,
        }
    }

    /// Creates a literal cell.
    pub fn literal(value: impl Into<String>) -> Self {
        Self::new(value, CellType::Static)
    }

    /// Creates a cell referencing the parameter `name`.
    pub fn dynamic(name: impl Into<String>) -> Self {
        Self::new(name, CellType::Dynamic)
    }

    /// Creates a cell holding a special parameter such as `file:notes.txt`.
    pub fn special_string(param: impl Into<String>) -> Self {
        Self::new(param, CellType::SpecialString)
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn cell_type(&self) -> CellType {
        self.cell_type
    }

    pub fn is_dynamic(&self) -> bool {
        self.cell_type == CellType::Dynamic
    }
}

impl fmt::Display for TableCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.cell_type {
            CellType::Static => write!(f, "{}", self.value),
            CellType::Dynamic | CellType::SpecialString => write!(f, "<{}>", self.value),
        }
    }
}

/// An ordered, column-oriented table.
///
/// The table is *uninitialized* until [`Table::add_headers`] has been called
/// with at least one header. An uninitialized table reports zero rows.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Table {
    columns: IndexMap<String, Vec<TableCell>>,
    line_no: usize,
}

impl Table {
    /// Creates an empty table declared at `line_no`.
    pub fn new(line_no: usize) -> Self {
        Self {
            columns: IndexMap::new(),
            line_no,
        }
    }

    /// Line number of the table header in its source file.
    pub fn line_no(&self) -> usize {
        self.line_no
    }

    pub fn set_line_no(&mut self, line_no: usize) {
        self.line_no = line_no;
    }

    /// Returns `true` once headers have been added.
    pub fn is_initialized(&self) -> bool {
        !self.columns.is_empty()
    }

    /// Adds column headers in order. Headers are trimmed; a header that is
    /// already present keeps its existing column.
    pub fn add_headers<I, S>(&mut self, headers: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for header in headers {
            let rows = self.row_count();
            self.columns
                .entry(header.as_ref().trim().to_string())
                .or_insert_with(|| vec![TableCell::default(); rows]);
        }
    }

    /// Appends a row of literal values.
    pub fn add_row_values<I, S>(&mut self, values: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let cells = values
            .into_iter()
            .map(|value| TableCell::literal(value.as_ref().trim()))
            .collect();
        self.add_row(cells);
    }

    /// Appends a row of cells, padding it to the header width with empty
    /// static cells. Cells beyond the header width are dropped.
    pub fn add_row(&mut self, cells: Vec<TableCell>) {
        let mut cells = cells.into_iter();
        for column in self.columns.values_mut() {
            column.push(cells.next().unwrap_or_default());
        }
    }

    /// Column headers in declaration order.
    pub fn headers(&self) -> impl ExactSizeIterator<Item = &str> {
        self.columns.keys().map(String::as_str)
    }

    pub fn header_count(&self) -> usize {
        self.columns.len()
    }

    pub fn contains_header(&self, header: &str) -> bool {
        self.columns.contains_key(header)
    }

    /// Number of data rows. Zero for an uninitialized table.
    pub fn row_count(&self) -> usize {
        self.columns.first().map_or(0, |(_, column)| column.len())
    }

    /// Returns the cells of the column named `header`.
    ///
    /// # Errors
    ///
    /// Returns [`TableError::ColumnNotFound`] if there is no such column.
    pub fn get(&self, header: &str) -> Result<&[TableCell], TableError> {
        self.columns
            .get(header)
            .map(Vec::as_slice)
            .ok_or_else(|| TableError::ColumnNotFound(header.to_string()))
    }

    /// Returns the cells of row `index` in header order.
    ///
    /// # Errors
    ///
    /// Returns [`TableError::RowOutOfRange`] if `index` is not a valid row.
    pub fn row(&self, index: usize) -> Result<Vec<&TableCell>, TableError> {
        let rows = self.row_count();
        if index >= rows {
            return Err(TableError::RowOutOfRange { index, rows });
        }
        Ok(self.columns.values().map(|column| &column[index]).collect())
    }

    /// Iterates over all rows in order.
    pub fn rows(&self) -> impl Iterator<Item = Vec<&TableCell>> {
        (0..self.row_count()).map(|index| {
            self.columns
                .values()
                .map(|column| &column[index])
                .collect::<Vec<_>>()
        })
    }

    /// Returns a copy of this table holding only row `index`.
    ///
    /// # Errors
    ///
    /// Returns [`TableError::RowOutOfRange`] if `index` is not a valid row.
    pub fn with_single_row(&self, index: usize) -> Result<Table, TableError> {
        let row = self.row(index)?.into_iter().cloned().collect();
        let mut table = Table::new(self.line_no);
        table.add_headers(self.headers());
        table.add_row(row);
        Ok(table)
    }

    /// Mutable access to every cell, used when resolving dynamic cells.
    pub fn cells_mut(&mut self) -> impl Iterator<Item = &mut TableCell> {
        self.columns.values_mut().flat_map(|column| column.iter_mut())
    }
}
