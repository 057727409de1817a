//! Resolution of special parameters and external data tables.
//!
//! A special parameter is written `<kind:value>`. The kind selects a
//! resolver: `file` reads a file into a string argument, `table` reads a CSV
//! file into a table argument. External data tables, `table: path`, use the
//! same CSV reader.
//!
//! All file access goes through a [`FileSystem`], so parsing can run against
//! an in-memory tree.

use std::{
    collections::HashMap,
    fs, io,
    path::{Path, PathBuf},
};

use log::debug;
use thiserror::Error;

use speclang_core::{arg::StepArg, table::Table};

use crate::error::{Diagnostic, ErrorCode};

/// Read access to the files referenced by special parameters.
pub trait FileSystem {
    /// Reads the whole file at `path`.
    fn read_to_string(&self, path: &Path) -> io::Result<String>;
}

/// The local disk. Relative paths are resolved against `root` when set.
#[derive(Debug, Clone, Default)]
pub struct LocalFileSystem {
    root: Option<PathBuf>,
}

impl LocalFileSystem {
    /// Reads paths as given, relative to the working directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolves relative paths against `root`.
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: Some(root.into()),
        }
    }
}

impl FileSystem for LocalFileSystem {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        match &self.root {
            Some(root) if path.is_relative() => fs::read_to_string(root.join(path)),
            _ => fs::read_to_string(path),
        }
    }
}

/// A file system held in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryFileSystem {
    files: HashMap<PathBuf, String>,
}

impl InMemoryFileSystem {
    /// Creates an empty file system.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a file.
    pub fn insert(&mut self, path: impl Into<PathBuf>, contents: impl Into<String>) {
        self.files.insert(path.into(), contents.into());
    }

    /// Builder form of [`InMemoryFileSystem::insert`].
    pub fn with_file(mut self, path: impl Into<PathBuf>, contents: impl Into<String>) -> Self {
        self.insert(path, contents);
        self
    }
}

impl FileSystem for InMemoryFileSystem {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        self.files.get(path).cloned().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("{} not found", path.display()),
            )
        })
    }
}

/// Failures while resolving a special parameter or data table file.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("Resolver not found for special param <{text}>")]
    NotFound { text: String },

    #[error("Dynamic param <{text}> could not be resolved, Missing file: {path}")]
    MissingFile {
        text: String,
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("Invalid table file {path}: {source}")]
    InvalidTable {
        path: String,
        #[source]
        source: csv::Error,
    },
}

impl ResolveError {
    /// The diagnostic code reported for this failure.
    pub fn code(&self) -> ErrorCode {
        match self {
            ResolveError::NotFound { .. } => ErrorCode::E202,
            ResolveError::MissingFile { .. } => ErrorCode::E203,
            ResolveError::InvalidTable { .. } => ErrorCode::E204,
        }
    }

    pub(crate) fn to_diagnostic(&self) -> Diagnostic {
        let diag = Diagnostic::error(self.to_string()).with_code(self.code());
        match self {
            ResolveError::NotFound { .. } => {
                diag.with_help("use `file:<path>` or `table:<path>`")
            }
            ResolveError::MissingFile { .. } | ResolveError::InvalidTable { .. } => diag,
        }
    }
}

/// Resolves special parameters through a [`FileSystem`].
#[derive(Clone, Copy)]
pub(crate) struct SpecialResolver<'a> {
    fs: &'a dyn FileSystem,
}

impl<'a> SpecialResolver<'a> {
    pub(crate) fn new(fs: &'a dyn FileSystem) -> Self {
        Self { fs }
    }

    /// Resolves the text of a `<kind:value>` parameter, without the angle
    /// brackets.
    pub(crate) fn resolve(&self, text: &str) -> Result<StepArg, ResolveError> {
        let (kind, value) = text
            .split_once(':')
            .map(|(kind, value)| (kind.trim(), value.trim()))
            .unwrap_or((text.trim(), ""));

        debug!(kind, value; "Resolving special parameter");
        match kind {
            "file" => {
                let contents = self.read(text, value)?;
                Ok(StepArg::special_string(text, contents))
            }
            "table" => {
                let table = self.table(text, value)?;
                Ok(StepArg::special_table(text, table))
            }
            _ => Err(ResolveError::NotFound {
                text: text.to_string(),
            }),
        }
    }

    /// Loads the CSV file behind a `table: path` reference.
    pub(crate) fn resolve_data_table(&self, path: &str) -> Result<Table, ResolveError> {
        self.table(&format!("table:{path}"), path)
    }

    fn read(&self, text: &str, path: &str) -> Result<String, ResolveError> {
        self.fs
            .read_to_string(Path::new(path))
            .map_err(|source| ResolveError::MissingFile {
                text: text.to_string(),
                path: path.to_string(),
                source,
            })
    }

    fn table(&self, text: &str, path: &str) -> Result<Table, ResolveError> {
        let contents = self.read(text, path)?;
        csv_to_table(&contents).map_err(|source| ResolveError::InvalidTable {
            path: path.to_string(),
            source,
        })
    }
}

/// Reads CSV text whose first record holds the headers.
pub(crate) fn csv_to_table(contents: &str) -> Result<Table, csv::Error> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(contents.as_bytes());

    let mut table = Table::new(0);
    table.add_headers(reader.headers()?.iter());
    for record in reader.records() {
        table.add_row_values(record?.iter());
    }
    Ok(table)
}
