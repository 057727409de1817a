//! Error types for speclang operations.

use std::io;

use thiserror::Error;

use speclang_parser::error::ParseError;

/// The main error type for speclang operations.
///
/// The `Parse` variant keeps the source text and file path, so diagnostics
/// can be rendered against the offending lines.
#[derive(Debug, Error)]
pub enum SpeclangError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("{path}: {err}")]
    Parse {
        err: ParseError,
        src: String,
        path: String,
    },

    #[error("Configuration error: {0}")]
    Config(String),
}

impl SpeclangError {
    /// Create a new `Parse` error with the associated source code.
    pub fn new_parse_error(err: ParseError, src: impl Into<String>, path: impl Into<String>) -> Self {
        Self::Parse {
            err,
            src: src.into(),
            path: path.into(),
        }
    }
}
