//! Diagnostics reported while tokenizing and parsing speclang files.
//!
//! Every problem is described by a [`Diagnostic`]: a severity, an optional
//! [`ErrorCode`], a message, the offending line and any number of labelled
//! spans. Fatal problems are returned together as a [`ParseError`]; warnings
//! travel alongside a successful result.
//!
//! # Example
//!
//! ```
//! # use speclang_parser::error::{Diagnostic, ErrorCode};
//! # use speclang_parser::Span;
//!
//! let diag = Diagnostic::error("Scenario should be defined after the spec heading")
//!     .with_code(ErrorCode::E101)
//!     .with_line(3, "## Login")
//!     .with_label(Span::new(12..20), "scenario heading")
//!     .with_help("add a `# heading` line before the first scenario");
//!
//! assert_eq!(diag.line_no(), Some(3));
//! ```

mod collector;
mod diagnostic;
mod error_code;
mod label;
mod parse_error;
mod severity;

pub(crate) use collector::DiagnosticCollector;

pub use diagnostic::Diagnostic;
pub use error_code::ErrorCode;
pub use label::Label;
pub use parse_error::ParseError;
pub use severity::Severity;
