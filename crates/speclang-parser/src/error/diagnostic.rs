//! The core diagnostic type.
//!
//! A [`Diagnostic`] represents a single error or warning with an optional
//! error code, the line it was reported on, labelled source spans and help
//! text.

use std::fmt;

use crate::{
    error::{Severity, error_code::ErrorCode, label::Label},
    span::Span,
};

/// A single error or warning.
///
/// Diagnostics raised while tokenizing or parsing carry both a byte span
/// (for rendering) and the 1-based line number and raw text of the line
/// (for plain-text reports). Diagnostics raised by the concept dictionary
/// refer to lines of already parsed concepts and carry only the line.
///
/// # Example
///
/// ```text
/// error[E200]: Dynamic parameter <user> could not be resolved
///   --> specs/login.spec:7:1
///    |
///  7 | * log in as <user>
///    | ^^^^^^^^^^^^^^^^^^ step
///    |
///    = help: add a `user` column to the data table
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    severity: Severity,
    code: Option<ErrorCode>,
    message: String,
    line_no: Option<usize>,
    line_text: Option<String>,
    labels: Vec<Label>,
    help: Option<String>,
}

impl Diagnostic {
    /// Create an error diagnostic.
    ///
    /// # Example
    ///
    /// ```
    /// # use speclang_parser::error::{Diagnostic, ErrorCode};
    /// # use speclang_parser::Span;
    ///
    /// let diag = Diagnostic::error("Step should not be blank")
    ///     .with_code(ErrorCode::E004)
    ///     .with_label(Span::new(0..1), "empty step");
    /// ```
    pub fn error(message: impl Into<String>) -> Self {
        Self::new(Severity::Error, message)
    }

    /// Create a warning diagnostic.
    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, message)
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn code(&self) -> Option<ErrorCode> {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// The 1-based line the diagnostic was reported on.
    pub fn line_no(&self) -> Option<usize> {
        self.line_no
    }

    /// The raw text of the reported line.
    pub fn line_text(&self) -> Option<&str> {
        self.line_text.as_deref()
    }

    pub fn labels(&self) -> &[Label] {
        &self.labels
    }

    pub fn help(&self) -> Option<&str> {
        self.help.as_deref()
    }

    pub fn with_code(mut self, code: ErrorCode) -> Self {
        self.code = Some(code);
        self
    }

    /// Record the line this diagnostic refers to.
    pub fn with_line(mut self, line_no: usize, line_text: impl Into<String>) -> Self {
        self.line_no = Some(line_no);
        self.line_text = Some(line_text.into());
        self
    }

    /// Add a primary label.
    pub fn with_label(mut self, span: Span, message: impl Into<String>) -> Self {
        self.labels.push(Label::primary(span, message));
        self
    }

    /// Add a secondary label.
    pub fn with_secondary_label(mut self, span: Span, message: impl Into<String>) -> Self {
        self.labels.push(Label::secondary(span, message));
        self
    }

    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            code: None,
            message: message.into(),
            line_no: None,
            line_text: None,
            labels: Vec::new(),
            help: None,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Format: "error[E001]: message" or "error: message"
        write!(f, "{}", self.severity)?;
        if let Some(code) = self.code {
            write!(f, "[{}]", code)?;
        }
        write!(f, ": {}", self.message)?;
        if let Some(line_no) = self.line_no {
            write!(f, " (line {line_no})")?;
        }
        Ok(())
    }
}

impl std::error::Error for Diagnostic {}
