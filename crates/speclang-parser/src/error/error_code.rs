//! Error codes for the speclang diagnostic system.
//!
//! Codes are grouped by the stage that reports them:
//! - `E0xx` - Tokenizer errors
//! - `E1xx` - Document structure errors
//! - `E2xx` - Argument and resolver errors
//! - `E3xx` - Concept errors

use std::fmt;

/// Error codes for categorizing diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // =========================================================================
    // Tokenizer Errors (E0xx)
    // =========================================================================
    /// A quoted step argument is never closed.
    ///
    /// The step text ends while still inside `"..."`.
    E001,

    /// A `<...>` step parameter is never closed.
    E002,

    /// A reserved character appears unescaped in step text.
    ///
    /// `{` and `}` must be written as `\{` and `\}`.
    E003,

    /// A step line has no text after the `*` marker.
    E004,

    /// Step text contains a literal typed placeholder.
    ///
    /// Text such as `{static}` cannot be told apart from a parameter.
    E005,

    /// A table header cell is blank.
    E006,

    /// A table header repeats a column name.
    E007,

    /// A `"""` block after a step is never closed.
    E008,

    /// A scenario heading has no text.
    E009,

    /// A `table:` line has no path.
    E010,

    /// A teardown marker has fewer than three underscores.
    E011,

    // =========================================================================
    // Document Errors (E1xx)
    // =========================================================================
    /// A specification file declares a second spec heading.
    E100,

    /// A scenario appears before the spec heading.
    E101,

    /// Two scenarios share a heading, compared case-insensitively.
    E102,

    /// The file contains nothing.
    E103,

    /// The file has content but no spec heading.
    E104,

    /// The spec heading has no text.
    E105,

    /// The data table has a header but no rows.
    E106,

    /// A scenario has no steps.
    E107,

    /// Tags are declared twice for the same scenario or specification.
    ///
    /// Reported as a warning; the first set is kept.
    E108,

    /// A second data table is declared.
    ///
    /// Reported as a warning; the table is kept as a comment.
    E109,

    /// A table inside a scenario does not follow a step.
    ///
    /// Reported as a warning; the table is kept as a comment.
    E110,

    /// A `table:` reference appears before the spec heading.
    ///
    /// Reported as a warning.
    E111,

    /// A step has both explicit parameters and a multiline argument.
    E112,

    // =========================================================================
    // Argument Errors (E2xx)
    // =========================================================================
    /// A `<name>` parameter does not name a data table column or concept parameter.
    E200,

    /// A `<name>` table cell does not name a data table column or concept parameter.
    E201,

    /// A special parameter names an unknown resolver.
    ///
    /// Known resolvers are `file` and `table`.
    E202,

    /// A special parameter references a file that cannot be read.
    E203,

    /// A `table:` file is not valid CSV.
    E204,

    // =========================================================================
    // Concept Errors (E3xx)
    // =========================================================================
    /// A concept heading has a parameter that is not `<dynamic>`.
    E300,

    /// A step appears before the first concept heading.
    E301,

    /// A concept has no steps.
    E302,

    /// A concept body step invokes the concept itself.
    E303,

    /// A table in a concept file does not follow a step.
    E304,

    /// Two concepts share a signature.
    E305,

    /// Concepts invoke each other in a cycle.
    E306,
}

impl ErrorCode {
    /// Returns the error code as a string (e.g., "E001").
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::E001 => "E001",
            ErrorCode::E002 => "E002",
            ErrorCode::E003 => "E003",
            ErrorCode::E004 => "E004",
            ErrorCode::E005 => "E005",
            ErrorCode::E006 => "E006",
            ErrorCode::E007 => "E007",
            ErrorCode::E008 => "E008",
            ErrorCode::E009 => "E009",
            ErrorCode::E010 => "E010",
            ErrorCode::E011 => "E011",
            ErrorCode::E100 => "E100",
            ErrorCode::E101 => "E101",
            ErrorCode::E102 => "E102",
            ErrorCode::E103 => "E103",
            ErrorCode::E104 => "E104",
            ErrorCode::E105 => "E105",
            ErrorCode::E106 => "E106",
            ErrorCode::E107 => "E107",
            ErrorCode::E108 => "E108",
            ErrorCode::E109 => "E109",
            ErrorCode::E110 => "E110",
            ErrorCode::E111 => "E111",
            ErrorCode::E112 => "E112",
            ErrorCode::E200 => "E200",
            ErrorCode::E201 => "E201",
            ErrorCode::E202 => "E202",
            ErrorCode::E203 => "E203",
            ErrorCode::E204 => "E204",
            ErrorCode::E300 => "E300",
            ErrorCode::E301 => "E301",
            ErrorCode::E302 => "E302",
            ErrorCode::E303 => "E303",
            ErrorCode::E304 => "E304",
            ErrorCode::E305 => "E305",
            ErrorCode::E306 => "E306",
        }
    }

    /// Returns a short description of the error.
    pub fn description(&self) -> &'static str {
        match self {
            ErrorCode::E001 => "string not terminated",
            ErrorCode::E002 => "dynamic parameter not terminated",
            ErrorCode::E003 => "reserved character",
            ErrorCode::E004 => "blank step",
            ErrorCode::E005 => "typed placeholder in step text",
            ErrorCode::E006 => "blank table header",
            ErrorCode::E007 => "repeated table header",
            ErrorCode::E008 => "multiline argument not terminated",
            ErrorCode::E009 => "blank scenario heading",
            ErrorCode::E010 => "table location not specified",
            ErrorCode::E011 => "short teardown marker",
            ErrorCode::E100 => "multiple spec headings",
            ErrorCode::E101 => "scenario before spec heading",
            ErrorCode::E102 => "duplicate scenario",
            ErrorCode::E103 => "empty specification",
            ErrorCode::E104 => "spec heading not found",
            ErrorCode::E105 => "blank spec heading",
            ErrorCode::E106 => "empty data table",
            ErrorCode::E107 => "scenario without steps",
            ErrorCode::E108 => "duplicate tags",
            ErrorCode::E109 => "multiple data tables",
            ErrorCode::E110 => "table without step",
            ErrorCode::E111 => "data table outside specification",
            ErrorCode::E112 => "mixed multiline argument",
            ErrorCode::E200 => "unresolved dynamic parameter",
            ErrorCode::E201 => "unresolved dynamic table cell",
            ErrorCode::E202 => "unknown special resolver",
            ErrorCode::E203 => "missing file",
            ErrorCode::E204 => "invalid table file",
            ErrorCode::E300 => "invalid concept heading",
            ErrorCode::E301 => "step outside concept",
            ErrorCode::E302 => "concept without steps",
            ErrorCode::E303 => "concept calls itself",
            ErrorCode::E304 => "table without step",
            ErrorCode::E305 => "duplicate concept",
            ErrorCode::E306 => "circular concept reference",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
