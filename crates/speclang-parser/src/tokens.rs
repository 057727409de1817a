//! Token definitions produced by the lexer.
//!
//! Each source line becomes exactly one [`Token`], except for a setext
//! underline which merges into the line above it and the lines of a
//! multiline block which attach to the preceding step.

use std::fmt;

use crate::{span::Span, step_text::ParamKind};

/// The classification of a source line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    SpecHeading,
    ScenarioHeading,
    Comment,
    Step,
    TableHeader,
    TableRow,
    Tags,
    DataTable,
    TearDown,
}

impl TokenKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenKind::SpecHeading => "spec heading",
            TokenKind::ScenarioHeading => "scenario heading",
            TokenKind::Comment => "comment",
            TokenKind::Step => "step",
            TokenKind::TableHeader => "table header",
            TokenKind::TableRow => "table row",
            TokenKind::Tags => "tags",
            TokenKind::DataTable => "data table",
            TokenKind::TearDown => "teardown",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A classified line.
///
/// `value` depends on the kind: the heading text for headings, the
/// canonical value for steps, the path for data table references and the
/// trimmed line otherwise. `args` holds step arguments, table cells or tag
/// values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    kind: TokenKind,
    line_no: usize,
    span: Span,
    line_text: String,
    value: String,
    args: Vec<String>,
    params: Vec<ParamKind>,
    multiline: Option<String>,
}

impl Token {
    pub(crate) fn new(
        kind: TokenKind,
        line_no: usize,
        span: Span,
        line_text: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            line_no,
            span,
            line_text: line_text.into(),
            value: value.into(),
            args: Vec::new(),
            params: Vec::new(),
            multiline: None,
        }
    }

    pub(crate) fn with_args(mut self, args: Vec<String>) -> Self {
        self.args = args;
        self
    }

    pub(crate) fn with_params(mut self, params: Vec<ParamKind>) -> Self {
        self.params = params;
        self
    }

    pub(crate) fn set_multiline(&mut self, multiline: String) {
        self.multiline = Some(multiline);
    }

    /// Appends the tags of a continuation line.
    pub(crate) fn continue_tags(&mut self, line: &str, values: Vec<String>, span: Span) {
        self.value = format!("{} {}", self.value, line.trim());
        self.args.extend(values);
        self.span = self.span.union(span);
    }

    /// Merges an underline into this token, turning it into a heading.
    pub(crate) fn into_heading(mut self, kind: TokenKind, underline: Span) -> Self {
        self.kind = kind;
        self.value = self.value.trim().to_string();
        self.span = self.span.union(underline);
        self
    }

    pub fn kind(&self) -> TokenKind {
        self.kind
    }

    /// 1-based line number of the first line of the token.
    pub fn line_no(&self) -> usize {
        self.line_no
    }

    /// Byte range of the token in the source text.
    pub fn span(&self) -> Span {
        self.span
    }

    /// The source line as written. For steps, the text after the `*` marker.
    pub fn line_text(&self) -> &str {
        &self.line_text
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// The kind of each step argument, parallel to [`Token::args`].
    pub fn params(&self) -> &[ParamKind] {
        &self.params
    }

    /// The text of a `"""` block following a step.
    pub fn multiline(&self) -> Option<&str> {
        self.multiline.as_deref()
    }

    pub(crate) fn is_blank(&self) -> bool {
        self.kind == TokenKind::Comment && self.value == "\n"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_into_heading_merges_underline() {
        let token = Token::new(TokenKind::Comment, 1, Span::new(0..7), "Login  ", "Login  ");

        let heading = token.into_heading(TokenKind::SpecHeading, Span::new(8..13));

        assert_eq!(heading.kind(), TokenKind::SpecHeading);
        assert_eq!(heading.value(), "Login");
        assert_eq!(heading.span(), Span::new(0..13));
        assert_eq!(heading.line_no(), 1);
    }

    #[test]
    fn test_blank_comment() {
        let blank = Token::new(TokenKind::Comment, 1, Span::new(0..0), "", "\n");
        let text = Token::new(TokenKind::Comment, 2, Span::new(1..5), "text", "text");

        assert!(blank.is_blank());
        assert!(!text.is_blank());
    }

    #[test]
    fn test_continue_tags() {
        let mut token = Token::new(TokenKind::Tags, 1, Span::new(0..12), "tags: a, b,", "a, b,")
            .with_args(vec!["a".to_string(), "b".to_string()]);

        token.continue_tags("  c ", vec!["c".to_string()], Span::new(13..17));

        assert_eq!(token.args(), ["a", "b", "c"]);
        assert_eq!(token.value(), "a, b, c");
        assert_eq!(token.span(), Span::new(0..17));
        assert_eq!(token.line_no(), 1);
    }

    #[test]
    fn test_kind_display() {
        assert_eq!(TokenKind::TableHeader.to_string(), "table header");
    }
}
