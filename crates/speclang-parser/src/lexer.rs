//! Line tokenizer for specification and concept files.
//!
//! Every physical line is classified on its own, in a fixed priority order,
//! with a small amount of state carried between lines: whether the previous
//! line was a comment (for setext underlines), whether a table is open (to
//! tell a table header from a table row) and whether the last `tags:` line
//! ended with a comma (to continue it on the next line).
//!
//! The public entry point is [`tokenize`], which reports every problem in
//! the file before failing.

use log::trace;
use winnow::{
    Parser as _,
    ascii::{Caseless, space0},
    combinator::{not, opt, preceded},
    error::{ContextError, ErrMode},
    token::rest,
};

use crate::{
    error::{Diagnostic, DiagnosticCollector, ErrorCode, ParseError},
    span::Span,
    state::ParseState,
    step_text::scan_step_text,
    table,
    tokens::{Token, TokenKind},
};

type IResult<O> = std::result::Result<O, ErrMode<ContextError>>;

const MULTILINE_FENCE: &str = "\"\"\"";

fn scenario_heading<'a>(input: &mut &'a str) -> IResult<&'a str> {
    preceded(("##", not('#')), rest).parse_next(input)
}

fn spec_heading<'a>(input: &mut &'a str) -> IResult<&'a str> {
    preceded(('#', not('#')), rest).parse_next(input)
}

fn step_marker<'a>(input: &mut &'a str) -> IResult<&'a str> {
    preceded(('*', not('*')), rest).parse_next(input)
}

/// `tags:` or `tags :`, in any case.
fn tags_prefix<'a>(input: &mut &'a str) -> IResult<&'a str> {
    preceded((Caseless("tags"), opt(' '), ':'), rest).parse_next(input)
}

/// `table:` with any whitespace before the colon, in any case.
fn data_table_prefix<'a>(input: &mut &'a str) -> IResult<&'a str> {
    preceded((Caseless("table"), space0, ':'), rest).parse_next(input)
}

/// Runs `parser` against the whole of `line`, returning what follows the
/// recognized prefix.
fn strip<'a>(
    line: &'a str,
    mut parser: impl FnMut(&mut &'a str) -> IResult<&'a str>,
) -> Option<&'a str> {
    let mut input = line;
    parser(&mut input).ok()
}

/// A physical line and its byte offset.
#[derive(Debug, Clone, Copy)]
struct Line<'a> {
    text: &'a str,
    start: usize,
}

impl Line<'_> {
    fn span(&self) -> Span {
        Span::new(self.start..self.start + self.text.len())
    }
}

fn split_lines(source: &str) -> Vec<Line<'_>> {
    let mut lines = Vec::new();
    let mut start = 0;
    for raw in source.split_inclusive('\n') {
        let text = raw.strip_suffix('\n').unwrap_or(raw);
        let text = text.strip_suffix('\r').unwrap_or(text);
        lines.push(Line { text, start });
        start += raw.len();
    }
    lines
}

/// Tokenizer that accumulates tokens and diagnostics.
struct Lexer<'a> {
    lines: Vec<Line<'a>>,
    tokens: Vec<Token>,
    state: ParseState,
    diagnostics: DiagnosticCollector,
}

impl<'a> Lexer<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            lines: split_lines(source),
            tokens: Vec::new(),
            state: ParseState::INITIAL,
            diagnostics: DiagnosticCollector::new(),
        }
    }

    fn tokenize(&mut self) {
        let mut index = 0;
        while index < self.lines.len() {
            let line = self.lines[index];
            let line_no = index + 1;
            index += 1;

            let trimmed = line.text.trim();
            if trimmed.is_empty() {
                self.comment(line, line_no, "\n");
            } else if let Some(heading) = strip(trimmed, scenario_heading) {
                self.scenario_heading(line, line_no, heading.trim());
            } else if let Some(heading) = strip(trimmed, spec_heading) {
                self.state.clear();
                self.push(Token::new(
                    TokenKind::SpecHeading,
                    line_no,
                    line.span(),
                    line.text,
                    heading.trim(),
                ));
            } else if table::is_underline(trimmed, '=') {
                self.underline(line, line_no, TokenKind::SpecHeading);
            } else if table::is_underline(trimmed, '-') {
                self.underline(line, line_no, TokenKind::ScenarioHeading);
            } else if let Some(text) = strip(trimmed, step_marker) {
                self.step(line, line_no, text.trim(), &mut index);
            } else if let Some(tags) = strip(trimmed, tags_prefix) {
                self.tags(line, line_no, tags);
            } else if self.state.contains(ParseState::TAGS) {
                self.tag_continuation(line, trimmed);
            } else if table::is_table_line(trimmed) {
                self.table_line(line, line_no, trimmed);
            } else if let Some(path) = strip(trimmed, data_table_prefix) {
                self.data_table(line, line_no, path.trim());
            } else if table::is_underline(trimmed, '_') {
                self.teardown(line, line_no, trimmed);
            } else {
                self.comment(line, line_no, line.text.trim_end());
            }
        }
    }

    fn push(&mut self, token: Token) {
        trace!(line_no = token.line_no(), kind = token.kind().as_str(); "Token produced");
        self.tokens.push(token);
    }

    fn error(&mut self, diagnostic: Diagnostic, line: Line<'_>, line_no: usize) {
        let label = diagnostic
            .code()
            .map_or("here", |code| code.description());
        let diagnostic = diagnostic
            .with_line(line_no, line.text)
            .with_label(line.span(), label);
        self.diagnostics.emit(diagnostic);
    }

    fn comment(&mut self, line: Line<'_>, line_no: usize, value: &str) {
        self.state.clear();
        self.state.insert(ParseState::COMMENT);
        self.push(Token::new(
            TokenKind::Comment,
            line_no,
            line.span(),
            line.text,
            value,
        ));
    }

    fn scenario_heading(&mut self, line: Line<'_>, line_no: usize, heading: &str) {
        self.state.clear();
        if heading.is_empty() {
            self.error(
                Diagnostic::error("Scenario heading should have at least one character")
                    .with_code(ErrorCode::E009),
                line,
                line_no,
            );
            return;
        }
        self.push(Token::new(
            TokenKind::ScenarioHeading,
            line_no,
            line.span(),
            line.text,
            heading,
        ));
    }

    /// A line of `=` or `-` turns the comment above it into a heading.
    fn underline(&mut self, line: Line<'_>, line_no: usize, kind: TokenKind) {
        let follows_text = self.state.contains(ParseState::COMMENT)
            && self
                .tokens
                .last()
                .is_some_and(|token| token.kind() == TokenKind::Comment && !token.is_blank());

        match self.tokens.pop() {
            Some(previous) if follows_text => {
                self.state.clear();
                let heading = previous.into_heading(kind, line.span());
                self.push(heading);
            }
            previous => {
                self.tokens.extend(previous);
                self.comment(line, line_no, line.text.trim_end());
            }
        }
    }

    fn step(&mut self, line: Line<'_>, line_no: usize, text: &str, index: &mut usize) {
        self.state.clear();

        let scanned = match scan_step_text(text) {
            Ok(scanned) => scanned,
            Err(err) => {
                self.error(err.to_diagnostic(), line, line_no);
                return;
            }
        };

        let mut token = Token::new(TokenKind::Step, line_no, line.span(), text, scanned.value)
            .with_args(scanned.args)
            .with_params(scanned.kinds);

        let opens_block = self
            .lines
            .get(*index)
            .is_some_and(|next| next.text.trim() == MULTILINE_FENCE);
        if opens_block {
            let fence = self.lines[*index];
            *index += 1;
            match self.multiline(index) {
                Some(content) => token.set_multiline(content),
                None => {
                    self.error(
                        Diagnostic::error("Multiline argument not terminated")
                            .with_code(ErrorCode::E008)
                            .with_help("close the block with a line containing only `\"\"\"`"),
                        fence,
                        line_no + 1,
                    );
                    return;
                }
            }
        }

        self.push(token);
    }

    /// Collects lines up to the closing fence. Returns `None`, having
    /// consumed the rest of the file, if there is none.
    fn multiline(&mut self, index: &mut usize) -> Option<String> {
        let mut content = Vec::new();
        while let Some(line) = self.lines.get(*index) {
            *index += 1;
            if line.text.trim() == MULTILINE_FENCE {
                return Some(content.join("\n"));
            }
            content.push(line.text);
        }
        None
    }

    fn tags(&mut self, line: Line<'_>, line_no: usize, tags: &str) {
        self.state.clear();
        self.push(
            Token::new(TokenKind::Tags, line_no, line.span(), line.text, tags.trim())
                .with_args(split_tags(tags)),
        );
        self.continue_tags_if(tags);
    }

    /// A line following a `tags:` line that ended with a comma.
    fn tag_continuation(&mut self, line: Line<'_>, trimmed: &str) {
        self.state.clear();
        if let Some(token) = self.tokens.last_mut() {
            token.continue_tags(trimmed, split_tags(trimmed), line.span());
        }
        self.continue_tags_if(trimmed);
    }

    fn continue_tags_if(&mut self, tags: &str) {
        if tags.trim_end().ends_with(',') {
            self.state.insert(ParseState::TAGS);
        }
    }

    fn table_line(&mut self, line: Line<'_>, line_no: usize, trimmed: &str) {
        let cells = table::split_cells(trimmed);

        let kind = if self.state.contains(ParseState::TABLE) {
            self.state.insert(ParseState::TABLE_DATA);
            TokenKind::TableRow
        } else {
            if let Err(diagnostic) = table::validate_header(&cells) {
                self.error(diagnostic, line, line_no);
            }
            self.state.insert(ParseState::TABLE);
            TokenKind::TableHeader
        };

        self.push(Token::new(kind, line_no, line.span(), line.text, trimmed).with_args(cells));
    }

    fn data_table(&mut self, line: Line<'_>, line_no: usize, path: &str) {
        if path.is_empty() {
            self.error(
                Diagnostic::error("Table location not specified")
                    .with_code(ErrorCode::E010)
                    .with_help("write the path of a CSV file after `table:`"),
                line,
                line_no,
            );
            return;
        }
        self.push(Token::new(
            TokenKind::DataTable,
            line_no,
            line.span(),
            line.text,
            path,
        ));
    }

    fn teardown(&mut self, line: Line<'_>, line_no: usize, marker: &str) {
        self.state.clear();
        if marker.len() < 3 {
            self.error(
                Diagnostic::error("Teardown should have at least three underscore characters")
                    .with_code(ErrorCode::E011)
                    .with_help("write the teardown marker as `___`"),
                line,
                line_no,
            );
            return;
        }
        self.push(Token::new(
            TokenKind::TearDown,
            line_no,
            line.span(),
            line.text,
            marker,
        ));
    }

    fn finish(self) -> Result<Vec<Token>, ParseError> {
        self.diagnostics.finish().map(|_| self.tokens)
    }
}

fn split_tags(tags: &str) -> Vec<String> {
    tags.split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
        .collect()
}

/// Splits `source` into tokens.
///
/// # Errors
///
/// Returns a [`ParseError`] holding every malformed line: steps that cannot
/// be scanned, invalid table headers, blank scenario headings, empty
/// `table:` references, short teardown markers and unterminated multiline
/// blocks.
pub fn tokenize(source: &str) -> Result<Vec<Token>, ParseError> {
    let mut lexer = Lexer::new(source);
    lexer.tokenize();
    lexer.finish()
}
