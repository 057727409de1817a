//! Scanning of step text into a canonical value and raw arguments.
//!
//! A step such as `log in as "alice" with <password>` is scanned into the
//! canonical value `log in as {} with {}` and the raw arguments `alice`
//! and `password`, each tagged with a [`ParamKind`].
//!
//! Scanning happens in two passes. The first walks the characters with a
//! small state machine, writing a typed placeholder such as `{static}` for
//! each argument. The second replaces the typed placeholders with `{}`;
//! if it finds more typed placeholders than arguments, the author wrote one
//! literally and the step is rejected.

use thiserror::Error;
use winnow::{
    Parser as _,
    combinator::{alt, repeat},
    error::{ContextError, ErrMode},
    token::take_while,
};

use speclang_core::step::PARAMETER_PLACEHOLDER;

use crate::error::{Diagnostic, ErrorCode};

type IResult<O> = std::result::Result<O, ErrMode<ContextError>>;

const QUOTE: char = '"';
const ESCAPE: char = '\\';
const DYNAMIC_START: char = '<';
const DYNAMIC_END: char = '>';
const SPECIAL_SEPARATOR: char = ':';

/// The written form of a step argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamKind {
    /// `"value"`
    Static,
    /// `<name>`
    Dynamic,
    /// `<resolver:value>`
    Special,
}

impl ParamKind {
    fn typed_placeholder(self) -> &'static str {
        match self {
            ParamKind::Static => "{static}",
            ParamKind::Dynamic => "{dynamic}",
            ParamKind::Special => "{special}",
        }
    }
}

/// Problems found while scanning step text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub(crate) enum StepTextError {
    #[error("Step should not be blank")]
    Blank,

    #[error("String not terminated")]
    StringNotTerminated,

    #[error("Dynamic parameter not terminated")]
    DynamicNotTerminated,

    #[error("'{0}' is a reserved character and should be escaped")]
    ReservedCharacter(char),

    #[error("Step text should not have '{{static}}' or '{{dynamic}}' or '{{special}}'")]
    TypedPlaceholder,
}

impl StepTextError {
    pub(crate) fn code(&self) -> ErrorCode {
        match self {
            StepTextError::StringNotTerminated => ErrorCode::E001,
            StepTextError::DynamicNotTerminated => ErrorCode::E002,
            StepTextError::ReservedCharacter(_) => ErrorCode::E003,
            StepTextError::Blank => ErrorCode::E004,
            StepTextError::TypedPlaceholder => ErrorCode::E005,
        }
    }

    pub(crate) fn help(&self) -> Option<&'static str> {
        match self {
            StepTextError::StringNotTerminated => Some("add the closing `\"`"),
            StepTextError::DynamicNotTerminated => Some("add the closing `>`"),
            StepTextError::ReservedCharacter(_) => Some("escape it with a backslash"),
            StepTextError::TypedPlaceholder => Some("remove the literal placeholder text"),
            StepTextError::Blank => None,
        }
    }

    pub(crate) fn to_diagnostic(&self) -> Diagnostic {
        let diag = Diagnostic::error(self.to_string()).with_code(self.code());
        match self.help() {
            Some(help) => diag.with_help(help),
            None => diag,
        }
    }
}

/// The result of scanning one step line.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub(crate) struct ScannedStep {
    /// Canonical value with `{}` placeholders.
    pub(crate) value: String,
    /// Raw argument text in order.
    pub(crate) args: Vec<String>,
    /// Kind of each argument.
    pub(crate) kinds: Vec<ParamKind>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    Default,
    Quotes,
    Dynamic { special: bool },
}

impl ScanState {
    fn in_argument(self) -> bool {
        !matches!(self, ScanState::Default)
    }
}

/// Scans the text of a step, without the leading `*`.
pub(crate) fn scan_step_text(text: &str) -> Result<ScannedStep, StepTextError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(StepTextError::Blank);
    }

    let mut typed_value = String::with_capacity(text.len());
    let mut arg = String::new();
    let mut args = Vec::new();
    let mut state = ScanState::Default;
    let mut escaped = false;

    for c in text.chars() {
        if escaped {
            escaped = false;
            let target = if state.in_argument() {
                &mut arg
            } else {
                &mut typed_value
            };
            if state == ScanState::Default && !is_reserved(c) {
                target.push(ESCAPE);
                target.push(c);
            } else {
                target.push(unescape(c));
            }
            continue;
        }

        match (state, c) {
            (_, ESCAPE) => {
                escaped = true;
                continue;
            }
            (ScanState::Dynamic { special: false }, SPECIAL_SEPARATOR) => {
                state = ScanState::Dynamic { special: true };
            }
            (ScanState::Default, DYNAMIC_START) => {
                state = ScanState::Dynamic { special: false };
                continue;
            }
            (ScanState::Dynamic { special }, DYNAMIC_END) => {
                let kind = if special {
                    ParamKind::Special
                } else {
                    ParamKind::Dynamic
                };
                typed_value.push_str(kind.typed_placeholder());
                args.push(std::mem::take(&mut arg));
                state = ScanState::Default;
                continue;
            }
            (ScanState::Default, QUOTE) => {
                state = ScanState::Quotes;
                continue;
            }
            (ScanState::Quotes, QUOTE) => {
                typed_value.push_str(ParamKind::Static.typed_placeholder());
                args.push(std::mem::take(&mut arg));
                state = ScanState::Default;
                continue;
            }
            (ScanState::Default, c) if is_reserved(c) => {
                return Err(StepTextError::ReservedCharacter(c));
            }
            _ => {}
        }

        if state.in_argument() {
            arg.push(c);
        } else {
            typed_value.push(c);
        }
    }

    match state {
        ScanState::Quotes => return Err(StepTextError::StringNotTerminated),
        ScanState::Dynamic { .. } => return Err(StepTextError::DynamicNotTerminated),
        ScanState::Default => {}
    }

    let (value, kinds) = extract_parameter_kinds(typed_value.trim());
    if kinds.len() != args.len() {
        return Err(StepTextError::TypedPlaceholder);
    }

    Ok(ScannedStep { value, args, kinds })
}

fn is_reserved(c: char) -> bool {
    matches!(c, '{' | '}')
}

fn unescape(c: char) -> char {
    match c {
        't' => '\t',
        'n' => '\n',
        other => other,
    }
}

#[derive(Debug)]
enum Piece<'a> {
    Text(&'a str),
    Param(ParamKind),
}

fn typed_placeholder(input: &mut &str) -> IResult<ParamKind> {
    alt((
        "{static}".value(ParamKind::Static),
        "{dynamic}".value(ParamKind::Dynamic),
        "{special}".value(ParamKind::Special),
    ))
    .parse_next(input)
}

fn plain_text<'a>(input: &mut &'a str) -> IResult<&'a str> {
    alt((take_while(1.., |c: char| c != '{'), "{")).parse_next(input)
}

fn pieces<'a>(input: &mut &'a str) -> IResult<Vec<Piece<'a>>> {
    repeat(
        0..,
        alt((typed_placeholder.map(Piece::Param), plain_text.map(Piece::Text))),
    )
    .parse_next(input)
}

/// Replaces each typed placeholder in `typed_value` with `{}` and returns
/// the kinds in order.
fn extract_parameter_kinds(typed_value: &str) -> (String, Vec<ParamKind>) {
    let mut input = typed_value;
    let Ok(pieces) = pieces(&mut input) else {
        return (typed_value.to_string(), Vec::new());
    };

    let mut value = String::with_capacity(typed_value.len());
    let mut kinds = Vec::new();
    for piece in pieces {
        match piece {
            Piece::Text(text) => value.push_str(text),
            Piece::Param(kind) => {
                value.push_str(PARAMETER_PLACEHOLDER);
                kinds.push(kind);
            }
        }
    }
    (value, kinds)
}

/// Returns the canonical value of `text` and the names of its parameters.
///
/// When `has_inline_table` is set the value gains a trailing placeholder
/// and the parameter list ends with `table`, matching a step followed by an
/// inline table.
///
/// # Errors
///
/// Returns a [`Diagnostic`] if `text` is not a valid step.
///
/// # Example
///
/// ```
/// # use speclang_parser::extract_step_value_and_params;
/// let (value, params) =
///     extract_step_value_and_params("a \"param1\" step with <param2>", true).unwrap();
///
/// assert_eq!(value, "a {} step with {} {}");
/// assert_eq!(params, vec!["param1", "param2", "table"]);
/// ```
pub fn extract_step_value_and_params(
    text: &str,
    has_inline_table: bool,
) -> Result<(String, Vec<String>), Diagnostic> {
    let ScannedStep {
        mut value,
        mut args,
        ..
    } = scan_step_text(text).map_err(|err| err.to_diagnostic())?;

    if has_inline_table {
        value.push(' ');
        value.push_str(PARAMETER_PLACEHOLDER);
        args.push("table".to_string());
    }
    Ok((value, args))
}

/// Returns the step text with every placeholder written as `<name>`.
///
/// This is the form used to refer to a step independently of its literal
/// arguments, e.g. `log in as <alice> with <password>`.
///
/// # Errors
///
/// Returns a [`Diagnostic`] if `text` is not a valid step.
pub fn parameterized_step_value(text: &str) -> Result<String, Diagnostic> {
    let scanned = scan_step_text(text).map_err(|err| err.to_diagnostic())?;

    let mut parameterized = String::with_capacity(scanned.value.len());
    let mut args = scanned.args.iter();
    let mut parts = scanned.value.split(PARAMETER_PLACEHOLDER).peekable();
    while let Some(part) = parts.next() {
        parameterized.push_str(part);
        if parts.peek().is_none() {
            break;
        }
        if let Some(arg) = args.next() {
            parameterized.push('<');
            parameterized.push_str(arg);
            parameterized.push('>');
        }
    }
    Ok(parameterized)
}
