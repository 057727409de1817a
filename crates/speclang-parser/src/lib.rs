//! # Speclang Parser
//!
//! Tokenizer, parser and concept dictionary for speclang specifications.
//!
//! ## Usage
//!
//! ```
//! # use speclang_parser::{parse_concepts, parse_spec, ConceptDictionary, InMemoryFileSystem};
//! # use speclang_parser::error::ParseError;
//!
//! fn main() -> Result<(), ParseError> {
//!     let fs = InMemoryFileSystem::new();
//!
//!     let concepts = parse_concepts("# greet <name>\n* say <name>\n", "greet.cpt", &fs)?;
//!     let mut dictionary = ConceptDictionary::new();
//!     dictionary.add(concepts.document, "greet.cpt")?;
//!
//!     let source = "# Greeting\n## Say hello\n* greet \"world\"\n";
//!     let parsed = parse_spec(source, "hello.spec", &dictionary, &fs)?;
//!     let step = parsed.document.scenarios().next().unwrap().steps().next().unwrap();
//!     assert!(step.is_concept());
//!     Ok(())
//! }
//! ```

mod concept;
mod data_table;
mod dictionary;
pub mod error;
mod execution;
mod formatter;
mod lexer;
mod parser;
mod resolver;
mod span;
mod state;
mod step_text;
mod table;
mod tokens;

pub use data_table::data_table_specs;
pub use dictionary::{ConceptDictionary, ConceptId};
pub use execution::{ResolvedStep, resolve_scenario, resolve_step};
pub use formatter::{DEFAULT_TABLE_INDENT, Formatter, format_concepts, format_specification};
pub use lexer::tokenize;
pub use resolver::{FileSystem, InMemoryFileSystem, LocalFileSystem, ResolveError};
pub use span::Span;
pub use step_text::{ParamKind, extract_step_value_and_params, parameterized_step_value};
pub use tokens::{Token, TokenKind};

use log::debug;

use speclang_core::{concept::Concept, spec::Specification};

use concept::ConceptParser;
use error::{Diagnostic, ParseError};
use parser::SpecParser;

/// A parsed document together with the warnings raised while parsing it.
#[derive(Debug, Clone)]
pub struct Parsed<T> {
    pub document: T,
    pub warnings: Vec<Diagnostic>,
}

/// Parses a specification file.
///
/// Steps whose value matches a concept signature in `dictionary` are
/// expanded in place. Special parameters and external data tables are read
/// through `fs`.
///
/// # Errors
///
/// Returns a [`ParseError`] holding every fatal diagnostic of the file.
pub fn parse_spec(
    source: &str,
    file_name: &str,
    dictionary: &ConceptDictionary,
    fs: &dyn FileSystem,
) -> Result<Parsed<Specification>, ParseError> {
    let tokens = lexer::tokenize(source)?;
    debug!(file = file_name, tokens = tokens.len(); "Tokenized specification");

    let (document, warnings) = SpecParser::new(file_name, &tokens, fs).parse(dictionary)?;
    Ok(Parsed { document, warnings })
}

/// Parses a concept file. The concepts still have to be added to a
/// [`ConceptDictionary`] before specifications can use them.
///
/// # Errors
///
/// Returns a [`ParseError`] holding every fatal diagnostic of the file.
pub fn parse_concepts(
    source: &str,
    file_name: &str,
    fs: &dyn FileSystem,
) -> Result<Parsed<Vec<Concept>>, ParseError> {
    let tokens = lexer::tokenize(source)?;
    debug!(file = file_name, tokens = tokens.len(); "Tokenized concept file");

    let (document, warnings) = ConceptParser::new(file_name, &tokens, fs).parse()?;
    Ok(Parsed { document, warnings })
}
