//! Speclang - a compiler for plain-text test specifications.
//!
//! Specifications are Markdown-like documents of scenarios and steps.
//! Concepts name a sequence of steps that specifications invoke like any
//! other step. The [`Compiler`] loads concept files, parses specifications
//! against them and writes specifications back in canonical form.

pub mod config;

mod error;

pub use speclang_core::{arg, concept, lookup, spec, step, table};
pub use speclang_parser::{
    ConceptDictionary, FileSystem, InMemoryFileSystem, LocalFileSystem, ResolvedStep,
    data_table_specs, resolve_scenario, resolve_step,
};

pub use error::SpeclangError;

use std::{fs, path::Path};

use log::{debug, info, trace, warn};

use speclang_core::{concept::Concept, spec::Specification};
use speclang_parser::{Formatter, error::Diagnostic};

use config::AppConfig;

/// Loads concepts and compiles specifications.
///
/// The compiler owns the concept dictionary, so every specification parsed
/// through it sees every concept loaded before.
///
/// # Examples
///
/// ```
/// use speclang::{Compiler, InMemoryFileSystem, config::AppConfig};
///
/// let mut compiler = Compiler::new(AppConfig::default())
///     .with_file_system(InMemoryFileSystem::new());
///
/// compiler
///     .add_concepts("# greet <name>\n* say <name>\n", "greet.cpt")
///     .expect("Failed to load concepts");
///
/// let spec = compiler
///     .parse_spec("# Hello\n## World\n* greet \"world\"\n", "hello.spec")
///     .expect("Failed to parse");
///
/// assert_eq!(compiler.format_spec(&spec), "# Hello\n## World\n* greet \"world\"\n");
/// ```
#[derive(Default)]
pub struct Compiler {
    config: AppConfig,
    dictionary: ConceptDictionary,
    fs: Option<Box<dyn FileSystem>>,
}

impl Compiler {
    /// Create a compiler with the given configuration.
    ///
    /// Files referenced by special parameters and `table:` lines are read
    /// from disk, relative to the file being parsed.
    pub fn new(config: AppConfig) -> Self {
        Self {
            config,
            dictionary: ConceptDictionary::new(),
            fs: None,
        }
    }

    /// Read referenced files through `fs` instead of the local disk.
    pub fn with_file_system(mut self, fs: impl FileSystem + 'static) -> Self {
        self.fs = Some(Box::new(fs));
        self
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn dictionary(&self) -> &ConceptDictionary {
        &self.dictionary
    }

    /// Load the concept file at `path`. Returns the number of concepts it
    /// defines.
    ///
    /// # Errors
    ///
    /// Returns `SpeclangError` if the file cannot be read, fails to parse,
    /// redefines a known concept or closes a reference cycle.
    pub fn load_concepts(&mut self, path: &Path) -> Result<usize, SpeclangError> {
        info!(path:? = path; "Loading concepts");
        let source = fs::read_to_string(path)?;
        let file_name = path.display().to_string();
        self.add_concepts_in(&source, &file_name, path.parent())
    }

    /// Parse concept definitions from `source` and add them to the
    /// dictionary.
    ///
    /// # Errors
    ///
    /// See [`Compiler::load_concepts`].
    pub fn add_concepts(&mut self, source: &str, file_name: &str) -> Result<usize, SpeclangError> {
        self.add_concepts_in(source, file_name, None)
    }

    fn add_concepts_in(
        &mut self,
        source: &str,
        file_name: &str,
        base: Option<&Path>,
    ) -> Result<usize, SpeclangError> {
        let parsed = self
            .with_fs(base, |fs| speclang_parser::parse_concepts(source, file_name, fs))
            .map_err(|err| SpeclangError::new_parse_error(err, source, file_name))?;
        log_warnings(file_name, &parsed.warnings);

        let count = parsed.document.len();
        self.dictionary
            .add(parsed.document, file_name)
            .map_err(|err| SpeclangError::new_parse_error(err, source, file_name))?;

        debug!(file = file_name, count; "Concept file loaded");
        Ok(count)
    }

    /// Parse the specification file at `path`.
    ///
    /// # Errors
    ///
    /// Returns `SpeclangError` if the file cannot be read or fails to parse.
    pub fn parse_spec_file(&self, path: &Path) -> Result<Specification, SpeclangError> {
        info!(path:? = path; "Parsing specification");
        let source = fs::read_to_string(path)?;
        let file_name = path.display().to_string();
        self.parse_spec_in(&source, &file_name, path.parent())
    }

    /// Parse a specification and expand the concepts it invokes.
    ///
    /// # Errors
    ///
    /// Returns `SpeclangError::Parse` holding every fatal diagnostic.
    pub fn parse_spec(&self, source: &str, file_name: &str) -> Result<Specification, SpeclangError> {
        self.parse_spec_in(source, file_name, None)
    }

    fn parse_spec_in(
        &self,
        source: &str,
        file_name: &str,
        base: Option<&Path>,
    ) -> Result<Specification, SpeclangError> {
        let parsed = self
            .with_fs(base, |fs| {
                speclang_parser::parse_spec(source, file_name, &self.dictionary, fs)
            })
            .map_err(|err| SpeclangError::new_parse_error(err, source, file_name))?;
        log_warnings(file_name, &parsed.warnings);

        trace!(spec:? = parsed.document; "Parsed specification");
        Ok(parsed.document)
    }

    /// Write `spec` in canonical form.
    pub fn format_spec(&self, spec: &Specification) -> String {
        self.formatter().format_specification(spec)
    }

    /// Write concepts in canonical form.
    pub fn format_concepts(&self, concepts: &[Concept]) -> String {
        self.formatter().format_concepts(concepts)
    }

    fn formatter(&self) -> Formatter {
        Formatter::new(self.config.format().table_indent())
    }

    fn with_fs<T>(&self, base: Option<&Path>, f: impl FnOnce(&dyn FileSystem) -> T) -> T {
        match &self.fs {
            Some(fs) => f(fs.as_ref()),
            None => {
                let local = base
                    .filter(|dir| !dir.as_os_str().is_empty())
                    .map_or_else(LocalFileSystem::new, LocalFileSystem::with_root);
                f(&local)
            }
        }
    }
}

fn log_warnings(file: &str, warnings: &[Diagnostic]) {
    for warning in warnings {
        warn!(file, line_no:? = warning.line_no(); "{}", warning.message());
    }
}
