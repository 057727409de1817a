//! Configuration types for the speclang compiler.
//!
//! All types implement [`serde::Deserialize`] and fall back to their
//! defaults for any field that is not set.
//!
//! # Overview
//!
//! - [`AppConfig`] - Top-level configuration combining project and format settings.
//! - [`ProjectConfig`] - Which file extensions hold specifications and concepts.
//! - [`FormatConfig`] - Options for canonical formatting.
//!
//! # Example
//!
//! ```
//! # use speclang::config::AppConfig;
//! let config = AppConfig::default();
//! assert_eq!(config.format().table_indent(), 5);
//! assert!(config.project().is_spec_file("login.spec".as_ref()));
//! ```

use std::path::Path;

use serde::Deserialize;

use speclang_parser::DEFAULT_TABLE_INDENT;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Project layout section.
    #[serde(default)]
    project: ProjectConfig,

    /// Formatting section.
    #[serde(default)]
    format: FormatConfig,
}

impl AppConfig {
    pub fn new(project: ProjectConfig, format: FormatConfig) -> Self {
        Self { project, format }
    }

    pub fn project(&self) -> &ProjectConfig {
        &self.project
    }

    pub fn format(&self) -> &FormatConfig {
        &self.format
    }
}

/// File extensions recognised when walking directories.
#[derive(Debug, Clone, Deserialize)]
pub struct ProjectConfig {
    #[serde(default = "default_spec_extensions")]
    spec_extensions: Vec<String>,

    #[serde(default = "default_concept_extensions")]
    concept_extensions: Vec<String>,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            spec_extensions: default_spec_extensions(),
            concept_extensions: default_concept_extensions(),
        }
    }
}

impl ProjectConfig {
    /// Creates a project configuration from extensions given without the
    /// leading dot.
    pub fn new(spec_extensions: Vec<String>, concept_extensions: Vec<String>) -> Self {
        Self {
            spec_extensions,
            concept_extensions,
        }
    }

    pub fn spec_extensions(&self) -> &[String] {
        &self.spec_extensions
    }

    pub fn concept_extensions(&self) -> &[String] {
        &self.concept_extensions
    }

    /// Returns `true` if `path` has one of the specification extensions.
    pub fn is_spec_file(&self, path: &Path) -> bool {
        has_extension(path, &self.spec_extensions)
    }

    /// Returns `true` if `path` has one of the concept extensions.
    pub fn is_concept_file(&self, path: &Path) -> bool {
        has_extension(path, &self.concept_extensions)
    }
}

/// Canonical formatting options.
#[derive(Debug, Clone, Deserialize)]
pub struct FormatConfig {
    /// Spaces written before every table line.
    #[serde(default = "default_table_indent")]
    table_indent: usize,
}

impl Default for FormatConfig {
    fn default() -> Self {
        Self {
            table_indent: default_table_indent(),
        }
    }
}

impl FormatConfig {
    pub fn new(table_indent: usize) -> Self {
        Self { table_indent }
    }

    pub fn table_indent(&self) -> usize {
        self.table_indent
    }
}

fn has_extension(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| extensions.iter().any(|known| known.eq_ignore_ascii_case(ext)))
}

fn default_spec_extensions() -> Vec<String> {
    vec!["spec".to_string(), "md".to_string()]
}

fn default_concept_extensions() -> Vec<String> {
    vec!["cpt".to_string()]
}

fn default_table_indent() -> usize {
    DEFAULT_TABLE_INDENT
}
