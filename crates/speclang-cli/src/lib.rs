//! CLI logic for the speclang compiler.
//!
//! Loads concept files, compiles every specification given on the command
//! line and optionally rewrites them in canonical format.

pub mod error_adapter;

mod args;
mod config;

pub use args::Args;

use std::{
    fs,
    path::{Path, PathBuf},
};

use log::{debug, info};

use speclang::{Compiler, SpeclangError};

/// What a successful run processed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Summary {
    pub concepts: usize,
    pub specs: usize,
    pub scenarios: usize,
    /// Specification files rewritten by `--format`.
    pub formatted: usize,
}

/// Run the speclang CLI application
///
/// Concept files named with `--concepts`, or found in input directories,
/// are loaded first. Every specification is then compiled in path order,
/// stopping at the first file that fails.
///
/// # Errors
///
/// Returns `SpeclangError` for:
/// - Configuration loading errors
/// - File I/O errors
/// - Concept or specification parse errors
pub fn run(args: &Args) -> Result<Summary, SpeclangError> {
    let app_config = config::load_config(args.config.as_ref())?;
    let project = app_config.project().clone();
    let mut compiler = Compiler::new(app_config);
    let mut summary = Summary::default();

    let mut concept_files = Vec::new();
    for path in args.concepts.iter().map(Path::new) {
        collect_files(path, &|file: &Path| project.is_concept_file(file), &mut concept_files)?;
    }
    for path in args.inputs.iter().map(Path::new).filter(|path| path.is_dir()) {
        collect_files(path, &|file: &Path| project.is_concept_file(file), &mut concept_files)?;
    }
    dedup_paths(&mut concept_files);

    for path in &concept_files {
        summary.concepts += compiler.load_concepts(path)?;
    }
    info!(files = concept_files.len(), concepts = summary.concepts; "Concepts loaded");

    let mut spec_files = Vec::new();
    for path in args.inputs.iter().map(Path::new) {
        collect_files(path, &|file: &Path| project.is_spec_file(file), &mut spec_files)?;
    }
    dedup_paths(&mut spec_files);

    for path in &spec_files {
        let spec = compiler.parse_spec_file(path)?;
        summary.specs += 1;
        summary.scenarios += spec.scenarios().count();

        if args.format {
            let formatted = compiler.format_spec(&spec);
            if fs::read_to_string(path)? != formatted {
                fs::write(path, formatted)?;
                summary.formatted += 1;
                info!(path:? = path; "Formatted specification");
            }
        }
    }

    info!(
        specs = summary.specs,
        scenarios = summary.scenarios,
        formatted = summary.formatted;
        "Specifications compiled"
    );
    Ok(summary)
}

/// Adds `path` to `files` if it is a file, or every matching file below it
/// if it is a directory.
fn collect_files(
    path: &Path,
    matches: &dyn Fn(&Path) -> bool,
    files: &mut Vec<PathBuf>,
) -> Result<(), SpeclangError> {
    if !path.is_dir() {
        files.push(path.to_path_buf());
        return Ok(());
    }

    debug!(path:? = path; "Walking directory");
    let mut entries = fs::read_dir(path)?
        .map(|entry| entry.map(|entry| entry.path()))
        .collect::<Result<Vec<_>, _>>()?;
    entries.sort();

    for entry in entries {
        if entry.is_dir() {
            collect_files(&entry, matches, files)?;
        } else if matches(&entry) {
            files.push(entry);
        }
    }
    Ok(())
}

fn dedup_paths(paths: &mut Vec<PathBuf>) {
    let mut seen = std::collections::HashSet::new();
    paths.retain(|path| seen.insert(fs::canonicalize(path).unwrap_or_else(|_| path.clone())));
}
