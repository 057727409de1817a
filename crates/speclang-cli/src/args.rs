//! Command-line argument definitions for the speclang CLI.
//!
//! This module defines the [`Args`] structure parsed from the command line
//! using [`clap`]. Arguments select the specification and concept files,
//! configuration file, formatting mode and logging verbosity.

use clap::Parser;

/// Command-line arguments for the speclang compiler
#[derive(Parser, Debug, Default)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Specification files or directories to compile
    #[arg(required = true, help = "Specification files or directories")]
    pub inputs: Vec<String>,

    /// Concept files or directories, loaded before any specification
    #[arg(short, long = "concepts")]
    pub concepts: Vec<String>,

    /// Path to configuration file (TOML)
    #[arg(long)]
    pub config: Option<String>,

    /// Rewrite specification files in canonical format
    #[arg(long)]
    pub format: bool,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_args() {
        let args = Args::parse_from([
            "speclang",
            "specs",
            "extra.spec",
            "-c",
            "concepts",
            "--concepts",
            "more.cpt",
            "--format",
        ]);

        assert_eq!(args.inputs, vec!["specs", "extra.spec"]);
        assert_eq!(args.concepts, vec!["concepts", "more.cpt"]);
        assert!(args.format);
        assert_eq!(args.config, None);
        assert_eq!(args.log_level, "info");
    }

    #[test]
    fn test_inputs_are_required() {
        assert!(Args::try_parse_from(["speclang"]).is_err());
    }
}
