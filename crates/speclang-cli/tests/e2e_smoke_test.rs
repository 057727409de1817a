use std::{fs, path::Path, path::PathBuf};

use tempfile::tempdir;

use speclang::SpeclangError;
use speclang_cli::{Args, Summary, run};

/// The demo project at the workspace root.
fn demos_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .unwrap()
        .parent()
        .unwrap()
        .join("demos")
}

fn copy_dir(from: &Path, to: &Path) {
    fs::create_dir_all(to).unwrap();
    for entry in fs::read_dir(from).unwrap().flatten() {
        let target = to.join(entry.file_name());
        if entry.path().is_dir() {
            copy_dir(&entry.path(), &target);
        } else {
            fs::copy(entry.path(), target).unwrap();
        }
    }
}

fn args(inputs: &[&Path]) -> Args {
    Args {
        inputs: inputs
            .iter()
            .map(|path| path.to_string_lossy().to_string())
            .collect(),
        log_level: "off".to_string(),
        ..Args::default()
    }
}

#[test]
fn e2e_smoke_test_demos() {
    let summary = run(&args(&[&demos_path()])).expect("Demos should compile");

    assert_eq!(
        summary,
        Summary {
            concepts: 1,
            specs: 2,
            scenarios: 4,
            formatted: 0,
        }
    );
}

#[test]
fn e2e_explicit_concepts_are_not_loaded_twice() {
    let demos = demos_path();
    let mut args = args(&[&demos]);
    args.concepts = vec![demos.join("concepts").to_string_lossy().to_string()];

    let summary = run(&args).expect("Concepts should be deduplicated");

    assert_eq!(summary.concepts, 1);
}

#[test]
fn e2e_format_rewrites_once() {
    let dir = tempdir().unwrap();
    copy_dir(&demos_path(), dir.path());
    let spec = dir.path().join("checkout.spec");
    let messy = fs::read_to_string(&spec)
        .unwrap()
        .replace("|sku  |quantity|", "|sku|quantity|")
        .replace("|A-100|2       |", "| A-100 | 2 |");
    fs::write(&spec, messy).unwrap();

    let mut args = args(&[dir.path()]);
    args.format = true;

    let first = run(&args).unwrap();
    assert_eq!(first.formatted, 1);
    assert!(fs::read_to_string(&spec).unwrap().contains("     |A-100|2       |\n"));

    let second = run(&args).unwrap();
    assert_eq!(second.formatted, 0);
}

#[test]
fn e2e_invalid_spec_fails() {
    let dir = tempdir().unwrap();
    let spec = dir.path().join("broken.spec");
    fs::write(&spec, "## Scenario first\n* step\n# Heading\n").unwrap();

    let err = run(&args(&[&spec])).unwrap_err();

    let SpeclangError::Parse { path, .. } = &err else {
        panic!("Expected a parse error, got {err}");
    };
    assert!(path.ends_with("broken.spec"));
}

#[test]
fn e2e_missing_concept_for_dynamic_param() {
    let dir = tempdir().unwrap();
    let spec = dir.path().join("orphan.spec");
    fs::write(&spec, "# Orphan\n## Uses a column\n* greet <name>\n").unwrap();

    assert!(matches!(
        run(&args(&[&spec])),
        Err(SpeclangError::Parse { .. })
    ));
}
