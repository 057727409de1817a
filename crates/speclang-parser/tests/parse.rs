use speclang_core::{arg::StepArg, table::TableCell};
use speclang_parser::{
    ConceptDictionary, InMemoryFileSystem, data_table_specs, error::ErrorCode,
    extract_step_value_and_params, format_concepts, format_specification, parse_concepts,
    parse_spec, resolve_scenario,
};

const ACCOUNTS: &str = r#"# Account management

tags: accounts, smoke

|id|name|
|---|---|
|1|alice|
|2|bob|

* open the admin page
* seed users
   | id | name |
   |<id>|<name>|

## Create account
tags: create
* create account for <name> with "se\"cret"
* read <file:notes.txt>
* write
"""
line one
line two
"""

## Delete account
Some notes about deletion.
* delete account \{id\} for <name>
"#;

fn fs() -> InMemoryFileSystem {
    InMemoryFileSystem::new().with_file("notes.txt", "remember the milk")
}

fn dictionary(files: &[(&str, &str)]) -> ConceptDictionary {
    let fs = fs();
    let mut dictionary = ConceptDictionary::new();
    for (file, source) in files {
        let parsed = parse_concepts(source, file, &fs).expect("Failed to parse concepts");
        dictionary.add(parsed.document, file).expect("Failed to add concepts");
    }
    dictionary
}

#[test]
fn test_format_is_idempotent() {
    let fs = fs();
    let dictionary = ConceptDictionary::new();

    let first = parse_spec(ACCOUNTS, "accounts.spec", &dictionary, &fs).expect("Failed to parse");
    assert!(first.warnings.is_empty());
    let formatted = format_specification(&first.document);

    let second =
        parse_spec(&formatted, "accounts.spec", &dictionary, &fs).expect("Failed to reparse");
    assert_eq!(format_specification(&second.document), formatted);
    assert_eq!(second.document.scenarios().count(), 2);
}

#[test]
fn test_formatted_layout() {
    let fs = fs();
    let parsed = parse_spec(ACCOUNTS, "accounts.spec", &ConceptDictionary::new(), &fs).unwrap();
    let formatted = format_specification(&parsed.document);

    assert!(formatted.starts_with("# Account management\n\ntags: accounts, smoke\n"));
    assert!(formatted.contains("     |id|name |\n     |--|-----|\n     |1 |alice|\n"));
    assert!(formatted.contains("* seed users\n     |id  |name  |\n"));
    assert!(formatted.contains("* create account for <name> with \"se\\\"cret\"\n"));
    assert!(formatted.contains("* read <file:notes.txt>\n"));
    assert!(formatted.contains("* write\n\"\"\"\nline one\nline two\n\"\"\"\n"));
    assert!(formatted.contains("* delete account \\{id\\} for <name>\n"));
}

#[test]
fn test_format_concepts_is_idempotent() {
    let source = "Shared steps\n# log in as <user>\n* open \"login\"\n* type <user>\n";
    let fs = fs();

    let concepts = parse_concepts(source, "login.cpt", &fs).unwrap().document;
    let formatted = format_concepts(&concepts);
    assert_eq!(formatted, source);

    let again = parse_concepts(&formatted, "login.cpt", &fs).unwrap().document;
    assert_eq!(format_concepts(&again), formatted);
}

#[test]
fn test_extract_step_value_and_params() {
    let (value, params) =
        extract_step_value_and_params("a \"param1\" step with <param2>", true).unwrap();

    assert_eq!(value, "a {} step with {} {}");
    assert_eq!(params, vec!["param1", "param2", "table"]);
}

#[test]
fn test_nested_concept_binding() {
    let dictionary = dictionary(&[(
        "numbers.cpt",
        "# show <number>\n* print <number>\n\n# print <value>\n* echo <value>\n",
    )]);
    let source = "# Numbers\n## Show\n* show \"42\"\n";

    let spec = parse_spec(source, "numbers.spec", &dictionary, &fs())
        .unwrap()
        .document;
    let scenario = spec.scenarios().next().unwrap();
    let steps = resolve_scenario(&spec, scenario, None).unwrap();

    let show = &steps[0];
    assert!(show.is_concept());
    let print = &show.children[0];
    assert_eq!(print.params, vec![StepArg::literal("42")]);
    let echo = &print.children[0];
    assert_eq!(echo.text, "echo {}");
    assert_eq!(echo.params, vec![StepArg::literal("42")]);
}

#[test]
fn test_direct_concept_cycle() {
    let fs = fs();
    let concepts = parse_concepts("# a\n* b\n# b\n* a\n", "cycle.cpt", &fs)
        .unwrap()
        .document;
    let mut dictionary = ConceptDictionary::new();

    let err = dictionary.add(concepts, "cycle.cpt").unwrap_err();

    assert_eq!(err.diagnostics()[0].code(), Some(ErrorCode::E306));
    assert!(dictionary.is_empty());
}

#[test]
fn test_concept_cycle_across_files() {
    let fs = fs();
    let mut dictionary = ConceptDictionary::new();
    for (file, source) in [("b.cpt", "# b\n* a\n"), ("c.cpt", "# c\n* b\n")] {
        let concepts = parse_concepts(source, file, &fs).unwrap().document;
        dictionary.add(concepts, file).unwrap();
    }

    let concepts = parse_concepts("# a\n* c\n", "a.cpt", &fs).unwrap().document;
    let err = dictionary.add(concepts, "a.cpt").unwrap_err();

    let diag = &err.diagnostics()[0];
    assert_eq!(diag.code(), Some(ErrorCode::E306));
    assert!(diag.message().starts_with("Circular reference found in concept"));
    assert_eq!(dictionary.len(), 2);
}

#[test]
fn test_scenario_before_spec_heading() {
    let source = "## Too early\n* step\n# Spec\n";
    let err = parse_spec(source, "early.spec", &ConceptDictionary::new(), &fs()).unwrap_err();

    let diag = &err.diagnostics()[0];
    assert_eq!(diag.code(), Some(ErrorCode::E101));
    assert_eq!(diag.line_no(), Some(1));
}

#[test]
fn test_inline_cell_for_undefined_column() {
    let source = "# Spec\n|id|\n|7|\n## S\n* check\n|value|\n|<missing>|\n";
    let err = parse_spec(source, "cells.spec", &ConceptDictionary::new(), &fs()).unwrap_err();

    let diag = &err.diagnostics()[0];
    assert_eq!(diag.code(), Some(ErrorCode::E201));
    assert_eq!(diag.line_no(), Some(7));
}

#[test]
fn test_inline_cell_resolves_row_value() {
    let source = "# Spec\n|id|\n|7|\n|8|\n## S\n* check\n|value|\n|<id>|\n";
    let spec = parse_spec(source, "cells.spec", &ConceptDictionary::new(), &fs())
        .unwrap()
        .document;
    let scenario = spec.scenarios().next().unwrap();

    for (row, expected) in [(0, "7"), (1, "8")] {
        let steps = resolve_scenario(&spec, scenario, Some(row)).unwrap();
        let table = steps[0].params[0].table_value().unwrap();
        let values: Vec<_> = table.get("value").unwrap().iter().map(TableCell::value).collect();
        assert_eq!(values, vec![expected]);
    }
}

#[test]
fn test_data_table_specs_per_row() {
    let spec = parse_spec(ACCOUNTS, "accounts.spec", &ConceptDictionary::new(), &fs())
        .unwrap()
        .document;

    let specs = data_table_specs(&spec);

    assert_eq!(specs.len(), 2);
    let names: Vec<_> = specs
        .iter()
        .map(|spec| {
            let scenario = spec.scenarios().next().unwrap();
            let steps = resolve_scenario(spec, scenario, Some(0)).unwrap();
            steps[2].params[0].value().to_string()
        })
        .collect();
    assert_eq!(names, vec!["alice", "bob"]);
}

#[test]
fn test_table_passed_to_concept_resolves_row_values() {
    let dictionary = dictionary(&[("users.cpt", "# create users <table>\n* register <table>\n")]);
    let source = "# Users\n|name|\n|alice|\n## Create\n* create users\n|user|\n|<name>|\n";
    let spec = parse_spec(source, "users.spec", &dictionary, &fs())
        .unwrap()
        .document;
    let scenario = spec.scenarios().next().unwrap();

    let steps = resolve_scenario(&spec, scenario, Some(0)).unwrap();

    let register = &steps[0].children[0];
    let table = register.params[0].table_value().unwrap();
    assert_eq!(table.get("user").unwrap()[0].value(), "alice");
    assert!(!table.get("user").unwrap()[0].is_dynamic());
}

#[test]
fn test_resolve_without_row_keeps_column_placeholders() {
    let spec = parse_spec(ACCOUNTS, "accounts.spec", &ConceptDictionary::new(), &fs())
        .unwrap()
        .document;
    let scenario = spec.scenarios().next().unwrap();

    let steps = resolve_scenario(&spec, scenario, None).unwrap();

    assert_eq!(steps[2].params[0], StepArg::dynamic("name"));
}
