//! The specification parser.
//!
//! Tokens are applied one at a time to a [`Specification`] under
//! construction. A [`ParseState`] records which scopes are open (spec,
//! scenario, step, context, table) and decides where each token attaches.
//! Tokens that cannot attach anywhere are kept as comments so the document
//! can still be written back in full.
//!
//! Problems are collected rather than returned eagerly; the structural
//! checks that need the whole document run only when no error was found
//! while building it.

use log::{debug, trace};

use speclang_core::{
    arg::StepArg,
    lookup::ArgLookup,
    spec::{
        Comment, DataTable, Heading, HeadingKind, Item, Scenario, Specification, Tags, TearDown,
    },
    step::Step,
    table::{Table, TableCell},
};

use crate::{
    dictionary::ConceptDictionary,
    error::{Diagnostic, DiagnosticCollector, ErrorCode, ParseError},
    resolver::{FileSystem, SpecialResolver},
    state::ParseState,
    step_text::ParamKind,
    table,
    tokens::{Token, TokenKind},
};

/// Attaches the line, its text and a label to a diagnostic about `token`.
pub(crate) fn locate(diagnostic: Diagnostic, token: &Token) -> Diagnostic {
    let label = diagnostic
        .code()
        .map_or(token.kind().as_str(), |code| code.description());
    diagnostic
        .with_line(token.line_no(), token.line_text())
        .with_label(token.span(), label)
}

/// Builds a step from a step token.
///
/// Dynamic arguments must name a parameter of `lookup`; special arguments
/// are resolved through `resolver`. Problems are emitted to `diagnostics`
/// and the step is returned regardless.
pub(crate) fn build_step(
    token: &Token,
    lookup: &ArgLookup,
    resolver: SpecialResolver<'_>,
    diagnostics: &mut DiagnosticCollector,
) -> Step {
    let mut args = Vec::with_capacity(token.args().len());
    for (raw, kind) in token.args().iter().zip(token.params()) {
        let arg = match kind {
            ParamKind::Static => StepArg::literal(raw),
            ParamKind::Dynamic => {
                if !lookup.contains_arg(raw) {
                    diagnostics.emit(locate(
                        Diagnostic::error(format!(
                            "Dynamic parameter <{raw}> could not be resolved"
                        ))
                        .with_code(ErrorCode::E200)
                        .with_help(format!("declare a `{raw}` column in the data table")),
                        token,
                    ));
                }
                StepArg::dynamic(raw)
            }
            ParamKind::Special => match resolver.resolve(raw) {
                Ok(arg) => arg,
                Err(err) => {
                    diagnostics.emit(locate(err.to_diagnostic(), token));
                    StepArg::dynamic(raw)
                }
            },
        };
        args.push(arg);
    }

    let mut step = Step::new(token.line_no(), token.value(), token.line_text(), args);

    if let Some(multiline) = token.multiline() {
        if step.args().is_empty() {
            step.push_trailing_arg(StepArg::multiline(multiline));
        } else {
            diagnostics.emit(locate(
                Diagnostic::error("Step cannot mix explicit parameters with a multiline argument")
                    .with_code(ErrorCode::E112)
                    .with_help("move the parameters into the multiline block or drop the block"),
                token,
            ));
        }
    }

    step
}

/// Builds the cells of an inline table row. A `<name>` cell refers to a
/// parameter of `lookup`; a `<file:path>` cell is checked through
/// `resolver`.
pub(crate) fn inline_row_cells(
    token: &Token,
    lookup: &ArgLookup,
    resolver: SpecialResolver<'_>,
    diagnostics: &mut DiagnosticCollector,
) -> Vec<TableCell> {
    token
        .args()
        .iter()
        .map(|cell| {
            let Some(name) = bracketed(cell) else {
                return TableCell::literal(cell);
            };
            if let Some(special) = special_cell(name, token, resolver, diagnostics) {
                return special;
            }
            if !lookup.contains_arg(name) {
                diagnostics.emit(locate(
                    Diagnostic::error(format!("Dynamic param <{name}> could not be resolved"))
                        .with_code(ErrorCode::E201),
                    token,
                ));
            }
            TableCell::dynamic(name)
        })
        .collect()
}

/// Builds the cells of a data table row. Only `<file:path>` cells are
/// special; everything else is literal.
fn data_row_cells(
    token: &Token,
    resolver: SpecialResolver<'_>,
    diagnostics: &mut DiagnosticCollector,
) -> Vec<TableCell> {
    token
        .args()
        .iter()
        .map(|cell| {
            bracketed(cell)
                .and_then(|name| special_cell(name, token, resolver, diagnostics))
                .unwrap_or_else(|| TableCell::literal(cell))
        })
        .collect()
}

/// A `file:path` cell keeps the parameter text. The file must exist.
fn special_cell(
    param: &str,
    token: &Token,
    resolver: SpecialResolver<'_>,
    diagnostics: &mut DiagnosticCollector,
) -> Option<TableCell> {
    if !param.starts_with("file:") {
        return None;
    }
    if let Err(err) = resolver.resolve(param) {
        diagnostics.emit(locate(err.to_diagnostic(), token));
    }
    Some(TableCell::special_string(param))
}

fn bracketed(cell: &str) -> Option<&str> {
    cell.strip_prefix('<')
        .and_then(|rest| rest.strip_suffix('>'))
        .map(str::trim)
}

/// The text a token leaves behind when it is kept as a comment.
pub(crate) fn comment_text(token: &Token) -> &str {
    match token.kind() {
        TokenKind::Comment => token.value(),
        _ => token.line_text().trim_end(),
    }
}

/// State machine building a [`Specification`] from tokens.
pub(crate) struct SpecParser<'a> {
    spec: Specification,
    state: ParseState,
    tokens: &'a [Token],
    resolver: SpecialResolver<'a>,
    diagnostics: DiagnosticCollector,
}

impl<'a> SpecParser<'a> {
    pub(crate) fn new(file_name: &str, tokens: &'a [Token], fs: &'a dyn FileSystem) -> Self {
        Self {
            spec: Specification::new(file_name),
            state: ParseState::INITIAL,
            tokens,
            resolver: SpecialResolver::new(fs),
            diagnostics: DiagnosticCollector::new(),
        }
    }

    /// Parses every token, validates the result and expands concept steps.
    ///
    /// Returns the specification with its warnings.
    pub(crate) fn parse(
        mut self,
        dictionary: &ConceptDictionary,
    ) -> Result<(Specification, Vec<Diagnostic>), ParseError> {
        for token in self.tokens {
            trace!(line_no = token.line_no(), kind = token.kind().as_str(), state:? = self.state; "Applying token");
            self.accept(token);
        }

        if !self.diagnostics.has_errors() {
            self.validate();
        }

        let SpecParser {
            mut spec,
            diagnostics,
            ..
        } = self;
        let warnings = diagnostics.finish()?;

        dictionary.expand_concepts(&mut spec);
        debug!(file = spec.file_name(), scenarios = spec.scenarios().count(); "Specification parsed");
        Ok((spec, warnings))
    }

    fn accept(&mut self, token: &Token) {
        match token.kind() {
            TokenKind::SpecHeading => self.spec_heading(token),
            TokenKind::ScenarioHeading => self.scenario_heading(token),
            TokenKind::Step => self.step(token),
            TokenKind::Comment => self.comment(token),
            TokenKind::TableHeader => self.table_header(token),
            TokenKind::TableRow => self.table_row(token),
            TokenKind::Tags => self.tags(token),
            TokenKind::DataTable => self.data_table(token),
            TokenKind::TearDown => self.teardown(token),
        }
    }

    fn error(&mut self, diagnostic: Diagnostic, token: &Token) {
        self.diagnostics.emit(locate(diagnostic, token));
    }

    /// Emits a warning and keeps the token as a comment.
    fn ignore(&mut self, diagnostic: Diagnostic, token: &Token) {
        self.diagnostics.emit(locate(diagnostic, token));
        self.add_comment(token);
    }

    fn data_table_lookup(&self) -> ArgLookup {
        self.spec
            .data_table()
            .map(|data_table| ArgLookup::from_data_table(data_table.table()))
            .unwrap_or_default()
    }

    fn spec_heading(&mut self, token: &Token) {
        if self.spec.heading().is_some() {
            self.error(
                Diagnostic::error("Multiple spec headings found in same file")
                    .with_code(ErrorCode::E100)
                    .with_help("split the file or turn this heading into a scenario with `##`"),
                token,
            );
            return;
        }

        self.spec
            .set_heading(Heading::new(token.value(), token.line_no(), HeadingKind::Spec));
        self.state.clear();
        self.state.insert(ParseState::SPEC);
    }

    fn scenario_heading(&mut self, token: &Token) {
        if self.spec.heading().is_none() {
            self.error(
                Diagnostic::error("Scenario should be defined after the spec heading")
                    .with_code(ErrorCode::E101)
                    .with_help("add a `# heading` line before the first scenario"),
                token,
            );
            return;
        }

        let heading = token.value();
        let duplicate = self
            .spec
            .scenarios()
            .map(|scenario| scenario.heading().value())
            .find(|existing| existing.to_lowercase() == heading.to_lowercase())
            .map(str::to_string);
        if let Some(existing) = duplicate {
            self.error(
                Diagnostic::error(format!(
                    "Duplicate scenario definition '{existing}' found in the same specification"
                ))
                .with_code(ErrorCode::E102),
                token,
            );
            return;
        }

        self.spec.add_item(Item::Scenario(Scenario::new(Heading::new(
            heading,
            token.line_no(),
            HeadingKind::Scenario,
        ))));
        self.state.retain(ParseState::SPEC);
        self.state.insert(ParseState::SCENARIO);
    }

    fn step(&mut self, token: &Token) {
        let in_scenario = self.state.contains(ParseState::SCENARIO);
        if !in_scenario && !self.state.contains(ParseState::SPEC) {
            debug!(line_no = token.line_no(); "Ignoring step outside a specification");
            return;
        }

        let lookup = self.data_table_lookup();
        let step = build_step(token, &lookup, self.resolver, &mut self.diagnostics);

        if self.state.contains(ParseState::TEARDOWN) {
            self.spec.add_item(Item::Step(step));
            self.state.retain(ParseState::SPEC | ParseState::TEARDOWN);
        } else if in_scenario {
            if let Some(scenario) = self.spec.latest_scenario_mut() {
                scenario.add_item(Item::Step(step));
            }
            self.state.retain(ParseState::SPEC | ParseState::SCENARIO);
            self.state.insert(ParseState::STEP);
        } else {
            self.spec.add_item(Item::Step(step));
            self.state.retain(ParseState::SPEC);
            self.state.insert(ParseState::CONTEXT);
        }
    }

    fn add_comment(&mut self, token: &Token) {
        let item = Item::Comment(Comment::new(comment_text(token), token.line_no()));
        if self.state.contains(ParseState::SCENARIO) {
            if let Some(scenario) = self.spec.latest_scenario_mut() {
                scenario.add_item(item);
                return;
            }
        }
        self.spec.add_item(item);
    }

    fn comment(&mut self, token: &Token) {
        self.add_comment(token);
        self.state
            .retain(ParseState::SPEC | ParseState::SCENARIO | ParseState::TEARDOWN);
        self.state.insert(ParseState::COMMENT);
    }

    fn table_header(&mut self, token: &Token) {
        if !self.state.contains(ParseState::SPEC) {
            self.comment(token);
            return;
        }

        let mut table = Table::new(token.line_no());
        table.add_headers(token.args());

        if self.state.contains(ParseState::STEP) {
            let step = self
                .spec
                .latest_scenario_mut()
                .and_then(Scenario::latest_step_mut);
            if let Some(step) = step {
                step.add_inline_table(table);
            }
        } else if self.state.contains(ParseState::CONTEXT) {
            if let Some(step) = self.spec.latest_context_mut() {
                step.add_inline_table(table);
            }
        } else if self.state.contains(ParseState::TEARDOWN) {
            let Some(step) = self.spec.latest_teardown_step_mut() else {
                self.comment(token);
                return;
            };
            step.add_inline_table(table);
        } else if self.state.contains(ParseState::SCENARIO) {
            self.ignore(
                Diagnostic::warning("Table not associated with a step, ignoring table")
                    .with_code(ErrorCode::E110),
                token,
            );
            return;
        } else if self.spec.data_table().is_none() {
            self.spec.add_item(Item::DataTable(DataTable::inline(table)));
        } else {
            self.ignore(
                Diagnostic::warning("Multiple data table present, ignoring table")
                    .with_code(ErrorCode::E109),
                token,
            );
            return;
        }

        self.state.retain(
            ParseState::SPEC
                | ParseState::SCENARIO
                | ParseState::STEP
                | ParseState::CONTEXT
                | ParseState::TEARDOWN,
        );
        self.state.insert(ParseState::TABLE);
    }

    fn table_row(&mut self, token: &Token) {
        if !self.state.contains(ParseState::TABLE) {
            self.comment(token);
            return;
        }
        if table::is_separator_row(token.args()) {
            return;
        }

        let owned_by_step = self.state.contains(ParseState::STEP)
            || self.state.contains(ParseState::CONTEXT)
            || self.state.contains(ParseState::TEARDOWN);
        if owned_by_step {
            let lookup = self.data_table_lookup();
            let cells = inline_row_cells(token, &lookup, self.resolver, &mut self.diagnostics);
            let step = if self.state.contains(ParseState::STEP) {
                self.spec
                    .latest_scenario_mut()
                    .and_then(Scenario::latest_step_mut)
            } else if self.state.contains(ParseState::CONTEXT) {
                self.spec.latest_context_mut()
            } else {
                self.spec.latest_teardown_step_mut()
            };
            if let Some(table) = step.and_then(Step::inline_table_mut) {
                table.add_row(cells);
            }
        } else {
            let cells = data_row_cells(token, self.resolver, &mut self.diagnostics);
            if let Some(data_table) = self.spec.data_table_mut() {
                data_table.table_mut().add_row(cells);
            }
        }

        self.state.retain(
            ParseState::SPEC
                | ParseState::SCENARIO
                | ParseState::STEP
                | ParseState::CONTEXT
                | ParseState::TEARDOWN
                | ParseState::TABLE,
        );
    }

    fn tags(&mut self, token: &Token) {
        let tags = Tags::new(token.args().to_vec(), token.line_no());

        if self.state.contains(ParseState::SCENARIO) {
            let has_tags = self
                .spec
                .latest_scenario_mut()
                .is_some_and(|scenario| scenario.tags().is_some());
            if has_tags {
                self.ignore(
                    Diagnostic::warning("Tags can be defined only once per scenario")
                        .with_code(ErrorCode::E108),
                    token,
                );
            } else if let Some(scenario) = self.spec.latest_scenario_mut() {
                scenario.add_item(Item::Tags(tags));
            }
        } else if self.spec.tags().is_some() {
            self.ignore(
                Diagnostic::warning("Tags can be defined only once per specification")
                    .with_code(ErrorCode::E108),
                token,
            );
        } else {
            self.spec.add_item(Item::Tags(tags));
        }

        self.state
            .retain(ParseState::SPEC | ParseState::SCENARIO | ParseState::TEARDOWN);
    }

    /// Opens the teardown section. Scenario scope ends here.
    fn teardown(&mut self, token: &Token) {
        self.spec
            .add_item(Item::TearDown(TearDown::new(token.value(), token.line_no())));
        self.state.retain(ParseState::SPEC);
        self.state.insert(ParseState::TEARDOWN);
    }

    fn data_table(&mut self, token: &Token) {
        let table = match self.resolver.resolve_data_table(token.value()) {
            Ok(mut table) => {
                table.set_line_no(token.line_no());
                table
            }
            Err(err) => {
                self.error(err.to_diagnostic(), token);
                return;
            }
        };

        let in_spec = self.state.contains(ParseState::SPEC)
            && !self.state.contains(ParseState::SCENARIO);
        if !in_spec {
            self.ignore(
                Diagnostic::warning("Data table not associated with spec")
                    .with_code(ErrorCode::E111),
                token,
            );
        } else if self.spec.data_table().is_some() {
            self.ignore(
                Diagnostic::warning("Multiple data table present, ignoring table")
                    .with_code(ErrorCode::E109),
                token,
            );
        } else {
            self.spec
                .add_item(Item::DataTable(DataTable::external(table, token.value())));
        }
    }

    /// Reports a structural problem found after all tokens were applied.
    fn invalid(&mut self, diagnostic: Diagnostic, line_no: usize) {
        let diagnostic = match self.tokens.iter().find(|token| token.line_no() == line_no) {
            Some(token) => locate(diagnostic, token),
            None => diagnostic.with_line(line_no, ""),
        };
        self.diagnostics.emit(diagnostic);
    }

    fn validate(&mut self) {
        if self.spec.items().is_empty() {
            self.invalid(
                Diagnostic::error("Spec does not have any elements").with_code(ErrorCode::E103),
                1,
            );
            return;
        }

        let Some(heading) = self.spec.heading() else {
            self.invalid(
                Diagnostic::error("Spec heading not found")
                    .with_code(ErrorCode::E104)
                    .with_help("start the file with a `# heading` line"),
                1,
            );
            return;
        };
        if heading.value().trim().is_empty() {
            let line_no = heading.line_no();
            self.invalid(
                Diagnostic::error("Spec heading should have at least one character")
                    .with_code(ErrorCode::E105),
                line_no,
            );
            return;
        }

        let empty_table = self
            .spec
            .data_table()
            .map(DataTable::table)
            .filter(|table| table.is_initialized() && table.row_count() == 0)
            .map(Table::line_no);
        if let Some(line_no) = empty_table {
            self.invalid(
                Diagnostic::error("Data table should have at least 1 data row")
                    .with_code(ErrorCode::E106),
                line_no,
            );
        }

        let empty_scenarios: Vec<usize> = self
            .spec
            .scenarios()
            .filter(|scenario| scenario.steps().next().is_none())
            .map(|scenario| scenario.heading().line_no())
            .collect();
        for line_no in empty_scenarios {
            self.invalid(
                Diagnostic::error("Scenario should have at least one step")
                    .with_code(ErrorCode::E107),
                line_no,
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use speclang_core::{arg::ArgType, table::CellType};

    use super::*;
    use crate::{lexer::tokenize, resolver::InMemoryFileSystem};

    fn parse_with(
        source: &str,
        fs: &InMemoryFileSystem,
    ) -> Result<(Specification, Vec<Diagnostic>), ParseError> {
        let tokens = tokenize(source)?;
        SpecParser::new("test.spec", &tokens, fs).parse(&ConceptDictionary::new())
    }

    fn parse(source: &str) -> Result<(Specification, Vec<Diagnostic>), ParseError> {
        parse_with(source, &InMemoryFileSystem::new())
    }

    fn first_error(source: &str) -> Diagnostic {
        parse(source).unwrap_err().diagnostics()[0].clone()
    }

    #[test]
    fn test_parse_spec_with_context_and_scenarios() {
        let source = "\
# Login

* open the app

## Valid user
* log in as \"alice\"

## Invalid user
* log in as \"mallory\"
";
        let (spec, warnings) = parse(source).unwrap();

        assert!(warnings.is_empty());
        assert_eq!(spec.heading().unwrap().value(), "Login");
        assert_eq!(spec.contexts().count(), 1);
        let scenarios: Vec<_> = spec.scenarios().collect();
        assert_eq!(scenarios.len(), 2);
        assert_eq!(scenarios[1].heading().value(), "Invalid user");
        let step = scenarios[0].steps().next().unwrap();
        assert_eq!(step.value(), "log in as {}");
        assert_eq!(step.args()[0].value(), "alice");
    }

    #[test]
    fn test_multiple_spec_headings() {
        let diag = first_error("# One\n# Two\n## S\n* step");

        assert_eq!(diag.code(), Some(ErrorCode::E100));
        assert_eq!(diag.line_no(), Some(2));
    }

    #[test]
    fn test_scenario_before_spec_heading() {
        let diag = first_error("## Early\n* step\n# Spec");

        assert_eq!(diag.code(), Some(ErrorCode::E101));
        assert_eq!(diag.message(), "Scenario should be defined after the spec heading");
        assert_eq!(diag.line_no(), Some(1));
    }

    #[test]
    fn test_duplicate_scenario_is_case_insensitive() {
        let diag = first_error("# Spec\n## Login\n* a\n## LOGIN\n* b");

        assert_eq!(diag.code(), Some(ErrorCode::E102));
        assert_eq!(
            diag.message(),
            "Duplicate scenario definition 'Login' found in the same specification"
        );
        assert_eq!(diag.line_no(), Some(4));
    }

    #[test]
    fn test_dynamic_param_resolved_against_data_table() {
        let source = "# Spec\n|user|\n|alice|\n## S\n* greet <user>";
        let (spec, _) = parse(source).unwrap();

        let step = spec.scenarios().next().unwrap().steps().next().unwrap();
        assert_eq!(step.args()[0].arg_type(), ArgType::Dynamic);
        assert_eq!(step.args()[0].value(), "user");
    }

    #[test]
    fn test_unresolved_dynamic_param() {
        let diag = first_error("# Spec\n## S\n* greet <user>");

        assert_eq!(diag.code(), Some(ErrorCode::E200));
        assert_eq!(diag.message(), "Dynamic parameter <user> could not be resolved");
        assert_eq!(diag.line_no(), Some(3));
    }

    #[test]
    fn test_inline_table_on_scenario_step() {
        let source = "# Spec\n## S\n* create users\n   |id|name|\n   |--|----|\n   |1|alice|";
        let (spec, _) = parse(source).unwrap();

        let step = spec.scenarios().next().unwrap().steps().next().unwrap();
        assert!(step.has_inline_table());
        assert_eq!(step.value(), "create users {}");
        let table = step.args()[0].table_value().unwrap();
        assert_eq!(table.row_count(), 1);
        assert_eq!(table.get("name").unwrap()[0].value(), "alice");
    }

    #[test]
    fn test_inline_table_on_context_step() {
        let (spec, _) = parse("# Spec\n* seed\n|id|\n|1|\n## S\n* run").unwrap();

        let context = spec.contexts().next().unwrap();
        assert!(context.has_inline_table());
    }

    #[test]
    fn test_inline_dynamic_cell() {
        let source = "# Spec\n|id|\n|7|\n## S\n* check\n|value|\n|<id>|";
        let (spec, _) = parse(source).unwrap();

        let step = spec.scenarios().next().unwrap().steps().next().unwrap();
        let cell = &step.args()[0].table_value().unwrap().get("value").unwrap()[0];
        assert_eq!(cell.cell_type(), CellType::Dynamic);
        assert_eq!(cell.value(), "id");
    }

    #[test]
    fn test_inline_dynamic_cell_unresolved() {
        let diag = first_error("# Spec\n## S\n* check\n|value|\n|<id>|");

        assert_eq!(diag.code(), Some(ErrorCode::E201));
        assert_eq!(diag.message(), "Dynamic param <id> could not be resolved");
        assert_eq!(diag.line_no(), Some(5));
    }

    #[test]
    fn test_table_in_scenario_without_step_is_ignored() {
        let (spec, warnings) = parse("# Spec\n## S\n|a|\n* step").unwrap();

        assert_eq!(warnings[0].code(), Some(ErrorCode::E110));
        let scenario = spec.scenarios().next().unwrap();
        assert!(matches!(&scenario.items()[0], Item::Comment(comment) if comment.value() == "|a|"));
    }

    #[test]
    fn test_second_data_table_is_ignored() {
        let source = "# Spec\n|a|\n|1|\n\n|b|\n|2|\n## S\n* step";
        let (spec, warnings) = parse(source).unwrap();

        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].code(), Some(ErrorCode::E109));
        assert_eq!(warnings[0].line_no(), Some(5));
        assert!(spec.data_table().unwrap().table().contains_header("a"));
    }

    #[test]
    fn test_duplicate_tags_keep_first_set() {
        let source = "# Spec\ntags: a\ntags: b\n## S\ntags: c\ntags: d\n* step";
        let (spec, warnings) = parse(source).unwrap();

        assert_eq!(spec.tags().unwrap().values(), ["a"]);
        assert_eq!(spec.scenarios().next().unwrap().tags().unwrap().values(), ["c"]);
        let messages: Vec<_> = warnings.iter().map(Diagnostic::message).collect();
        assert_eq!(messages, vec![
            "Tags can be defined only once per specification",
            "Tags can be defined only once per scenario",
        ]);
    }

    #[test]
    fn test_external_data_table() {
        let fs = InMemoryFileSystem::new().with_file("users.csv", "user\nalice\nbob\n");
        let (spec, _) = parse_with("# Spec\ntable: users.csv\n## S\n* greet <user>", &fs).unwrap();

        let data_table = spec.data_table().unwrap();
        assert_eq!(data_table.reference(), Some("users.csv"));
        assert_eq!(data_table.table().row_count(), 2);
        assert_eq!(data_table.table().line_no(), 2);
    }

    #[test]
    fn test_missing_external_data_table_is_fatal() {
        let diag = first_error("# Spec\ntable: missing.csv\n## S\n* step");

        assert_eq!(diag.code(), Some(ErrorCode::E203));
    }

    #[test]
    fn test_data_table_reference_inside_scenario() {
        let fs = InMemoryFileSystem::new().with_file("users.csv", "user\nalice\n");
        let (spec, warnings) = parse_with("# Spec\n## S\ntable: users.csv\n* step", &fs).unwrap();

        assert_eq!(warnings[0].code(), Some(ErrorCode::E111));
        assert!(spec.data_table().is_none());
    }

    #[test]
    fn test_special_file_param() {
        let fs = InMemoryFileSystem::new().with_file("body.json", "{}");
        let (spec, _) = parse_with("# Spec\n## S\n* post <file:body.json>", &fs).unwrap();

        let arg = &spec.scenarios().next().unwrap().steps().next().unwrap().args()[0];
        assert_eq!(arg.arg_type(), ArgType::SpecialString);
        assert_eq!(arg.value(), "{}");
    }

    #[test]
    fn test_unknown_special_resolver_is_fatal() {
        let diag = first_error("# Spec\n## S\n* open <url:http://x>");

        assert_eq!(diag.code(), Some(ErrorCode::E202));
    }

    #[test]
    fn test_multiline_argument() {
        let (spec, _) = parse("# Spec\n## S\n* write\n\"\"\"\nline one\nline two\n\"\"\"").unwrap();

        let step = spec.scenarios().next().unwrap().steps().next().unwrap();
        assert_eq!(step.value(), "write {}");
        assert!(step.args()[0].is_multiline());
        assert_eq!(step.args()[0].value(), "line one\nline two");
    }

    #[test]
    fn test_multiline_with_explicit_params() {
        let diag = first_error("# Spec\n## S\n* write \"x\"\n\"\"\"\nbody\n\"\"\"");

        assert_eq!(diag.code(), Some(ErrorCode::E112));
    }

    #[test]
    fn test_empty_file() {
        let diag = first_error("");

        assert_eq!(diag.code(), Some(ErrorCode::E103));
        assert_eq!(diag.line_no(), Some(1));
    }

    #[test]
    fn test_missing_spec_heading() {
        let diag = first_error("just a comment");

        assert_eq!(diag.code(), Some(ErrorCode::E104));
        assert_eq!(diag.message(), "Spec heading not found");
    }

    #[test]
    fn test_blank_spec_heading() {
        let diag = first_error("#\n## S\n* step");

        assert_eq!(diag.code(), Some(ErrorCode::E105));
    }

    #[test]
    fn test_data_table_without_rows() {
        let diag = first_error("# Spec\n|a|\n## S\n* step");

        assert_eq!(diag.code(), Some(ErrorCode::E106));
        assert_eq!(diag.line_no(), Some(2));
    }

    #[test]
    fn test_scenario_without_steps() {
        let err = parse("# Spec\n## One\n## Two\n* step\n## Three").unwrap_err();

        let lines: Vec<_> = err.errors().filter_map(Diagnostic::line_no).collect();
        assert_eq!(lines, vec![2, 5]);
    }

    #[test]
    fn test_validation_skipped_after_errors() {
        let err = parse("# Spec\n## S\n* greet <user>\n## Empty").unwrap_err();

        assert_eq!(err.diagnostics().len(), 1);
        assert_eq!(err.diagnostics()[0].code(), Some(ErrorCode::E200));
    }

    #[test]
    fn test_table_after_comment_is_a_second_table() {
        let (spec, warnings) = parse("# Spec\n|a|\n|1|\nnote\n|2|\n## S\n* step").unwrap();

        assert_eq!(warnings[0].code(), Some(ErrorCode::E109));
        assert_eq!(spec.data_table().unwrap().table().row_count(), 1);
    }

    #[test]
    fn test_file_cell_in_inline_table() {
        let fs = InMemoryFileSystem::new().with_file("a.txt", "hello");
        let source = "# Spec\n## S\n* check\n|name|content|\n|----|-------|\n|a|<file:a.txt>|";
        let (spec, warnings) = parse_with(source, &fs).unwrap();

        assert!(warnings.is_empty());
        let step = spec.scenarios().next().unwrap().steps().next().unwrap();
        let cell = &step.args()[0].table_value().unwrap().get("content").unwrap()[0];
        assert_eq!(cell.cell_type(), CellType::SpecialString);
        assert_eq!(cell.value(), "file:a.txt");
    }

    #[test]
    fn test_file_cell_with_missing_file() {
        let diag = first_error("# Spec\n## S\n* check\n|content|\n|<file:gone.txt>|");

        assert_eq!(diag.code(), Some(ErrorCode::E203));
        assert_eq!(
            diag.message(),
            "Dynamic param <file:gone.txt> could not be resolved, Missing file: gone.txt"
        );
        assert_eq!(diag.line_no(), Some(5));
    }

    #[test]
    fn test_file_cell_in_data_table() {
        let fs = InMemoryFileSystem::new().with_file("bio.txt", "likes tea");
        let source = "# Spec\n|name|bio|\n|---|---|\n|alice|<file:bio.txt>|\n## S\n* greet <name>";
        let (spec, _) = parse_with(source, &fs).unwrap();

        let table = spec.data_table().unwrap().table();
        assert_eq!(table.get("name").unwrap()[0].cell_type(), CellType::Static);
        assert_eq!(table.get("bio").unwrap()[0].cell_type(), CellType::SpecialString);
        assert_eq!(table.get("bio").unwrap()[0].value(), "file:bio.txt");
    }

    #[test]
    fn test_single_row_table_without_separator() {
        let (spec, warnings) = parse("# Spec\n|name|id|\n|john|123|\n## S\n* step").unwrap();

        assert!(warnings.is_empty());
        let table = spec.data_table().unwrap().table();
        assert_eq!(table.row_count(), 1);
        assert_eq!(table.get("id").unwrap()[0].value(), "123");
    }

    #[test]
    fn test_teardown_steps() {
        let source = "\
# Spec
* open app

## S
* step
___
* close app
|id|
|--|
|1|
* clear cache
";
        let (spec, warnings) = parse(source).unwrap();

        assert!(warnings.is_empty());
        assert_eq!(spec.teardown().unwrap().value(), "___");
        let contexts: Vec<_> = spec.contexts().map(Step::value).collect();
        let teardown: Vec<_> = spec.teardown_steps().map(Step::value).collect();
        assert_eq!(contexts, vec!["open app"]);
        assert_eq!(teardown, vec!["close app {}", "clear cache"]);
        assert_eq!(spec.scenarios().next().unwrap().steps().count(), 1);
        let table = spec.teardown_steps().next().unwrap().args()[0].table_value().unwrap();
        assert_eq!(table.row_count(), 1);
    }

    #[test]
    fn test_teardown_table_without_step_is_kept_as_comments() {
        let source = "# Spec\n## S\n* step\n___\n|word|count|\n|----|-----|\n|gauge|3|";
        let (spec, _) = parse(source).unwrap();

        assert_eq!(spec.teardown_steps().count(), 0);
        let comments = spec
            .items()
            .iter()
            .filter(|item| matches!(item, Item::Comment(_)))
            .count();
        assert_eq!(comments, 3);
    }

    #[test]
    fn test_tags_continue_on_next_line() {
        let (spec, _) = parse("# Spec\ntags: smoke,\nnightly\n## S\n* step").unwrap();

        assert_eq!(spec.tags().unwrap().values(), ["smoke", "nightly"]);
        assert!(!spec.items().iter().any(|item| matches!(item, Item::Comment(_))));
    }
}
