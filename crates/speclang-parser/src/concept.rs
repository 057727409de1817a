//! Concept file parser.
//!
//! A concept file holds any number of concepts. Each heading, `#` or `##`,
//! opens a concept whose heading is itself a step: its dynamic parameters
//! are the concept's formal parameters. The steps that follow form the
//! concept body and may only refer to those parameters.

use log::debug;

use speclang_core::{
    arg::StepArg,
    concept::Concept,
    lookup::ArgLookup,
    spec::{Comment, Item},
    step::Step,
    table::Table,
};

use crate::{
    error::{Diagnostic, DiagnosticCollector, ErrorCode, ParseError},
    parser::{build_step, comment_text, inline_row_cells, locate},
    resolver::{FileSystem, SpecialResolver},
    state::ParseState,
    step_text::{ParamKind, scan_step_text},
    table,
    tokens::{Token, TokenKind},
};

pub(crate) struct ConceptParser<'a> {
    file_name: &'a str,
    tokens: &'a [Token],
    resolver: SpecialResolver<'a>,
    state: ParseState,
    current: Option<(Concept, &'a Token)>,
    concepts: Vec<Concept>,
    pre_comments: Vec<Comment>,
    diagnostics: DiagnosticCollector,
}

impl<'a> ConceptParser<'a> {
    pub(crate) fn new(file_name: &'a str, tokens: &'a [Token], fs: &'a dyn FileSystem) -> Self {
        Self {
            file_name,
            tokens,
            resolver: SpecialResolver::new(fs),
            state: ParseState::INITIAL,
            current: None,
            concepts: Vec::new(),
            pre_comments: Vec::new(),
            diagnostics: DiagnosticCollector::new(),
        }
    }

    /// Parses every concept in the file. Returns the concepts with their
    /// warnings.
    pub(crate) fn parse(mut self) -> Result<(Vec<Concept>, Vec<Diagnostic>), ParseError> {
        for token in self.tokens {
            match token.kind() {
                TokenKind::SpecHeading | TokenKind::ScenarioHeading => self.heading(token),
                TokenKind::Step => self.step(token),
                TokenKind::TableHeader => self.table_header(token),
                TokenKind::TableRow => self.table_row(token),
                TokenKind::Comment
                | TokenKind::Tags
                | TokenKind::DataTable
                | TokenKind::TearDown => self.comment(token),
            }
        }
        self.finish_concept();

        let warnings = self.diagnostics.finish()?;
        debug!(file = self.file_name, concepts = self.concepts.len(); "Concept file parsed");
        Ok((self.concepts, warnings))
    }

    fn error(&mut self, diagnostic: Diagnostic, token: &Token) {
        self.diagnostics.emit(locate(diagnostic, token));
    }

    fn finish_concept(&mut self) {
        let Some((concept, heading)) = self.current.take() else {
            return;
        };
        if concept.step_count() == 0 {
            self.error(
                Diagnostic::error("Concept should have atleast one step")
                    .with_code(ErrorCode::E302),
                heading,
            );
            return;
        }
        self.concepts.push(concept);
    }

    fn heading(&mut self, token: &'a Token) {
        self.finish_concept();
        self.state.clear();

        let scanned = match scan_step_text(token.value()) {
            Ok(scanned) => scanned,
            Err(err) => {
                self.error(err.to_diagnostic(), token);
                return;
            }
        };
        if scanned.kinds.iter().any(|kind| *kind != ParamKind::Dynamic) {
            self.error(
                Diagnostic::error("Concept heading can have only Dynamic Parameters")
                    .with_code(ErrorCode::E300)
                    .with_help("write every parameter as `<name>`"),
                token,
            );
            return;
        }

        let mut lookup = ArgLookup::default();
        for name in &scanned.args {
            lookup.add_arg_name(name.as_str());
        }
        let args = scanned.args.iter().map(StepArg::dynamic).collect();
        let mut heading = Step::new(token.line_no(), scanned.value, token.value(), args);
        heading.set_lookup(lookup);

        let mut concept = Concept::new(self.file_name, heading);
        if !self.pre_comments.is_empty() {
            concept.set_pre_comments(std::mem::take(&mut self.pre_comments));
        }
        self.current = Some((concept, token));
        self.state.insert(ParseState::CONCEPT);
    }

    fn step(&mut self, token: &Token) {
        let Some((concept, _)) = self.current.as_mut() else {
            self.error(
                Diagnostic::error("Step is not defined inside a concept heading")
                    .with_code(ErrorCode::E301)
                    .with_help("add a `# concept heading` line above the step"),
                token,
            );
            return;
        };

        let step = build_step(
            token,
            concept.formal_params(),
            self.resolver,
            &mut self.diagnostics,
        );
        if step.value() == concept.signature() {
            self.diagnostics.emit(locate(
                Diagnostic::error("Cyclic dependancy found. Step is calling concept again.")
                    .with_code(ErrorCode::E303),
                token,
            ));
        }
        concept.add_item(Item::Step(step));
        self.state.insert(ParseState::STEP);
    }

    fn table_header(&mut self, token: &Token) {
        let step = self
            .current
            .as_mut()
            .filter(|_| self.state.contains(ParseState::STEP))
            .and_then(|(concept, _)| concept.latest_step_mut());
        let Some(step) = step else {
            self.error(
                Diagnostic::error("Table doesn't belong to any step").with_code(ErrorCode::E304),
                token,
            );
            return;
        };

        let mut table = Table::new(token.line_no());
        table.add_headers(token.args());
        step.add_inline_table(table);
        self.state.insert(ParseState::TABLE);
    }

    fn table_row(&mut self, token: &Token) {
        if table::is_separator_row(token.args()) {
            return;
        }
        let in_table = self.state.contains(ParseState::STEP | ParseState::TABLE);
        let Some((concept, _)) = self.current.as_ref().filter(|_| in_table) else {
            self.comment(token);
            return;
        };

        let cells = inline_row_cells(
            token,
            concept.formal_params(),
            self.resolver,
            &mut self.diagnostics,
        );
        let table = self
            .current
            .as_mut()
            .and_then(|(concept, _)| concept.latest_step_mut())
            .and_then(Step::inline_table_mut);
        if let Some(table) = table {
            table.add_row(cells);
        }
    }

    fn comment(&mut self, token: &Token) {
        self.state.retain(ParseState::CONCEPT);
        self.state.insert(ParseState::COMMENT);

        let comment = Comment::new(comment_text(token), token.line_no());
        match self.current.as_mut() {
            Some((concept, _)) => concept.add_item(Item::Comment(comment)),
            None => self.pre_comments.push(comment),
        }
    }
}

#[cfg(test)]
mod tests {
    use speclang_core::arg::ArgType;

    use super::*;
    use crate::{lexer::tokenize, resolver::InMemoryFileSystem};

    fn parse(source: &str) -> Result<Vec<Concept>, ParseError> {
        let tokens = tokenize(source)?;
        let fs = InMemoryFileSystem::new();
        ConceptParser::new("test.cpt", &tokens, &fs)
            .parse()
            .map(|(concepts, _)| concepts)
    }

    fn first_error(source: &str) -> Diagnostic {
        parse(source).unwrap_err().diagnostics()[0].clone()
    }

    #[test]
    fn test_parse_concepts() {
        let source = "\
Shared login steps

# log in as <user> with <password>
* open the login page
* type <user> into \"name\"
* type <password> into \"password\"

# log out
* click \"logout\"
";
        let concepts = parse(source).unwrap();

        assert_eq!(concepts.len(), 2);
        let login = &concepts[0];
        assert_eq!(login.signature(), "log in as {} with {}");
        assert_eq!(login.formal_params().names().collect::<Vec<_>>(), vec!["user", "password"]);
        assert_eq!(login.step_count(), 3);
        assert_eq!(login.pre_comments().len(), 2);
        assert_eq!(login.pre_comments()[0].value(), "Shared login steps");
        assert_eq!(login.file_name(), "test.cpt");

        let second = login.steps().nth(1).unwrap();
        assert_eq!(second.args()[0].arg_type(), ArgType::Dynamic);
        assert_eq!(concepts[1].signature(), "log out");
    }

    #[test]
    fn test_scenario_heading_opens_concept() {
        let concepts = parse("## greet <name>\n* say <name>").unwrap();

        assert_eq!(concepts[0].signature(), "greet {}");
    }

    #[test]
    fn test_heading_with_static_param() {
        let diag = first_error("# greet \"bob\"\n* say hi");

        assert_eq!(diag.code(), Some(ErrorCode::E300));
        assert_eq!(diag.message(), "Concept heading can have only Dynamic Parameters");
    }

    #[test]
    fn test_step_outside_concept() {
        let diag = first_error("* orphan\n# concept\n* step");

        assert_eq!(diag.code(), Some(ErrorCode::E301));
        assert_eq!(diag.line_no(), Some(1));
    }

    #[test]
    fn test_concept_without_steps() {
        let diag = first_error("# empty\n\n# full\n* step");

        assert_eq!(diag.code(), Some(ErrorCode::E302));
        assert_eq!(diag.message(), "Concept should have atleast one step");
        assert_eq!(diag.line_no(), Some(1));
    }

    #[test]
    fn test_last_concept_without_steps() {
        let diag = first_error("# full\n* step\n# empty");

        assert_eq!(diag.code(), Some(ErrorCode::E302));
        assert_eq!(diag.line_no(), Some(3));
    }

    #[test]
    fn test_concept_calling_itself() {
        let diag = first_error("# greet <name>\n* greet \"bob\"");

        assert_eq!(diag.code(), Some(ErrorCode::E303));
        assert_eq!(diag.message(), "Cyclic dependancy found. Step is calling concept again.");
    }

    #[test]
    fn test_body_param_must_be_formal() {
        let diag = first_error("# greet <name>\n* say <other>");

        assert_eq!(diag.code(), Some(ErrorCode::E200));
    }

    #[test]
    fn test_table_without_step() {
        let diag = first_error("# greet\n|a|\n* step");

        assert_eq!(diag.code(), Some(ErrorCode::E304));
        assert_eq!(diag.message(), "Table doesn't belong to any step");
    }

    #[test]
    fn test_inline_table_with_formal_cell() {
        let concepts = parse("# create <id>\n* insert\n|id|\n|--|\n|<id>|").unwrap();

        let step = concepts[0].steps().next().unwrap();
        let table = step.args()[0].table_value().unwrap();
        assert_eq!(table.row_count(), 1);
        assert!(table.get("id").unwrap()[0].is_dynamic());
    }

    #[test]
    fn test_inline_cell_not_formal() {
        let diag = first_error("# create <id>\n* insert\n|id|\n|<other>|");

        assert_eq!(diag.code(), Some(ErrorCode::E201));
    }
}
