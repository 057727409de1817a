//! Steps and their concept expansions.

use crate::{arg::StepArg, lookup::ArgLookup, table::Table};

/// The placeholder that stands for one argument in a step's canonical value.
pub const PARAMETER_PLACEHOLDER: &str = "{}";

/// A single step line, optionally expanded into a concept body.
///
/// `value` is the canonical text with each argument replaced by
/// [`PARAMETER_PLACEHOLDER`]; steps with equal values invoke the same step
/// implementation or concept. When [`Step::is_concept`] is set, the step
/// owns a private copy of the concept body in [`Step::concept_steps`] and
/// its [`Step::lookup`] binds the concept's formal parameters to this call
/// site's arguments.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Step {
    line_no: usize,
    value: String,
    line_text: String,
    args: Vec<StepArg>,
    has_inline_table: bool,
    is_concept: bool,
    lookup: ArgLookup,
    concept_steps: Vec<Step>,
}

impl Step {
    /// Creates a plain step.
    pub fn new(
        line_no: usize,
        value: impl Into<String>,
        line_text: impl Into<String>,
        args: Vec<StepArg>,
    ) -> Self {
        Self {
            line_no,
            value: value.into(),
            line_text: line_text.into(),
            args,
            ..Self::default()
        }
    }

    pub fn line_no(&self) -> usize {
        self.line_no
    }

    /// Canonical value, e.g. `create user {} with {}`.
    pub fn value(&self) -> &str {
        &self.value
    }

    /// The step text as written, without the `*` marker.
    pub fn line_text(&self) -> &str {
        &self.line_text
    }

    pub fn args(&self) -> &[StepArg] {
        &self.args
    }

    pub fn has_inline_table(&self) -> bool {
        self.has_inline_table
    }

    pub fn is_concept(&self) -> bool {
        self.is_concept
    }

    pub fn lookup(&self) -> &ArgLookup {
        &self.lookup
    }

    pub fn concept_steps(&self) -> &[Step] {
        &self.concept_steps
    }

    /// Attaches an inline table: the value gains a trailing placeholder and
    /// the table becomes the last argument.
    pub fn add_inline_table(&mut self, table: Table) {
        self.value = format!("{} {PARAMETER_PLACEHOLDER}", self.value);
        self.has_inline_table = true;
        self.args.push(StepArg::table(table));
    }

    /// The inline table most recently attached with
    /// [`Step::add_inline_table`].
    pub fn inline_table_mut(&mut self) -> Option<&mut Table> {
        if !self.has_inline_table {
            return None;
        }
        self.args.last_mut().and_then(StepArg::table_value_mut)
    }

    /// Appends an implicit trailing argument, such as a multiline block.
    pub fn push_trailing_arg(&mut self, arg: StepArg) {
        self.value = format!("{} {PARAMETER_PLACEHOLDER}", self.value);
        self.args.push(arg);
    }

    /// Declares formal parameters on a concept heading step.
    pub fn set_lookup(&mut self, lookup: ArgLookup) {
        self.lookup = lookup;
    }

    /// Turns this step into an expanded concept invocation.
    pub fn expand(&mut self, lookup: ArgLookup, concept_steps: Vec<Step>) {
        self.is_concept = true;
        self.lookup = lookup;
        self.concept_steps = concept_steps;
    }

    /// Splits the canonical value into literal text and the argument that
    /// fills each placeholder, in order. A placeholder with no matching
    /// argument is reported as text.
    pub fn fragments(&self) -> Vec<Fragment<'_>> {
        let mut fragments = Vec::new();
        let mut args = self.args.iter();
        let mut pieces = self.value.split(PARAMETER_PLACEHOLDER).peekable();
        while let Some(piece) = pieces.next() {
            if !piece.is_empty() {
                fragments.push(Fragment::Text(piece));
            }
            if pieces.peek().is_none() {
                break;
            }
            match args.next() {
                Some(arg) => fragments.push(Fragment::Param(arg)),
                None => fragments.push(Fragment::Text(PARAMETER_PLACEHOLDER)),
            }
        }
        fragments
    }

    /// The step text with every placeholder rendered back as its argument,
    /// `"static"`, `<dynamic>` or `<special>`. Table and multiline arguments
    /// are omitted.
    pub fn parameterized_text(&self) -> String {
        let mut text = String::with_capacity(self.value.len());
        for fragment in self.fragments() {
            match fragment {
                Fragment::Text(piece) => text.push_str(piece),
                Fragment::Param(arg) => render_inline_arg(&mut text, arg),
            }
        }
        text.trim_end().to_string()
    }
}

/// A piece of a step's canonical value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fragment<'a> {
    Text(&'a str),
    Param(&'a StepArg),
}

fn render_inline_arg(text: &mut String, arg: &StepArg) {
    use crate::arg::ArgType;

    match arg.arg_type() {
        ArgType::Static => {
            text.push('"');
            text.push_str(&escape_static(arg.value()));
            text.push('"');
        }
        ArgType::Dynamic => {
            text.push('<');
            text.push_str(arg.value());
            text.push('>');
        }
        ArgType::SpecialString | ArgType::SpecialTable if !arg.is_multiline() => {
            text.push('<');
            text.push_str(arg.name());
            text.push('>');
        }
        ArgType::SpecialString | ArgType::SpecialTable | ArgType::Table => {}
    }
}

/// Escapes a literal so it can be written back between double quotes.
pub fn escape_static(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '"' => escaped.push_str("\\\""),
            '\\' => escaped.push_str("\\\\"),
            '\n' => escaped.push_str("\\n"),
            '\t' => escaped.push_str("\\t"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_inline_table_appends_placeholder() {
        let mut step = Step::new(3, "create users", "create users", Vec::new());
        let mut table = Table::new(4);
        table.add_headers(["id"]);

        step.add_inline_table(table);

        assert_eq!(step.value(), "create users {}");
        assert!(step.has_inline_table());
        assert_eq!(step.args().len(), 1);
        assert!(step.inline_table_mut().is_some());
    }

    #[test]
    fn test_inline_table_mut_without_table() {
        let mut step = Step::new(1, "say {}", "say \"hi\"", vec![StepArg::literal("hi")]);

        assert!(step.inline_table_mut().is_none());
    }

    #[test]
    fn test_parameterized_text() {
        let step = Step::new(
            1,
            "log in as {} with {} and {}",
            "",
            vec![
                StepArg::literal("say \"hi\""),
                StepArg::dynamic("password"),
                StepArg::special_string("file:notes.txt", "contents"),
            ],
        );

        assert_eq!(
            step.parameterized_text(),
            "log in as \"say \\\"hi\\\"\" with <password> and <file:notes.txt>"
        );
    }

    #[test]
    fn test_parameterized_text_drops_table_placeholder() {
        let mut step = Step::new(1, "create users", "create users", Vec::new());
        let mut table = Table::new(2);
        table.add_headers(["id"]);
        step.add_inline_table(table);

        assert_eq!(step.parameterized_text(), "create users");
    }

    #[test]
    fn test_fragments_pair_placeholders_with_args() {
        let step = Step::new(
            1,
            "add {} to {}",
            "add \"milk\" to <list>",
            vec![StepArg::literal("milk"), StepArg::dynamic("list")],
        );

        let fragments = step.fragments();

        assert_eq!(fragments.len(), 4);
        assert_eq!(fragments[0], Fragment::Text("add "));
        assert!(matches!(fragments[1], Fragment::Param(arg) if arg.value() == "milk"));
        assert_eq!(fragments[2], Fragment::Text(" to "));
        assert!(matches!(fragments[3], Fragment::Param(arg) if arg.is_dynamic()));
    }

    #[test]
    fn test_expand_marks_concept() {
        let mut step = Step::new(1, "login", "login", Vec::new());
        let body = vec![Step::new(2, "open page", "open page", Vec::new())];

        step.expand(ArgLookup::default(), body);

        assert!(step.is_concept());
        assert_eq!(step.concept_steps().len(), 1);
    }
}
