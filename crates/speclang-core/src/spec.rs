//! Specification documents.
//!
//! A [`Specification`] and each of its [`Scenario`]s keep their children as
//! an ordered list of [`Item`]s so the document can be re-emitted in source
//! order. Typed views such as [`Specification::contexts`] and
//! [`Scenario::steps`] filter that list.

use crate::{step::Step, table::Table};

/// Whether a heading opened a specification or a scenario.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HeadingKind {
    Spec,
    Scenario,
}

/// A specification or scenario heading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Heading {
    value: String,
    line_no: usize,
    kind: HeadingKind,
}

impl Heading {
    pub fn new(value: impl Into<String>, line_no: usize, kind: HeadingKind) -> Self {
        Self {
            value: value.into(),
            line_no,
            kind,
        }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn line_no(&self) -> usize {
        self.line_no
    }

    pub fn kind(&self) -> HeadingKind {
        self.kind
    }
}

/// Free text between structural elements. A blank line is stored as `"\n"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    value: String,
    line_no: usize,
}

impl Comment {
    pub fn new(value: impl Into<String>, line_no: usize) -> Self {
        Self {
            value: value.into(),
            line_no,
        }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn line_no(&self) -> usize {
        self.line_no
    }

    pub fn is_blank_line(&self) -> bool {
        self.value == "\n"
    }
}

/// A `tags:` line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tags {
    values: Vec<String>,
    line_no: usize,
}

impl Tags {
    pub fn new(values: Vec<String>, line_no: usize) -> Self {
        Self { values, line_no }
    }

    pub fn values(&self) -> &[String] {
        &self.values
    }

    pub fn line_no(&self) -> usize {
        self.line_no
    }
}

/// The specification-level data table, either written inline or loaded
/// from a `table: <path>` reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataTable {
    table: Table,
    external: Option<String>,
}

impl DataTable {
    pub fn inline(table: Table) -> Self {
        Self {
            table,
            external: None,
        }
    }

    pub fn external(table: Table, reference: impl Into<String>) -> Self {
        Self {
            table,
            external: Some(reference.into()),
        }
    }

    pub fn table(&self) -> &Table {
        &self.table
    }

    pub fn table_mut(&mut self) -> &mut Table {
        &mut self.table
    }

    /// The referenced path for an external data table.
    pub fn reference(&self) -> Option<&str> {
        self.external.as_deref()
    }

    pub fn is_external(&self) -> bool {
        self.external.is_some()
    }
}

/// The `___` line that opens the teardown section of a specification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TearDown {
    value: String,
    line_no: usize,
}

impl TearDown {
    pub fn new(value: impl Into<String>, line_no: usize) -> Self {
        Self {
            value: value.into(),
            line_no,
        }
    }

    /// The marker as written.
    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn line_no(&self) -> usize {
        self.line_no
    }
}

/// A child of a specification, scenario or concept, in source order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Item {
    Comment(Comment),
    Step(Step),
    Tags(Tags),
    DataTable(DataTable),
    Scenario(Scenario),
    TearDown(TearDown),
}

fn before_teardown(item: &&Item) -> bool {
    !matches!(item, Item::TearDown(_))
}

fn before_teardown_mut(item: &&mut Item) -> bool {
    !matches!(item, Item::TearDown(_))
}

/// A named sequence of steps within a specification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scenario {
    heading: Heading,
    items: Vec<Item>,
}

impl Scenario {
    pub fn new(heading: Heading) -> Self {
        Self {
            heading,
            items: Vec::new(),
        }
    }

    pub fn heading(&self) -> &Heading {
        &self.heading
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn add_item(&mut self, item: Item) {
        self.items.push(item);
    }

    pub fn steps(&self) -> impl Iterator<Item = &Step> {
        self.items.iter().filter_map(|item| match item {
            Item::Step(step) => Some(step),
            _ => None,
        })
    }

    pub fn steps_mut(&mut self) -> impl Iterator<Item = &mut Step> {
        self.items.iter_mut().filter_map(|item| match item {
            Item::Step(step) => Some(step),
            _ => None,
        })
    }

    pub fn latest_step_mut(&mut self) -> Option<&mut Step> {
        self.items.iter_mut().rev().find_map(|item| match item {
            Item::Step(step) => Some(step),
            _ => None,
        })
    }

    pub fn tags(&self) -> Option<&Tags> {
        self.items.iter().find_map(|item| match item {
            Item::Tags(tags) => Some(tags),
            _ => None,
        })
    }
}

/// A parsed specification file.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Specification {
    file_name: String,
    heading: Option<Heading>,
    items: Vec<Item>,
}

impl Specification {
    pub fn new(file_name: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            ..Self::default()
        }
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn heading(&self) -> Option<&Heading> {
        self.heading.as_ref()
    }

    pub fn set_heading(&mut self, heading: Heading) {
        self.heading = Some(heading);
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn add_item(&mut self, item: Item) {
        self.items.push(item);
    }

    /// Replaces the item list, used when deriving per-row copies.
    pub fn set_items(&mut self, items: Vec<Item>) {
        self.items = items;
    }

    /// Steps declared outside any scenario and before the teardown marker;
    /// they run before every scenario.
    pub fn contexts(&self) -> impl Iterator<Item = &Step> {
        self.items
            .iter()
            .take_while(before_teardown)
            .filter_map(|item| match item {
                Item::Step(step) => Some(step),
                _ => None,
            })
    }

    pub fn contexts_mut(&mut self) -> impl Iterator<Item = &mut Step> {
        self.items
            .iter_mut()
            .take_while(before_teardown_mut)
            .filter_map(|item| match item {
                Item::Step(step) => Some(step),
                _ => None,
            })
    }

    pub fn latest_context_mut(&mut self) -> Option<&mut Step> {
        self.contexts_mut().last()
    }

    /// The teardown marker, if the specification has one.
    pub fn teardown(&self) -> Option<&TearDown> {
        self.items.iter().find_map(|item| match item {
            Item::TearDown(teardown) => Some(teardown),
            _ => None,
        })
    }

    /// Steps following the teardown marker; they run after every scenario.
    pub fn teardown_steps(&self) -> impl Iterator<Item = &Step> {
        self.items
            .iter()
            .skip_while(before_teardown)
            .filter_map(|item| match item {
                Item::Step(step) => Some(step),
                _ => None,
            })
    }

    pub fn latest_teardown_step_mut(&mut self) -> Option<&mut Step> {
        self.items
            .iter_mut()
            .skip_while(before_teardown_mut)
            .filter_map(|item| match item {
                Item::Step(step) => Some(step),
                _ => None,
            })
            .last()
    }

    pub fn scenarios(&self) -> impl Iterator<Item = &Scenario> {
        self.items.iter().filter_map(|item| match item {
            Item::Scenario(scenario) => Some(scenario),
            _ => None,
        })
    }

    pub fn scenarios_mut(&mut self) -> impl Iterator<Item = &mut Scenario> {
        self.items.iter_mut().filter_map(|item| match item {
            Item::Scenario(scenario) => Some(scenario),
            _ => None,
        })
    }

    pub fn latest_scenario_mut(&mut self) -> Option<&mut Scenario> {
        self.items.iter_mut().rev().find_map(|item| match item {
            Item::Scenario(scenario) => Some(scenario),
            _ => None,
        })
    }

    pub fn data_table(&self) -> Option<&DataTable> {
        self.items.iter().find_map(|item| match item {
            Item::DataTable(table) => Some(table),
            _ => None,
        })
    }

    pub fn data_table_mut(&mut self) -> Option<&mut DataTable> {
        self.items.iter_mut().find_map(|item| match item {
            Item::DataTable(table) => Some(table),
            _ => None,
        })
    }

    /// Specification-level tags.
    pub fn tags(&self) -> Option<&Tags> {
        self.items.iter().find_map(|item| match item {
            Item::Tags(tags) => Some(tags),
            _ => None,
        })
    }

    /// Every step of the document in source order: contexts, scenario
    /// steps and teardown steps.
    pub fn steps_mut(&mut self) -> impl Iterator<Item = &mut Step> {
        self.items.iter_mut().flat_map(|item| {
            let steps: Box<dyn Iterator<Item = &mut Step> + '_> = match item {
                Item::Step(step) => Box::new(std::iter::once(step)),
                Item::Scenario(scenario) => Box::new(scenario.steps_mut()),
                _ => Box::new(std::iter::empty()),
            };
            steps
        })
    }
}
