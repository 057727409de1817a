//! Concept definitions.
//!
//! A concept is a named, parameterized sequence of steps declared in a
//! concept file. Its heading is parsed as a [`Step`] whose arguments are the
//! formal parameters; the heading's canonical value is the concept's
//! signature, which is what invoking steps are matched against.

use crate::{
    lookup::ArgLookup,
    spec::{Comment, Item},
    step::Step,
};

/// A concept declared in a concept file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Concept {
    file_name: String,
    heading: Step,
    items: Vec<Item>,
    pre_comments: Vec<Comment>,
}

impl Concept {
    /// Creates a concept from its heading step. The heading's lookup must
    /// already declare the formal parameters.
    pub fn new(file_name: impl Into<String>, heading: Step) -> Self {
        Self {
            file_name: file_name.into(),
            heading,
            items: Vec::new(),
            pre_comments: Vec::new(),
        }
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn heading(&self) -> &Step {
        &self.heading
    }

    /// The canonical heading value used as the dictionary key.
    pub fn signature(&self) -> &str {
        self.heading.value()
    }

    /// Formal parameter names in declaration order.
    pub fn formal_params(&self) -> &ArgLookup {
        self.heading.lookup()
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn add_item(&mut self, item: Item) {
        self.items.push(item);
    }

    /// Comments written in the file before this concept's heading.
    pub fn pre_comments(&self) -> &[Comment] {
        &self.pre_comments
    }

    pub fn set_pre_comments(&mut self, comments: Vec<Comment>) {
        self.pre_comments = comments;
    }

    /// The body steps in order.
    pub fn steps(&self) -> impl Iterator<Item = &Step> {
        self.items.iter().filter_map(|item| match item {
            Item::Step(step) => Some(step),
            _ => None,
        })
    }

    pub fn step_count(&self) -> usize {
        self.steps().count()
    }

    pub fn latest_step_mut(&mut self) -> Option<&mut Step> {
        self.items.iter_mut().rev().find_map(|item| match item {
            Item::Step(step) => Some(step),
            _ => None,
        })
    }
}
