//! The concept dictionary.
//!
//! Concepts live in an arena and are addressed by [`ConceptId`]. Every body
//! step of every concept is linked to the concept it invokes, if any, so
//! expansion and cycle detection work on ids instead of signatures.
//!
//! Links are recomputed on every successful [`ConceptDictionary::add`]: a
//! step written against a concept that only appears in a later file is
//! linked once that file is added.

use indexmap::IndexMap;
use log::{debug, info};

use speclang_core::{concept::Concept, spec::Specification, step::Step};

use crate::error::{Diagnostic, ErrorCode, ParseError};

/// Index of a concept in a [`ConceptDictionary`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConceptId(usize);

impl ConceptId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Every concept known to the compiler, keyed by signature.
#[derive(Debug, Clone, Default)]
pub struct ConceptDictionary {
    concepts: Vec<Concept>,
    signatures: IndexMap<String, ConceptId>,
    links: Vec<Vec<Option<ConceptId>>>,
}

impl ConceptDictionary {
    /// Creates an empty dictionary.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of concepts added so far.
    pub fn len(&self) -> usize {
        self.concepts.len()
    }

    /// Whether no concept has been added.
    pub fn is_empty(&self) -> bool {
        self.concepts.is_empty()
    }

    /// The concept with `id`, if it belongs to this dictionary.
    pub fn get(&self, id: ConceptId) -> Option<&Concept> {
        self.concepts.get(id.0)
    }

    /// The id of the concept whose canonical heading is `signature`.
    pub fn id_of(&self, signature: &str) -> Option<ConceptId> {
        self.signatures.get(signature).copied()
    }

    /// Finds the concept invoked by a step with canonical value `signature`.
    pub fn search(&self, signature: &str) -> Option<&Concept> {
        self.id_of(signature).and_then(|id| self.get(id))
    }

    /// Concepts in insertion order, with their ids.
    pub fn iter(&self) -> impl Iterator<Item = (ConceptId, &Concept)> {
        self.concepts
            .iter()
            .enumerate()
            .map(|(index, concept)| (ConceptId(index), concept))
    }

    /// Adds the concepts parsed from `file`.
    ///
    /// The dictionary is left unchanged when the batch is rejected.
    ///
    /// # Errors
    ///
    /// Returns a [`ParseError`] if a signature is already defined, here or
    /// earlier in the batch, or if the new concepts close a reference cycle.
    pub fn add(&mut self, concepts: Vec<Concept>, file: &str) -> Result<(), ParseError> {
        let mut batch = std::collections::HashSet::with_capacity(concepts.len());
        for concept in &concepts {
            if self.signatures.contains_key(concept.signature())
                || !batch.insert(concept.signature())
            {
                let heading = concept.heading();
                return Err(Diagnostic::error("Duplicate concept definition found")
                    .with_code(ErrorCode::E305)
                    .with_line(heading.line_no(), heading.line_text())
                    .with_help(format!("another concept already has the signature `{}`", concept.signature()))
                    .into());
            }
        }

        let previous = self.concepts.len();
        let count = concepts.len();
        for concept in concepts {
            let id = ConceptId(self.concepts.len());
            self.signatures.insert(concept.signature().to_string(), id);
            self.concepts.push(concept);
        }
        self.relink();

        if let Some(diagnostic) = self.find_cycle() {
            self.concepts.truncate(previous);
            self.signatures.truncate(previous);
            self.relink();
            return Err(diagnostic.into());
        }

        info!(file, concepts = count; "Concepts added");
        Ok(())
    }

    fn relink(&mut self) {
        self.links = self
            .concepts
            .iter()
            .map(|concept| {
                concept
                    .steps()
                    .map(|step| self.signatures.get(step.value()).copied())
                    .collect()
            })
            .collect();
    }

    /// Searches for a concept that invokes, directly or not, a concept on
    /// its own call path.
    fn find_cycle(&self) -> Option<Diagnostic> {
        let count = self.concepts.len();
        let mut done = vec![false; count];
        let mut on_path = vec![false; count];

        for root in 0..count {
            if done[root] {
                continue;
            }
            let mut stack = vec![(root, 0usize)];
            on_path[root] = true;

            while let Some(frame) = stack.last_mut() {
                let (current, next) = *frame;
                frame.1 += 1;
                match self.links[current].get(next) {
                    None => {
                        on_path[current] = false;
                        done[current] = true;
                        stack.pop();
                    }
                    Some(None) => {}
                    Some(Some(target)) => {
                        let target = target.0;
                        if on_path[target] {
                            return Some(self.cycle_error(root, current, next, target));
                        }
                        if !done[target] {
                            on_path[target] = true;
                            stack.push((target, 0));
                        }
                    }
                }
            }
        }
        None
    }

    fn cycle_error(&self, root: usize, current: usize, step: usize, target: usize) -> Diagnostic {
        let root = &self.concepts[root];
        let concept = &self.concepts[current];
        let target = &self.concepts[target];
        let Some(step) = concept.steps().nth(step) else {
            return Diagnostic::error("Circular reference found in concept").with_code(ErrorCode::E306);
        };

        Diagnostic::error(format!(
            "Circular reference found in concept: \"{}\"\n{}: The concept \"{}\" references a higher concept -> {}: \"{}\"",
            root.heading().line_text(),
            concept.file_name(),
            concept.heading().line_text(),
            target.file_name(),
            step.line_text(),
        ))
        .with_code(ErrorCode::E306)
        .with_line(step.line_no(), step.line_text())
    }

    /// Expands every context and scenario step of `spec` that invokes a
    /// concept.
    pub fn expand_concepts(&self, spec: &mut Specification) {
        for step in spec.steps_mut() {
            if let Some(id) = self.id_of(step.value()) {
                debug!(line_no = step.line_no(), signature = step.value(); "Expanding concept step");
                self.expand_step(step, id);
            }
        }
    }

    /// Gives `step` a private copy of the body of concept `id`, with nested
    /// concept steps expanded in turn.
    ///
    /// The step's lookup binds the concept's formal parameters to the step's
    /// arguments by position.
    pub fn expand_step(&self, step: &mut Step, id: ConceptId) {
        let Some(concept) = self.get(id) else {
            return;
        };
        let lookup = concept.formal_params().bind(step.args());
        let body = concept
            .steps()
            .zip(&self.links[id.0])
            .map(|(body_step, link)| {
                let mut copy = body_step.clone();
                if let Some(nested) = link {
                    self.expand_step(&mut copy, *nested);
                }
                copy
            })
            .collect();
        step.expand(lookup, body);
    }
}
