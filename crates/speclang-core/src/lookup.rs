//! Parameter lookups and the scope chain used to resolve dynamic arguments.
//!
//! An [`ArgLookup`] maps declared parameter names to optionally bound
//! [`StepArg`]s, preserving declaration order. Lookups are built from a
//! data table's headers (names only), from one data table row (static
//! values), or from a concept's formal parameters bound at a call site.
//!
//! A [`Scope`] chains lookups without storing back-references in steps. A
//! dynamic binding found in one scope is re-resolved in its parent, which is
//! how a value passed to an outer concept reaches a deeply nested step.
//!
//! # Example
//!
//! ```
//! # use speclang_core::{arg::StepArg, lookup::{ArgLookup, Scope}};
//! let mut row = ArgLookup::default();
//! row.add_arg_name("user");
//! row.add_arg_value("user", StepArg::literal("alice")).unwrap();
//!
//! let mut concept = ArgLookup::default();
//! concept.add_arg_name("name");
//! concept.add_arg_value("name", StepArg::dynamic("user")).unwrap();
//!
//! let root = Scope::root(&row);
//! let scope = root.child(&concept);
//! assert_eq!(scope.resolve("name").unwrap().value(), "alice");
//! ```

use indexmap::IndexMap;
use thiserror::Error;

use crate::{
    arg::StepArg,
    table::{Table, TableError},
};

/// Errors raised when accessing an [`ArgLookup`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    #[error("Accessing an invalid parameter ({0})")]
    UnknownParam(String),

    #[error("Parameter ({0}) has no bound value")]
    Unbound(String),

    #[error(transparent)]
    Table(#[from] TableError),
}

/// An ordered mapping from parameter name to its bound argument.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArgLookup {
    params: IndexMap<String, Option<StepArg>>,
}

impl ArgLookup {
    /// Declares a parameter. Re-declaring a name clears its binding but
    /// keeps its position.
    pub fn add_arg_name(&mut self, name: impl Into<String>) {
        self.params.insert(name.into(), None);
    }

    /// Binds a value to a declared parameter.
    ///
    /// # Errors
    ///
    /// Returns [`LookupError::UnknownParam`] if `name` was never declared.
    pub fn add_arg_value(&mut self, name: &str, arg: StepArg) -> Result<(), LookupError> {
        let slot = self
            .params
            .get_mut(name)
            .ok_or_else(|| LookupError::UnknownParam(name.to_string()))?;
        *slot = Some(arg);
        Ok(())
    }

    pub fn contains_arg(&self, name: &str) -> bool {
        self.params.contains_key(name)
    }

    /// Returns the value bound to `name`.
    ///
    /// # Errors
    ///
    /// Returns [`LookupError::UnknownParam`] for an undeclared name and
    /// [`LookupError::Unbound`] for a declared name with no value.
    pub fn get_arg(&self, name: &str) -> Result<&StepArg, LookupError> {
        match self.params.get(name) {
            Some(Some(arg)) => Ok(arg),
            Some(None) => Err(LookupError::Unbound(name.to_string())),
            None => Err(LookupError::UnknownParam(name.to_string())),
        }
    }

    /// Declared parameter names in order.
    pub fn names(&self) -> impl ExactSizeIterator<Item = &str> {
        self.params.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// A copy of this lookup with `args` bound to the declared names by
    /// position. Names without a matching argument stay unbound.
    pub fn bind(&self, args: &[StepArg]) -> Self {
        let mut bound = self.clone();
        for (slot, arg) in bound.params.values_mut().zip(args) {
            *slot = Some(arg.clone());
        }
        bound
    }

    /// Declares every header of `table` without binding values.
    pub fn from_data_table(table: &Table) -> Self {
        let mut lookup = Self::default();
        for header in table.headers() {
            lookup.add_arg_name(header);
        }
        lookup
    }

    /// Declares every header of `table` and binds it to the static value in
    /// row `index`.
    ///
    /// # Errors
    ///
    /// Returns an error if `index` is not a valid row of an initialized
    /// table.
    pub fn from_data_table_row(table: &Table, index: usize) -> Result<Self, LookupError> {
        let mut lookup = Self::default();
        if !table.is_initialized() {
            return Ok(lookup);
        }
        let row = table.row(index)?;
        for (header, cell) in table.headers().zip(row) {
            lookup.add_arg_name(header);
            lookup.add_arg_value(header, StepArg::literal(cell.value()))?;
        }
        Ok(lookup)
    }
}

/// A chain of lookups, innermost first.
#[derive(Debug, Clone, Copy)]
pub struct Scope<'a> {
    lookup: &'a ArgLookup,
    parent: Option<&'a Scope<'a>>,
}

impl<'a> Scope<'a> {
    /// The outermost scope, usually a data table row.
    pub fn root(lookup: &'a ArgLookup) -> Self {
        Self {
            lookup,
            parent: None,
        }
    }

    /// A nested scope whose unresolved dynamic bindings fall through to
    /// `self`.
    pub fn child<'b>(&'b self, lookup: &'b ArgLookup) -> Scope<'b> {
        Scope {
            lookup,
            parent: Some(self),
        }
    }

    pub fn lookup(&self) -> &'a ArgLookup {
        self.lookup
    }

    /// Number of lookups in the chain.
    pub fn depth(&self) -> usize {
        let mut depth = 1;
        let mut current = self.parent;
        while let Some(scope) = current {
            depth += 1;
            current = scope.parent;
        }
        depth
    }

    /// Resolves `name` through the chain.
    ///
    /// A non-dynamic binding is returned as is. A dynamic binding names a
    /// parameter of the parent scope and is resolved there. A dynamic
    /// binding in the root scope is returned unchanged.
    ///
    /// # Errors
    ///
    /// Returns a [`LookupError`] if a name along the chain is undeclared or
    /// unbound.
    pub fn resolve(&self, name: &str) -> Result<StepArg, LookupError> {
        let mut scope = self;
        let mut arg = scope.lookup.get_arg(name)?;
        while arg.is_dynamic() {
            let Some(parent) = scope.parent else {
                break;
            };
            arg = parent.lookup.get_arg(arg.value())?;
            scope = parent;
        }
        Ok(arg.clone())
    }
}
