//! Resolution of parsed steps into concrete values for an execution engine.
//!
//! Dynamic arguments are looked up through a [`Scope`] chain. The root scope
//! is a data-table row and every expanded concept adds its bound formal
//! parameters as a child scope. Table arguments passed to a concept have
//! their cells resolved at the call site, before the body sees them.

use log::trace;

use speclang_core::{
    arg::StepArg,
    lookup::{ArgLookup, LookupError, Scope},
    spec::{Scenario, Specification},
    step::Step,
    table::{CellType, Table, TableCell},
};

/// A step with every argument resolved to its value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedStep {
    /// The canonical step value, with `{}` placeholders.
    pub text: String,
    pub params: Vec<StepArg>,
    /// Resolved body of a concept invocation, empty for plain steps.
    pub children: Vec<ResolvedStep>,
}

impl ResolvedStep {
    pub fn is_concept(&self) -> bool {
        !self.children.is_empty()
    }
}

/// Resolves `step` and, for a concept invocation, its whole body.
///
/// # Errors
///
/// Returns a [`LookupError`] if a dynamic argument or table cell names a
/// parameter that is undeclared or unbound in the scope chain.
pub fn resolve_step(step: &Step, scope: &Scope<'_>) -> Result<ResolvedStep, LookupError> {
    let params = step
        .args()
        .iter()
        .map(|arg| resolve_arg(arg, scope))
        .collect::<Result<Vec<_>, _>>()?;

    let children = if step.is_concept() {
        let lookup = resolve_bound_tables(step.lookup(), scope)?;
        let child = scope.child(&lookup);
        trace!(step = step.value(), depth = child.depth(); "Resolving concept body");
        step.concept_steps()
            .iter()
            .map(|inner| resolve_step(inner, &child))
            .collect::<Result<Vec<_>, _>>()?
    } else {
        Vec::new()
    };

    Ok(ResolvedStep {
        text: step.value().to_string(),
        params,
        children,
    })
}

/// Resolves the context steps of `spec`, the steps of `scenario` and then
/// the teardown steps.
///
/// `row` selects the data-table row that binds dynamic parameters. Without
/// it every data-table column is bound to itself, so dynamic arguments and
/// cells stay `<name>` placeholders.
///
/// # Errors
///
/// Returns a [`LookupError`] if `row` is out of range or a step names a
/// parameter that is not declared anywhere in its scope chain.
pub fn resolve_scenario(
    spec: &Specification,
    scenario: &Scenario,
    row: Option<usize>,
) -> Result<Vec<ResolvedStep>, LookupError> {
    let lookup = match (row, spec.data_table()) {
        (Some(index), Some(data)) => ArgLookup::from_data_table_row(data.table(), index)?,
        (None, Some(data)) => passthrough_lookup(data.table()),
        (_, None) => ArgLookup::default(),
    };
    let scope = Scope::root(&lookup);

    spec.contexts()
        .chain(scenario.steps())
        .chain(spec.teardown_steps())
        .map(|step| resolve_step(step, &scope))
        .collect()
}

fn passthrough_lookup(table: &Table) -> ArgLookup {
    let names: Vec<StepArg> = table.headers().map(StepArg::dynamic).collect();
    ArgLookup::from_data_table(table).bind(&names)
}

/// A concept call's bindings with the cells of every table argument
/// resolved in the caller's scope.
fn resolve_bound_tables(lookup: &ArgLookup, scope: &Scope<'_>) -> Result<ArgLookup, LookupError> {
    let mut resolved = lookup.clone();
    for name in lookup.names() {
        match lookup.get_arg(name) {
            Ok(arg) if arg.table_value().is_some() => {
                resolved.add_arg_value(name, resolve_arg(arg, scope)?)?;
            }
            _ => {}
        }
    }
    Ok(resolved)
}

fn resolve_arg(arg: &StepArg, scope: &Scope<'_>) -> Result<StepArg, LookupError> {
    if arg.is_dynamic() {
        return scope.resolve(arg.value());
    }

    let mut resolved = arg.clone();
    if let Some(table) = resolved.table_value_mut() {
        for cell in table.cells_mut().filter(|cell| cell.is_dynamic()) {
            let value = scope.resolve(cell.value())?;
            let cell_type = if value.is_dynamic() {
                CellType::Dynamic
            } else {
                CellType::Static
            };
            *cell = TableCell::new(value.value(), cell_type);
        }
    }
    Ok(resolved)
}
