//! Step arguments.

use std::fmt;

use crate::table::Table;

/// Classification of a [`StepArg`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArgType {
    /// A quoted literal, `"value"`.
    Static,
    /// A `<name>` reference resolved against a lookup.
    Dynamic,
    /// An inline table following the step.
    Table,
    /// A `<file:path>` parameter or a multiline block.
    SpecialString,
    /// A `<table:path>` parameter loaded from CSV.
    SpecialTable,
}

impl ArgType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ArgType::Static => "static",
            ArgType::Dynamic => "dynamic",
            ArgType::Table => "table",
            ArgType::SpecialString => "special_string",
            ArgType::SpecialTable => "special_table",
        }
    }
}

impl fmt::Display for ArgType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single argument of a step.
///
/// `name` keeps the original placeholder text so the argument can be
/// re-resolved or re-rendered. For dynamic arguments `value` is the name of
/// the parameter to look up. Table arguments own their table; copies never
/// share it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepArg {
    name: String,
    value: String,
    arg_type: ArgType,
    table: Option<Table>,
    multiline: bool,
}

impl StepArg {
    /// A literal argument.
    pub fn literal(value: impl Into<String>) -> Self {
        let value = value.into();
        Self {
            name: value.clone(),
            value,
            arg_type: ArgType::Static,
            table: None,
            multiline: false,
        }
    }

    /// A reference to the parameter `name`.
    pub fn dynamic(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            value: name.clone(),
            name,
            arg_type: ArgType::Dynamic,
            table: None,
            multiline: false,
        }
    }

    /// An inline table argument.
    pub fn table(table: Table) -> Self {
        Self {
            name: "table".to_string(),
            value: String::new(),
            arg_type: ArgType::Table,
            table: Some(table),
            multiline: false,
        }
    }

    /// A resolved special string, e.g. the contents of `<file:path>`.
    pub fn special_string(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            arg_type: ArgType::SpecialString,
            table: None,
            multiline: false,
        }
    }

    /// A resolved special table, e.g. the contents of `<table:path>`.
    pub fn special_table(name: impl Into<String>, table: Table) -> Self {
        Self {
            name: name.into(),
            value: String::new(),
            arg_type: ArgType::SpecialTable,
            table: Some(table),
            multiline: false,
        }
    }

    /// A block argument captured between `"""` fences after a step.
    pub fn multiline(value: impl Into<String>) -> Self {
        Self {
            name: String::new(),
            value: value.into(),
            arg_type: ArgType::SpecialString,
            table: None,
            multiline: true,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn arg_type(&self) -> ArgType {
        self.arg_type
    }

    pub fn is_dynamic(&self) -> bool {
        self.arg_type == ArgType::Dynamic
    }

    pub fn is_multiline(&self) -> bool {
        self.multiline
    }

    /// The owned table of a `Table` or `SpecialTable` argument.
    pub fn table_value(&self) -> Option<&Table> {
        self.table.as_ref()
    }

    pub fn table_value_mut(&mut self) -> Option<&mut Table> {
        self.table.as_mut()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dynamic_arg_keeps_name_as_value() {
        let arg = StepArg::dynamic("user");

        assert!(arg.is_dynamic());
        assert_eq!(arg.name(), "user");
        assert_eq!(arg.value(), "user");
    }

    #[test]
    fn test_table_args_own_their_table() {
        let mut table = Table::new(2);
        table.add_headers(["id"]);
        let arg = StepArg::table(table.clone());
        let mut copy = arg.clone();

        copy.table_value_mut().unwrap().add_row_values(["1"]);

        assert_eq!(arg.table_value().unwrap().row_count(), 0);
        assert_eq!(copy.table_value().unwrap().row_count(), 1);
    }

    #[test]
    fn test_arg_type_display() {
        assert_eq!(ArgType::SpecialTable.to_string(), "special_table");
        assert_eq!(ArgType::Static.to_string(), "static");
    }
}
