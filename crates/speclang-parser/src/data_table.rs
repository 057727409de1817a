//! Expansion of a data-driven specification into one copy per row.

use log::debug;

use speclang_core::spec::Specification;

/// Splits `spec` into one specification per data-table row. Each copy
/// carries a data table holding only its row and the rest of the document
/// unchanged, teardown steps included.
///
/// A specification without a data table, or with a table that has no rows,
/// is returned as the single element.
pub fn data_table_specs(spec: &Specification) -> Vec<Specification> {
    let rows = spec.data_table().map_or(0, |data| data.table().row_count());
    if rows == 0 {
        return vec![spec.clone()];
    }

    debug!(file = spec.file_name(), rows; "Expanding data table");
    (0..rows)
        .filter_map(|index| {
            let mut copy = spec.clone();
            let data = copy.data_table_mut()?;
            let single = data.table().with_single_row(index).ok()?;
            *data.table_mut() = single;
            Some(copy)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use speclang_core::{
        spec::{DataTable, Heading, HeadingKind, Item, TearDown},
        step::Step,
        table::Table,
    };

    use super::*;

    fn spec_with_rows(rows: &[&str]) -> Specification {
        let mut table = Table::new(2);
        table.add_headers(["user"]);
        for row in rows {
            table.add_row_values([*row]);
        }
        let mut spec = Specification::new("users.spec");
        spec.set_heading(Heading::new("Users", 1, HeadingKind::Spec));
        spec.add_item(Item::DataTable(DataTable::inline(table)));
        spec
    }

    #[test]
    fn test_one_spec_per_row() {
        let specs = data_table_specs(&spec_with_rows(&["alice", "bob", "carol"]));

        assert_eq!(specs.len(), 3);
        let users: Vec<_> = specs
            .iter()
            .map(|spec| {
                let table = spec.data_table().unwrap().table();
                assert_eq!(table.row_count(), 1);
                table.get("user").unwrap()[0].value().to_string()
            })
            .collect();
        assert_eq!(users, vec!["alice", "bob", "carol"]);
    }

    #[test]
    fn test_header_only_table() {
        let spec = spec_with_rows(&[]);

        assert_eq!(data_table_specs(&spec), vec![spec]);
    }

    #[test]
    fn test_without_data_table() {
        let spec = Specification::new("plain.spec");

        assert_eq!(data_table_specs(&spec), vec![spec]);
    }

    #[test]
    fn test_copies_keep_teardown_steps() {
        let mut spec = spec_with_rows(&["alice", "bob"]);
        spec.add_item(Item::TearDown(TearDown::new("___", 4)));
        spec.add_item(Item::Step(Step::new(5, "log out", "log out", Vec::new())));

        let specs = data_table_specs(&spec);

        assert_eq!(specs.len(), 2);
        for copy in &specs {
            let teardown: Vec<_> = copy.teardown_steps().map(Step::value).collect();
            assert_eq!(teardown, vec!["log out"]);
        }
    }
}
