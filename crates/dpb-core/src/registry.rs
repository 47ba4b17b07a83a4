//! The static operation registry.
//!
//! Every operation a configuration may name is listed here, in the order
//! `list-operations` shows them.

use std::fmt;

/// Operation family, used to group the registry listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Column,
    Row,
    Frame,
    Quality,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Column,
        Category::Row,
        Category::Frame,
        Category::Quality,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Category::Column => "Column operations",
            Category::Row => "Row operations",
            Category::Frame => "Frame operations",
            Category::Quality => "Quality checks",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A registered operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperationSpec {
    pub name: &'static str,
    pub category: Category,
    pub summary: &'static str,
}

const fn spec(name: &'static str, category: Category, summary: &'static str) -> OperationSpec {
    OperationSpec {
        name,
        category,
        summary,
    }
}

pub static OPERATIONS: &[OperationSpec] = &[
    // Column operations
    spec("rename_columns", Category::Column, "Rename columns from an old-to-new mapping"),
    spec("drop_columns", Category::Column, "Remove the listed columns"),
    spec(
        "concat_and_pad_aas",
        Category::Column,
        "Join residue columns into a '-'-delimited sequence",
    ),
    spec(
        "add_punctuation_staples_and_stitches",
        Category::Column,
        "Mark staple residues with $ and stitch residues with $$",
    ),
    spec(
        "assign_class_labels",
        Category::Column,
        "Binary or binned class labels from numeric thresholds",
    ),
    spec(
        "concatenate_stitches_and_staples",
        Category::Column,
        "Merge cross-linked residues of a marked sequence",
    ),
    spec(
        "concatenate_stitches_and_staples2",
        Category::Column,
        "Merge cross-linked residues of a marked or unmarked sequence",
    ),
    spec(
        "convert_to_pxc50_values",
        Category::Column,
        "Convert M/uM/nM/pM concentrations to pXC50",
    ),
    // Row operations
    spec("drop_duplicates", Category::Row, "Remove duplicate rows"),
    spec("filter_rows", Category::Row, "Keep rows matching a comparison"),
    spec("sort_rows", Category::Row, "Stable sort by one or more columns"),
    spec("sample_rows", Category::Row, "Random sample by count or fraction"),
    spec("shuffle_rows", Category::Row, "Randomly permute all rows"),
    spec("validate_rows", Category::Row, "Keep rows satisfying every condition"),
    spec("remove_empty_rows", Category::Row, "Remove rows with missing values"),
    // Frame operations
    spec(
        "aggregate_dataframe",
        Category::Frame,
        "Group and aggregate into named output columns",
    ),
    spec(
        "aggregate_with_custom_functions",
        Category::Frame,
        "Group and aggregate with aliased aggregators",
    ),
    spec(
        "aggregate_with_column_functions",
        Category::Frame,
        "Group with one aggregator per column and an optional count",
    ),
    spec(
        "apply_pandas_function",
        Category::Frame,
        "Apply head, tail, fillna, dropna or a reducer to the table",
    ),
    spec(
        "apply_numpy_function",
        Category::Frame,
        "Apply a reducer to each column",
    ),
    // Quality checks
    spec("check_row_count", Category::Quality, "Check the number of rows"),
    spec("check_column_count", Category::Quality, "Check the number of columns"),
    spec(
        "check_missing_values",
        Category::Quality,
        "Check the proportion of missing cells",
    ),
    spec("check_data_types", Category::Quality, "Check column data types"),
];

/// Registered operation names, in registry order.
pub fn operation_names() -> Vec<&'static str> {
    OPERATIONS.iter().map(|op| op.name).collect()
}

/// Look up a registered operation by exact name.
pub fn find_operation(name: &str) -> Option<&'static OperationSpec> {
    OPERATIONS.iter().find(|op| op.name == name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    #[test]
    fn names_are_unique() {
        let names: BTreeSet<&str> = operation_names().into_iter().collect();
        assert_eq!(names.len(), OPERATIONS.len());
        assert_eq!(OPERATIONS.len(), 24);
    }

    #[test]
    fn every_category_is_populated() {
        for category in Category::ALL {
            assert!(OPERATIONS.iter().any(|op| op.category == category));
        }
    }

    #[test]
    fn lookup_is_exact() {
        assert!(find_operation("filter_rows").is_some());
        assert!(find_operation("Filter_Rows").is_none());
        assert!(find_operation("aggregate_peptide_data").is_none());
    }
}
