//! Value ordering and row identity.
//!
//! Sorting, grouping and de-duplication all need to compare cells of
//! arbitrary dtype. Nulls sort after every present value regardless of
//! direction.

use std::cmp::Ordering;

use polars::prelude::AnyValue;

use crate::values::{any_to_string, as_number};

/// Hashable identity of a single cell. `None` is the null marker, so all
/// nulls in a column share one identity.
pub type CellKey = Option<String>;

/// Builds the identity of a row from the given cells.
pub fn row_key(values: &[AnyValue<'_>]) -> Vec<CellKey> {
    values
        .iter()
        .map(|value| match value {
            AnyValue::Null => None,
            other => Some(any_to_string(other.clone())),
        })
        .collect()
}

/// Compares two present values.
///
/// Numbers compare numerically, booleans as `false < true`, everything
/// else by its string form.
pub fn compare_non_null(left: &AnyValue<'_>, right: &AnyValue<'_>) -> Ordering {
    if let (Some(a), Some(b)) = (as_number(left), as_number(right)) {
        return a.total_cmp(&b);
    }
    if let (AnyValue::Boolean(a), AnyValue::Boolean(b)) = (left, right) {
        return a.cmp(b);
    }
    any_to_string(left.clone()).cmp(&any_to_string(right.clone()))
}

/// Compares two cells for sorting. Nulls are always placed last.
pub fn compare_cells(left: &AnyValue<'_>, right: &AnyValue<'_>, ascending: bool) -> Ordering {
    match (left, right) {
        (AnyValue::Null, AnyValue::Null) => Ordering::Equal,
        (AnyValue::Null, _) => Ordering::Greater,
        (_, AnyValue::Null) => Ordering::Less,
        _ => {
            let ordering = compare_non_null(left, right);
            if ascending { ordering } else { ordering.reverse() }
        }
    }
}
