//! Row operations: filtering, validation, ordering, sampling and
//! de-duplication.

use std::cmp::Ordering;
use std::collections::HashMap;

use polars::prelude::{AnyValue, DataFrame};
use rand::{Rng, SeedableRng};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde_json::Value;
use tracing::debug;

use dpb_common::{CellKey, as_number, column_values, compare_cells, row_key};
use dpb_model::{KeepStrategy, Operator, Result, TableError};

use crate::util::{column_names, filter_mask, require_columns, take_rows};

/// A row condition for [`validate_rows`].
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// The column named by the condition's label equals this literal.
    Equals(Value),
    /// `column operator value`, with the same operators as [`filter_rows`].
    Compare {
        column: String,
        operator: String,
        value: Value,
    },
}

impl Condition {
    /// A `[column, operator, value]` triple is a comparison; anything else is
    /// an equality literal.
    pub fn from_value(value: &Value) -> Self {
        if let Value::Array(items) = value
            && let [Value::String(column), Value::String(operator), literal] = items.as_slice()
        {
            return Condition::Compare {
                column: column.clone(),
                operator: operator.clone(),
                value: literal.clone(),
            };
        }
        Condition::Equals(value.clone())
    }
}

fn cell_str<'a>(cell: &'a AnyValue<'_>) -> Option<&'a str> {
    match cell {
        AnyValue::String(s) => Some(*s),
        AnyValue::StringOwned(s) => Some(s.as_str()),
        _ => None,
    }
}

fn literal_eq(cell: &AnyValue<'_>, literal: &Value) -> bool {
    match literal {
        Value::Null => matches!(cell, AnyValue::Null),
        Value::Bool(b) => matches!(cell, AnyValue::Boolean(v) if v == b),
        Value::Number(n) => match (as_number(cell), n.as_f64()) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        },
        Value::String(s) => cell_str(cell) == Some(s.as_str()),
        Value::Array(_) | Value::Object(_) => false,
    }
}

/// Order of `cell` relative to `literal`; `None` when the cell is missing.
fn literal_cmp(cell: &AnyValue<'_>, literal: &Value, column: &str) -> Result<Option<Ordering>> {
    if matches!(cell, AnyValue::Null) {
        return Ok(None);
    }
    let ordering = match literal {
        Value::Number(n) => as_number(cell)
            .zip(n.as_f64())
            .map(|(a, b)| a.total_cmp(&b)),
        Value::String(s) => cell_str(cell).map(|c| c.cmp(s.as_str())),
        Value::Bool(b) => match cell {
            AnyValue::Boolean(v) => Some(v.cmp(b)),
            _ => None,
        },
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    };
    ordering.map(Some).ok_or_else(|| {
        TableError::type_error(format!(
            "cannot order values of column '{column}' against {literal}"
        ))
    })
}

fn matches_literal(
    cell: &AnyValue<'_>,
    operator: Operator,
    literal: &Value,
    column: &str,
) -> Result<bool> {
    let is_ordered = |wanted: &[Ordering]| -> Result<bool> {
        Ok(literal_cmp(cell, literal, column)?.is_some_and(|o| wanted.contains(&o)))
    };
    match operator {
        Operator::Eq => Ok(literal_eq(cell, literal)),
        Operator::Ne => Ok(!literal_eq(cell, literal)),
        Operator::Gt => is_ordered(&[Ordering::Greater]),
        Operator::Lt => is_ordered(&[Ordering::Less]),
        Operator::Ge => is_ordered(&[Ordering::Greater, Ordering::Equal]),
        Operator::Le => is_ordered(&[Ordering::Less, Ordering::Equal]),
        Operator::In | Operator::NotIn => {
            let members = literal.as_array().map_or(&[][..], Vec::as_slice);
            let found = members.iter().any(|member| literal_eq(cell, member));
            Ok(found == (operator == Operator::In))
        }
    }
}

fn predicate_mask(
    df: &DataFrame,
    column: &str,
    operator: Operator,
    literal: &Value,
) -> Result<Vec<bool>> {
    if operator.is_membership() && !literal.is_array() {
        return Err(TableError::type_error(format!(
            "operator '{operator}' needs a list of values, found {literal}"
        )));
    }
    column_values(df, column)?
        .iter()
        .map(|cell| matches_literal(cell, operator, literal, column))
        .collect()
}

/// Keep rows where `column operator value` holds. Row order is preserved.
pub fn filter_rows(df: &DataFrame, column: &str, operator: &str, value: &Value) -> Result<DataFrame> {
    require_columns(df, &[column])?;
    let operator: Operator = operator.parse()?;
    debug!(column, %operator, %value, "filtering rows");
    let mask = predicate_mask(df, column, operator, value)?;
    filter_mask(df, &mask)
}

/// Keep rows satisfying every condition.
///
/// Each entry is `(label, condition)`; for [`Condition::Equals`] the label
/// names the column to test.
pub fn validate_rows(df: &DataFrame, conditions: &[(String, Condition)]) -> Result<DataFrame> {
    let mut resolved = Vec::with_capacity(conditions.len());
    for (label, condition) in conditions {
        let (column, operator, literal) = match condition {
            Condition::Equals(literal) => (label.as_str(), Operator::Eq, literal),
            Condition::Compare {
                column,
                operator,
                value,
            } => (column.as_str(), operator.parse()?, value),
        };
        require_columns(df, &[column])?;
        resolved.push((column, operator, literal));
    }

    let mut mask = vec![true; df.height()];
    for (column, operator, literal) in resolved {
        let hits = predicate_mask(df, column, operator, literal)?;
        for (keep, hit) in mask.iter_mut().zip(hits) {
            *keep &= hit;
        }
    }
    filter_mask(df, &mask)
}

/// Stable sort by one or more columns.
///
/// `ascending` holds one flag applied to every key, or one flag per key.
/// Missing values sort last in either direction.
pub fn sort_rows(df: &DataFrame, by: &[String], ascending: &[bool]) -> Result<DataFrame> {
    if by.is_empty() {
        return Err(TableError::invalid_argument("sort needs at least one column"));
    }
    require_columns(df, by)?;
    let directions: Vec<bool> = match ascending.len() {
        0 => vec![true; by.len()],
        1 => vec![ascending[0]; by.len()],
        n if n == by.len() => ascending.to_vec(),
        n => {
            return Err(TableError::invalid_argument(format!(
                "ascending has {n} flags for {} sort columns",
                by.len()
            )));
        }
    };

    let keys = by
        .iter()
        .map(|name| column_values(df, name))
        .collect::<std::result::Result<Vec<_>, _>>()?;

    let mut order: Vec<usize> = (0..df.height()).collect();
    order.sort_by(|&a, &b| {
        keys.iter()
            .zip(&directions)
            .map(|(values, asc)| compare_cells(&values[a], &values[b], *asc))
            .find(|o| o.is_ne())
            .unwrap_or(Ordering::Equal)
    });
    take_rows(df, &order)
}

fn make_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

/// Draw a random subset of rows.
///
/// Exactly one of `n` and `frac` must be given. Without `replace` the
/// sample cannot be larger than the table.
pub fn sample_rows(
    df: &DataFrame,
    n: Option<usize>,
    frac: Option<f64>,
    seed: Option<u64>,
    replace: bool,
) -> Result<DataFrame> {
    let height = df.height();
    let count = match (n, frac) {
        (Some(n), None) => n,
        (None, Some(frac)) if frac.is_finite() && frac >= 0.0 => {
            (frac * height as f64).round() as usize
        }
        (None, Some(frac)) => {
            return Err(TableError::invalid_argument(format!(
                "frac must be a non-negative number, got {frac}"
            )));
        }
        _ => {
            return Err(TableError::invalid_argument(
                "exactly one of 'n' or 'frac' must be given",
            ));
        }
    };

    if count > height && !replace {
        return Err(TableError::invalid_argument(format!(
            "cannot take {count} rows from {height} without replacement"
        )));
    }
    if height == 0 && count > 0 {
        return Err(TableError::invalid_argument("cannot sample from an empty table"));
    }

    debug!(count, replace, seeded = seed.is_some(), "sampling rows");
    let mut rng = make_rng(seed);
    let indices: Vec<usize> = if replace {
        (0..count).map(|_| rng.gen_range(0..height)).collect()
    } else {
        rand::seq::index::sample(&mut rng, height, count).into_vec()
    };
    take_rows(df, &indices)
}

/// Randomly permute all rows.
pub fn shuffle_rows(df: &DataFrame, seed: Option<u64>) -> Result<DataFrame> {
    let mut order: Vec<usize> = (0..df.height()).collect();
    order.shuffle(&mut make_rng(seed));
    take_rows(df, &order)
}

fn subset_columns(df: &DataFrame, subset: Option<&[String]>) -> Result<Vec<String>> {
    match subset {
        Some(columns) => {
            require_columns(df, columns)?;
            Ok(columns.to_vec())
        }
        None => Ok(column_names(df)),
    }
}

fn row_keys(df: &DataFrame, columns: &[String]) -> Result<Vec<Vec<CellKey>>> {
    let values = columns
        .iter()
        .map(|name| column_values(df, name))
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok((0..df.height())
        .map(|row| {
            let cells: Vec<AnyValue<'_>> = values.iter().map(|col| col[row].clone()).collect();
            row_key(&cells)
        })
        .collect())
}

/// Remove rows that repeat an earlier (or later) row on `subset`.
///
/// `keep` is `first`, `last` or `none`; `none` drops every member of a
/// duplicated group. Surviving rows keep their original order.
pub fn drop_duplicates(df: &DataFrame, subset: Option<&[String]>, keep: &str) -> Result<DataFrame> {
    let keep: KeepStrategy = keep.parse()?;
    let columns = subset_columns(df, subset)?;
    let keys = row_keys(df, &columns)?;

    // (occurrences, first row, last row) per key
    let mut seen: HashMap<&Vec<CellKey>, (usize, usize, usize)> = HashMap::new();
    for (row, key) in keys.iter().enumerate() {
        seen.entry(key)
            .and_modify(|entry| {
                entry.0 += 1;
                entry.2 = row;
            })
            .or_insert((1, row, row));
    }

    let mask: Vec<bool> = keys
        .iter()
        .enumerate()
        .map(|(row, key)| {
            let (count, first, last) = seen[key];
            match keep {
                KeepStrategy::First => row == first,
                KeepStrategy::Last => row == last,
                KeepStrategy::None => count == 1,
            }
        })
        .collect();
    debug!(
        removed = mask.iter().filter(|keep| !**keep).count(),
        "dropping duplicates"
    );
    filter_mask(df, &mask)
}

/// Remove rows with a missing value in any `subset` column (all columns when
/// `subset` is omitted). Empty strings are not missing.
pub fn remove_empty_rows(df: &DataFrame, subset: Option<&[String]>) -> Result<DataFrame> {
    let columns = subset_columns(df, subset)?;
    let mut mask = vec![true; df.height()];
    for name in &columns {
        for (keep, cell) in mask.iter_mut().zip(column_values(df, name)?) {
            *keep &= !matches!(cell, AnyValue::Null);
        }
    }
    filter_mask(df, &mask)
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::df;
    use serde_json::json;

    fn ints(df: &DataFrame, column: &str) -> Vec<Option<i32>> {
        df.column(column)
            .unwrap()
            .i32()
            .unwrap()
            .into_iter()
            .collect()
    }

    fn strings(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn filter_greater_than_keeps_order() {
        let df = df! { "a" => [1, 5, 2, 8] }.unwrap();
        let out = filter_rows(&df, "a", ">", &json!(3)).unwrap();
        assert_eq!(ints(&out, "a"), vec![Some(5), Some(8)]);
    }

    #[test]
    fn filter_membership() {
        let df = df! { "aa" => ["S5", "A", "R8", "L"] }.unwrap();
        let out = filter_rows(&df, "aa", "in", &json!(["S5", "R8"])).unwrap();
        assert_eq!(out.height(), 2);
        let out = filter_rows(&df, "aa", "not_in", &json!(["S5", "R8"])).unwrap();
        assert_eq!(out.height(), 2);

        let err = filter_rows(&df, "aa", "in", &json!("S5")).unwrap_err();
        assert!(matches!(err, TableError::Type { .. }));
    }

    #[test]
    fn membership_operand_is_checked_on_empty_tables() {
        let df = df! { "aa" => Vec::<&str>::new() }.unwrap();
        let err = filter_rows(&df, "aa", "not_in", &json!(5)).unwrap_err();
        assert!(matches!(err, TableError::Type { .. }));
    }

    #[test]
    fn filter_not_equal_keeps_nulls() {
        let df = df! { "a" => [Some(1), None, Some(2)] }.unwrap();
        let out = filter_rows(&df, "a", "!=", &json!(1)).unwrap();
        assert_eq!(ints(&out, "a"), vec![None, Some(2)]);
        let out = filter_rows(&df, "a", ">=", &json!(1)).unwrap();
        assert_eq!(ints(&out, "a"), vec![Some(1), Some(2)]);
    }

    #[test]
    fn filter_errors() {
        let df = df! { "a" => [1] }.unwrap();
        assert!(matches!(
            filter_rows(&df, "b", ">", &json!(1)).unwrap_err(),
            TableError::UnknownColumn { .. }
        ));
        assert!(matches!(
            filter_rows(&df, "a", "~=", &json!(1)).unwrap_err(),
            TableError::UnsupportedOperator { .. }
        ));
        assert!(matches!(
            filter_rows(&df, "a", ">", &json!("x")).unwrap_err(),
            TableError::Type { .. }
        ));
    }

    #[test]
    fn validate_combines_conditions() {
        let df = df! {
            "assay" => ["A", "A", "B", "A"],
            "value" => [1.0, 7.0, 9.0, 3.0],
        }
        .unwrap();
        let conditions = vec![
            ("assay".to_string(), Condition::from_value(&json!("A"))),
            (
                "potent".to_string(),
                Condition::from_value(&json!(["value", ">", 2])),
            ),
        ];
        let out = validate_rows(&df, &conditions).unwrap();
        let values: Vec<Option<f64>> = out.column("value").unwrap().f64().unwrap().into_iter().collect();
        assert_eq!(values, vec![Some(7.0), Some(3.0)]);
    }

    #[test]
    fn validate_checks_operator() {
        let df = df! { "a" => [1] }.unwrap();
        let conditions = vec![("c".to_string(), Condition::from_value(&json!(["a", "<>", 1])))];
        assert!(matches!(
            validate_rows(&df, &conditions).unwrap_err(),
            TableError::UnsupportedOperator { .. }
        ));
    }

    #[test]
    fn condition_shapes() {
        assert_eq!(Condition::from_value(&json!(3)), Condition::Equals(json!(3)));
        assert_eq!(
            Condition::from_value(&json!(["a", "b"])),
            Condition::Equals(json!(["a", "b"]))
        );
        assert!(matches!(
            Condition::from_value(&json!(["a", "==", null])),
            Condition::Compare { .. }
        ));
    }

    #[test]
    fn sort_multiple_keys() {
        let df = df! {
            "g" => ["b", "a", "b", "a"],
            "v" => [1, 2, 3, 4],
        }
        .unwrap();
        let out = sort_rows(&df, &strings(&["g", "v"]), &[true, false]).unwrap();
        assert_eq!(ints(&out, "v"), vec![Some(4), Some(2), Some(3), Some(1)]);

        let err = sort_rows(&df, &strings(&["g", "v"]), &[true, false, true]).unwrap_err();
        assert!(matches!(err, TableError::InvalidArgument { .. }));
    }

    #[test]
    fn sort_places_nulls_last() {
        let df = df! { "v" => [None, Some(2), Some(1)] }.unwrap();
        let out = sort_rows(&df, &strings(&["v"]), &[false]).unwrap();
        assert_eq!(ints(&out, "v"), vec![Some(2), Some(1), None]);
    }

    #[test]
    fn sample_argument_rules() {
        let df = df! { "v" => [1, 2, 3] }.unwrap();
        for (n, frac) in [(Some(1), Some(0.5)), (None, None)] {
            assert!(matches!(
                sample_rows(&df, n, frac, Some(1), false).unwrap_err(),
                TableError::InvalidArgument { .. }
            ));
        }
        assert!(sample_rows(&df, Some(4), None, Some(1), false).is_err());
        assert_eq!(sample_rows(&df, Some(6), None, Some(1), true).unwrap().height(), 6);
        assert_eq!(sample_rows(&df, None, Some(0.67), Some(1), false).unwrap().height(), 2);
    }

    #[test]
    fn sample_is_reproducible_with_seed() {
        let values: Vec<i32> = (0..50).collect();
        let df = df! { "v" => values }.unwrap();
        let a = sample_rows(&df, Some(10), None, Some(42), false).unwrap();
        let b = sample_rows(&df, Some(10), None, Some(42), false).unwrap();
        let c = sample_rows(&df, Some(10), None, Some(7), false).unwrap();
        assert!(a.equals(&b));
        assert!(!a.equals(&c));
    }

    #[test]
    fn shuffle_is_a_permutation() {
        let values: Vec<i32> = (0..20).collect();
        let df = df! { "v" => values }.unwrap();
        let out = shuffle_rows(&df, Some(3)).unwrap();
        let mut seen: Vec<i32> = ints(&out, "v").into_iter().flatten().collect();
        seen.sort_unstable();
        assert_eq!(seen, (0..20).collect::<Vec<_>>());
        assert!(out.equals(&shuffle_rows(&df, Some(3)).unwrap()));
    }

    #[test]
    fn drop_duplicates_keep_modes() {
        let df = df! {
            "k" => ["a", "b", "a", "c", "b"],
            "v" => [1, 2, 3, 4, 5],
        }
        .unwrap();
        let subset = strings(&["k"]);
        let first = drop_duplicates(&df, Some(&subset), "first").unwrap();
        assert_eq!(ints(&first, "v"), vec![Some(1), Some(2), Some(4)]);
        let last = drop_duplicates(&df, Some(&subset), "last").unwrap();
        assert_eq!(ints(&last, "v"), vec![Some(3), Some(4), Some(5)]);
        let none = drop_duplicates(&df, Some(&subset), "none").unwrap();
        assert_eq!(ints(&none, "v"), vec![Some(4)]);
        let all = drop_duplicates(&df, None, "first").unwrap();
        assert_eq!(all.height(), 5);

        assert!(matches!(
            drop_duplicates(&df, Some(&subset), "middle").unwrap_err(),
            TableError::InvalidArgument { .. }
        ));
    }

    #[test]
    fn remove_empty_rows_only_drops_nulls() {
        let df = df! {
            "a" => [Some("x"), None, Some("")],
            "b" => [Some(1), Some(2), None],
        }
        .unwrap();
        assert_eq!(remove_empty_rows(&df, None).unwrap().height(), 1);
        let subset = strings(&["a"]);
        assert_eq!(remove_empty_rows(&df, Some(&subset)).unwrap().height(), 2);
    }
}
