//! Group-by aggregation.
//!
//! Rows are grouped on the string identity of their key cells, groups are
//! emitted in ascending key order, and each aggregation yields one value
//! per group.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::fmt;
use std::sync::Arc;

use polars::prelude::{AnyValue, DataFrame, IntoColumn, NamedFrom, PolarsResult, Series};
use tracing::debug;

use dpb_common::{CellKey, column_values, compare_cells, row_key};
use dpb_model::{Reducer, Result, TableError};

use super::reducer::reduce;
use crate::util::{index_array, require_columns, take_rows};

/// A caller-supplied aggregation over one group's values.
pub type CustomAggregator =
    Arc<dyn Fn(&Series) -> PolarsResult<AnyValue<'static>> + Send + Sync>;

#[derive(Clone)]
enum Aggregator {
    Builtin(Reducer),
    Custom(CustomAggregator),
}

/// Named aggregators consulted before the built-in reducers.
#[derive(Clone, Default)]
pub struct CustomFunctions {
    functions: HashMap<String, Aggregator>,
}

impl CustomFunctions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a closure under `name`.
    pub fn insert<F>(&mut self, name: impl Into<String>, function: F)
    where
        F: Fn(&Series) -> PolarsResult<AnyValue<'static>> + Send + Sync + 'static,
    {
        self.functions
            .insert(name.into(), Aggregator::Custom(Arc::new(function)));
    }

    /// Register `name` as another spelling of a built-in reducer.
    pub fn alias(&mut self, name: impl Into<String>, reducer: Reducer) {
        self.functions
            .insert(name.into(), Aggregator::Builtin(reducer));
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.functions.keys().cloned().collect();
        names.sort();
        names
    }

    fn resolve(&self, name: &str) -> Result<Aggregator> {
        if let Some(found) = self.functions.get(name) {
            return Ok(found.clone());
        }
        name.parse::<Reducer>()
            .map(Aggregator::Builtin)
            .map_err(|_| TableError::UnknownFunction {
                name: name.to_string(),
                available: self.names().into_iter().chain(Reducer::names()).collect(),
            })
    }
}

impl fmt::Debug for CustomFunctions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustomFunctions")
            .field("names", &self.names())
            .finish()
    }
}

/// One output column of a grouped aggregation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedAggregation {
    /// Column the values are read from.
    pub source: String,
    /// Name of the produced column.
    pub output: String,
    /// Custom function name or built-in reducer name.
    pub aggregator: String,
}

impl NamedAggregation {
    pub fn new(
        source: impl Into<String>,
        output: impl Into<String>,
        aggregator: impl Into<String>,
    ) -> Self {
        Self {
            source: source.into(),
            output: output.into(),
            aggregator: aggregator.into(),
        }
    }
}

/// Row indices of each group, ordered by key.
fn group_rows(df: &DataFrame, keys: &[String], drop_null_keys: bool) -> Result<Vec<Vec<usize>>> {
    let key_values = keys
        .iter()
        .map(|name| column_values(df, name))
        .collect::<std::result::Result<Vec<_>, _>>()?;

    let mut positions: HashMap<Vec<CellKey>, usize> = HashMap::new();
    let mut groups: Vec<Vec<usize>> = Vec::new();
    for row in 0..df.height() {
        let cells: Vec<AnyValue<'_>> = key_values.iter().map(|col| col[row].clone()).collect();
        if drop_null_keys && cells.iter().any(|cell| matches!(cell, AnyValue::Null)) {
            continue;
        }
        match positions.entry(row_key(&cells)) {
            Entry::Occupied(entry) => groups[*entry.get()].push(row),
            Entry::Vacant(entry) => {
                entry.insert(groups.len());
                groups.push(vec![row]);
            }
        }
    }

    groups.sort_by(|a, b| {
        key_values
            .iter()
            .map(|col| compare_cells(&col[a[0]], &col[b[0]], true))
            .find(|o| o.is_ne())
            .unwrap_or(Ordering::Equal)
    });
    Ok(groups)
}

fn aggregate(
    df: &DataFrame,
    groupby: &[String],
    aggregations: &[(&str, &str, Aggregator)],
    drop_null_keys: bool,
    count_column: Option<&str>,
) -> Result<DataFrame> {
    if groupby.is_empty() {
        return Err(TableError::invalid_argument(
            "aggregation needs at least one group-by column",
        ));
    }
    require_columns(df, groupby)?;
    let sources: Vec<&str> = aggregations.iter().map(|(source, _, _)| *source).collect();
    require_columns(df, &sources)?;

    let groups = group_rows(df, groupby, drop_null_keys)?;
    debug!(groups = groups.len(), aggregations = aggregations.len(), "aggregating");

    let leaders: Vec<usize> = groups.iter().map(|rows| rows[0]).collect();
    let mut columns = take_rows(&df.select(groupby.iter().cloned())?, &leaders)?.take_columns();

    for (source, output, aggregator) in aggregations {
        let column = df.column(source)?;
        let mut values = Vec::with_capacity(groups.len());
        for rows in &groups {
            let value = match aggregator {
                Aggregator::Builtin(reducer) => {
                    let cells = rows
                        .iter()
                        .map(|&row| column.get(row))
                        .collect::<PolarsResult<Vec<_>>>()?;
                    reduce(*reducer, &cells)?
                }
                Aggregator::Custom(function) => {
                    let group = column.as_materialized_series().take(&index_array(rows))?;
                    function(&group)?
                }
            };
            values.push(value);
        }
        columns.push(Series::from_any_values((*output).into(), &values, false)?.into_column());
    }

    if let Some(name) = count_column {
        let counts: Vec<i64> = groups.iter().map(|rows| rows.len() as i64).collect();
        columns.push(Series::new(name.into(), counts).into_column());
    }
    Ok(DataFrame::new(columns)?)
}

/// Group by `groupby` and compute each named aggregation with built-in
/// reducers. Rows whose key contains a missing value are dropped.
pub fn aggregate_dataframe(
    df: &DataFrame,
    groupby: &[String],
    aggregations: &[NamedAggregation],
) -> Result<DataFrame> {
    aggregate_with_custom_functions(df, groupby, aggregations, &CustomFunctions::default())
}

/// Like [`aggregate_dataframe`], resolving aggregator names against
/// `custom` before the built-in reducers.
pub fn aggregate_with_custom_functions(
    df: &DataFrame,
    groupby: &[String],
    aggregations: &[NamedAggregation],
    custom: &CustomFunctions,
) -> Result<DataFrame> {
    let resolved = aggregations
        .iter()
        .map(|agg| {
            Ok((
                agg.source.as_str(),
                agg.output.as_str(),
                custom.resolve(&agg.aggregator)?,
            ))
        })
        .collect::<Result<Vec<_>>>()?;
    aggregate(df, groupby, &resolved, true, None)
}

/// Group by `groupby`, applying one aggregator per source column and keeping
/// the source column names. Missing keys form their own group.
pub fn aggregate_with_column_functions(
    df: &DataFrame,
    groupby: &[String],
    column_functions: &[(String, String)],
    add_count_column: bool,
    count_column_name: &str,
) -> Result<DataFrame> {
    let builtins = CustomFunctions::default();
    let resolved = column_functions
        .iter()
        .map(|(column, function)| {
            Ok((column.as_str(), column.as_str(), builtins.resolve(function)?))
        })
        .collect::<Result<Vec<_>>>()?;
    let count_column = add_count_column.then_some(count_column_name);
    aggregate(df, groupby, &resolved, false, count_column)
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::{ChunkAgg, df};

    fn keys(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn named_outputs_and_sorted_groups() {
        let df = df! {
            "peptide" => ["b", "a", "b", "a", "a"],
            "pic50" => [6.0, 7.0, 8.0, 5.0, 6.0],
        }
        .unwrap();
        let out = aggregate_dataframe(
            &df,
            &keys(&["peptide"]),
            &[
                NamedAggregation::new("pic50", "pic50_mean", "mean"),
                NamedAggregation::new("pic50", "n", "count"),
            ],
        )
        .unwrap();
        assert_eq!(out.get_column_names_str(), vec!["peptide", "pic50_mean", "n"]);
        assert_eq!(out.column("peptide").unwrap().get(0).unwrap(), AnyValue::String("a"));
        assert_eq!(out.column("pic50_mean").unwrap().get(0).unwrap(), AnyValue::Float64(6.0));
        assert_eq!(out.column("pic50_mean").unwrap().get(1).unwrap(), AnyValue::Float64(7.0));
        assert_eq!(out.column("n").unwrap().get(0).unwrap(), AnyValue::Int64(3));
    }

    #[test]
    fn null_keys_dropped_by_default() {
        let df = df! {
            "k" => [Some("a"), None, Some("a")],
            "v" => [1, 2, 3],
        }
        .unwrap();
        let out = aggregate_dataframe(&df, &keys(&["k"]), &[NamedAggregation::new("v", "total", "sum")])
            .unwrap();
        assert_eq!(out.height(), 1);
        assert_eq!(out.column("total").unwrap().get(0).unwrap(), AnyValue::Int64(4));
    }

    #[test]
    fn custom_functions_take_precedence() {
        let df = df! {
            "k" => ["a", "a", "b"],
            "v" => [1.0, 3.0, 10.0],
        }
        .unwrap();
        let mut custom = CustomFunctions::new();
        custom.insert("range", |series: &Series| {
            let ca = series.f64()?;
            let span = ca.max().unwrap_or(0.0) - ca.min().unwrap_or(0.0);
            Ok(AnyValue::Float64(span))
        });
        custom.alias("mean", Reducer::Max);
        let out = aggregate_with_custom_functions(
            &df,
            &keys(&["k"]),
            &[
                NamedAggregation::new("v", "spread", "range"),
                NamedAggregation::new("v", "top", "mean"),
            ],
            &custom,
        )
        .unwrap();
        assert_eq!(out.column("spread").unwrap().get(0).unwrap(), AnyValue::Float64(2.0));
        assert_eq!(out.column("top").unwrap().get(0).unwrap(), AnyValue::Float64(3.0));
        assert_eq!(out.column("spread").unwrap().get(1).unwrap(), AnyValue::Float64(0.0));
    }

    #[test]
    fn unknown_aggregator_lists_choices() {
        let df = df! { "k" => ["a"], "v" => [1] }.unwrap();
        let err = aggregate_dataframe(&df, &keys(&["k"]), &[NamedAggregation::new("v", "x", "mode")])
            .unwrap_err();
        match err {
            TableError::UnknownFunction { name, available } => {
                assert_eq!(name, "mode");
                assert!(available.contains(&"set_join".to_string()));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn column_functions_keep_null_group_and_count() {
        let df = df! {
            "series" => [Some("x"), None, Some("x"), None],
            "staple" => ["S5", "R8", "R8", "R8"],
            "pic50" => [6.0, 7.0, 8.0, 9.0],
        }
        .unwrap();
        let out = aggregate_with_column_functions(
            &df,
            &keys(&["series"]),
            &[
                ("staple".to_string(), "set_join".to_string()),
                ("pic50".to_string(), "max".to_string()),
            ],
            true,
            "n_rows",
        )
        .unwrap();
        assert_eq!(out.get_column_names_str(), vec!["series", "staple", "pic50", "n_rows"]);
        assert_eq!(out.height(), 2);
        assert_eq!(out.column("series").unwrap().get(1).unwrap(), AnyValue::Null);
        assert_eq!(out.column("staple").unwrap().get(0).unwrap(), AnyValue::String("R8, S5"));
        assert_eq!(out.column("pic50").unwrap().get(1).unwrap(), AnyValue::Float64(9.0));
        assert_eq!(out.column("n_rows").unwrap().get(1).unwrap(), AnyValue::Int64(2));
    }

    #[test]
    fn missing_groupby_column() {
        let df = df! { "k" => ["a"] }.unwrap();
        let err = aggregate_dataframe(&df, &keys(&["nope"]), &[]).unwrap_err();
        assert!(matches!(err, TableError::UnknownColumn { .. }));
    }
}
