//! Whole-table functions selected by name.

use polars::prelude::{AnyValue, DataFrame, IntoColumn, Series};
use serde_json::Value;
use tracing::debug;

use dpb_common::{column_values, is_numeric_dtype};
use dpb_model::{Reducer, Result, TableError};

use super::reducer::reduce;
use crate::rows::remove_empty_rows;
use crate::util::{column_names, require_columns, with_series};

/// Table-shaped functions understood by [`apply_pandas_function`] besides
/// the reducers.
pub const PANDAS_FUNCTIONS: &[&str] = &["head", "tail", "fillna", "fill_null", "dropna"];

const DEFAULT_ROWS: usize = 5;

fn literal_value(value: &Value) -> Result<AnyValue<'static>> {
    match value {
        Value::Bool(b) => Ok(AnyValue::Boolean(*b)),
        Value::Number(n) => n
            .as_i64()
            .map(AnyValue::Int64)
            .or_else(|| n.as_f64().map(AnyValue::Float64))
            .ok_or_else(|| TableError::type_error(format!("unsupported fill value {n}"))),
        Value::String(s) => Ok(AnyValue::StringOwned(s.as_str().into())),
        other => Err(TableError::type_error(format!(
            "fill value must be a scalar, found {other}"
        ))),
    }
}

fn fill_missing(df: &DataFrame, value: &Value, columns: Option<&[String]>) -> Result<DataFrame> {
    let fill = literal_value(value)?;
    let targets = match columns {
        Some(columns) => {
            require_columns(df, columns)?;
            columns.to_vec()
        }
        None => column_names(df),
    };

    let mut out = df.clone();
    for name in &targets {
        let values: Vec<AnyValue<'_>> = column_values(df, name)?
            .into_iter()
            .map(|cell| match cell {
                AnyValue::Null => fill.clone(),
                other => other,
            })
            .collect();
        out = with_series(&out, Series::from_any_values(name.as_str().into(), &values, false)?)?;
    }
    Ok(out)
}

/// Apply `reducer` to each selected column, producing a one-row table.
///
/// Without an explicit selection, numeric reducers only visit numeric
/// columns.
pub fn reduce_columns(
    df: &DataFrame,
    reducer: Reducer,
    columns: Option<&[String]>,
) -> Result<DataFrame> {
    let targets: Vec<String> = match columns {
        Some(columns) => {
            require_columns(df, columns)?;
            columns.to_vec()
        }
        None => df
            .get_columns()
            .iter()
            .filter(|col| !reducer.is_numeric() || is_numeric_dtype(col.dtype()))
            .map(|col| col.name().to_string())
            .collect(),
    };

    let mut reduced = Vec::with_capacity(targets.len());
    for name in &targets {
        let value = reduce(reducer, &column_values(df, name)?)?;
        reduced.push(Series::from_any_values(name.as_str().into(), &[value], false)?.into_column());
    }
    Ok(DataFrame::new(reduced)?)
}

/// Apply a table method by name.
///
/// `head`/`tail` take `n` rows (default 5), `fillna` replaces missing
/// values with `value`, `dropna` removes incomplete rows, and any reducer
/// name collapses the table to one row.
pub fn apply_pandas_function(
    df: &DataFrame,
    function: &str,
    n: Option<usize>,
    value: Option<&Value>,
    columns: Option<&[String]>,
) -> Result<DataFrame> {
    debug!(function, "applying table function");
    match function {
        "head" => Ok(df.head(Some(n.unwrap_or(DEFAULT_ROWS)))),
        "tail" => Ok(df.tail(Some(n.unwrap_or(DEFAULT_ROWS)))),
        "fillna" | "fill_null" => {
            let value = value.ok_or_else(|| {
                TableError::invalid_argument(format!("'{function}' needs a 'value'"))
            })?;
            fill_missing(df, value, columns)
        }
        "dropna" => remove_empty_rows(df, columns),
        other => match other.parse::<Reducer>() {
            Ok(reducer) => reduce_columns(df, reducer, columns),
            Err(_) => Err(TableError::UnknownFunction {
                name: other.to_string(),
                available: PANDAS_FUNCTIONS
                    .iter()
                    .map(|s| (*s).to_string())
                    .chain(Reducer::names())
                    .collect(),
            }),
        },
    }
}

/// Apply an array function by name to each selected column.
pub fn apply_numpy_function(
    df: &DataFrame,
    function: &str,
    columns: Option<&[String]>,
) -> Result<DataFrame> {
    let reducer: Reducer = function.parse()?;
    debug!(function, %reducer, "applying array function");
    reduce_columns(df, reducer, columns)
}
