//! Column operations: rename, drop, amino-acid concatenation, class labels
//! and potency conversion.

use std::collections::BTreeMap;

use polars::prelude::{AnyValue, DataFrame, NamedFrom, Series};
use serde_json::Value;
use tracing::{debug, warn};

use dpb_common::{any_to_f64, any_to_string};
use dpb_model::{ConcentrationUnit, Result, TableError};

use crate::util::{column_names, require_columns, with_series};

/// Token written for a missing residue when padding.
pub const BLANK_RESIDUE: &str = "blank";

/// Rename columns according to `mapping` (old name to new name).
///
/// Names absent from the table are skipped with a warning. Renames are
/// applied simultaneously, so `{a: b, b: a}` swaps two columns.
pub fn rename_columns(df: &DataFrame, mapping: &BTreeMap<String, String>) -> Result<DataFrame> {
    let current = column_names(df);
    for old in mapping.keys() {
        if !current.contains(old) {
            warn!(column = %old, "rename skipped: column not present");
        }
    }

    let renamed: Vec<String> = current
        .iter()
        .map(|name| mapping.get(name).unwrap_or(name).clone())
        .collect();
    for (idx, name) in renamed.iter().enumerate() {
        if renamed[..idx].contains(name) {
            return Err(TableError::invalid_argument(format!(
                "renaming would produce duplicate column '{name}'"
            )));
        }
    }

    let mut out = df.clone();
    out.set_column_names(renamed.iter().map(String::as_str))?;
    Ok(out)
}

/// Drop the named columns. Every name must exist.
pub fn drop_columns(df: &DataFrame, columns: &[String]) -> Result<DataFrame> {
    require_columns(df, columns)?;
    let keep: Vec<String> = column_names(df)
        .into_iter()
        .filter(|name| !columns.contains(name))
        .collect();
    Ok(df.select(keep)?)
}

fn is_blank(value: &AnyValue<'_>) -> bool {
    match value {
        AnyValue::Null => true,
        AnyValue::String(s) => s.trim().is_empty(),
        AnyValue::StringOwned(s) => s.trim().is_empty(),
        _ => false,
    }
}

/// Join the listed columns row-wise with `-` into `output_column`.
///
/// Missing or blank cells become [`BLANK_RESIDUE`] when `pad` is set and
/// are skipped otherwise, so no empty segments appear.
pub fn concat_and_pad_aas(
    df: &DataFrame,
    columns: &[String],
    output_column: &str,
    pad: bool,
) -> Result<DataFrame> {
    require_columns(df, columns)?;
    debug!(columns = columns.len(), output_column, pad, "concatenating residues");

    let sources = columns
        .iter()
        .map(|name| df.column(name))
        .collect::<std::result::Result<Vec<_>, _>>()?;

    let mut sequences = Vec::with_capacity(df.height());
    for idx in 0..df.height() {
        let mut residues = Vec::with_capacity(sources.len());
        for source in &sources {
            let value = source.get(idx)?;
            if is_blank(&value) {
                if pad {
                    residues.push(BLANK_RESIDUE.to_string());
                }
            } else {
                residues.push(any_to_string(value));
            }
        }
        sequences.push(residues.join("-"));
    }

    with_series(df, Series::new(output_column.into(), sequences))
}

/// Class-label threshold: a single cut-off or a set of bin edges.
#[derive(Debug, Clone, PartialEq)]
pub enum Threshold {
    /// Label is 1 when the value is strictly greater, else 0.
    Binary(f64),
    /// Label is the number of edges strictly below the value.
    Bins(Vec<f64>),
}

impl Threshold {
    /// Interpret a configuration value as a threshold.
    pub fn from_value(value: &Value) -> Result<Self> {
        match value {
            Value::Number(n) => n
                .as_f64()
                .map(Threshold::Binary)
                .ok_or_else(|| TableError::type_error("threshold is not a finite number")),
            Value::Array(items) => {
                let mut edges = items
                    .iter()
                    .map(|item| {
                        item.as_f64().ok_or_else(|| {
                            TableError::type_error(format!(
                                "threshold list must contain numbers, found {item}"
                            ))
                        })
                    })
                    .collect::<Result<Vec<_>>>()?;
                edges.sort_by(f64::total_cmp);
                Ok(Threshold::Bins(edges))
            }
            other => Err(TableError::type_error(format!(
                "threshold must be a number or a list of numbers, found {other}"
            ))),
        }
    }

    fn label(&self, value: Option<f64>) -> Option<i64> {
        match (self, value) {
            (Threshold::Binary(cut), Some(v)) => Some(i64::from(v > *cut)),
            (Threshold::Binary(_), None) => Some(0),
            (Threshold::Bins(_), Some(v)) if v.is_nan() => None,
            (Threshold::Bins(edges), Some(v)) => {
                Some(edges.iter().filter(|edge| v > **edge).count() as i64)
            }
            (Threshold::Bins(_), None) => None,
        }
    }
}

fn numeric_cell(value: AnyValue<'_>, column: &str) -> Result<Option<f64>> {
    if matches!(value, AnyValue::Null) {
        return Ok(None);
    }
    let text = any_to_string(value.clone());
    any_to_f64(value).map(Some).ok_or_else(|| {
        TableError::type_error(format!(
            "column '{column}' contains non-numeric value '{text}'"
        ))
    })
}

/// Label each row of `input_column` against `threshold`.
///
/// Missing inputs get label 0 in binary mode. Missing and NaN inputs stay
/// missing in bin mode.
pub fn assign_class_labels(
    df: &DataFrame,
    input_column: &str,
    threshold: &Threshold,
    output_column: &str,
) -> Result<DataFrame> {
    require_columns(df, &[input_column])?;
    let source = df.column(input_column)?;
    let mut labels: Vec<Option<i64>> = Vec::with_capacity(df.height());
    for idx in 0..df.height() {
        let value = numeric_cell(source.get(idx)?, input_column)?;
        labels.push(threshold.label(value));
    }
    with_series(df, Series::new(output_column.into(), labels))
}

/// Convert concentrations in `unit` to pXC50 (`offset - log10(x)`).
///
/// Non-positive and missing concentrations produce a missing value.
pub fn convert_to_pxc50_values(
    df: &DataFrame,
    input_column: &str,
    unit: &str,
    output_column: &str,
) -> Result<DataFrame> {
    let unit: ConcentrationUnit = unit.parse()?;
    require_columns(df, &[input_column])?;
    let offset = unit.log_offset();
    let source = df.column(input_column)?;
    let mut values: Vec<Option<f64>> = Vec::with_capacity(df.height());
    for idx in 0..df.height() {
        let pxc50 = numeric_cell(source.get(idx)?, input_column)?
            .filter(|x| *x > 0.0)
            .map(|x| offset - x.log10());
        values.push(pxc50);
    }
    with_series(df, Series::new(output_column.into(), values))
}
