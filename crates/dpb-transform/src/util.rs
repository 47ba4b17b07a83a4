//! Internal helpers shared by the operation modules.

use polars::prelude::{
    AnyValue, BooleanChunked, DataFrame, IdxCa, IdxSize, IntoColumn, NamedFrom, NewChunkedArray,
    Series,
};

use dpb_common::any_to_string;
use dpb_model::{Result, TableError};

/// Fail with [`TableError::UnknownColumn`] unless every name is a column.
pub fn require_columns<S: AsRef<str>>(df: &DataFrame, names: &[S]) -> Result<()> {
    for name in names {
        let name = name.as_ref();
        if df.column(name).is_err() {
            return Err(TableError::UnknownColumn {
                column: name.to_string(),
                available: column_names(df),
            });
        }
    }
    Ok(())
}

/// Owned column names in table order.
pub fn column_names(df: &DataFrame) -> Vec<String> {
    df.get_column_names_str()
        .into_iter()
        .map(str::to_string)
        .collect()
}

/// Row positions as a Polars index array.
pub fn index_array(indices: &[usize]) -> IdxCa {
    IdxCa::from_vec(
        "idx".into(),
        indices.iter().map(|&i| i as IdxSize).collect(),
    )
}

/// Select rows by position, in the given order.
pub fn take_rows(df: &DataFrame, indices: &[usize]) -> Result<DataFrame> {
    Ok(df.take(&index_array(indices))?)
}

/// Keep rows whose mask entry is true.
pub fn filter_mask(df: &DataFrame, mask: &[bool]) -> Result<DataFrame> {
    let mask = BooleanChunked::from_slice("mask".into(), mask);
    Ok(df.filter(&mask)?)
}

/// Returns a copy of the table with `name` added or replaced.
pub fn with_series(df: &DataFrame, series: Series) -> Result<DataFrame> {
    let mut out = df.clone();
    out.with_column(series.into_column())?;
    Ok(out)
}

/// Map every non-null cell of a column through `f` as text, writing the
/// result to `output`. Nulls stay null.
pub fn map_text_column<F>(df: &DataFrame, input: &str, output: &str, f: F) -> Result<DataFrame>
where
    F: Fn(&str) -> String,
{
    require_columns(df, &[input])?;
    let column = df.column(input)?;
    let mut values: Vec<Option<String>> = Vec::with_capacity(df.height());
    for idx in 0..df.height() {
        let value = match column.get(idx)? {
            AnyValue::Null => None,
            other => Some(f(&any_to_string(other))),
        };
        values.push(value);
    }
    with_series(df, Series::new(output.into(), values))
}
