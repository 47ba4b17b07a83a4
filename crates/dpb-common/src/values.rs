//! Polars `AnyValue` utility functions.
//!
//! This module provides helper functions for working with Polars `AnyValue` types,
//! including string conversions and numeric coercion.

use polars::prelude::{AnyValue, DataFrame, DataType, PolarsResult};

/// Converts a Polars `AnyValue` to a `String` representation.
///
/// Returns an empty string for `Null`, formats numeric types without
/// unnecessary trailing zeros.
///
/// # Examples
///
/// ```
/// use polars::prelude::AnyValue;
/// use dpb_common::any_to_string;
///
/// assert_eq!(any_to_string(AnyValue::Null), "");
/// assert_eq!(any_to_string(AnyValue::Int32(42)), "42");
/// assert_eq!(any_to_string(AnyValue::String("S5")), "S5");
/// ```
pub fn any_to_string(value: AnyValue<'_>) -> String {
    match value {
        AnyValue::Null => String::new(),
        AnyValue::Int8(v) => v.to_string(),
        AnyValue::Int16(v) => v.to_string(),
        AnyValue::Int32(v) => v.to_string(),
        AnyValue::Int64(v) => v.to_string(),
        AnyValue::UInt8(v) => v.to_string(),
        AnyValue::UInt16(v) => v.to_string(),
        AnyValue::UInt32(v) => v.to_string(),
        AnyValue::UInt64(v) => v.to_string(),
        AnyValue::Float32(v) => format_numeric(f64::from(v)),
        AnyValue::Float64(v) => format_numeric(v),
        AnyValue::String(s) => s.to_string(),
        AnyValue::StringOwned(s) => s.to_string(),
        AnyValue::Boolean(b) => b.to_string(),
        other => other.to_string(),
    }
}

/// Detaches a value from the column it was read from.
///
/// Strings are copied; other variants without borrowed data are kept as is,
/// anything else is rendered to its string form.
pub fn owned_value(value: AnyValue<'_>) -> AnyValue<'static> {
    match value {
        AnyValue::Null => AnyValue::Null,
        AnyValue::Boolean(v) => AnyValue::Boolean(v),
        AnyValue::Int8(v) => AnyValue::Int8(v),
        AnyValue::Int16(v) => AnyValue::Int16(v),
        AnyValue::Int32(v) => AnyValue::Int32(v),
        AnyValue::Int64(v) => AnyValue::Int64(v),
        AnyValue::UInt8(v) => AnyValue::UInt8(v),
        AnyValue::UInt16(v) => AnyValue::UInt16(v),
        AnyValue::UInt32(v) => AnyValue::UInt32(v),
        AnyValue::UInt64(v) => AnyValue::UInt64(v),
        AnyValue::Float32(v) => AnyValue::Float32(v),
        AnyValue::Float64(v) => AnyValue::Float64(v),
        AnyValue::String(s) => AnyValue::StringOwned(s.into()),
        AnyValue::StringOwned(s) => AnyValue::StringOwned(s),
        other => AnyValue::StringOwned(other.to_string().into()),
    }
}

/// Formats a floating-point number as a string without trailing zeros.
///
/// # Examples
///
/// ```
/// use dpb_common::format_numeric;
///
/// assert_eq!(format_numeric(1.0), "1");
/// assert_eq!(format_numeric(1.50), "1.5");
/// assert_eq!(format_numeric(10.0), "10");
/// ```
pub fn format_numeric(v: f64) -> String {
    let s = format!("{v}");
    if !s.contains('.') {
        return s;
    }
    let trimmed = s.trim_end_matches('0').trim_end_matches('.');
    if trimmed.is_empty() || trimmed == "-" {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Converts an `AnyValue` to `f64`, returning `None` for non-numeric or null values.
///
/// Handles integer types, floating-point types, and string parsing.
pub fn any_to_f64(value: AnyValue<'_>) -> Option<f64> {
    match value {
        AnyValue::String(s) => parse_f64(s),
        AnyValue::StringOwned(s) => parse_f64(&s),
        other => as_number(&other),
    }
}

/// Returns the numeric value of a numeric `AnyValue`, without parsing strings.
#[allow(clippy::cast_precision_loss)]
pub fn as_number(value: &AnyValue<'_>) -> Option<f64> {
    match *value {
        AnyValue::Int8(v) => Some(f64::from(v)),
        AnyValue::Int16(v) => Some(f64::from(v)),
        AnyValue::Int32(v) => Some(f64::from(v)),
        AnyValue::Int64(v) => Some(v as f64),
        AnyValue::UInt8(v) => Some(f64::from(v)),
        AnyValue::UInt16(v) => Some(f64::from(v)),
        AnyValue::UInt32(v) => Some(f64::from(v)),
        AnyValue::UInt64(v) => Some(v as f64),
        AnyValue::Float32(v) => Some(f64::from(v)),
        AnyValue::Float64(v) => Some(v),
        _ => None,
    }
}

/// Parses a string as `f64`, returning `None` for invalid or empty strings.
pub fn parse_f64(value: &str) -> Option<f64> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok()
}

/// Returns true unless the value is the null marker.
///
/// Empty strings count as present: only Polars nulls are missing.
pub fn is_present(value: &AnyValue<'_>) -> bool {
    !matches!(value, AnyValue::Null)
}

/// Returns true for integer and floating-point data types.
pub fn is_numeric_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32
            | DataType::Float64
    )
}

/// Collect every value of a column, row by row.
pub fn column_values<'a>(df: &'a DataFrame, name: &str) -> PolarsResult<Vec<AnyValue<'a>>> {
    let column = df.column(name)?;
    (0..df.height()).map(|idx| column.get(idx)).collect()
}
