//! Column data type check.
//!
//! Expected types may be written with dataframe-style names (`int64`,
//! `float64`, `object`, `bool`) or Polars shorthands (`i64`, `f64`, `str`).

use polars::prelude::{DataFrame, DataType};
use tracing::debug;

use dpb_model::{ReportMessage, Result, TableError};

const DATETIME: &str = "datetime64[ns]";

/// Dataframe-style name of a Polars dtype.
pub fn dtype_name(dtype: &DataType) -> String {
    let name = match dtype {
        DataType::Int8 => "int8",
        DataType::Int16 => "int16",
        DataType::Int32 => "int32",
        DataType::Int64 => "int64",
        DataType::UInt8 => "uint8",
        DataType::UInt16 => "uint16",
        DataType::UInt32 => "uint32",
        DataType::UInt64 => "uint64",
        DataType::Float32 => "float32",
        DataType::Float64 => "float64",
        DataType::String => "object",
        DataType::Boolean => "bool",
        DataType::Date => "date",
        DataType::Datetime(_, _) => DATETIME,
        DataType::Null => "null",
        other => return other.to_string(),
    };
    name.to_string()
}

/// Canonical form of a user-supplied type name.
fn canonical_name(expected: &str) -> Result<&'static str> {
    let canonical = match expected.trim().to_ascii_lowercase().as_str() {
        "int8" | "i8" => "int8",
        "int16" | "i16" => "int16",
        "int32" | "i32" => "int32",
        "int64" | "i64" | "int" => "int64",
        "uint8" | "u8" => "uint8",
        "uint16" | "u16" => "uint16",
        "uint32" | "u32" => "uint32",
        "uint64" | "u64" => "uint64",
        "float32" | "f32" => "float32",
        "float64" | "f64" | "float" => "float64",
        "object" | "str" | "string" | "utf8" => "object",
        "bool" | "boolean" => "bool",
        "date" => "date",
        "datetime" | "datetime64" | "datetime64[ns]" => DATETIME,
        "null" => "null",
        _ => {
            return Err(TableError::value_error(format!(
                "unknown data type '{expected}'"
            )));
        }
    };
    Ok(canonical)
}

/// Check each `(column, type)` pair, collecting every missing column and
/// mismatch into a single failure message.
pub fn check_data_types(df: &DataFrame, expected_types: &[(String, String)]) -> Result<ReportMessage> {
    let mut failures = Vec::new();
    for (column, expected) in expected_types {
        let wanted = canonical_name(expected)?;
        let Ok(series) = df.column(column) else {
            failures.push(format!("Column '{column}' not found"));
            continue;
        };
        let actual = dtype_name(series.dtype());
        debug!(column = %column, expected = wanted, actual = %actual, "checking data type");
        if actual != wanted {
            failures.push(format!("Column '{column}': expected {expected}, got {actual}"));
        }
    }

    Ok(if failures.is_empty() {
        ReportMessage::passed(format!(
            "Data types validation passed: {} columns checked",
            expected_types.len()
        ))
    } else {
        ReportMessage::failed(format!(
            "Data types validation failed: {}",
            failures.join("; ")
        ))
    })
}
