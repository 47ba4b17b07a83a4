//! Shared utilities for DataProduct Builder crates.
//!
//! This crate provides common utilities used across the workspace,
//! including Polars `AnyValue` helpers and row-key/ordering primitives.

pub mod ordering;
pub mod values;

// Re-export commonly used functions at crate root for convenience
pub use ordering::{CellKey, compare_cells, compare_non_null, row_key};
pub use values::{
    any_to_f64, any_to_string, as_number, column_values, format_numeric, is_numeric_dtype,
    is_present, owned_value, parse_f64,
};
