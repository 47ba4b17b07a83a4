//! Quality checks for pipeline tables.
//!
//! A check inspects a table and returns a [`ReportMessage`]; a failing
//! check is a normal outcome, not an error. Only malformed arguments (an
//! unknown dtype name, an out-of-range threshold) are reported as
//! [`TableError`](dpb_model::TableError).

mod checks;

pub use checks::{
    check_column_count, check_data_types, check_missing_values, check_row_count, dtype_name,
};
pub use dpb_model::{ReportMessage, ReportStatus};
