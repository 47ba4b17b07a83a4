//! Validation check modules.

mod counts;
mod datatype;
mod missing;

pub use counts::{check_column_count, check_row_count};
pub use datatype::{check_data_types, dtype_name};
pub use missing::check_missing_values;
