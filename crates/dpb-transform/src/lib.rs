//! Table transformation operations.
//!
//! This crate provides the operation libraries a pipeline step dispatches to:
//!
//! - **columns**: rename/drop, amino-acid concatenation, class labels, pXC50
//! - **peptide**: staple and stitch punctuation and merged notation
//! - **rows**: filter, validate, sort, sample, shuffle, de-duplicate
//! - **frame**: group-by aggregation and the reducer escape hatches
//!
//! Every operation borrows the input table and returns a new one.

pub mod columns;
pub mod frame;
pub mod peptide;
pub mod rows;
mod util;

// Re-export the operations for external use
pub use columns::{
    Threshold, assign_class_labels, concat_and_pad_aas, convert_to_pxc50_values, drop_columns,
    rename_columns,
};
pub use frame::{
    CustomAggregator, CustomFunctions, NamedAggregation, aggregate_dataframe,
    aggregate_with_column_functions, aggregate_with_custom_functions, apply_numpy_function,
    apply_pandas_function, reduce_columns,
};
pub use peptide::{
    add_punctuation_staples_and_stitches, concatenate_stitches_and_staples,
    concatenate_stitches_and_staples2,
};
pub use rows::{
    Condition, drop_duplicates, filter_rows, remove_empty_rows, sample_rows, shuffle_rows,
    sort_rows, validate_rows,
};
