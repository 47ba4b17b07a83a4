//! Frame operations: group-by aggregation and whole-table reducers.

mod aggregate;
mod apply;
mod reducer;

pub use aggregate::{
    CustomAggregator, CustomFunctions, NamedAggregation, aggregate_dataframe,
    aggregate_with_column_functions, aggregate_with_custom_functions,
};
pub use apply::{PANDAS_FUNCTIONS, apply_numpy_function, apply_pandas_function, reduce_columns};
pub use reducer::reduce;
