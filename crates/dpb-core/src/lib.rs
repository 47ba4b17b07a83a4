//! Declarative pipeline execution.
//!
//! A pipeline configuration names an input table, an optional output path
//! and an ordered list of steps. Each step names a registered operation and
//! its parameters:
//!
//! ```yaml
//! input_path: data/peptides.csv
//! output_path: data/peptides_clean.csv
//! steps:
//!   - operation: drop_duplicates
//!     params: { subset: [peptide_id], keep: first }
//!   - operation: check_row_count
//!     params: { min_count: 1 }
//! ```
//!
//! [`run`] loads and validates the configuration before touching any table
//! file, then threads the table through every step in order.

pub mod config;
pub mod error;
pub mod executor;
pub mod operation;
pub mod registry;

pub use config::{
    ConfigFormat, PipelineConfig, Step, create_example_config, load_config, validate_config,
};
pub use error::{PipelineError, Result};
pub use executor::{StepOutcome, execute_step, run};
pub use operation::Operation;
pub use registry::{Category, OPERATIONS, OperationSpec, find_operation, operation_names};
