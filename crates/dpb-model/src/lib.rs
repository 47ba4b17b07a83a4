//! Shared model types for DataProduct Builder.
//!
//! - **error**: the [`TableError`] taxonomy raised by table operations
//! - **report**: [`ReportMessage`], the outcome of a quality check
//! - **enums**: parsed operation arguments (comparison operators, keep
//!   strategies, aggregation reducers, concentration units)

pub mod enums;
pub mod error;
pub mod report;

pub use enums::{ConcentrationUnit, KeepStrategy, Operator, Reducer};
pub use error::{Result, TableError};
pub use report::{ReportMessage, ReportStatus};
