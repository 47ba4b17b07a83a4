//! Table ingestion and export.
//!
//! This crate loads the single input table of a pipeline run into a Polars
//! `DataFrame` and writes the final table back out. The file format is chosen
//! purely by extension:
//!
//! - **Delimited text**: `.csv`
//! - **Spreadsheet**: `.xlsx`, `.xls` (first worksheet, header row first)
//! - **Structured text**: `.json` (array of records)
//!
//! # Example
//!
//! ```ignore
//! use std::path::Path;
//! use dpb_ingest::{read_table, write_table};
//!
//! let df = read_table(Path::new("data/peptides.csv"))?;
//! write_table(&df, Path::new("data/peptides.json"))?;
//! ```

mod error;
mod format;
mod reader;
mod spreadsheet;
mod writer;

// === Error Types ===
pub use error::{IngestError, Result};

// === Format Detection ===
pub use format::TableFormat;

// === Reading / Writing ===
pub use reader::{read_csv_table, read_json_table, read_table};
pub use spreadsheet::{read_spreadsheet_table, write_spreadsheet_table};
pub use writer::{write_csv_table, write_json_table, write_table};
