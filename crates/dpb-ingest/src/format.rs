//! File format detection by extension.

use std::fmt;
use std::path::Path;

use crate::error::{IngestError, Result};

/// Table file formats understood by the reader and writer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableFormat {
    /// Comma-delimited text (`.csv`).
    Csv,
    /// Excel workbook (`.xlsx`, `.xls`).
    Spreadsheet,
    /// JSON array of records (`.json`).
    Json,
}

impl TableFormat {
    /// Detect the format from a path's extension (case-insensitive).
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_lowercase)
            .unwrap_or_default();
        match extension.as_str() {
            "csv" => Ok(TableFormat::Csv),
            "xlsx" | "xls" => Ok(TableFormat::Spreadsheet),
            "json" => Ok(TableFormat::Json),
            _ => Err(IngestError::UnsupportedFormat {
                path: path.to_path_buf(),
                extension: if extension.is_empty() {
                    "<none>".to_string()
                } else {
                    format!(".{extension}")
                },
            }),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TableFormat::Csv => "csv",
            TableFormat::Spreadsheet => "spreadsheet",
            TableFormat::Json => "json",
        }
    }
}

impl fmt::Display for TableFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
