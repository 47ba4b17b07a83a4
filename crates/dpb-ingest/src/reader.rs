//! Table loading with format dispatch by extension.

use std::fs::File;
use std::path::Path;

use polars::prelude::{CsvReadOptions, DataFrame, JsonFormat, JsonReader, SerReader};
use tracing::{debug, info};

use crate::error::{IngestError, Result};
use crate::format::TableFormat;
use crate::spreadsheet::read_spreadsheet_table;

/// Rows sampled by the CSV reader when inferring column types.
const INFER_SCHEMA_ROWS: usize = 100;

/// Load a table, choosing the reader from the file extension.
pub fn read_table(path: &Path) -> Result<DataFrame> {
    if !path.exists() {
        return Err(IngestError::FileNotFound {
            path: path.to_path_buf(),
        });
    }
    let format = TableFormat::from_path(path)?;
    debug!(path = %path.display(), %format, "reading table");

    let df = match format {
        TableFormat::Csv => read_csv_table(path)?,
        TableFormat::Spreadsheet => read_spreadsheet_table(path)?,
        TableFormat::Json => read_json_table(path)?,
    };

    info!(
        path = %path.display(),
        rows = df.height(),
        columns = df.width(),
        "loaded table"
    );
    Ok(df)
}

/// Reads a CSV file with a single header row.
///
/// Empty fields become nulls.
pub fn read_csv_table(path: &Path) -> Result<DataFrame> {
    CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(INFER_SCHEMA_ROWS))
        .try_into_reader_with_file_path(Some(path.to_path_buf()))
        .map_err(|e| IngestError::CsvParse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?
        .finish()
        .map_err(|e| IngestError::CsvParse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
}

/// Reads a JSON array of records.
pub fn read_json_table(path: &Path) -> Result<DataFrame> {
    let file = File::open(path).map_err(|e| IngestError::FileRead {
        path: path.to_path_buf(),
        source: e,
    })?;
    JsonReader::new(file)
        .with_json_format(JsonFormat::Json)
        .finish()
        .map_err(|e| IngestError::JsonParse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::Builder;

    fn temp_file(suffix: &str, content: &str) -> tempfile::NamedTempFile {
        let mut file = Builder::new().suffix(suffix).tempfile().unwrap();
        write!(file, "{content}").unwrap();
        file
    }

    #[test]
    fn test_read_csv_table() {
        let file = temp_file(".csv", "sequence,activity\nAc-A-S5,0.5\nAc-R8-A,0.9\n");
        let df = read_table(file.path()).unwrap();

        assert_eq!(df.height(), 2);
        assert_eq!(df.width(), 2);
        assert_eq!(df.get_column_names_str(), vec!["sequence", "activity"]);
    }

    #[test]
    fn test_read_csv_empty_fields_are_null() {
        let file = temp_file(".csv", "a,b\n1,\n2,x\n");
        let df = read_table(file.path()).unwrap();

        assert_eq!(df.column("b").unwrap().null_count(), 1);
    }

    #[test]
    fn test_read_json_records() {
        let file = temp_file(".json", r#"[{"a": 1, "b": "x"}, {"a": 2, "b": "y"}]"#);
        let df = read_table(file.path()).unwrap();

        assert_eq!(df.height(), 2);
        assert_eq!(df.width(), 2);
    }

    #[test]
    fn test_read_missing_file() {
        let result = read_table(Path::new("/definitely/not/here.csv"));
        assert!(matches!(result, Err(IngestError::FileNotFound { .. })));
    }

    #[test]
    fn test_read_unsupported_extension() {
        let file = temp_file(".parquet", "");
        let result = read_table(file.path());
        assert!(matches!(result, Err(IngestError::UnsupportedFormat { .. })));
    }
}
