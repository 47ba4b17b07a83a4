//! Table export with format dispatch by extension.

use std::fs::File;
use std::path::Path;

use polars::prelude::{CsvWriter, DataFrame, JsonFormat, JsonWriter, SerWriter};
use tracing::info;

use crate::error::{IngestError, Result};
use crate::format::TableFormat;
use crate::spreadsheet::write_spreadsheet_table;

/// Write a table, choosing the writer from the file extension.
///
/// The format is checked before the file is created, so an unsupported
/// extension leaves nothing behind.
pub fn write_table(df: &DataFrame, path: &Path) -> Result<()> {
    let format = TableFormat::from_path(path)?;
    match format {
        TableFormat::Csv => write_csv_table(df, path)?,
        TableFormat::Spreadsheet => write_spreadsheet_table(df, path)?,
        TableFormat::Json => write_json_table(df, path)?,
    }
    info!(
        path = %path.display(),
        %format,
        rows = df.height(),
        columns = df.width(),
        "wrote table"
    );
    Ok(())
}

fn create_file(path: &Path) -> Result<File> {
    File::create(path).map_err(|e| IngestError::FileWrite {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Writes a CSV file with a header row and no index column.
pub fn write_csv_table(df: &DataFrame, path: &Path) -> Result<()> {
    let mut file = create_file(path)?;
    let mut out = df.clone();
    CsvWriter::new(&mut file)
        .include_header(true)
        .finish(&mut out)?;
    Ok(())
}

/// Writes a JSON array of records.
pub fn write_json_table(df: &DataFrame, path: &Path) -> Result<()> {
    let mut file = create_file(path)?;
    let mut out = df.clone();
    JsonWriter::new(&mut file)
        .with_json_format(JsonFormat::Json)
        .finish(&mut out)?;
    Ok(())
}
