//! Excel workbook reading (calamine) and writing (rust_xlsxwriter).
//!
//! Only the first worksheet is read. Its first row holds column names and
//! every following row is a record. Column types are inferred from the
//! non-empty cells: all whole numbers become `Int64`, any other numeric mix
//! becomes `Float64`, all booleans become `Boolean`, anything else `String`.

use std::path::Path;

use calamine::{Data, Reader, open_workbook_auto};
use polars::prelude::{AnyValue, Column, DataFrame, IntoColumn, NamedFrom, Series};
use rust_xlsxwriter::Workbook;

use dpb_common::{any_to_string, as_number};

use crate::error::{IngestError, Result};

fn spreadsheet_error(path: &Path, message: impl ToString) -> IngestError {
    IngestError::Spreadsheet {
        path: path.to_path_buf(),
        message: message.to_string(),
    }
}

/// Reads the first worksheet of a workbook into a DataFrame.
pub fn read_spreadsheet_table(path: &Path) -> Result<DataFrame> {
    let mut workbook = open_workbook_auto(path).map_err(|e| spreadsheet_error(path, e))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| spreadsheet_error(path, "workbook has no worksheets"))?
        .map_err(|e| spreadsheet_error(path, e))?;

    let mut rows = range.rows();
    let Some(header) = rows.next() else {
        return Ok(DataFrame::empty());
    };
    let body: Vec<&[Data]> = rows.collect();

    let mut columns = Vec::with_capacity(header.len());
    for (idx, cell) in header.iter().enumerate() {
        let name = match cell {
            Data::Empty => format!("column_{idx}"),
            other => other.to_string(),
        };
        let cells: Vec<&Data> = body
            .iter()
            .map(|row| row.get(idx).unwrap_or(&Data::Empty))
            .collect();
        columns.push(infer_column(&name, &cells));
    }

    DataFrame::new(columns).map_err(IngestError::from)
}

fn is_blank(cell: &Data) -> bool {
    matches!(cell, Data::Empty | Data::Error(_))
}

fn cell_number(cell: &Data) -> Option<f64> {
    match cell {
        Data::Int(v) => Some(*v as f64),
        Data::Float(v) => Some(*v),
        _ => None,
    }
}

fn infer_column(name: &str, cells: &[&Data]) -> Column {
    let present: Vec<&&Data> = cells.iter().filter(|cell| !is_blank(cell)).collect();

    let all_numeric = present.iter().all(|cell| cell_number(cell).is_some());
    let all_bool = present.iter().all(|cell| matches!(cell, Data::Bool(_)));

    if !present.is_empty() && all_numeric {
        let numbers: Vec<Option<f64>> = cells.iter().map(|cell| cell_number(cell)).collect();
        let whole = numbers
            .iter()
            .flatten()
            .all(|v| v.fract() == 0.0 && v.abs() < 9.0e15);
        if whole {
            let ints: Vec<Option<i64>> = numbers.iter().map(|v| v.map(|f| f as i64)).collect();
            return Series::new(name.into(), ints).into_column();
        }
        return Series::new(name.into(), numbers).into_column();
    }

    if !present.is_empty() && all_bool {
        let bools: Vec<Option<bool>> = cells
            .iter()
            .map(|cell| match cell {
                Data::Bool(b) => Some(*b),
                _ => None,
            })
            .collect();
        return Series::new(name.into(), bools).into_column();
    }

    let strings: Vec<Option<String>> = cells
        .iter()
        .map(|cell| {
            if is_blank(cell) {
                None
            } else {
                Some(cell.to_string())
            }
        })
        .collect();
    Series::new(name.into(), strings).into_column()
}

/// Writes a DataFrame to the first worksheet of a new workbook.
///
/// The header row holds the column names. Nulls are left as empty cells.
pub fn write_spreadsheet_table(df: &DataFrame, path: &Path) -> Result<()> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();

    for (col_idx, column) in df.get_columns().iter().enumerate() {
        let col = u16::try_from(col_idx)
            .map_err(|_| spreadsheet_error(path, "too many columns for a worksheet"))?;
        worksheet
            .write_string(0, col, column.name().as_str())
            .map_err(|e| spreadsheet_error(path, e))?;

        for row_idx in 0..df.height() {
            let row = u32::try_from(row_idx + 1)
                .map_err(|_| spreadsheet_error(path, "too many rows for a worksheet"))?;
            let value = column.get(row_idx)?;
            let written = match value {
                AnyValue::Null => continue,
                AnyValue::Boolean(b) => worksheet.write_boolean(row, col, b),
                other => match as_number(&other) {
                    Some(number) => worksheet.write_number(row, col, number),
                    None => worksheet.write_string(row, col, any_to_string(other)),
                },
            };
            written.map_err(|e| spreadsheet_error(path, e))?;
        }
    }

    workbook.save(path).map_err(|e| spreadsheet_error(path, e))
}
