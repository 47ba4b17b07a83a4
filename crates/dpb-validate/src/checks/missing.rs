//! Missing value proportion check.

use polars::prelude::DataFrame;

use dpb_model::{ReportMessage, Result, TableError};

fn percent(proportion: f64) -> String {
    format!("{:.2}%", proportion * 100.0)
}

/// Pass when the share of null cells over all cells is at most `threshold`
/// (a proportion between 0 and 1). An empty table has no missing cells.
#[allow(clippy::cast_precision_loss)]
pub fn check_missing_values(df: &DataFrame, threshold: f64) -> Result<ReportMessage> {
    if !(0.0..=1.0).contains(&threshold) {
        return Err(TableError::value_error(format!(
            "missing value threshold must be between 0 and 1, got {threshold}"
        )));
    }

    let total = df.height() * df.width();
    let missing: usize = df.get_columns().iter().map(|col| col.null_count()).sum();
    let proportion = if total == 0 {
        0.0
    } else {
        missing as f64 / total as f64
    };

    let detail = format!(
        "{} missing (threshold: {})",
        percent(proportion),
        percent(threshold)
    );
    Ok(if proportion <= threshold {
        ReportMessage::passed(format!("Missing values validation passed: {detail}"))
    } else {
        ReportMessage::failed(format!("Missing values validation failed: {detail}"))
    })
}
