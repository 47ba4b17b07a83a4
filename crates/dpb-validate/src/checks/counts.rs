//! Row and column count checks.

use polars::prelude::DataFrame;

use dpb_model::ReportMessage;

/// Exact count when `expected` is given, otherwise optional bounds.
fn check_count(
    label: &str,
    unit: &str,
    actual: usize,
    expected: Option<usize>,
    min: Option<usize>,
    max: Option<usize>,
) -> ReportMessage {
    if let Some(expected) = expected {
        let detail = format!("{actual} {unit} (expected: {expected})");
        return if actual == expected {
            ReportMessage::passed(format!("{label} validation passed: {detail}"))
        } else {
            ReportMessage::failed(format!("{label} validation failed: {detail}"))
        };
    }
    if let Some(min) = min
        && actual < min
    {
        return ReportMessage::failed(format!(
            "{label} validation failed: {actual} {unit} (minimum: {min})"
        ));
    }
    if let Some(max) = max
        && actual > max
    {
        return ReportMessage::failed(format!(
            "{label} validation failed: {actual} {unit} (maximum: {max})"
        ));
    }
    ReportMessage::passed(format!("{label} validation passed: {actual} {unit}"))
}

/// Check the number of rows.
pub fn check_row_count(
    df: &DataFrame,
    expected: Option<usize>,
    min: Option<usize>,
    max: Option<usize>,
) -> ReportMessage {
    check_count("Row count", "rows", df.height(), expected, min, max)
}

/// Check the number of columns.
pub fn check_column_count(
    df: &DataFrame,
    expected: Option<usize>,
    min: Option<usize>,
    max: Option<usize>,
) -> ReportMessage {
    check_count("Column count", "columns", df.width(), expected, min, max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::df;

    fn five_rows() -> DataFrame {
        df! { "a" => [1, 2, 3, 4, 5], "b" => ["v", "w", "x", "y", "z"] }.unwrap()
    }

    #[test]
    fn exact_row_count() {
        let df = five_rows();
        insta::assert_snapshot!(
            check_row_count(&df, Some(5), None, None),
            @"✅ Row count validation passed: 5 rows (expected: 5)"
        );
        insta::assert_snapshot!(
            check_row_count(&df.head(Some(4)), Some(5), None, None),
            @"❌ Row count validation failed: 4 rows (expected: 5)"
        );
    }

    #[test]
    fn row_bounds() {
        let df = five_rows();
        insta::assert_snapshot!(
            check_row_count(&df, None, Some(10), None),
            @"❌ Row count validation failed: 5 rows (minimum: 10)"
        );
        insta::assert_snapshot!(
            check_row_count(&df, None, None, Some(3)),
            @"❌ Row count validation failed: 5 rows (maximum: 3)"
        );
        insta::assert_snapshot!(
            check_row_count(&df, None, Some(1), Some(5)),
            @"✅ Row count validation passed: 5 rows"
        );
    }

    #[test]
    fn expected_overrides_bounds() {
        let df = five_rows();
        assert!(check_row_count(&df, Some(5), Some(10), Some(1)).is_passed());
    }

    #[test]
    fn column_count() {
        let df = five_rows();
        insta::assert_snapshot!(
            check_column_count(&df, Some(3), None, None),
            @"❌ Column count validation failed: 2 columns (expected: 3)"
        );
        assert!(check_column_count(&df, None, Some(2), Some(2)).is_passed());
    }
}
