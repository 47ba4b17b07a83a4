//! Built-in reducers over one column's values.

use std::collections::BTreeSet;

use polars::prelude::AnyValue;

use dpb_common::{any_to_string, as_number, compare_non_null, is_present, owned_value};
use dpb_model::{Reducer, Result, TableError};

fn as_integer(value: &AnyValue<'_>) -> Option<i128> {
    match value {
        AnyValue::Int8(v) => Some(i128::from(*v)),
        AnyValue::Int16(v) => Some(i128::from(*v)),
        AnyValue::Int32(v) => Some(i128::from(*v)),
        AnyValue::Int64(v) => Some(i128::from(*v)),
        AnyValue::UInt8(v) => Some(i128::from(*v)),
        AnyValue::UInt16(v) => Some(i128::from(*v)),
        AnyValue::UInt32(v) => Some(i128::from(*v)),
        AnyValue::UInt64(v) => Some(i128::from(*v)),
        _ => None,
    }
}

/// Exact sum of an all-integer group; `None` when a value is not an integer
/// or the total does not fit in i64.
fn integer_sum(present: &[&AnyValue<'_>]) -> Option<i64> {
    let total = present
        .iter()
        .try_fold(0i128, |acc, value| acc.checked_add(as_integer(value)?))?;
    i64::try_from(total).ok()
}

fn numbers(reducer: Reducer, present: &[&AnyValue<'_>]) -> Result<Vec<f64>> {
    present
        .iter()
        .map(|value| {
            as_number(value).ok_or_else(|| {
                TableError::type_error(format!(
                    "'{reducer}' needs numeric values, found '{}'",
                    any_to_string((*value).clone())
                ))
            })
        })
        .collect()
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

fn variance(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let m = mean(values);
    let squares: f64 = values.iter().map(|v| (v - m).powi(2)).sum();
    Some(squares / (values.len() - 1) as f64)
}

fn median(values: &mut [f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(f64::total_cmp);
    let mid = values.len() / 2;
    Some(if values.len() % 2 == 0 {
        (values[mid - 1] + values[mid]) / 2.0
    } else {
        values[mid]
    })
}

fn float_or_null(value: Option<f64>) -> AnyValue<'static> {
    value.map_or(AnyValue::Null, AnyValue::Float64)
}

/// Apply `reducer` to a group's values. Missing values are skipped by every
/// reducer except `size`.
#[allow(clippy::cast_possible_wrap)]
pub fn reduce(reducer: Reducer, values: &[AnyValue<'_>]) -> Result<AnyValue<'static>> {
    let present: Vec<&AnyValue<'_>> = values.iter().filter(|v| is_present(v)).collect();
    let out = match reducer {
        Reducer::Size => AnyValue::Int64(values.len() as i64),
        Reducer::Count => AnyValue::Int64(present.len() as i64),
        Reducer::Nunique => {
            let distinct: BTreeSet<String> =
                present.iter().map(|v| any_to_string((*v).clone())).collect();
            AnyValue::Int64(distinct.len() as i64)
        }
        Reducer::First => present.first().map_or(AnyValue::Null, |v| owned_value((*v).clone())),
        Reducer::Last => present.last().map_or(AnyValue::Null, |v| owned_value((*v).clone())),
        Reducer::Min => present
            .iter()
            .copied()
            .min_by(|a, b| compare_non_null(a, b))
            .map_or(AnyValue::Null, |v| owned_value(v.clone())),
        Reducer::Max => present
            .iter()
            .copied()
            .max_by(|a, b| compare_non_null(a, b))
            .map_or(AnyValue::Null, |v| owned_value(v.clone())),
        Reducer::SetJoin => {
            let distinct: BTreeSet<String> =
                present.iter().map(|v| any_to_string((*v).clone())).collect();
            AnyValue::StringOwned(distinct.into_iter().collect::<Vec<_>>().join(", ").into())
        }
        Reducer::Sum => {
            match integer_sum(&present).filter(|_| !present.is_empty()) {
                Some(total) => AnyValue::Int64(total),
                None => AnyValue::Float64(numbers(reducer, &present)?.iter().sum()),
            }
        }
        Reducer::Mean => {
            let values = numbers(reducer, &present)?;
            float_or_null((!values.is_empty()).then(|| mean(&values)))
        }
        Reducer::Median => float_or_null(median(&mut numbers(reducer, &present)?)),
        Reducer::Var => float_or_null(variance(&numbers(reducer, &present)?)),
        Reducer::Std => float_or_null(variance(&numbers(reducer, &present)?).map(f64::sqrt)),
    };
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn floats(values: &[f64]) -> Vec<AnyValue<'static>> {
        values.iter().map(|v| AnyValue::Float64(*v)).collect()
    }

    #[test]
    fn statistics() {
        let values = floats(&[1.0, 2.0, 3.0, 4.0]);
        assert_eq!(reduce(Reducer::Sum, &values).unwrap(), AnyValue::Float64(10.0));
        assert_eq!(reduce(Reducer::Mean, &values).unwrap(), AnyValue::Float64(2.5));
        assert_eq!(reduce(Reducer::Median, &values).unwrap(), AnyValue::Float64(2.5));
        let AnyValue::Float64(var) = reduce(Reducer::Var, &values).unwrap() else {
            panic!("variance should be a float");
        };
        assert!((var - 5.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn integer_sum_is_exact_and_widens_on_overflow() {
        let values = [AnyValue::Int64(9_007_199_254_740_993), AnyValue::Int64(0)];
        assert_eq!(
            reduce(Reducer::Sum, &values).unwrap(),
            AnyValue::Int64(9_007_199_254_740_993)
        );

        let values = [AnyValue::Int64(i64::MAX), AnyValue::Int64(i64::MAX)];
        let AnyValue::Float64(total) = reduce(Reducer::Sum, &values).unwrap() else {
            panic!("overflowing sum should widen to a float");
        };
        assert!((total - 2.0 * i64::MAX as f64).abs() < 1e6);

        let values = [AnyValue::UInt64(u64::MAX), AnyValue::Int64(-1)];
        assert_eq!(
            reduce(Reducer::Sum, &values).unwrap(),
            AnyValue::Float64(u64::MAX as f64)
        );
    }

    #[test]
    fn integer_sum_stays_integer() {
        let values = [AnyValue::Int32(2), AnyValue::Null, AnyValue::Int64(5)];
        assert_eq!(reduce(Reducer::Sum, &values).unwrap(), AnyValue::Int64(7));
        assert_eq!(reduce(Reducer::Count, &values).unwrap(), AnyValue::Int64(2));
        assert_eq!(reduce(Reducer::Size, &values).unwrap(), AnyValue::Int64(3));
    }

    #[test]
    fn empty_groups() {
        let values = [AnyValue::Null];
        assert_eq!(reduce(Reducer::Sum, &values).unwrap(), AnyValue::Float64(0.0));
        assert_eq!(reduce(Reducer::Mean, &values).unwrap(), AnyValue::Null);
        assert_eq!(reduce(Reducer::Min, &values).unwrap(), AnyValue::Null);
        assert_eq!(reduce(Reducer::Std, &floats(&[1.0])).unwrap(), AnyValue::Null);
    }

    #[test]
    fn first_last_skip_nulls() {
        let values = [AnyValue::Null, AnyValue::String("a"), AnyValue::String("b"), AnyValue::Null];
        assert_eq!(
            reduce(Reducer::First, &values).unwrap(),
            AnyValue::StringOwned("a".into())
        );
        assert_eq!(
            reduce(Reducer::Last, &values).unwrap(),
            AnyValue::StringOwned("b".into())
        );
    }

    #[test]
    fn set_join_sorts_and_dedups() {
        let values = [
            AnyValue::String("R8"),
            AnyValue::String("S5"),
            AnyValue::Null,
            AnyValue::String("R8"),
            AnyValue::String("B5"),
        ];
        assert_eq!(
            reduce(Reducer::SetJoin, &values).unwrap(),
            AnyValue::StringOwned("B5, R8, S5".into())
        );
        assert_eq!(reduce(Reducer::Nunique, &values).unwrap(), AnyValue::Int64(3));
    }

    #[test]
    fn numeric_reducers_reject_text() {
        let values = [AnyValue::String("x")];
        let err = reduce(Reducer::Mean, &values).unwrap_err();
        assert!(matches!(err, TableError::Type { .. }));
        assert_eq!(
            reduce(Reducer::Max, &values).unwrap(),
            AnyValue::StringOwned("x".into())
        );
    }
}
