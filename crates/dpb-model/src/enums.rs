//! Type-safe enumerations for operation arguments.
//!
//! These enums give compile-time structure to arguments that arrive as
//! strings in pipeline configuration files. Each parses through `FromStr`
//! so the calling operation can raise the matching [`TableError`].

use std::fmt;
use std::str::FromStr;

use crate::error::TableError;

/// Row comparison operator used by row filtering and validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Eq,
    Ne,
    Gt,
    Lt,
    Ge,
    Le,
    In,
    NotIn,
}

impl Operator {
    /// All operators in their configuration spelling.
    pub const ALL: [Operator; 8] = [
        Operator::Eq,
        Operator::Ne,
        Operator::Gt,
        Operator::Lt,
        Operator::Ge,
        Operator::Le,
        Operator::In,
        Operator::NotIn,
    ];

    /// Returns the operator as written in configuration files.
    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::Eq => "==",
            Operator::Ne => "!=",
            Operator::Gt => ">",
            Operator::Lt => "<",
            Operator::Ge => ">=",
            Operator::Le => "<=",
            Operator::In => "in",
            Operator::NotIn => "not_in",
        }
    }

    /// Returns true for membership operators that expect a list operand.
    pub fn is_membership(&self) -> bool {
        matches!(self, Operator::In | Operator::NotIn)
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operator {
    type Err = TableError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Operator::ALL
            .into_iter()
            .find(|op| op.as_str() == s.trim())
            .ok_or_else(|| TableError::UnsupportedOperator {
                operator: s.to_string(),
                supported: Operator::ALL.iter().map(Operator::as_str).collect(),
            })
    }
}

/// Which member of a duplicate group survives de-duplication.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum KeepStrategy {
    #[default]
    First,
    Last,
    /// Drop every member of a duplicate group.
    None,
}

impl KeepStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            KeepStrategy::First => "first",
            KeepStrategy::Last => "last",
            KeepStrategy::None => "none",
        }
    }
}

impl FromStr for KeepStrategy {
    type Err = TableError;

    /// `false` is accepted as a spelling of `none`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "first" => Ok(KeepStrategy::First),
            "last" => Ok(KeepStrategy::Last),
            "none" | "false" => Ok(KeepStrategy::None),
            _ => Err(TableError::invalid_argument(format!(
                "keep must be one of first, last, none (got '{s}')"
            ))),
        }
    }
}

/// Built-in reducer shared by frame aggregation and the reducer escape hatches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Reducer {
    Sum,
    Mean,
    Median,
    Min,
    Max,
    /// Number of non-null values.
    Count,
    /// Number of rows, nulls included.
    Size,
    /// Number of distinct non-null values.
    Nunique,
    /// Sample standard deviation (one degree of freedom).
    Std,
    /// Sample variance (one degree of freedom).
    Var,
    First,
    Last,
    /// Distinct non-null values, stringified, sorted and joined with `", "`.
    SetJoin,
}

impl Reducer {
    pub const ALL: [Reducer; 13] = [
        Reducer::Sum,
        Reducer::Mean,
        Reducer::Median,
        Reducer::Min,
        Reducer::Max,
        Reducer::Count,
        Reducer::Size,
        Reducer::Nunique,
        Reducer::Std,
        Reducer::Var,
        Reducer::First,
        Reducer::Last,
        Reducer::SetJoin,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Reducer::Sum => "sum",
            Reducer::Mean => "mean",
            Reducer::Median => "median",
            Reducer::Min => "min",
            Reducer::Max => "max",
            Reducer::Count => "count",
            Reducer::Size => "size",
            Reducer::Nunique => "nunique",
            Reducer::Std => "std",
            Reducer::Var => "var",
            Reducer::First => "first",
            Reducer::Last => "last",
            Reducer::SetJoin => "set_join",
        }
    }

    /// Returns true for reducers that only make sense over numbers.
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            Reducer::Sum | Reducer::Mean | Reducer::Median | Reducer::Std | Reducer::Var
        )
    }

    /// Names of every built-in reducer, in declaration order.
    pub fn names() -> Vec<String> {
        Reducer::ALL.iter().map(|r| r.as_str().to_string()).collect()
    }
}

impl fmt::Display for Reducer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Reducer {
    type Err = TableError;

    /// Accepts the numpy-style aliases `average`, `nanmean`, `nansum`, ...
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();
        let name = normalized.strip_prefix("nan").unwrap_or(&normalized);
        match name {
            "sum" => Ok(Reducer::Sum),
            "mean" | "average" => Ok(Reducer::Mean),
            "median" => Ok(Reducer::Median),
            "min" | "amin" => Ok(Reducer::Min),
            "max" | "amax" => Ok(Reducer::Max),
            "count" => Ok(Reducer::Count),
            "size" | "len" => Ok(Reducer::Size),
            "nunique" | "n_unique" => Ok(Reducer::Nunique),
            "std" => Ok(Reducer::Std),
            "var" => Ok(Reducer::Var),
            "first" => Ok(Reducer::First),
            "last" => Ok(Reducer::Last),
            "set_join" => Ok(Reducer::SetJoin),
            _ => Err(TableError::UnknownFunction {
                name: s.to_string(),
                available: Reducer::names(),
            }),
        }
    }
}

/// Molar concentration unit of a potency measurement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConcentrationUnit {
    Molar,
    Micromolar,
    Nanomolar,
    Picomolar,
}

impl ConcentrationUnit {
    /// Offset added to `-log10(value)` to express the value in molar units.
    pub fn log_offset(&self) -> f64 {
        match self {
            ConcentrationUnit::Molar => 0.0,
            ConcentrationUnit::Micromolar => 6.0,
            ConcentrationUnit::Nanomolar => 9.0,
            ConcentrationUnit::Picomolar => 12.0,
        }
    }
}

impl FromStr for ConcentrationUnit {
    type Err = TableError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "M" => Ok(ConcentrationUnit::Molar),
            "uM" | "µM" => Ok(ConcentrationUnit::Micromolar),
            "nM" => Ok(ConcentrationUnit::Nanomolar),
            "pM" => Ok(ConcentrationUnit::Picomolar),
            other => Err(TableError::value_error(format!(
                "unsupported unit '{other}' (expected one of M, uM, nM, pM)"
            ))),
        }
    }
}
