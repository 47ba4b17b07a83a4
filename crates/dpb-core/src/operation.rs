//! Typed operation parameters and dispatch.
//!
//! Each registered operation has a parameter struct deserialized from the
//! step's `params` mapping when the configuration is validated, so a
//! misspelled or mistyped parameter is rejected before any table is read.
//! Checks that depend on the table itself (column names, operator and unit
//! spellings) happen when the step runs.

use std::collections::BTreeMap;

use polars::prelude::DataFrame;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

use dpb_model::{Reducer, TableError};
use dpb_transform::{
    Condition, CustomFunctions, NamedAggregation, Threshold, add_punctuation_staples_and_stitches,
    aggregate_dataframe, aggregate_with_column_functions, aggregate_with_custom_functions,
    apply_numpy_function, apply_pandas_function, assign_class_labels, concat_and_pad_aas,
    concatenate_stitches_and_staples, concatenate_stitches_and_staples2, convert_to_pxc50_values,
    drop_columns, drop_duplicates, filter_rows, remove_empty_rows, rename_columns, sample_rows,
    shuffle_rows, sort_rows, validate_rows,
};
use dpb_validate::{check_column_count, check_data_types, check_missing_values, check_row_count};

use crate::executor::StepOutcome;

/// A single column name or a list of them.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl OneOrMany {
    pub fn to_vec(&self) -> Vec<String> {
        match self {
            OneOrMany::One(name) => vec![name.clone()],
            OneOrMany::Many(names) => names.clone(),
        }
    }
}

/// `ascending` for sorting: one flag for every key, or one per key.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum Ascending {
    All(bool),
    PerKey(Vec<bool>),
}

impl Default for Ascending {
    fn default() -> Self {
        Ascending::All(true)
    }
}

impl Ascending {
    fn flags(&self) -> Vec<bool> {
        match self {
            Ascending::All(flag) => vec![*flag],
            Ascending::PerKey(flags) => flags.clone(),
        }
    }
}

/// `keep` for de-duplication: a strategy name, or `false` for none.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum Keep {
    Flag(bool),
    Name(String),
}

impl Default for Keep {
    fn default() -> Self {
        Keep::Name("first".to_string())
    }
}

impl Keep {
    fn as_name(&self) -> String {
        match self {
            Keep::Flag(flag) => flag.to_string(),
            Keep::Name(name) => name.clone(),
        }
    }
}

/// Mapping entries in document order, with string values.
fn string_pairs<'de, D>(deserializer: D) -> Result<Vec<(String, String)>, D::Error>
where
    D: Deserializer<'de>,
{
    Map::<String, Value>::deserialize(deserializer)?
        .into_iter()
        .map(|(key, value)| match value {
            Value::String(text) => Ok((key, text)),
            other => Err(D::Error::custom(format!(
                "value for '{key}' must be a string, found {other}"
            ))),
        })
        .collect()
}

/// `{source: {output: aggregator}}`, or the shorthand `{source: aggregator}`
/// which keeps the source name.
fn named_aggregations<'de, D>(deserializer: D) -> Result<Vec<NamedAggregation>, D::Error>
where
    D: Deserializer<'de>,
{
    let mut aggregations = Vec::new();
    for (source, spec) in Map::<String, Value>::deserialize(deserializer)? {
        match spec {
            Value::String(aggregator) => {
                aggregations.push(NamedAggregation::new(source.clone(), source, aggregator));
            }
            Value::Object(outputs) => {
                for (output, aggregator) in outputs {
                    let Value::String(aggregator) = aggregator else {
                        return Err(D::Error::custom(format!(
                            "aggregator for '{source}.{output}' must be a string"
                        )));
                    };
                    aggregations.push(NamedAggregation::new(source.clone(), output, aggregator));
                }
            }
            other => {
                return Err(D::Error::custom(format!(
                    "aggregation for '{source}' must be a mapping or a name, found {other}"
                )));
            }
        }
    }
    Ok(aggregations)
}

fn conditions<'de, D>(deserializer: D) -> Result<Vec<(String, Condition)>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Map::<String, Value>::deserialize(deserializer)?
        .into_iter()
        .map(|(label, value)| {
            let condition = Condition::from_value(&value);
            (label, condition)
        })
        .collect())
}

fn default_true() -> bool {
    true
}

fn default_missing_threshold() -> f64 {
    0.1
}

fn default_count_column() -> String {
    "count".to_string()
}

// ============================================================================
// Column operation parameters
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RenameColumnsParams {
    #[serde(alias = "col_mapping", alias = "columns")]
    pub mapping: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DropColumnsParams {
    pub columns: OneOrMany,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConcatParams {
    #[serde(alias = "cols_to_concat")]
    pub columns: Vec<String>,
    #[serde(alias = "output_col")]
    pub output_column: String,
    #[serde(default = "default_true")]
    pub pad: bool,
}

/// Input and output column of a sequence notation operation.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SequenceParams {
    #[serde(alias = "col_name")]
    pub column: String,
    #[serde(alias = "output_col")]
    pub output_column: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClassLabelParams {
    #[serde(alias = "input_col")]
    pub input_column: String,
    /// A number or a list of numbers; the shape is checked when the step
    /// runs.
    pub threshold: Value,
    #[serde(alias = "output_col")]
    pub output_column: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Pxc50Params {
    #[serde(alias = "input_col")]
    pub input_column: String,
    pub unit: String,
    #[serde(alias = "output_col")]
    pub output_column: String,
}

// ============================================================================
// Row operation parameters
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DropDuplicatesParams {
    #[serde(default)]
    pub subset: Option<OneOrMany>,
    #[serde(default)]
    pub keep: Keep,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FilterRowsParams {
    pub column: String,
    pub operator: String,
    pub value: Value,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SortRowsParams {
    pub by: OneOrMany,
    #[serde(default)]
    pub ascending: Ascending,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SampleRowsParams {
    #[serde(default)]
    pub n: Option<usize>,
    #[serde(default)]
    pub frac: Option<f64>,
    #[serde(default, alias = "random_state")]
    pub seed: Option<u64>,
    #[serde(default)]
    pub replace: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ShuffleRowsParams {
    #[serde(default, alias = "random_state")]
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ValidateRowsParams {
    #[serde(deserialize_with = "conditions")]
    pub conditions: Vec<(String, Condition)>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SubsetParams {
    #[serde(default)]
    pub subset: Option<OneOrMany>,
}

// ============================================================================
// Frame operation parameters
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AggregateParams {
    #[serde(alias = "groupby_cols", alias = "groupby")]
    pub groupby_columns: OneOrMany,
    #[serde(alias = "agg_dict", deserialize_with = "named_aggregations")]
    pub agg_spec: Vec<NamedAggregation>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CustomAggregateParams {
    #[serde(alias = "groupby_cols", alias = "groupby")]
    pub groupby_columns: OneOrMany,
    #[serde(alias = "agg_dict", deserialize_with = "named_aggregations")]
    pub agg_spec: Vec<NamedAggregation>,
    /// Alias name to built-in reducer name.
    #[serde(default)]
    pub custom_functions: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ColumnFunctionsParams {
    #[serde(alias = "groupby_cols", alias = "groupby")]
    pub groupby_columns: OneOrMany,
    #[serde(alias = "agg_dict", deserialize_with = "string_pairs")]
    pub column_functions: Vec<(String, String)>,
    #[serde(default)]
    pub add_count_column: bool,
    #[serde(default = "default_count_column")]
    pub count_column_name: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PandasFunctionParams {
    #[serde(alias = "func_name")]
    pub function: String,
    #[serde(default)]
    pub n: Option<usize>,
    #[serde(default)]
    pub value: Option<Value>,
    #[serde(default)]
    pub columns: Option<OneOrMany>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NumpyFunctionParams {
    #[serde(alias = "func_name")]
    pub function: String,
    #[serde(default)]
    pub columns: Option<OneOrMany>,
}

// ============================================================================
// Quality check parameters
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CountParams {
    #[serde(default)]
    pub expected_count: Option<usize>,
    #[serde(default)]
    pub min_count: Option<usize>,
    #[serde(default)]
    pub max_count: Option<usize>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MissingValuesParams {
    #[serde(default = "default_missing_threshold")]
    pub threshold: f64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DataTypesParams {
    #[serde(deserialize_with = "string_pairs")]
    pub expected_types: Vec<(String, String)>,
}

// ============================================================================
// Dispatch
// ============================================================================

/// A registered operation with its parsed parameters.
#[derive(Debug, Clone)]
pub enum Operation {
    RenameColumns(RenameColumnsParams),
    DropColumns(DropColumnsParams),
    ConcatAndPadAas(ConcatParams),
    AddPunctuationStaplesAndStitches(SequenceParams),
    AssignClassLabels(ClassLabelParams),
    ConcatenateStitchesAndStaples(SequenceParams),
    ConcatenateStitchesAndStaples2(SequenceParams),
    ConvertToPxc50Values(Pxc50Params),
    DropDuplicates(DropDuplicatesParams),
    FilterRows(FilterRowsParams),
    SortRows(SortRowsParams),
    SampleRows(SampleRowsParams),
    ShuffleRows(ShuffleRowsParams),
    ValidateRows(ValidateRowsParams),
    RemoveEmptyRows(SubsetParams),
    AggregateDataframe(AggregateParams),
    AggregateWithCustomFunctions(CustomAggregateParams),
    AggregateWithColumnFunctions(ColumnFunctionsParams),
    ApplyPandasFunction(PandasFunctionParams),
    ApplyNumpyFunction(NumpyFunctionParams),
    CheckRowCount(CountParams),
    CheckColumnCount(CountParams),
    CheckMissingValues(MissingValuesParams),
    CheckDataTypes(DataTypesParams),
}

impl Operation {
    /// Parse `params` for the operation registered as `name`.
    pub fn from_params(name: &str, params: Value) -> Result<Self, serde_json::Error> {
        use serde_json::from_value as p;
        let operation = match name {
            "rename_columns" => Operation::RenameColumns(p(params)?),
            "drop_columns" => Operation::DropColumns(p(params)?),
            "concat_and_pad_aas" => Operation::ConcatAndPadAas(p(params)?),
            "add_punctuation_staples_and_stitches" => {
                Operation::AddPunctuationStaplesAndStitches(p(params)?)
            }
            "assign_class_labels" => Operation::AssignClassLabels(p(params)?),
            "concatenate_stitches_and_staples" => {
                Operation::ConcatenateStitchesAndStaples(p(params)?)
            }
            "concatenate_stitches_and_staples2" => {
                Operation::ConcatenateStitchesAndStaples2(p(params)?)
            }
            "convert_to_pxc50_values" => Operation::ConvertToPxc50Values(p(params)?),
            "drop_duplicates" => Operation::DropDuplicates(p(params)?),
            "filter_rows" => Operation::FilterRows(p(params)?),
            "sort_rows" => Operation::SortRows(p(params)?),
            "sample_rows" => Operation::SampleRows(p(params)?),
            "shuffle_rows" => Operation::ShuffleRows(p(params)?),
            "validate_rows" => Operation::ValidateRows(p(params)?),
            "remove_empty_rows" => Operation::RemoveEmptyRows(p(params)?),
            "aggregate_dataframe" => Operation::AggregateDataframe(p(params)?),
            "aggregate_with_custom_functions" => {
                Operation::AggregateWithCustomFunctions(p(params)?)
            }
            "aggregate_with_column_functions" => {
                Operation::AggregateWithColumnFunctions(p(params)?)
            }
            "apply_pandas_function" => Operation::ApplyPandasFunction(p(params)?),
            "apply_numpy_function" => Operation::ApplyNumpyFunction(p(params)?),
            "check_row_count" => Operation::CheckRowCount(p(params)?),
            "check_column_count" => Operation::CheckColumnCount(p(params)?),
            "check_missing_values" => Operation::CheckMissingValues(p(params)?),
            "check_data_types" => Operation::CheckDataTypes(p(params)?),
            other => {
                return Err(serde_json::Error::custom(format!(
                    "unknown operation '{other}'"
                )));
            }
        };
        Ok(operation)
    }

    /// Registered name of the operation.
    pub fn name(&self) -> &'static str {
        match self {
            Operation::RenameColumns(_) => "rename_columns",
            Operation::DropColumns(_) => "drop_columns",
            Operation::ConcatAndPadAas(_) => "concat_and_pad_aas",
            Operation::AddPunctuationStaplesAndStitches(_) => {
                "add_punctuation_staples_and_stitches"
            }
            Operation::AssignClassLabels(_) => "assign_class_labels",
            Operation::ConcatenateStitchesAndStaples(_) => "concatenate_stitches_and_staples",
            Operation::ConcatenateStitchesAndStaples2(_) => "concatenate_stitches_and_staples2",
            Operation::ConvertToPxc50Values(_) => "convert_to_pxc50_values",
            Operation::DropDuplicates(_) => "drop_duplicates",
            Operation::FilterRows(_) => "filter_rows",
            Operation::SortRows(_) => "sort_rows",
            Operation::SampleRows(_) => "sample_rows",
            Operation::ShuffleRows(_) => "shuffle_rows",
            Operation::ValidateRows(_) => "validate_rows",
            Operation::RemoveEmptyRows(_) => "remove_empty_rows",
            Operation::AggregateDataframe(_) => "aggregate_dataframe",
            Operation::AggregateWithCustomFunctions(_) => "aggregate_with_custom_functions",
            Operation::AggregateWithColumnFunctions(_) => "aggregate_with_column_functions",
            Operation::ApplyPandasFunction(_) => "apply_pandas_function",
            Operation::ApplyNumpyFunction(_) => "apply_numpy_function",
            Operation::CheckRowCount(_) => "check_row_count",
            Operation::CheckColumnCount(_) => "check_column_count",
            Operation::CheckMissingValues(_) => "check_missing_values",
            Operation::CheckDataTypes(_) => "check_data_types",
        }
    }

    /// Run the operation against `df`.
    pub fn apply(&self, df: &DataFrame) -> Result<StepOutcome, TableError> {
        let table = match self {
            Operation::RenameColumns(p) => rename_columns(df, &p.mapping)?,
            Operation::DropColumns(p) => drop_columns(df, &p.columns.to_vec())?,
            Operation::ConcatAndPadAas(p) => {
                concat_and_pad_aas(df, &p.columns, &p.output_column, p.pad)?
            }
            Operation::AddPunctuationStaplesAndStitches(p) => {
                add_punctuation_staples_and_stitches(df, &p.column, &p.output_column)?
            }
            Operation::AssignClassLabels(p) => {
                let threshold = Threshold::from_value(&p.threshold)?;
                assign_class_labels(df, &p.input_column, &threshold, &p.output_column)?
            }
            Operation::ConcatenateStitchesAndStaples(p) => {
                concatenate_stitches_and_staples(df, &p.column, &p.output_column)?
            }
            Operation::ConcatenateStitchesAndStaples2(p) => {
                concatenate_stitches_and_staples2(df, &p.column, &p.output_column)?
            }
            Operation::ConvertToPxc50Values(p) => {
                convert_to_pxc50_values(df, &p.input_column, &p.unit, &p.output_column)?
            }
            Operation::DropDuplicates(p) => {
                let subset = p.subset.as_ref().map(OneOrMany::to_vec);
                drop_duplicates(df, subset.as_deref(), &p.keep.as_name())?
            }
            Operation::FilterRows(p) => filter_rows(df, &p.column, &p.operator, &p.value)?,
            Operation::SortRows(p) => sort_rows(df, &p.by.to_vec(), &p.ascending.flags())?,
            Operation::SampleRows(p) => sample_rows(df, p.n, p.frac, p.seed, p.replace)?,
            Operation::ShuffleRows(p) => shuffle_rows(df, p.seed)?,
            Operation::ValidateRows(p) => validate_rows(df, &p.conditions)?,
            Operation::RemoveEmptyRows(p) => {
                let subset = p.subset.as_ref().map(OneOrMany::to_vec);
                remove_empty_rows(df, subset.as_deref())?
            }
            Operation::AggregateDataframe(p) => {
                aggregate_dataframe(df, &p.groupby_columns.to_vec(), &p.agg_spec)?
            }
            Operation::AggregateWithCustomFunctions(p) => {
                let mut custom = CustomFunctions::new();
                for (alias, builtin) in &p.custom_functions {
                    custom.alias(alias.clone(), builtin.parse::<Reducer>()?);
                }
                aggregate_with_custom_functions(
                    df,
                    &p.groupby_columns.to_vec(),
                    &p.agg_spec,
                    &custom,
                )?
            }
            Operation::AggregateWithColumnFunctions(p) => aggregate_with_column_functions(
                df,
                &p.groupby_columns.to_vec(),
                &p.column_functions,
                p.add_count_column,
                &p.count_column_name,
            )?,
            Operation::ApplyPandasFunction(p) => {
                let columns = p.columns.as_ref().map(OneOrMany::to_vec);
                apply_pandas_function(df, &p.function, p.n, p.value.as_ref(), columns.as_deref())?
            }
            Operation::ApplyNumpyFunction(p) => {
                let columns = p.columns.as_ref().map(OneOrMany::to_vec);
                apply_numpy_function(df, &p.function, columns.as_deref())?
            }
            Operation::CheckRowCount(p) => {
                return Ok(StepOutcome::Report(check_row_count(
                    df,
                    p.expected_count,
                    p.min_count,
                    p.max_count,
                )));
            }
            Operation::CheckColumnCount(p) => {
                return Ok(StepOutcome::Report(check_column_count(
                    df,
                    p.expected_count,
                    p.min_count,
                    p.max_count,
                )));
            }
            Operation::CheckMissingValues(p) => {
                return Ok(StepOutcome::Report(check_missing_values(df, p.threshold)?));
            }
            Operation::CheckDataTypes(p) => {
                return Ok(StepOutcome::Report(check_data_types(df, &p.expected_types)?));
            }
        };
        Ok(StepOutcome::Table(table))
    }
}
