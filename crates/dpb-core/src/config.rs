//! Pipeline configuration loading and validation.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value, json};
use tracing::{debug, info};

use crate::error::{PipelineError, Result};
use crate::operation::Operation;
use crate::registry::{find_operation, operation_names};

/// Configuration file syntax, chosen by extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Json,
    Yaml,
}

impl ConfigFormat {
    /// Detect the format from a path's extension (case-insensitive).
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        match extension.as_str() {
            "json" => Ok(ConfigFormat::Json),
            "yaml" | "yml" => Ok(ConfigFormat::Yaml),
            _ => Err(PipelineError::UnsupportedFormat {
                path: path.to_path_buf(),
                extension,
            }),
        }
    }
}

/// One validated pipeline step.
#[derive(Debug, Clone)]
pub struct Step {
    pub operation: Operation,
    /// Parameters as written, kept for logging.
    pub params: Value,
}

impl Step {
    pub fn name(&self) -> &'static str {
        self.operation.name()
    }
}

/// A validated pipeline configuration.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub input_path: PathBuf,
    pub output_path: Option<PathBuf>,
    pub steps: Vec<Step>,
}

/// Read a JSON or YAML configuration file into a raw value tree.
pub fn load_config(path: &Path) -> Result<Value> {
    if !path.exists() {
        return Err(PipelineError::ConfigNotFound {
            path: path.to_path_buf(),
        });
    }
    let format = ConfigFormat::from_path(path)?;
    let parse_error = |message: String| PipelineError::ConfigParse {
        path: path.to_path_buf(),
        message,
    };

    let text = fs::read_to_string(path).map_err(|e| parse_error(e.to_string()))?;
    let value = match format {
        ConfigFormat::Json => serde_json::from_str(&text).map_err(|e| parse_error(e.to_string()))?,
        ConfigFormat::Yaml => serde_yaml::from_str(&text).map_err(|e| parse_error(e.to_string()))?,
    };
    debug!(path = %path.display(), ?format, "loaded configuration");
    Ok(value)
}

fn required<'a>(config: &'a Map<String, Value>, field: &str) -> Result<&'a Value> {
    config
        .get(field)
        .ok_or_else(|| PipelineError::invalid_config(format!("missing required field: {field}")))
}

fn path_field(value: &Value, field: &str) -> Result<PathBuf> {
    value
        .as_str()
        .map(PathBuf::from)
        .ok_or_else(|| PipelineError::invalid_config(format!("'{field}' must be a string")))
}

fn validate_step(index: usize, raw: &Value) -> Result<Step> {
    let number = index + 1;
    let Value::Object(step) = raw else {
        return Err(PipelineError::invalid_config(format!(
            "step {number}: must be a mapping with an 'operation' field"
        )));
    };
    let Some(name) = step.get("operation") else {
        return Err(PipelineError::invalid_config(format!(
            "step {number}: missing 'operation' field"
        )));
    };
    let Some(name) = name.as_str() else {
        return Err(PipelineError::invalid_config(format!(
            "step {number}: 'operation' must be a string"
        )));
    };
    if find_operation(name).is_none() {
        return Err(PipelineError::invalid_config(format!(
            "step {number}: unknown operation '{name}'. Available: {}",
            operation_names().join(", ")
        )));
    }

    let params = match step.get("params") {
        None | Some(Value::Null) => Value::Object(Map::new()),
        Some(params @ Value::Object(_)) => params.clone(),
        Some(_) => {
            return Err(PipelineError::invalid_config(format!(
                "step {number} ({name}): 'params' must be a mapping"
            )));
        }
    };
    let operation = Operation::from_params(name, params.clone()).map_err(|e| {
        PipelineError::invalid_config(format!("step {number} ({name}): invalid params: {e}"))
    })?;
    Ok(Step { operation, params })
}

/// Check the configuration shape and parse every step.
///
/// Fails on a missing `input_path` or `steps`, a non-list `steps`, a step
/// without an `operation`, an unregistered operation name, or parameters
/// that do not fit the operation.
pub fn validate_config(config: &Value) -> Result<PipelineConfig> {
    let Value::Object(config) = config else {
        return Err(PipelineError::invalid_config(
            "configuration must be a mapping",
        ));
    };

    let input_path = path_field(required(config, "input_path")?, "input_path")?;
    let Value::Array(raw_steps) = required(config, "steps")? else {
        return Err(PipelineError::invalid_config("'steps' must be a list"));
    };
    let output_path = match config.get("output_path") {
        None | Some(Value::Null) => None,
        Some(value) => Some(path_field(value, "output_path")?),
    };

    let steps = raw_steps
        .iter()
        .enumerate()
        .map(|(index, raw)| validate_step(index, raw))
        .collect::<Result<Vec<_>>>()?;

    Ok(PipelineConfig {
        input_path,
        output_path,
        steps,
    })
}

fn example_config() -> Value {
    json!({
        "input_path": "data/input.csv",
        "output_path": "data/output.csv",
        "steps": [
            {
                "operation": "drop_duplicates",
                "params": {"subset": ["sequence_id"], "keep": "first"}
            },
            {
                "operation": "filter_rows",
                "params": {"column": "activity", "operator": ">", "value": 0.5}
            },
            {
                "operation": "concat_and_pad_aas",
                "params": {
                    "columns": ["Ncap", "AA1", "AA2", "AA3", "AA4", "AA5", "Ccap"],
                    "output_column": "sequence",
                    "pad": true
                }
            },
            {
                "operation": "add_punctuation_staples_and_stitches",
                "params": {"column": "sequence", "output_column": "sequence_with_punctuation"}
            },
            {
                "operation": "concatenate_stitches_and_staples2",
                "params": {"column": "sequence_with_punctuation", "output_column": "sequence_merged"}
            },
            {
                "operation": "assign_class_labels",
                "params": {"input_column": "activity", "threshold": 0.7, "output_column": "activity_class"}
            },
            {
                "operation": "sort_rows",
                "params": {"by": "activity", "ascending": false}
            },
            {
                "operation": "sample_rows",
                "params": {"n": 1000, "seed": 42}
            },
            {
                "operation": "check_missing_values",
                "params": {"threshold": 0.1}
            }
        ]
    })
}

/// Write a template configuration to `path`, as JSON or YAML by extension.
pub fn create_example_config(path: &Path) -> Result<()> {
    let format = ConfigFormat::from_path(path)?;
    let config = example_config();
    let text = match format {
        ConfigFormat::Json => serde_json::to_string_pretty(&config).map_err(|e| e.to_string()),
        ConfigFormat::Yaml => serde_yaml::to_string(&config).map_err(|e| e.to_string()),
    }
    .map_err(|message| PipelineError::ConfigParse {
        path: path.to_path_buf(),
        message,
    })?;
    fs::write(path, text).map_err(|source| PipelineError::ConfigWrite {
        path: path.to_path_buf(),
        source,
    })?;
    info!(path = %path.display(), "example configuration written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp(suffix: &str, contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    fn invalid_message(config: &Value) -> String {
        match validate_config(config).unwrap_err() {
            PipelineError::InvalidConfig { message } => message,
            other => panic!("expected InvalidConfig, got {other}"),
        }
    }

    #[test]
    fn loads_json_and_yaml() {
        let json = write_temp(".json", r#"{"input_path": "a.csv", "steps": []}"#);
        let yaml = write_temp(".YML", "input_path: a.csv\nsteps: []\n");
        assert_eq!(load_config(json.path()).unwrap(), load_config(yaml.path()).unwrap());
    }

    #[test]
    fn load_errors() {
        assert!(matches!(
            load_config(Path::new("/definitely/not/here.json")).unwrap_err(),
            PipelineError::ConfigNotFound { .. }
        ));
        let toml = write_temp(".toml", "input_path = 'a.csv'");
        assert!(matches!(
            load_config(toml.path()).unwrap_err(),
            PipelineError::UnsupportedFormat { .. }
        ));
        let broken = write_temp(".json", "{ not json");
        assert!(matches!(
            load_config(broken.path()).unwrap_err(),
            PipelineError::ConfigParse { .. }
        ));
    }

    #[test]
    fn required_fields() {
        assert_eq!(
            invalid_message(&json!({"steps": []})),
            "missing required field: input_path"
        );
        assert_eq!(
            invalid_message(&json!({"input_path": "a.csv"})),
            "missing required field: steps"
        );
        assert_eq!(
            invalid_message(&json!({"input_path": "a.csv", "steps": {}})),
            "'steps' must be a list"
        );
        assert!(invalid_message(&json!([])).contains("mapping"));
    }

    #[test]
    fn step_shape() {
        let message = invalid_message(&json!({
            "input_path": "a.csv",
            "steps": [{"operation": "drop_columns", "params": {"columns": ["x"]}}, {"params": {}}]
        }));
        assert_eq!(message, "step 2: missing 'operation' field");
    }

    #[test]
    fn unknown_operation_lists_choices() {
        let message = invalid_message(&json!({
            "input_path": "a.csv",
            "steps": [{"operation": "pivot_table"}]
        }));
        assert!(message.starts_with("step 1: unknown operation 'pivot_table'"));
        assert!(message.contains("filter_rows"));
        assert!(message.contains("check_data_types"));
    }

    #[test]
    fn bad_params_are_invalid_config() {
        let message = invalid_message(&json!({
            "input_path": "a.csv",
            "steps": [{"operation": "sample_rows", "params": {"n": "ten"}}]
        }));
        assert!(message.starts_with("step 1 (sample_rows): invalid params"));
    }

    #[test]
    fn valid_config_is_typed() {
        let config = validate_config(&json!({
            "input_path": "in.csv",
            "output_path": "out.json",
            "steps": [
                {"operation": "shuffle_rows"},
                {"operation": "check_row_count", "params": {"min_count": 1}}
            ]
        }))
        .unwrap();
        assert_eq!(config.input_path, PathBuf::from("in.csv"));
        assert_eq!(config.output_path, Some(PathBuf::from("out.json")));
        let names: Vec<&str> = config.steps.iter().map(Step::name).collect();
        assert_eq!(names, vec!["shuffle_rows", "check_row_count"]);
    }

    #[test]
    fn example_config_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["example.json", "example.yaml"] {
            let path = dir.path().join(name);
            create_example_config(&path).unwrap();
            let config = validate_config(&load_config(&path).unwrap()).unwrap();
            assert_eq!(config.steps.len(), 9);
        }
        assert!(matches!(
            create_example_config(&dir.path().join("example.txt")).unwrap_err(),
            PipelineError::UnsupportedFormat { .. }
        ));
    }
}
