//! Step execution and the end-to-end pipeline run.

use std::path::Path;
use std::time::Instant;

use polars::prelude::DataFrame;
use tracing::{debug, error, info, info_span, warn};

use dpb_ingest::{read_table, write_table};
use dpb_model::ReportMessage;

use crate::config::{Step, load_config, validate_config};
use crate::error::{PipelineError, Result};

/// What an operation produced.
#[derive(Debug)]
pub enum StepOutcome {
    /// A replacement table.
    Table(DataFrame),
    /// A quality-check report; the table is unchanged.
    Report(ReportMessage),
}

/// Run one step. `index` is zero-based and tags any error.
///
/// Quality-check reports are logged and the input table is returned as is.
pub fn execute_step(df: DataFrame, step: &Step, index: usize) -> Result<DataFrame> {
    let operation = step.name();
    let span = info_span!("step", index = index + 1, operation);
    let _guard = span.enter();
    let start = Instant::now();

    info!("executing step {}: {operation}", index + 1);
    debug!(params = %step.params, "step parameters");

    match step.operation.apply(&df) {
        Ok(StepOutcome::Table(result)) => {
            info!(
                rows = result.height(),
                columns = result.width(),
                duration_ms = start.elapsed().as_millis(),
                "step completed"
            );
            Ok(result)
        }
        Ok(StepOutcome::Report(report)) => {
            if report.is_passed() {
                info!("validation result: {report}");
            } else {
                warn!("validation result: {report}");
            }
            Ok(df)
        }
        Err(source) => {
            error!(error = %source, "step failed");
            Err(PipelineError::Step {
                index,
                operation: operation.to_string(),
                source,
            })
        }
    }
}

/// Load, validate and run the pipeline described by `config_path`.
///
/// `output_path` takes precedence over the configuration's own
/// `output_path`; when neither is set the result is only returned.
pub fn run(config_path: &Path, output_path: Option<&Path>) -> Result<DataFrame> {
    let span = info_span!("pipeline", config = %config_path.display());
    let _guard = span.enter();
    let start = Instant::now();

    let config = validate_config(&load_config(config_path)?)?;
    info!(
        input = %config.input_path.display(),
        steps = config.steps.len(),
        "starting pipeline"
    );

    let mut df = read_table(&config.input_path)?;
    info!(rows = df.height(), columns = df.width(), "loaded input table");

    for (index, step) in config.steps.iter().enumerate() {
        df = execute_step(df, step, index)?;
    }

    if let Some(path) = output_path.or(config.output_path.as_deref()) {
        info!(output = %path.display(), "saving output table");
        write_table(&df, path)?;
    }

    info!(
        rows = df.height(),
        columns = df.width(),
        duration_ms = start.elapsed().as_millis(),
        "pipeline completed"
    );
    Ok(df)
}
