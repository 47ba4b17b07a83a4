//! End-to-end pipeline runs over files in a temporary directory.

use std::fs;
use std::path::Path;

use polars::prelude::*;
use serde_json::json;

use dpb_core::{PipelineError, run};
use dpb_ingest::read_table;
use dpb_model::TableError;

const PEPTIDES: &str = "\
peptide_id,Ncap,AA1,AA2,AA3,AA4,AA5,Ccap,ic50_nm
P1,Ac,S5,A,A,A,S5,NH2,10
P2,Ac,R8,L,L,L,S5,NH2,1000
P2,Ac,R8,L,L,L,S5,NH2,1000
P3,Ac,A,,K,E,A,NH2,5
P4,Ac,B5,A,A,A,A,NH2,
";

fn write_config(dir: &Path, config: &serde_json::Value) -> std::path::PathBuf {
    let path = dir.join("pipeline.json");
    fs::write(&path, serde_json::to_string_pretty(config).unwrap()).unwrap();
    path
}

fn text_column(df: &DataFrame, name: &str) -> Vec<Option<String>> {
    df.column(name)
        .unwrap()
        .str()
        .unwrap()
        .into_iter()
        .map(|v| v.map(str::to_string))
        .collect()
}

#[test]
fn peptide_workflow_writes_output() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("peptides.csv");
    fs::write(&input, PEPTIDES).unwrap();
    let output = dir.path().join("result.csv");

    let config = json!({
        "input_path": input,
        "output_path": output,
        "steps": [
            {"operation": "drop_duplicates", "params": {"subset": ["peptide_id"]}},
            {"operation": "check_row_count", "params": {"expected_count": 99}},
            {"operation": "concat_and_pad_aas", "params": {
                "cols_to_concat": ["Ncap", "AA1", "AA2", "AA3", "AA4", "AA5", "Ccap"],
                "output_col": "sequence"
            }},
            {"operation": "add_punctuation_staples_and_stitches", "params": {
                "col_name": "sequence", "output_col": "marked"
            }},
            {"operation": "concatenate_stitches_and_staples2", "params": {
                "column": "marked", "output_column": "merged"
            }},
            {"operation": "convert_to_pxc50_values", "params": {
                "input_column": "ic50_nm", "unit": "nM", "output_column": "pic50"
            }},
            {"operation": "assign_class_labels", "params": {
                "input_column": "pic50", "threshold": 7.5, "output_column": "active"
            }},
            {"operation": "remove_empty_rows", "params": {"subset": ["pic50"]}},
            {"operation": "sort_rows", "params": {"by": "pic50", "ascending": false}},
            {"operation": "drop_columns", "params": {"columns": ["AA1", "AA2", "AA3", "AA4", "AA5"]}}
        ]
    });
    let config_path = write_config(dir.path(), &config);

    let df = run(&config_path, None).unwrap();
    assert_eq!(df.height(), 3);
    assert_eq!(
        text_column(&df, "peptide_id"),
        vec![Some("P3".into()), Some("P1".into()), Some("P2".into())]
    );
    assert_eq!(
        text_column(&df, "merged"),
        vec![
            Some("Ac-A-blank-K-E-A-NH2".into()),
            Some("Ac-$S5$S5-A-A-A-STAP-NH2".into()),
            Some("Ac-$R8$S5-L-L-L-STAP-NH2".into()),
        ]
    );

    let written = read_table(&output).unwrap();
    assert_eq!(written.shape(), df.shape());
}

#[test]
fn explicit_output_overrides_config() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("peptides.csv");
    fs::write(&input, PEPTIDES).unwrap();
    let configured = dir.path().join("configured.csv");
    let explicit = dir.path().join("explicit.json");

    let config_path = write_config(
        dir.path(),
        &json!({
            "input_path": input,
            "output_path": configured,
            "steps": [{"operation": "shuffle_rows", "params": {"seed": 1}}]
        }),
    );
    run(&config_path, Some(&explicit)).unwrap();
    assert!(explicit.exists());
    assert!(!configured.exists());
}

#[test]
fn unknown_operation_fails_before_input_is_read() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("out.csv");
    let config_path = write_config(
        dir.path(),
        &json!({
            "input_path": dir.path().join("does-not-exist.csv"),
            "output_path": output,
            "steps": [{"operation": "explode_rows"}]
        }),
    );
    let err = run(&config_path, None).unwrap_err();
    assert!(matches!(err, PipelineError::InvalidConfig { .. }), "{err}");
    assert!(!output.exists());
}

#[test]
fn step_errors_carry_index_and_operation() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("peptides.csv");
    fs::write(&input, PEPTIDES).unwrap();
    let output = dir.path().join("out.csv");
    let config_path = write_config(
        dir.path(),
        &json!({
            "input_path": input,
            "output_path": output,
            "steps": [
                {"operation": "shuffle_rows"},
                {"operation": "filter_rows", "params": {"column": "potency", "operator": ">", "value": 1}}
            ]
        }),
    );
    match run(&config_path, None).unwrap_err() {
        PipelineError::Step {
            index,
            operation,
            source,
        } => {
            assert_eq!(index, 1);
            assert_eq!(operation, "filter_rows");
            assert!(matches!(source, TableError::UnknownColumn { .. }));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(!output.exists());
}

#[test]
fn missing_input_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = write_config(
        dir.path(),
        &json!({"input_path": dir.path().join("nope.csv"), "steps": []}),
    );
    let err = run(&config_path, None).unwrap_err();
    assert!(matches!(err, PipelineError::Ingest(_)));
}
