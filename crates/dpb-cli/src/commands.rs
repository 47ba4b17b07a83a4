use std::time::Instant;

use anyhow::Result;
use tracing::info;

use dpb_cli::listing::{operations_table, total_line};
use dpb_core::{OPERATIONS, create_example_config, run};

use crate::cli::{CreateConfigArgs, ProcessArgs};

pub fn run_process(args: &ProcessArgs) -> Result<()> {
    let start = Instant::now();
    let df = run(&args.config, args.output.as_deref())?;
    let (rows, columns) = df.shape();
    info!(
        rows,
        columns,
        duration_ms = start.elapsed().as_millis(),
        "process complete"
    );
    println!("✅ Pipeline completed: {rows} rows x {columns} columns");
    Ok(())
}

pub fn run_create_config(args: &CreateConfigArgs) -> Result<()> {
    create_example_config(&args.output)?;
    println!(
        "✅ Example configuration written to {}",
        args.output.display()
    );
    Ok(())
}

pub fn run_list_operations() -> Result<()> {
    println!("{}", operations_table(OPERATIONS));
    println!("{}", total_line(OPERATIONS.len()));
    Ok(())
}
