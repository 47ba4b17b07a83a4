//! `dataproduct-builder`: run declarative table pipelines from the shell.

use clap::Parser;
use dpb_cli::logging::init_logging;

mod cli;
mod commands;

use crate::cli::{Cli, Command};
use crate::commands::{run_create_config, run_list_operations, run_process};

fn main() {
    let cli = Cli::parse();
    cli.color.write_global();
    let log_config = cli.log_config();
    if let Err(error) = init_logging(&log_config) {
        eprintln!("error: failed to initialize logging: {error}");
        std::process::exit(1);
    }
    let result = match &cli.command {
        Command::Process(args) => run_process(args),
        Command::CreateConfig(args) => run_create_config(args),
        Command::ListOperations => run_list_operations(),
    };
    let exit_code = match result {
        Ok(()) => 0,
        Err(error) => {
            eprintln!("❌ error: {error:#}");
            1
        }
    };
    std::process::exit(exit_code);
}
