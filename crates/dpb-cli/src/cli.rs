//! CLI argument definitions.

use std::io::{self, IsTerminal};
use std::path::PathBuf;

use clap::{ColorChoice, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{InfoLevel, Verbosity};
use colorchoice_clap::Color;
use dpb_cli::logging::{LogConfig, LogFormat};
use tracing::level_filters::LevelFilter;

#[derive(Parser)]
#[command(
    name = "dataproduct-builder",
    version,
    about = "Run declarative transformation pipelines over peptide tables",
    long_about = "Run declarative transformation pipelines over peptide tables.\n\n\
                  A pipeline is a JSON or YAML file naming an input table (CSV, JSON,\n\
                  XLSX/XLS) and an ordered list of column, row, frame and quality steps."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for debug, -vv for trace, -q for warnings only).
    #[command(flatten)]
    pub verbosity: Verbosity<InfoLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Execute a pipeline configuration.
    Process(ProcessArgs),

    /// Write a template pipeline configuration.
    CreateConfig(CreateConfigArgs),

    /// List every registered operation.
    ListOperations,
}

#[derive(Parser)]
pub struct ProcessArgs {
    /// Pipeline configuration file (.json, .yaml or .yml).
    #[arg(value_name = "CONFIG")]
    pub config: PathBuf,

    /// Output table path (overrides the configuration's output_path).
    #[arg(short = 'o', long = "output", value_name = "OUTPUT")]
    pub output: Option<PathBuf>,
}

#[derive(Parser)]
pub struct CreateConfigArgs {
    /// Where to write the template; the extension picks JSON or YAML.
    #[arg(
        short = 'o',
        long = "output",
        value_name = "PATH",
        default_value = "example_config.json"
    )]
    pub output: PathBuf,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}

impl From<LogLevelArg> for LevelFilter {
    fn from(level: LogLevelArg) -> Self {
        match level {
            LogLevelArg::Error => LevelFilter::ERROR,
            LogLevelArg::Warn => LevelFilter::WARN,
            LogLevelArg::Info => LevelFilter::INFO,
            LogLevelArg::Debug => LevelFilter::DEBUG,
            LogLevelArg::Trace => LevelFilter::TRACE,
        }
    }
}

impl From<LogFormatArg> for LogFormat {
    fn from(format: LogFormatArg) -> Self {
        match format {
            LogFormatArg::Pretty => LogFormat::Pretty,
            LogFormatArg::Compact => LogFormat::Compact,
            LogFormatArg::Json => LogFormat::Json,
        }
    }
}

impl Cli {
    /// Logging setup for this invocation.
    ///
    /// `--log-level` beats `-v`/`-q`; with neither, `RUST_LOG` applies on
    /// top of the info default.
    pub fn log_config(&self) -> LogConfig {
        let explicit = self
            .log_level
            .map(LevelFilter::from)
            .or_else(|| {
                self.verbosity
                    .is_present()
                    .then(|| self.verbosity.tracing_level_filter())
            });
        let config = match explicit {
            Some(level) => LogConfig::default().with_level(level),
            None => LogConfig::default(),
        };
        let ansi = match self.color.color {
            ColorChoice::Always => true,
            ColorChoice::Never => false,
            ColorChoice::Auto => self.log_file.is_none() && io::stderr().is_terminal(),
        };
        config
            .with_format(self.log_format.into())
            .with_log_file(self.log_file.clone())
            .with_ansi(ansi)
    }
}
