//! Command line definition

use crate::tracing::{LogLevel, TracingFormat};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Environment variable naming the configuration file.
pub const CONFIG_ENV: &str = "PIPESHIFT_CONFIG";

#[derive(Parser, Debug)]
#[command(name = "pipeshift")]
#[command(about = "Translate CI/CD pipeline definitions between systems")]
#[command(long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Logging verbosity level.
    #[arg(
        short = 'l',
        long,
        global = true,
        help = "Set logging level",
        default_value = "warn",
        value_enum
    )]
    pub level: LogLevel,

    /// Log line format on stderr.
    #[arg(long, global = true, default_value = "compact", value_enum)]
    pub log_format: TracingFormat,

    /// Configuration file; `pipeshift.toml` in the working directory is used when absent.
    #[arg(long, global = true, env = CONFIG_ENV)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Guess the dialect of a pipeline file.
    #[command(about = "Guess the dialect of a pipeline file")]
    Classify {
        /// Input file; stdin when absent or `-`
        file: Option<PathBuf>,

        /// Require every keyword of a dialect instead of the ordered rules
        #[arg(long)]
        strict: bool,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Parse a pipeline and print its intermediate representation.
    #[command(about = "Parse a pipeline and print its intermediate representation")]
    Parse {
        /// Input file; stdin when absent or `-`
        file: Option<PathBuf>,

        /// Source dialect tag
        #[arg(long)]
        from: String,

        /// Output encoding for the representation
        #[arg(long, default_value = "json", value_enum)]
        format: OutputFormat,

        /// Fail when the parsed pipeline has structural issues
        #[arg(long)]
        check: bool,
    },

    /// Translate a pipeline into another system's dialect.
    #[command(about = "Translate a pipeline into another system's dialect")]
    Translate {
        /// Input file; stdin when absent or `-`
        file: Option<PathBuf>,

        /// Source dialect tag; classified from the text when absent
        #[arg(long)]
        from: Option<String>,

        /// Target dialect tag
        #[arg(long)]
        to: String,
    },

    /// List supported dialects.
    #[command(about = "List supported dialects")]
    Formats {
        /// Print the table as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Json,
    Yaml,
}
