//! CLI-specific error types
//!
//! Library failures pass through unchanged as diagnostics; everything the
//! CLI itself can get wrong (files, configuration, arguments) lives here.

use miette::{Diagnostic, SourceSpan};
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by the pipeshift command line front end
#[derive(Error, Debug, Diagnostic)]
pub enum CliError {
    #[error("Failed to {operation} {}", .path.display())]
    #[diagnostic(
        code(pipeshift::cli::file_error),
        help("Check file permissions and ensure the path exists")
    )]
    File {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read pipeline text from stdin")]
    #[diagnostic(code(pipeshift::cli::stdin_error))]
    Stdin {
        #[source]
        source: std::io::Error,
    },

    #[error("Configuration parsing failed: {message}")]
    #[diagnostic(code(pipeshift::cli::config_parse_error))]
    ConfigParse {
        message: String,
        #[source_code]
        src: miette::NamedSource<String>,
        #[label("error occurred here")]
        span: Option<SourceSpan>,
        #[help]
        help: Option<String>,
    },

    #[error("Could not determine the pipeline format")]
    #[diagnostic(
        code(pipeshift::cli::unknown_format),
        help("Pass --from <tag> explicitly; run 'pipeshift formats' to list tags")
    )]
    UnknownFormat,

    #[error("Pipeline failed validation with {} issue(s):\n{}", .issues.len(), .issues.join("\n"))]
    #[diagnostic(code(pipeshift::cli::validation_failed))]
    Validation { issues: Vec<String> },

    #[error("Failed to render output as {format}: {message}")]
    #[diagnostic(code(pipeshift::cli::output_error))]
    Output { format: &'static str, message: String },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Core(#[from] pipeshift_core::Error),
}

impl CliError {
    pub fn file(operation: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::File {
            operation,
            path: path.into(),
            source,
        }
    }

    /// Wrap a TOML decode failure, pointing at the offending span when known.
    pub fn config_parse(path: &std::path::Path, src: String, err: &toml::de::Error) -> Self {
        let span = err.span().map(SourceSpan::from);
        Self::ConfigParse {
            message: err.message().to_string(),
            src: miette::NamedSource::new(path.display().to_string(), src),
            span,
            help: Some("Known tables are [classify] and [emit.<target>]".to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, CliError>;
