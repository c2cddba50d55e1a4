//! Error types for pipeline parsing, conversion and emission.

use crate::ir::Variant;
use miette::Diagnostic;
use thiserror::Error;

/// Result type alias for pipeshift operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while turning pipeline text into IR and back.
///
/// Every variant is recoverable: callers are expected to surface the
/// message and let the user retry with corrected input.
#[derive(Error, Debug, Clone, PartialEq, Eq, Diagnostic)]
pub enum Error {
    /// The input was empty after pre-processing, or decoded to nothing.
    #[error("Empty pipeline input")]
    #[diagnostic(
        code(pipeshift::empty_input),
        help("Provide pipeline text; fences and blank lines are stripped before parsing")
    )]
    EmptyInput,

    /// The YAML or JSON payload could not be decoded.
    #[error("{format} parsing error{}: {message}", location_suffix(.line, .column))]
    #[diagnostic(
        code(pipeshift::decode),
        help("Check indentation and quoting around the reported position")
    )]
    Decode {
        /// Payload format ("YAML" or "JSON")
        format: &'static str,
        /// Message reported by the decoder
        message: String,
        /// 1-based line, when the decoder reports one
        line: Option<usize>,
        /// 1-based column, when the decoder reports one
        column: Option<usize>,
    },

    /// A key the dialect requires was not present.
    #[error("Missing required field '{field}' in {context}")]
    #[diagnostic(code(pipeshift::missing_field))]
    MissingRequiredField {
        /// The missing key
        field: String,
        /// Where the key was expected
        context: String,
    },

    /// The dialect tag is not in the dispatch table.
    #[error("Unsupported pipeline type: {tag}")]
    #[diagnostic(
        code(pipeshift::unsupported_dialect),
        help(
            "Supported types: azure-pipelines, github-actions, gitlab-ci, jenkinsfile-scripted, jenkinsfile-declarative, bamboo, circleci, codepipeline"
        )
    )]
    UnsupportedDialect {
        /// The rejected tag
        tag: String,
    },

    /// The IR cannot be expressed in the target dialect.
    #[error("Structural violation: {message}")]
    #[diagnostic(code(pipeshift::structural_violation))]
    StructuralViolation {
        /// What is wrong with the structure
        message: String,
    },

    /// A Pipeline of one variant was passed where another was required.
    #[error("Pipeline variant mismatch: expected {expected}, found {found}")]
    #[diagnostic(
        code(pipeshift::type_mismatch),
        help("Use Pipeline::retarget to move a pipeline between variants")
    )]
    TypeMismatch {
        /// The variant the converter produces
        expected: Variant,
        /// The variant that was supplied
        found: Variant,
    },

    /// Serializing the emitted document failed.
    #[error("Serialization failed: {message}")]
    #[diagnostic(code(pipeshift::serialization))]
    Serialization {
        /// The serializer's message
        message: String,
    },
}

fn location_suffix(line: &Option<usize>, column: &Option<usize>) -> String {
    match (line, column) {
        (Some(line), Some(column)) => format!(" on line {line}, column {column}"),
        (Some(line), None) => format!(" on line {line}"),
        _ => String::new(),
    }
}

impl Error {
    /// Create a missing field error.
    pub fn missing_field(field: impl Into<String>, context: impl Into<String>) -> Self {
        Self::MissingRequiredField {
            field: field.into(),
            context: context.into(),
        }
    }

    /// Create a structural violation error.
    pub fn structural(message: impl Into<String>) -> Self {
        Self::StructuralViolation {
            message: message.into(),
        }
    }

    /// Create an unsupported dialect error.
    pub fn unsupported(tag: impl Into<String>) -> Self {
        Self::UnsupportedDialect { tag: tag.into() }
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(err: serde_yaml::Error) -> Self {
        let location = err.location();
        Self::Decode {
            format: "YAML",
            message: err.to_string(),
            line: location.as_ref().map(|l| l.line()),
            column: location.as_ref().map(|l| l.column()),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        let (line, column) = (err.line(), err.column());
        Self::Decode {
            format: "JSON",
            message: err.to_string(),
            line: (line > 0).then_some(line),
            column: (column > 0).then_some(column),
        }
    }
}
