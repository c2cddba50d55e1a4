//! Subcommand implementations
//!
//! Each command takes the input text and returns what should be written to
//! stdout, leaving I/O to `main`.

use crate::cli::OutputFormat;
use crate::config::Config;
use crate::errors::{CliError, Result};
use pipeshift_core::dialect::table;
use pipeshift_core::{Classification, ClassifyPolicy, Dialect, PipelineParser, classify_with, ir, translate};
use serde::Serialize;
use std::fmt::Write as _;
use std::io::Read;
use std::path::Path;

/// Read pipeline text from `file`, or from stdin when it is absent or `-`.
pub fn read_input(file: Option<&Path>) -> Result<String> {
    match file {
        Some(path) if path != Path::new("-") => {
            tracing::debug!(path = %path.display(), "Reading pipeline file");
            std::fs::read_to_string(path).map_err(|e| CliError::file("read", path, e))
        }
        _ => {
            tracing::debug!("Reading pipeline from stdin");
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .map_err(|source| CliError::Stdin { source })?;
            Ok(text)
        }
    }
}

#[derive(Serialize)]
struct ClassifyReport {
    format: &'static str,
    extension: &'static str,
    language: &'static str,
}

impl From<Classification> for ClassifyReport {
    fn from(value: Classification) -> Self {
        let (format, extension, language) = value.as_tuple();
        Self {
            format,
            extension,
            language,
        }
    }
}

/// `pipeshift classify`
pub fn classify(text: &str, policy: ClassifyPolicy, json: bool) -> Result<String> {
    let result = classify_with(text, policy);
    tracing::info!(%policy, format = result.format_tag(), "Classified input");

    if json {
        let report = ClassifyReport::from(result);
        return serde_json::to_string_pretty(&report)
            .map(|s| s + "\n")
            .map_err(|e| CliError::Output {
                format: "JSON",
                message: e.to_string(),
            });
    }
    let (format, extension, language) = result.as_tuple();
    Ok(format!("{format} {extension} {language}\n"))
}

/// `pipeshift parse`
pub fn parse(text: &str, from: &str, format: OutputFormat, check: bool) -> Result<String> {
    let pipeline = PipelineParser::new(text, from).parse()?;

    if check {
        ir::validate(&pipeline).map_err(|errors| CliError::Validation {
            issues: errors.iter().map(ToString::to_string).collect(),
        })?;
    }

    match format {
        OutputFormat::Json => serde_json::to_string_pretty(&pipeline)
            .map(|s| s + "\n")
            .map_err(|e| CliError::Output {
                format: "JSON",
                message: e.to_string(),
            }),
        OutputFormat::Yaml => serde_yaml::to_string(&pipeline).map_err(|e| CliError::Output {
            format: "YAML",
            message: e.to_string(),
        }),
    }
}

/// `pipeshift translate`
pub fn translate_text(text: &str, from: Option<&str>, to: &str, config: &Config) -> Result<String> {
    let to: Dialect = to.parse()?;
    let from = match from {
        Some(tag) => tag.parse()?,
        None => {
            let guess = classify_with(text, config.classify.policy);
            let dialect = guess.format.ok_or(CliError::UnknownFormat)?;
            tracing::info!(%dialect, policy = %config.classify.policy, "Detected source dialect");
            dialect
        }
    };

    let mut output = translate(text, from, to, &config.emit)?;
    if !output.ends_with('\n') {
        output.push('\n');
    }
    Ok(output)
}

#[derive(Serialize)]
struct FormatRow {
    tag: &'static str,
    variant: String,
    extension: &'static str,
    language: &'static str,
    keywords: &'static [&'static str],
}

/// `pipeshift formats`
pub fn formats(json: bool) -> Result<String> {
    let rows: Vec<FormatRow> = table()
        .map(|(dialect, info)| FormatRow {
            tag: info.tag,
            variant: dialect.variant().to_string(),
            extension: info.file_extension,
            language: info.language,
            keywords: info.keywords,
        })
        .collect();

    if json {
        return serde_json::to_string_pretty(&rows)
            .map(|s| s + "\n")
            .map_err(|e| CliError::Output {
                format: "JSON",
                message: e.to_string(),
            });
    }

    let mut out = format!("{:<25} {:<16} {:<8} {:<8} KEYWORDS\n", "TAG", "VARIANT", "EXT", "LANG");
    for row in rows {
        let _ = writeln!(
            out,
            "{:<25} {:<16} {:<8} {:<8} {}",
            row.tag,
            row.variant,
            row.extension,
            row.language,
            row.keywords.join(", ")
        );
    }
    Ok(out)
}
