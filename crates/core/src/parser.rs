//! Pipeline parser facade.
//!
//! Chains the phases for one dialect: pre-processing, structural load and
//! conversion. A parse either yields the whole pipeline or an error, never a
//! partly populated one.

use crate::convert::convert;
use crate::dialect::Dialect;
use crate::emitter::EmitOptions;
use crate::error::Result;
use crate::ir::Pipeline;
use crate::loader::load;
use crate::preprocess::normalize;

/// Parser for one piece of pipeline text in a named dialect.
///
/// # Example
///
/// ```
/// use pipeshift_core::PipelineParser;
///
/// let text = "stages:\n  - build\ncompile:\n  stage: build\n  script:\n    - make\n";
/// let pipeline = PipelineParser::new(text, "gitlab-ci").parse().unwrap();
/// assert_eq!(pipeline.stage_names(), ["build"]);
/// ```
#[derive(Debug, Clone)]
pub struct PipelineParser<'a> {
    text: &'a str,
    tag: &'a str,
}

impl<'a> PipelineParser<'a> {
    /// Create a parser for `text` written in the dialect named by `tag`.
    #[must_use]
    pub const fn new(text: &'a str, tag: &'a str) -> Self {
        Self { text, tag }
    }

    /// Parse the text into a pipeline.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::UnsupportedDialect`] for an unknown tag and
    /// any pre-processing, decode or conversion error otherwise.
    pub fn parse(&self) -> Result<Pipeline> {
        let dialect: Dialect = self.tag.parse()?;
        parse(self.text, dialect)
    }
}

/// Parse pipeline text written in `dialect`.
///
/// # Errors
///
/// Returns [`crate::Error::EmptyInput`] when nothing is left after cleaning,
/// a decode error for malformed YAML or JSON, and the converter's error for
/// documents missing required structure.
pub fn parse(text: &str, dialect: Dialect) -> Result<Pipeline> {
    tracing::debug!(%dialect, bytes = text.len(), "Parsing pipeline");
    let normalized = normalize(text, dialect)?;
    let source = load(normalized)?;
    convert(dialect, source)
}

/// Parse text written in `from` and emit it in the dialect of `to`.
///
/// # Errors
///
/// Returns any parse error (see [`parse`]) and any error raised by the
/// target emitter.
pub fn translate(text: &str, from: Dialect, to: Dialect, options: &EmitOptions) -> Result<String> {
    let pipeline = parse(text, from)?;
    tracing::debug!(%from, %to, stages = pipeline.stages().len(), "Translating pipeline");
    pipeline.retarget(to.variant()).to_text_with(options)
}
