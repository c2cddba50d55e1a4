//! Pipeline Emitters
//!
//! Each variant has one emitter turning the IR back into its dialect's
//! native text. YAML dialects are built from typed, order-preserving schema
//! structs and serialized with `serde_yaml`; AWS CodePipeline is JSON and
//! Jenkins is written as declarative Groovy.
//!
//! Emission is a pure function of the IR. Dialect features the IR does not
//! capture (triggers, environments, caches) are filled with fixed defaults
//! taken from [`EmitOptions`].
//!
//! ## Emitter Registry
//!
//! The [`EmitterRegistry`] maps format names to emitters for callers that
//! pick a target at runtime.

mod aws;
mod azure;
mod bamboo;
mod circleci;
mod github;
mod gitlab;
mod jenkins;
mod registry;

pub use aws::CodePipelineEmitter;
pub use azure::{AzureEmitter, AzureLayout};
pub use bamboo::BambooEmitter;
pub use circleci::CircleCiEmitter;
pub use github::GitHubEmitter;
pub use gitlab::GitLabEmitter;
pub use jenkins::JenkinsEmitter;
pub use registry::{EmitterInfo, EmitterRegistry, EmitterRegistryBuilder};

use crate::error::{Error, Result};
use crate::ir::{Pipeline, Variant};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Trait for pipeline emitters.
///
/// # Example
///
/// ```ignore
/// use pipeshift_core::emitter::Emitter;
/// use pipeshift_core::{Pipeline, Result, Variant};
///
/// struct Outline;
///
/// impl Emitter for Outline {
///     fn emit(&self, pipeline: &Pipeline) -> Result<String> {
///         Ok(pipeline.stage_names().join("\n"))
///     }
///
///     fn format_name(&self) -> &'static str {
///         "outline"
///     }
///
///     fn file_extension(&self) -> &'static str {
///         ".txt"
///     }
///
///     fn variant(&self) -> Variant {
///         Variant::GitLabCi
///     }
/// }
/// ```
pub trait Emitter: Send + Sync {
    /// Render the pipeline as dialect text.
    ///
    /// # Errors
    /// Returns an error if the pipeline cannot be expressed in the dialect or
    /// serialization fails
    fn emit(&self, pipeline: &Pipeline) -> Result<String>;

    /// Format identifier, the dialect tag of the emitted text
    fn format_name(&self) -> &'static str;

    /// File extension for emitted files, including the dot
    fn file_extension(&self) -> &'static str;

    /// The variant this emitter renders natively
    fn variant(&self) -> Variant;

    /// Get a human-readable description of this emitter
    fn description(&self) -> &'static str {
        "CI configuration emitter"
    }

    /// Check that the pipeline can be emitted.
    ///
    /// # Errors
    /// Returns [`Error::StructuralViolation`] if validation fails
    fn validate(&self, pipeline: &Pipeline) -> Result<()> {
        let _ = pipeline;
        Ok(())
    }
}

/// Per-target emission settings, read from the `[emit]` config table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EmitOptions {
    /// Azure Pipelines settings
    pub azure: AzureEmitter,
    /// GitHub Actions settings
    pub github: GitHubEmitter,
    /// GitLab CI settings
    pub gitlab: GitLabEmitter,
    /// Jenkins settings
    pub jenkins: JenkinsEmitter,
    /// Bamboo settings
    pub bamboo: BambooEmitter,
    /// CircleCI settings
    pub circleci: CircleCiEmitter,
}

impl EmitOptions {
    /// The configured emitter for a variant.
    #[must_use]
    pub fn emitter_for(&self, variant: Variant) -> Box<dyn Emitter> {
        match variant {
            Variant::AzureDevOps => Box::new(self.azure.clone()),
            Variant::GitHubActions => Box::new(self.github.clone()),
            Variant::GitLabCi => Box::new(self.gitlab.clone()),
            Variant::Jenkins => Box::new(self.jenkins.clone()),
            Variant::Bamboo => Box::new(self.bamboo.clone()),
            Variant::CircleCi => Box::new(self.circleci.clone()),
            Variant::Aws => Box::new(CodePipelineEmitter),
        }
    }
}

impl Pipeline {
    /// Emit this pipeline in its own variant's dialect with default settings.
    ///
    /// # Errors
    /// Returns the emitter's error, see [`Emitter::emit`]
    pub fn to_text(&self) -> Result<String> {
        self.to_text_with(&EmitOptions::default())
    }

    /// Emit this pipeline in its own variant's dialect.
    ///
    /// # Errors
    /// Returns the emitter's error, see [`Emitter::emit`]
    pub fn to_text_with(&self, options: &EmitOptions) -> Result<String> {
        let emitter = options.emitter_for(self.variant());
        emitter.validate(self)?;
        let text = emitter.emit(self)?;
        tracing::debug!(
            format = emitter.format_name(),
            bytes = text.len(),
            "Emitted pipeline"
        );
        Ok(text)
    }
}

pub(crate) fn to_yaml<T: Serialize>(document: &T) -> Result<String> {
    serde_yaml::to_string(document).map_err(|e| Error::Serialization {
        message: e.to_string(),
    })
}

/// Render an input value, restoring lists and maps the loader flattened.
///
/// Only text in the loader's compact JSON form (see
/// [`crate::loader::Node::to_input_string`]) is turned back into structure;
/// anything else, `"[1, 2]"` included, stays a string. A plain string that
/// is byte-for-byte compact JSON is indistinguishable and is restored too.
pub(crate) fn input_value(raw: &str) -> serde_json::Value {
    if raw.starts_with('[') || raw.starts_with('{') {
        if let Ok(value) = serde_json::from_str::<serde_json::Value>(raw) {
            if value.to_string() == raw {
                return value;
            }
        }
    }
    serde_json::Value::String(raw.to_string())
}

/// Restrict a name to identifier characters.
///
/// Disallowed characters become `_`; a leading digit gets a `_` prefix.
pub(crate) fn identifier(name: &str, allow_dash: bool) -> String {
    let mut id: String = name
        .trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || (allow_dash && c == '-') {
                c
            } else {
                '_'
            }
        })
        .collect();
    if id.is_empty() || id.starts_with(|c: char| c.is_ascii_digit()) {
        id.insert(0, '_');
    }
    id
}

/// Hands out unique keys, suffixing repeats with `-<n>`.
#[derive(Debug, Default)]
pub(crate) struct KeyAllocator {
    taken: HashSet<String>,
}

impl KeyAllocator {
    /// An allocator that treats `reserved` as already taken.
    pub(crate) fn with_reserved(reserved: &[&str]) -> Self {
        Self {
            taken: reserved.iter().map(|r| (*r).to_string()).collect(),
        }
    }

    pub(crate) fn allocate(&mut self, base: &str) -> String {
        if self.taken.insert(base.to_string()) {
            return base.to_string();
        }
        let mut n = 2;
        loop {
            let candidate = format!("{base}-{n}");
            if self.taken.insert(candidate.clone()) {
                return candidate;
            }
            n += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{Job, Stage, Step};

    #[test]
    fn test_identifier() {
        assert_eq!(identifier("Build & Test", false), "Build___Test");
        assert_eq!(identifier("unit-tests", true), "unit-tests");
        assert_eq!(identifier("unit-tests", false), "unit_tests");
        assert_eq!(identifier("2nd", true), "_2nd");
        assert_eq!(identifier("", true), "_");
    }

    #[test]
    fn test_key_allocator() {
        let mut keys = KeyAllocator::with_reserved(&["stages"]);
        assert_eq!(keys.allocate("build"), "build");
        assert_eq!(keys.allocate("build"), "build-2");
        assert_eq!(keys.allocate("build"), "build-3");
        assert_eq!(keys.allocate("stages"), "stages-2");
    }

    #[test]
    fn test_input_value() {
        assert_eq!(input_value("make"), serde_json::json!("make"));
        assert_eq!(input_value(r#"["a","b"]"#), serde_json::json!(["a", "b"]));
        assert_eq!(input_value("[not json"), serde_json::json!("[not json"));
    }

    #[test]
    fn test_input_value_keeps_hand_written_json_text() {
        assert_eq!(input_value("[1, 2]"), serde_json::json!("[1, 2]"));
        assert_eq!(input_value(" {\"a\":1}"), serde_json::json!(" {\"a\":1}"));
        assert_eq!(input_value(r#"{"a":{"b":"c"}}"#), serde_json::json!({"a": {"b": "c"}}));
    }

    #[test]
    fn test_to_text_dispatches_on_variant() {
        let mut pipeline = Pipeline::new(Variant::Jenkins);
        pipeline.add_stage(Stage::new("Build"));
        assert!(pipeline.add_job_to_stage("Build", Job::new("Build_job").with_step(Step::script("make"))));

        let text = pipeline.to_text().unwrap();
        assert!(text.starts_with("pipeline {"));

        let text = pipeline.retarget(Variant::Aws).to_text().unwrap();
        assert!(text.contains("\"actionTypeId\""));
    }

    #[test]
    fn test_emit_options_from_toml() {
        let options: EmitOptions = toml::from_str(
            "[azure]\nlayout = \"jobs\"\n\n[github]\nruns_on = \"macos-latest\"\n",
        )
        .unwrap();
        assert_eq!(options.azure.layout, AzureLayout::Jobs);
        assert_eq!(options.github.runs_on, "macos-latest");
        assert_eq!(options.github.workflow_name, GitHubEmitter::default().workflow_name);
    }
}
