//! GitLab CI Emitter

use super::{Emitter, KeyAllocator, to_yaml};
use crate::convert::gitlab::RESERVED_KEYS;
use crate::error::Result;
use crate::ir::{Job, Pipeline, Variant};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// GitLab CI emitter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GitLabEmitter {
    /// Default `image` for all jobs
    pub image: Option<String>,
}

#[derive(Serialize)]
struct Config {
    #[serde(skip_serializing_if = "Option::is_none")]
    image: Option<String>,
    stages: Vec<String>,
    #[serde(flatten)]
    jobs: IndexMap<String, ConfigJob>,
}

#[derive(Serialize)]
struct ConfigJob {
    stage: String,
    script: Vec<String>,
}

impl GitLabEmitter {
    /// Create an emitter with the default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the default image.
    #[must_use]
    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }

    fn build_config(&self, pipeline: &Pipeline) -> Config {
        let mut keys = KeyAllocator::with_reserved(&RESERVED_KEYS);
        let mut jobs = IndexMap::new();
        for stage in pipeline.stages() {
            for job in &stage.jobs {
                let base = job.name.trim_start_matches('.');
                jobs.insert(
                    keys.allocate(if base.is_empty() { "job" } else { base }),
                    ConfigJob {
                        stage: stage.name.clone(),
                        script: script_lines(job),
                    },
                );
            }
        }

        Config {
            image: self.image.clone(),
            stages: pipeline.stages().iter().map(|s| s.name.clone()).collect(),
            jobs,
        }
    }
}

fn script_lines(job: &Job) -> Vec<String> {
    job.steps
        .iter()
        .map(|step| match step.script_command() {
            Some(command) => command.to_string(),
            None => format!("# {}: {}", step.name, step.task),
        })
        .collect()
}

impl Emitter for GitLabEmitter {
    fn emit(&self, pipeline: &Pipeline) -> Result<String> {
        to_yaml(&self.build_config(pipeline))
    }

    fn format_name(&self) -> &'static str {
        "gitlab-ci"
    }

    fn file_extension(&self) -> &'static str {
        ".yaml"
    }

    fn variant(&self) -> Variant {
        Variant::GitLabCi
    }

    fn description(&self) -> &'static str {
        "GitLab CI YAML"
    }
}
