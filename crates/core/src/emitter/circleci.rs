//! CircleCI Emitter
//!
//! One CircleCI job per stage, all run by a single workflow in stage order.

use super::{Emitter, KeyAllocator, input_value, to_yaml};
use crate::error::Result;
use crate::ir::{Pipeline, Step, Variant};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// CircleCI emitter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CircleCiEmitter {
    /// Docker image for every job
    pub image: String,
    /// Workflow name
    pub workflow: String,
}

impl Default for CircleCiEmitter {
    fn default() -> Self {
        Self {
            image: "cimg/base:stable".to_string(),
            workflow: "main".to_string(),
        }
    }
}

#[derive(Serialize)]
struct Config {
    version: f64,
    jobs: IndexMap<String, ConfigJob>,
    workflows: IndexMap<String, Workflow>,
}

#[derive(Serialize)]
struct ConfigJob {
    docker: Vec<DockerImage>,
    steps: Vec<ConfigStep>,
}

#[derive(Serialize)]
struct DockerImage {
    image: String,
}

#[derive(Serialize)]
struct Workflow {
    jobs: Vec<String>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum ConfigStep {
    /// `- checkout`
    Bare(String),
    /// `- run: ...` or `- save_cache: {...}`
    Keyed(IndexMap<String, serde_json::Value>),
}

impl CircleCiEmitter {
    /// Create an emitter with the default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the docker image.
    #[must_use]
    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = image.into();
        self
    }

    fn build_config(&self, pipeline: &Pipeline) -> Config {
        let mut keys = KeyAllocator::default();
        let mut jobs = IndexMap::new();
        for stage in pipeline.stages() {
            let job = ConfigJob {
                docker: vec![DockerImage {
                    image: self.image.clone(),
                }],
                steps: stage.steps().map(config_step).collect(),
            };
            jobs.insert(keys.allocate(&stage.name), job);
        }

        let mut workflows = IndexMap::new();
        workflows.insert(
            self.workflow.clone(),
            Workflow {
                jobs: jobs.keys().cloned().collect(),
            },
        );

        Config {
            version: 2.1,
            jobs,
            workflows,
        }
    }
}

fn config_step(step: &Step) -> ConfigStep {
    let mut entry = IndexMap::new();

    if let Some(command) = step.script_command() {
        let run = if step.name == command {
            serde_json::Value::String(command.to_string())
        } else {
            serde_json::json!({ "name": step.name, "command": command })
        };
        entry.insert("run".to_string(), run);
        return ConfigStep::Keyed(entry);
    }

    if step.name == step.task && step.inputs.is_empty() {
        return ConfigStep::Bare(step.task.clone());
    }

    let mut params = serde_json::Map::new();
    if step.name != step.task {
        params.insert("name".to_string(), serde_json::Value::String(step.name.clone()));
    }
    for (key, value) in &step.inputs {
        params.insert(key.clone(), input_value(value));
    }
    entry.insert(step.task.clone(), serde_json::Value::Object(params));
    ConfigStep::Keyed(entry)
}

impl Emitter for CircleCiEmitter {
    fn emit(&self, pipeline: &Pipeline) -> Result<String> {
        to_yaml(&self.build_config(pipeline))
    }

    fn format_name(&self) -> &'static str {
        "circleci"
    }

    fn file_extension(&self) -> &'static str {
        ".yaml"
    }

    fn variant(&self) -> Variant {
        Variant::CircleCi
    }

    fn description(&self) -> &'static str {
        "CircleCI config YAML"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{Job, Stage};

    #[test]
    fn test_config_shape() {
        let mut pipeline = Pipeline::new(Variant::CircleCi);
        pipeline.add_stage(Stage::new("build"));
        pipeline.add_stage(Stage::new("deploy"));
        assert!(pipeline.add_job_to_stage(
            "build",
            Job::new("build")
                .with_step(Step::new("checkout", "checkout"))
                .with_step(Step::script("cargo build"))
                .with_step(Step::named_script("Unit tests", "cargo test"))
        ));
        assert!(pipeline.add_job_to_stage(
            "deploy",
            Job::new("deploy").with_step(
                Step::new("Save target", "save_cache")
                    .with_input("key", "v1-target")
                    .with_input("paths", r#"["target"]"#)
            )
        ));

        let yaml = CircleCiEmitter::new().emit(&pipeline).unwrap();
        let expected = "\
version: 2.1
jobs:
  build:
    docker:
    - image: cimg/base:stable
    steps:
    - checkout
    - run: cargo build
    - run:
        name: Unit tests
        command: cargo test
  deploy:
    docker:
    - image: cimg/base:stable
    steps:
    - save_cache:
        name: Save target
        key: v1-target
        paths:
        - target
workflows:
  main:
    jobs:
    - build
    - deploy
";
        assert_eq!(yaml, expected);
    }
}
