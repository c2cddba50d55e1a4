//! Azure Pipelines Emitter
//!
//! | IR | Azure YAML (`stages` layout) |
//! |----|------------------------------|
//! | `stage.name` | `stages[].stage` |
//! | `job.name` | `jobs[].job` (identifier) + `displayName` |
//! | script step | `script` + `displayName` |
//! | other step | `task` + `displayName` + `inputs` |
//! | `step.condition` | `condition` |

use super::{Emitter, identifier, input_value, to_yaml};
use crate::error::Result;
use crate::ir::{Job, Pipeline, Step, Variant};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Top-level layout of emitted Azure YAML.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AzureLayout {
    /// `stages[].jobs[].steps[]`
    #[default]
    Stages,
    /// `jobs[].steps[]`, one job per stage
    Jobs,
}

/// Azure Pipelines emitter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AzureEmitter {
    /// Output layout
    pub layout: AzureLayout,
    /// Branch for the `trigger` and `pr` filters
    pub branch: String,
}

impl Default for AzureEmitter {
    fn default() -> Self {
        Self {
            layout: AzureLayout::Stages,
            branch: "main".to_string(),
        }
    }
}

#[derive(Serialize)]
struct Document {
    trigger: BranchFilter,
    pr: BranchFilter,
    #[serde(skip_serializing_if = "Option::is_none")]
    stages: Option<Vec<StageDef>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    jobs: Option<Vec<JobDef>>,
}

#[derive(Serialize)]
struct BranchFilter {
    branches: Include,
}

#[derive(Serialize)]
struct Include {
    include: Vec<String>,
}

#[derive(Serialize)]
struct StageDef {
    stage: String,
    jobs: Vec<JobDef>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JobDef {
    job: String,
    display_name: String,
    steps: Vec<StepDef>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StepDef {
    #[serde(skip_serializing_if = "Option::is_none")]
    script: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    task: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    display_name: Option<String>,
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    inputs: IndexMap<String, serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    condition: Option<String>,
}

impl AzureEmitter {
    /// Create an emitter with the default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Use the given layout.
    #[must_use]
    pub const fn with_layout(mut self, layout: AzureLayout) -> Self {
        self.layout = layout;
        self
    }

    fn filter(&self) -> BranchFilter {
        BranchFilter {
            branches: Include {
                include: vec![self.branch.clone()],
            },
        }
    }

    fn build_document(&self, pipeline: &Pipeline) -> Document {
        let (stages, jobs) = match self.layout {
            AzureLayout::Stages => {
                let stages = pipeline
                    .stages()
                    .iter()
                    .map(|stage| StageDef {
                        stage: stage.name.clone(),
                        jobs: stage.jobs.iter().map(job_def).collect(),
                    })
                    .collect();
                (Some(stages), None)
            }
            AzureLayout::Jobs => {
                let jobs = pipeline
                    .stages()
                    .iter()
                    .map(|stage| JobDef {
                        job: identifier(&stage.name, false),
                        display_name: stage.name.clone(),
                        steps: stage.steps().map(step_def).collect(),
                    })
                    .collect();
                (None, Some(jobs))
            }
        };

        Document {
            trigger: self.filter(),
            pr: self.filter(),
            stages,
            jobs,
        }
    }
}

fn job_def(job: &Job) -> JobDef {
    JobDef {
        job: identifier(&job.name, false),
        display_name: job.name.clone(),
        steps: job.steps.iter().map(step_def).collect(),
    }
}

fn step_def(step: &Step) -> StepDef {
    let condition = step.condition.clone();
    if let Some(command) = step.script_command() {
        return StepDef {
            script: Some(command.to_string()),
            task: None,
            display_name: (step.name != command).then(|| step.name.clone()),
            inputs: IndexMap::new(),
            condition,
        };
    }

    StepDef {
        script: None,
        task: Some(step.task.clone()),
        display_name: Some(step.name.clone()),
        inputs: step
            .inputs
            .iter()
            .map(|(k, v)| (k.clone(), input_value(v)))
            .collect(),
        condition,
    }
}

impl Emitter for AzureEmitter {
    fn emit(&self, pipeline: &Pipeline) -> Result<String> {
        to_yaml(&self.build_document(pipeline))
    }

    fn format_name(&self) -> &'static str {
        "azure-pipelines"
    }

    fn file_extension(&self) -> &'static str {
        ".yaml"
    }

    fn variant(&self) -> Variant {
        Variant::AzureDevOps
    }

    fn description(&self) -> &'static str {
        "Azure Pipelines YAML"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::Stage;

    fn pipeline() -> Pipeline {
        let mut pipeline = Pipeline::new(Variant::AzureDevOps);
        pipeline.add_stage(Stage::new("Build"));
        let job = Job::new("Compile all")
            .with_step(
                Step::new("Run", "Bash@3")
                    .with_input("script", "make")
                    .with_condition(Some("succeeded()".into())),
            )
            .with_step(Step::script("make install"));
        assert!(pipeline.add_job_to_stage("Build", job));
        pipeline
    }

    #[test]
    fn test_stages_layout() {
        let yaml = AzureEmitter::new().emit(&pipeline()).unwrap();
        let expected = "\
trigger:
  branches:
    include:
    - main
pr:
  branches:
    include:
    - main
stages:
- stage: Build
  jobs:
  - job: Compile_all
    displayName: Compile all
    steps:
    - task: Bash@3
      displayName: Run
      inputs:
        script: make
      condition: succeeded()
    - script: make install
";
        assert_eq!(yaml, expected);
    }

    #[test]
    fn test_jobs_layout() {
        let yaml = AzureEmitter::new()
            .with_layout(AzureLayout::Jobs)
            .emit(&pipeline())
            .unwrap();
        assert!(yaml.contains("jobs:\n- job: Build\n  displayName: Build\n  steps:\n"));
        assert!(!yaml.contains("stages:"));
    }
}
