//! GitHub Actions Emitter
//!
//! Each stage becomes one workflow job keyed by the stage name; steps of all
//! the stage's jobs run in order inside it.

use super::{Emitter, KeyAllocator, identifier, input_value, to_yaml};
use crate::error::Result;
use crate::ir::{Pipeline, Stage, Step, Variant};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// GitHub Actions emitter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GitHubEmitter {
    /// Workflow `name`
    pub workflow_name: String,
    /// Runner label for every job
    pub runs_on: String,
}

impl Default for GitHubEmitter {
    fn default() -> Self {
        Self {
            workflow_name: "CI".to_string(),
            runs_on: "ubuntu-latest".to_string(),
        }
    }
}

#[derive(Serialize)]
struct Workflow {
    name: String,
    #[serde(rename = "on")]
    on: Vec<&'static str>,
    jobs: IndexMap<String, WorkflowJob>,
}

#[derive(Serialize)]
#[serde(rename_all = "kebab-case")]
struct WorkflowJob {
    name: String,
    runs_on: String,
    steps: Vec<WorkflowStep>,
}

#[derive(Serialize)]
struct WorkflowStep {
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(rename = "if", skip_serializing_if = "Option::is_none")]
    condition: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    uses: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    run: Option<String>,
    #[serde(rename = "with", skip_serializing_if = "IndexMap::is_empty")]
    with_inputs: IndexMap<String, serde_json::Value>,
}

impl GitHubEmitter {
    /// Create an emitter with the default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the runner label.
    #[must_use]
    pub fn with_runs_on(mut self, runs_on: impl Into<String>) -> Self {
        self.runs_on = runs_on.into();
        self
    }

    fn build_workflow(&self, pipeline: &Pipeline) -> Workflow {
        let mut keys = KeyAllocator::default();
        let jobs = pipeline
            .stages()
            .iter()
            .map(|stage| {
                let key = keys.allocate(&identifier(&stage.name, true));
                (key, self.workflow_job(stage))
            })
            .collect();

        Workflow {
            name: self.workflow_name.clone(),
            on: vec!["push"],
            jobs,
        }
    }

    fn workflow_job(&self, stage: &Stage) -> WorkflowJob {
        let name = match stage.jobs.as_slice() {
            [only] => only.name.clone(),
            _ => stage.name.clone(),
        };
        WorkflowJob {
            name,
            runs_on: self.runs_on.clone(),
            steps: stage.steps().map(workflow_step).collect(),
        }
    }
}

fn workflow_step(step: &Step) -> WorkflowStep {
    let condition = step.condition.clone();
    if let Some(command) = step.script_command() {
        return WorkflowStep {
            name: (step.name != command).then(|| step.name.clone()),
            condition,
            uses: None,
            run: Some(command.to_string()),
            with_inputs: IndexMap::new(),
        };
    }

    WorkflowStep {
        name: (step.name != step.task).then(|| step.name.clone()),
        condition,
        uses: Some(step.task.clone()),
        run: None,
        with_inputs: step
            .inputs
            .iter()
            .map(|(k, v)| (k.clone(), input_value(v)))
            .collect(),
    }
}

impl Emitter for GitHubEmitter {
    fn emit(&self, pipeline: &Pipeline) -> Result<String> {
        to_yaml(&self.build_workflow(pipeline))
    }

    fn format_name(&self) -> &'static str {
        "github-actions"
    }

    fn file_extension(&self) -> &'static str {
        ".yaml"
    }

    fn variant(&self) -> Variant {
        Variant::GitHubActions
    }

    fn description(&self) -> &'static str {
        "GitHub Actions workflow YAML"
    }
}
