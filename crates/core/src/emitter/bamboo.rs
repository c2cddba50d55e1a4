//! Bamboo Specs Emitter
//!
//! Stages list their jobs by key; each job is defined once at the top level
//! of the document with its `tasks`.

use super::{Emitter, KeyAllocator, input_value, to_yaml};
use crate::error::Result;
use crate::ir::{Job, Pipeline, Step, Variant};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Top-level keys a job definition must not shadow.
const RESERVED_KEYS: [&str; 6] = ["version", "plan", "stages", "variables", "repositories", "triggers"];

/// Bamboo Specs emitter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BambooEmitter {
    /// `plan.project-key`
    pub project_key: String,
    /// `plan.key`
    pub plan_key: String,
    /// `plan.name`
    pub plan_name: String,
}

impl Default for BambooEmitter {
    fn default() -> Self {
        Self {
            project_key: "PROJ".to_string(),
            plan_key: "PLAN".to_string(),
            plan_name: "Pipeline".to_string(),
        }
    }
}

#[derive(Serialize)]
struct Specs {
    version: u32,
    plan: Plan,
    stages: Vec<IndexMap<String, StageBody>>,
    #[serde(flatten)]
    jobs: IndexMap<String, JobBody>,
}

#[derive(Serialize)]
#[serde(rename_all = "kebab-case")]
struct Plan {
    project_key: String,
    key: String,
    name: String,
}

#[derive(Serialize)]
struct StageBody {
    jobs: Vec<String>,
}

#[derive(Serialize)]
struct JobBody {
    tasks: Vec<Task>,
}

/// Exactly one of the two task kinds is set.
#[derive(Serialize)]
#[serde(rename_all = "kebab-case")]
struct Task {
    #[serde(skip_serializing_if = "Option::is_none")]
    script: Option<ScriptTask>,
    #[serde(skip_serializing_if = "Option::is_none")]
    any_task: Option<AnyTask>,
}

#[derive(Serialize)]
struct ScriptTask {
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    scripts: Vec<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "kebab-case")]
struct AnyTask {
    plugin_key: String,
    description: String,
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    configuration: IndexMap<String, serde_json::Value>,
}

impl BambooEmitter {
    /// Create an emitter with the default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the project and plan keys.
    #[must_use]
    pub fn with_plan(mut self, project_key: impl Into<String>, plan_key: impl Into<String>) -> Self {
        self.project_key = project_key.into();
        self.plan_key = plan_key.into();
        self
    }

    fn build_specs(&self, pipeline: &Pipeline) -> Specs {
        let mut keys = KeyAllocator::with_reserved(&RESERVED_KEYS);
        let mut jobs: IndexMap<String, JobBody> = IndexMap::new();
        let mut stages = Vec::with_capacity(pipeline.stages().len());

        for stage in pipeline.stages() {
            let mut refs = Vec::with_capacity(stage.jobs.len());
            for job in &stage.jobs {
                let key = keys.allocate(&job.name);
                jobs.insert(key.clone(), job_body(job));
                refs.push(key);
            }
            let mut entry = IndexMap::new();
            entry.insert(stage.name.clone(), StageBody { jobs: refs });
            stages.push(entry);
        }

        Specs {
            version: 2,
            plan: Plan {
                project_key: self.project_key.clone(),
                key: self.plan_key.clone(),
                name: self.plan_name.clone(),
            },
            stages,
            jobs,
        }
    }
}

fn job_body(job: &Job) -> JobBody {
    JobBody {
        tasks: job.steps.iter().map(task).collect(),
    }
}

fn task(step: &Step) -> Task {
    if let Some(command) = step.script_command() {
        return Task {
            script: Some(ScriptTask {
                description: (step.name != command).then(|| step.name.clone()),
                scripts: vec![command.to_string()],
            }),
            any_task: None,
        };
    }

    Task {
        script: None,
        any_task: Some(AnyTask {
            plugin_key: step.task.clone(),
            description: step.name.clone(),
            configuration: step
                .inputs
                .iter()
                .map(|(k, v)| (k.clone(), input_value(v)))
                .collect(),
        }),
    }
}

impl Emitter for BambooEmitter {
    fn emit(&self, pipeline: &Pipeline) -> Result<String> {
        to_yaml(&self.build_specs(pipeline))
    }

    fn format_name(&self) -> &'static str {
        "bamboo"
    }

    fn file_extension(&self) -> &'static str {
        ".yaml"
    }

    fn variant(&self) -> Variant {
        Variant::Bamboo
    }

    fn description(&self) -> &'static str {
        "Bamboo Specs YAML"
    }
}
