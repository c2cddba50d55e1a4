//! Pipeline IR Types
//!
//! The provider-agnostic object graph every converter produces and every
//! emitter consumes: `Pipeline` → `Stage` → `Job` → `Step`.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Task identifier used for plain shell commands.
///
/// Converters represent `run:`/`script:`/`sh` style commands as a step with
/// this task and the command stored under [`SCRIPT_INPUT`].
pub const SCRIPT_TASK: &str = "script";

/// Input key holding the command of a [`SCRIPT_TASK`] step.
pub const SCRIPT_INPUT: &str = "script";

/// Default step name when the source omits one.
pub const UNNAMED_STEP: &str = "Unnamed Step";

/// Default job name when the source omits one.
pub const UNNAMED_JOB: &str = "Unnamed Job";

/// Default stage name when the source omits one.
pub const UNNAMED_STAGE: &str = "Unnamed Stage";

/// Default task when the source omits one.
pub const UNKNOWN_TASK: &str = "Unknown Task";

/// The closed set of pipeline variants.
///
/// Each variant owns one converter and one emitter; both Jenkins dialects
/// (scripted and declarative) share [`Variant::Jenkins`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Variant {
    /// Azure DevOps Pipelines
    #[serde(rename = "azure-devops")]
    AzureDevOps,
    /// GitHub Actions
    #[serde(rename = "github-actions")]
    GitHubActions,
    /// GitLab CI
    #[serde(rename = "gitlab-ci")]
    GitLabCi,
    /// Jenkins (scripted or declarative)
    #[serde(rename = "jenkins")]
    Jenkins,
    /// Atlassian Bamboo
    #[serde(rename = "bamboo")]
    Bamboo,
    /// CircleCI
    #[serde(rename = "circleci")]
    CircleCi,
    /// AWS CodePipeline
    #[serde(rename = "aws")]
    Aws,
}

impl Variant {
    /// All variants in dispatch-table order.
    pub const ALL: [Self; 7] = [
        Self::AzureDevOps,
        Self::GitHubActions,
        Self::GitLabCi,
        Self::Jenkins,
        Self::Bamboo,
        Self::CircleCi,
        Self::Aws,
    ];

    /// Human-readable provider name.
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::AzureDevOps => "Azure DevOps",
            Self::GitHubActions => "GitHub Actions",
            Self::GitLabCi => "GitLab CI",
            Self::Jenkins => "Jenkins",
            Self::Bamboo => "Bamboo",
            Self::CircleCi => "CircleCI",
            Self::Aws => "AWS CodePipeline",
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Smallest unit of work.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    /// Display name
    pub name: String,

    /// Identifier of the action to run (plugin id, action ref, provider)
    pub task: String,

    /// Task parameters, in declaration order
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub inputs: IndexMap<String, String>,

    /// Dialect-specific guard expression
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
}

impl Step {
    /// Create a step with no inputs and no condition.
    pub fn new(name: impl Into<String>, task: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            task: task.into(),
            inputs: IndexMap::new(),
            condition: None,
        }
    }

    /// Create a shell command step named after the command itself.
    pub fn script(command: impl Into<String>) -> Self {
        let command = command.into();
        Self::new(command.clone(), SCRIPT_TASK).with_input(SCRIPT_INPUT, command)
    }

    /// Create a named shell command step.
    pub fn named_script(name: impl Into<String>, command: impl Into<String>) -> Self {
        Self::new(name, SCRIPT_TASK).with_input(SCRIPT_INPUT, command)
    }

    /// Add an input parameter.
    #[must_use]
    pub fn with_input(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.inputs.insert(key.into(), value.into());
        self
    }

    /// Replace all input parameters.
    #[must_use]
    pub fn with_inputs(mut self, inputs: IndexMap<String, String>) -> Self {
        self.inputs = inputs;
        self
    }

    /// Set the guard expression.
    #[must_use]
    pub fn with_condition(mut self, condition: Option<String>) -> Self {
        self.condition = condition;
        self
    }

    /// The shell command, if this is a script step.
    #[must_use]
    pub fn script_command(&self) -> Option<&str> {
        if self.task == SCRIPT_TASK {
            self.inputs.get(SCRIPT_INPUT).map(String::as_str)
        } else {
            None
        }
    }
}

/// A named, ordered sequence of steps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
    /// Job name
    pub name: String,

    /// Steps in execution order
    #[serde(default)]
    pub steps: Vec<Step>,
}

impl Job {
    /// Create an empty job.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            steps: Vec::new(),
        }
    }

    /// Append a step.
    pub fn add_step(&mut self, step: Step) {
        self.steps.push(step);
    }

    /// Builder form of [`Job::add_step`].
    #[must_use]
    pub fn with_step(mut self, step: Step) -> Self {
        self.steps.push(step);
        self
    }
}

/// A named, ordered sequence of jobs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stage {
    /// Stage name, used as the lookup key when attaching jobs
    pub name: String,

    /// Jobs in declaration order
    #[serde(default)]
    pub jobs: Vec<Job>,
}

impl Stage {
    /// Create an empty stage.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            jobs: Vec::new(),
        }
    }

    /// Append a job.
    pub fn add_job(&mut self, job: Job) {
        self.jobs.push(job);
    }

    /// Iterate over every step of every job, in order.
    pub fn steps(&self) -> impl Iterator<Item = &Step> {
        self.jobs.iter().flat_map(|job| job.steps.iter())
    }
}

/// Root IR node.
///
/// Created empty by a converter, populated stage by stage, then handed
/// read-only to an emitter or a visualiser.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pipeline {
    variant: Variant,
    #[serde(default)]
    stages: Vec<Stage>,
}

/// Ordered stage/job/step names of a pipeline.
pub type NameOutline = Vec<(String, Vec<(String, Vec<String>)>)>;

impl Pipeline {
    /// Create an empty pipeline of the given variant.
    #[must_use]
    pub fn new(variant: Variant) -> Self {
        Self {
            variant,
            stages: Vec::new(),
        }
    }

    /// The pipeline variant.
    #[must_use]
    pub fn variant(&self) -> Variant {
        self.variant
    }

    /// Stages in declaration order.
    #[must_use]
    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    /// Whether the pipeline has no stages.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Append a stage.
    pub fn add_stage(&mut self, stage: Stage) {
        self.stages.push(stage);
    }

    /// Attach a job to the first stage with the given name.
    ///
    /// Returns `false` and drops the job when no stage matches. Repeated
    /// stage names are not merged: the first declaration receives the job.
    #[must_use]
    pub fn add_job_to_stage(&mut self, stage_name: &str, job: Job) -> bool {
        if let Some(stage) = self.stages.iter_mut().find(|s| s.name == stage_name) {
            stage.add_job(job);
            true
        } else {
            tracing::warn!(
                stage = stage_name,
                job = %job.name,
                variant = %self.variant,
                "Dropping job attached to unknown stage"
            );
            false
        }
    }

    /// Move the same stage tree into another variant.
    #[must_use]
    pub fn retarget(self, variant: Variant) -> Self {
        Self {
            variant,
            stages: self.stages,
        }
    }

    /// Ordered stage → job → step names.
    #[must_use]
    pub fn name_outline(&self) -> NameOutline {
        self.stages
            .iter()
            .map(|stage| {
                let jobs = stage
                    .jobs
                    .iter()
                    .map(|job| {
                        let steps = job.steps.iter().map(|s| s.name.clone()).collect();
                        (job.name.clone(), steps)
                    })
                    .collect();
                (stage.name.clone(), jobs)
            })
            .collect()
    }

    /// Stage names in order.
    #[must_use]
    pub fn stage_names(&self) -> Vec<&str> {
        self.stages.iter().map(|s| s.name.as_str()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Pipeline {
        let mut pipeline = Pipeline::new(Variant::AzureDevOps);
        pipeline.add_stage(Stage::new("Build"));
        pipeline.add_stage(Stage::new("Test"));
        pipeline
    }

    #[test]
    fn test_add_job_to_existing_stage() {
        let mut pipeline = sample();
        assert!(pipeline.add_job_to_stage("Test", Job::new("unit")));
        assert_eq!(pipeline.stages()[1].jobs[0].name, "unit");
        assert!(pipeline.stages()[0].jobs.is_empty());
    }

    #[test]
    fn test_add_job_to_unknown_stage_is_dropped() {
        let mut pipeline = sample();
        assert!(!pipeline.add_job_to_stage("Deploy", Job::new("ship")));
        assert!(pipeline.stages().iter().all(|s| s.jobs.is_empty()));
    }

    #[test]
    fn test_duplicate_stage_names_first_match_wins() {
        let mut pipeline = sample();
        pipeline.add_stage(Stage::new("Build"));
        assert!(pipeline.add_job_to_stage("Build", Job::new("compile")));
        assert_eq!(pipeline.stages()[0].jobs.len(), 1);
        assert!(pipeline.stages()[2].jobs.is_empty());
    }

    #[test]
    fn test_step_defaults() {
        let step = Step::new("Run", "Bash@3");
        assert!(step.inputs.is_empty());
        assert!(step.condition.is_none());
        assert!(step.script_command().is_none());
    }

    #[test]
    fn test_script_step() {
        let step = Step::script("make test");
        assert_eq!(step.name, "make test");
        assert_eq!(step.task, SCRIPT_TASK);
        assert_eq!(step.script_command(), Some("make test"));
    }

    #[test]
    fn test_retarget_keeps_tree() {
        let mut pipeline = sample();
        assert!(pipeline.add_job_to_stage("Build", Job::new("compile").with_step(Step::script("make"))));
        let outline = pipeline.name_outline();
        let moved = pipeline.retarget(Variant::GitLabCi);
        assert_eq!(moved.variant(), Variant::GitLabCi);
        assert_eq!(moved.name_outline(), outline);
    }

    #[test]
    fn test_ir_serializes_in_order() {
        let mut pipeline = sample();
        assert!(pipeline.add_job_to_stage(
            "Build",
            Job::new("compile").with_step(
                Step::new("Run", "Bash@3")
                    .with_input("script", "make")
                    .with_input("workingDirectory", "src")
            )
        ));
        let json = serde_json::to_string(&pipeline).unwrap();
        assert!(json.starts_with("{\"variant\":\"azure-devops\""));
        let script = json.find("\"script\"").unwrap();
        let workdir = json.find("\"workingDirectory\"").unwrap();
        assert!(script < workdir);
    }
}
