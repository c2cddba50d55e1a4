//! AWS CodePipeline Emitter
//!
//! CodePipeline has no job level. Every step of every job in a stage is
//! flattened into that stage's `actions`.

use super::{Emitter, input_value};
use crate::error::{Error, Result};
use crate::ir::{Pipeline, Stage, Step, Variant};
use indexmap::IndexMap;
use serde::Serialize;

/// AWS CodePipeline emitter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CodePipelineEmitter;

#[derive(Serialize)]
struct Definition {
    version: &'static str,
    stages: Vec<StageDef>,
}

#[derive(Serialize)]
struct StageDef {
    name: String,
    actions: Vec<Action>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Action {
    name: String,
    action_type_id: ActionTypeId,
    configuration: IndexMap<String, serde_json::Value>,
    output_artifacts: Vec<serde_json::Value>,
    input_artifacts: Vec<serde_json::Value>,
    run_order: u32,
}

#[derive(Serialize)]
struct ActionTypeId {
    category: &'static str,
    owner: &'static str,
    provider: String,
    version: &'static str,
}

fn stage_def(stage: &Stage) -> StageDef {
    StageDef {
        name: stage.name.clone(),
        actions: stage.steps().map(action).collect(),
    }
}

fn action(step: &Step) -> Action {
    Action {
        name: step.name.clone(),
        action_type_id: ActionTypeId {
            category: "Build",
            owner: "AWS",
            provider: step.task.clone(),
            version: "1",
        },
        configuration: step
            .inputs
            .iter()
            .map(|(k, v)| (k.clone(), input_value(v)))
            .collect(),
        output_artifacts: Vec::new(),
        input_artifacts: Vec::new(),
        run_order: 1,
    }
}

impl Emitter for CodePipelineEmitter {
    fn emit(&self, pipeline: &Pipeline) -> Result<String> {
        self.validate(pipeline)?;
        let definition = Definition {
            version: "1.0",
            stages: pipeline.stages().iter().map(stage_def).collect(),
        };
        serde_json::to_string_pretty(&definition).map_err(|e| Error::Serialization {
            message: e.to_string(),
        })
    }

    fn format_name(&self) -> &'static str {
        "codepipeline"
    }

    fn file_extension(&self) -> &'static str {
        ".json"
    }

    fn variant(&self) -> Variant {
        Variant::Aws
    }

    fn description(&self) -> &'static str {
        "AWS CodePipeline JSON"
    }

    fn validate(&self, pipeline: &Pipeline) -> Result<()> {
        if pipeline.is_empty() {
            return Err(Error::structural("no stages in pipeline"));
        }
        if let Some(stage) = pipeline.stages().iter().find(|s| s.steps().next().is_none()) {
            return Err(Error::structural(format!("no actions in stage {}", stage.name)));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::Job;

    #[test]
    fn test_definition_shape() {
        let mut pipeline = Pipeline::new(Variant::Aws);
        pipeline.add_stage(Stage::new("Build"));
        assert!(pipeline.add_job_to_stage(
            "Build",
            Job::new("a").with_step(Step::new("Compile", "CodeBuild").with_input("ProjectName", "app"))
        ));
        assert!(pipeline.add_job_to_stage("Build", Job::new("b").with_step(Step::script("make"))));

        let json = CodePipelineEmitter.emit(&pipeline).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["version"], "1.0");
        let actions = value["stages"][0]["actions"].as_array().unwrap();
        assert_eq!(actions.len(), 2);
        assert_eq!(actions[0]["name"], "Compile");
        assert_eq!(actions[0]["actionTypeId"]["category"], "Build");
        assert_eq!(actions[0]["actionTypeId"]["owner"], "AWS");
        assert_eq!(actions[0]["actionTypeId"]["provider"], "CodeBuild");
        assert_eq!(actions[0]["actionTypeId"]["version"], "1");
        assert_eq!(actions[0]["configuration"]["ProjectName"], "app");
        assert_eq!(actions[0]["runOrder"], 1);
        assert_eq!(actions[1]["configuration"]["script"], "make");
    }

    #[test]
    fn test_no_stages() {
        let err = CodePipelineEmitter.emit(&Pipeline::new(Variant::Aws)).unwrap_err();
        assert!(matches!(err, Error::StructuralViolation { ref message } if message == "no stages in pipeline"));
    }

    #[test]
    fn test_stage_without_actions() {
        let mut pipeline = Pipeline::new(Variant::Aws);
        pipeline.add_stage(Stage::new("Build"));
        assert!(pipeline.add_job_to_stage("Build", Job::new("b").with_step(Step::script("make"))));
        pipeline.add_stage(Stage::new("Deploy"));
        assert!(pipeline.add_job_to_stage("Deploy", Job::new("empty")));

        let err = CodePipelineEmitter.emit(&pipeline).unwrap_err();
        assert_eq!(err.to_string(), Error::structural("no actions in stage Deploy").to_string());
    }
}
