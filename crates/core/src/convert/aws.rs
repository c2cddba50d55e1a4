//! AWS CodePipeline converter.
//!
//! CodePipeline has no job level: a stage's `actions` are gathered into one
//! job named `<stage>_job`. Stages that spell out `jobs[].steps[]` are read
//! structurally instead.

use crate::ir::{Job, Pipeline, Stage, Step, UNKNOWN_TASK, UNNAMED_JOB, UNNAMED_STAGE, UNNAMED_STEP, Variant};
use crate::loader::Node;

use super::stage_job_name;

pub fn convert(doc: &Node) -> Pipeline {
    let mut pipeline = Pipeline::new(Variant::Aws);

    let root = doc
        .get("pipeline")
        .filter(|node| node.as_mapping().is_some())
        .unwrap_or(doc);

    for stage_node in root.seq("stages") {
        pipeline.add_stage(stage(stage_node));
    }
    pipeline
}

fn stage(node: &Node) -> Stage {
    let name = match node {
        Node::Scalar(name) => name.as_str(),
        _ => node.str("name").unwrap_or(UNNAMED_STAGE),
    };
    let mut stage = Stage::new(name);

    let actions = node.seq("actions");
    if !actions.is_empty() {
        let mut job = Job::new(stage_job_name(name));
        for action in actions {
            job.add_step(action_step(action));
        }
        stage.add_job(job);
    }

    for job_node in node.seq("jobs") {
        let mut job = Job::new(job_node.str_or("name", UNNAMED_JOB));
        for step_node in job_node.seq("steps") {
            job.add_step(
                Step::new(
                    step_node.str_or("name", UNNAMED_STEP),
                    step_node.str_or("task", UNKNOWN_TASK),
                )
                .with_inputs(step_node.string_map("inputs")),
            );
        }
        stage.add_job(job);
    }
    stage
}

fn action_step(action: &Node) -> Step {
    let provider = action
        .get("actionTypeId")
        .and_then(|id| id.str("provider"))
        .unwrap_or(UNKNOWN_TASK);
    Step::new(action.str_or("name", UNNAMED_STEP), provider)
        .with_inputs(action.string_map("configuration"))
}
