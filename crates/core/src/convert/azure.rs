//! Azure Pipelines converter.

use crate::ir::{Job, Pipeline, Stage, Step, UNKNOWN_TASK, UNNAMED_JOB, UNNAMED_STAGE, UNNAMED_STEP, Variant};
use crate::loader::Node;

/// Step keys that carry an inline shell command.
const SCRIPT_SHORTHANDS: [&str; 4] = ["script", "bash", "pwsh", "powershell"];

pub fn convert(doc: &Node) -> Pipeline {
    let mut pipeline = Pipeline::new(Variant::AzureDevOps);

    let stages = doc.seq("stages");
    if stages.is_empty() {
        // trigger/pr/jobs layout: one stage per job
        for job_node in doc.seq("jobs") {
            let job = job(job_node);
            let mut stage = Stage::new(job.name.clone());
            stage.add_job(job);
            pipeline.add_stage(stage);
        }
        return pipeline;
    }

    for stage_node in stages {
        let mut stage = Stage::new(stage_node.str_or("stage", UNNAMED_STAGE));
        for job_node in stage_node.seq("jobs") {
            stage.add_job(job(job_node));
        }
        pipeline.add_stage(stage);
    }
    pipeline
}

fn job(node: &Node) -> Job {
    let name = node.first_str(&["displayName", "job", "deployment"]).unwrap_or(UNNAMED_JOB);
    let mut job = Job::new(name);
    for step_node in node.seq("steps") {
        job.add_step(step(step_node));
    }
    job
}

fn step(node: &Node) -> Step {
    let condition = node.str("condition").map(ToOwned::to_owned);
    let name = node.first_str(&["displayName", "name"]);

    if let Some(command) = node.first_str(&SCRIPT_SHORTHANDS) {
        return Step::named_script(name.unwrap_or(command), command).with_condition(condition);
    }

    Step::new(name.unwrap_or(UNNAMED_STEP), node.str_or("task", UNKNOWN_TASK))
        .with_inputs(node.string_map("inputs"))
        .with_condition(condition)
}
