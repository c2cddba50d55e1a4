//! Jenkins converters, scripted and declarative.
//!
//! Both share the Jenkins variant. Stages get a single job named
//! `<stage>_job`, since Jenkinsfiles have no job level.

use crate::error::{Error, Result};
use crate::ir::{Job, Pipeline, Stage, Step, UNKNOWN_TASK, UNNAMED_STEP, Variant};
use crate::loader::{Node, extract_jenkins_stages};

use super::stage_job_name;

pub fn convert_script(script: &str) -> Result<Pipeline> {
    let stages = extract_jenkins_stages(script);
    if stages.is_empty() {
        return Err(Error::missing_field(
            "stage",
            "Jenkins pipeline script (no stages found)",
        ));
    }

    let mut pipeline = Pipeline::new(Variant::Jenkins);
    for declared in stages {
        let mut job = Job::new(stage_job_name(&declared.name));
        for step in declared.steps {
            job.add_step(step);
        }
        let mut stage = Stage::new(declared.name);
        stage.add_job(job);
        pipeline.add_stage(stage);
    }
    Ok(pipeline)
}

pub fn convert_declarative(doc: &Node) -> Result<Pipeline> {
    const CONTEXT: &str = "Jenkins declarative pipeline";

    let body = doc
        .get("pipeline")
        .filter(|node| node.as_mapping().is_some_and(|map| !map.is_empty()))
        .ok_or_else(|| Error::missing_field("pipeline", CONTEXT))?;

    let stages = body.seq("stages");
    if stages.is_empty() {
        return Err(Error::missing_field("stages", CONTEXT));
    }

    let mut pipeline = Pipeline::new(Variant::Jenkins);
    for (index, stage_node) in stages.iter().enumerate() {
        let name = stage_node
            .str("name")
            .filter(|name| !name.is_empty())
            .ok_or_else(|| Error::missing_field("name", format!("stage {} of {CONTEXT}", index + 1)))?;

        let mut job = Job::new(stage_job_name(name));
        for step_node in stage_node.seq("steps") {
            job.add_step(step(step_node));
        }
        let mut stage = Stage::new(name);
        stage.add_job(job);
        pipeline.add_stage(stage);
    }
    Ok(pipeline)
}

fn step(node: &Node) -> Step {
    if let Some(command) = node.as_str() {
        return Step::script(command);
    }

    match node.get("sh") {
        Some(Node::Scalar(command)) => {
            Step::named_script(node.str("name").unwrap_or(command.as_str()), command.as_str())
        }
        Some(sh @ Node::Mapping(_)) => {
            let command = sh.str_or("script", "");
            let name = node
                .str("name")
                .or_else(|| sh.str("label"))
                .map_or_else(|| command.clone(), ToOwned::to_owned);
            Step::named_script(name, command)
        }
        _ => Step::new(
            node.str_or("name", UNNAMED_STEP),
            node.str_or("task", UNKNOWN_TASK),
        )
        .with_inputs(node.string_map("inputs"))
        .with_condition(node.str("condition").map(ToOwned::to_owned)),
    }
}
