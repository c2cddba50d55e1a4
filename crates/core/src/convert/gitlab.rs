//! GitLab CI converter.

use crate::ir::{Job, Pipeline, Stage, Step, Variant};
use crate::loader::Node;

/// Stages GitLab assumes when `stages` is not declared.
pub const DEFAULT_STAGES: [&str; 3] = ["build", "test", "deploy"];

/// Stage a job lands in when it does not name one.
pub const DEFAULT_JOB_STAGE: &str = "test";

/// Top-level keys that configure the pipeline rather than define a job.
pub const RESERVED_KEYS: [&str; 11] = [
    "default",
    "include",
    "stages",
    "types",
    "variables",
    "workflow",
    "image",
    "services",
    "cache",
    "before_script",
    "after_script",
];

pub fn convert(doc: &Node) -> Pipeline {
    let mut pipeline = Pipeline::new(Variant::GitLabCi);

    match doc.get("stages") {
        Some(stages @ Node::Sequence(_)) => {
            for name in stages.items().iter().filter_map(Node::as_str) {
                pipeline.add_stage(Stage::new(name));
            }
        }
        _ => {
            for name in DEFAULT_STAGES {
                pipeline.add_stage(Stage::new(name));
            }
        }
    }

    let Some(entries) = doc.as_mapping() else {
        return pipeline;
    };
    for (key, node) in entries {
        if RESERVED_KEYS.contains(&key.as_str()) || key.starts_with('.') {
            continue;
        }
        if node.as_mapping().is_none() {
            continue;
        }
        let stage = node.str("stage").unwrap_or(DEFAULT_JOB_STAGE);
        // Jobs naming an undeclared stage are dropped, as GitLab rejects them.
        let _ = pipeline.add_job_to_stage(stage, job(key, node));
    }
    pipeline
}

fn job(name: &str, node: &Node) -> Job {
    let mut job = Job::new(name);
    for line in script_lines(node.get("script")) {
        job.add_step(Step::script(line));
    }
    job
}

fn script_lines(node: Option<&Node>) -> Vec<&str> {
    match node {
        Some(Node::Scalar(line)) => vec![line.as_str()],
        Some(Node::Sequence(items)) => items
            .iter()
            .flat_map(|item| match item {
                Node::Sequence(nested) => nested.iter().filter_map(Node::as_str).collect(),
                other => other.as_str().into_iter().collect::<Vec<_>>(),
            })
            .collect(),
        _ => Vec::new(),
    }
}
