//! CircleCI converter.
//!
//! Like GitHub Actions, CircleCI config has no stage level; each job
//! becomes a stage holding one job of the same name.

use crate::ir::{Job, Pipeline, Stage, Step, UNKNOWN_TASK, UNNAMED_JOB, UNNAMED_STEP, Variant};
use crate::loader::Node;
use indexmap::IndexMap;

/// Step parameter lifted into the IR step name.
const NAME_PARAM: &str = "name";

pub fn convert(doc: &Node) -> Pipeline {
    let mut pipeline = Pipeline::new(Variant::CircleCi);

    match doc.get("jobs") {
        Some(Node::Mapping(jobs)) => {
            for (name, job_node) in jobs {
                pipeline.add_stage(stage(name, job_node));
            }
        }
        Some(Node::Sequence(jobs)) => {
            for job_node in jobs {
                pipeline.add_stage(stage(job_node.str("name").unwrap_or(UNNAMED_JOB), job_node));
            }
        }
        _ => {}
    }
    pipeline
}

fn stage(name: &str, node: &Node) -> Stage {
    let mut job = Job::new(name);
    for step_node in node.seq("steps") {
        job.add_step(step(step_node));
    }
    let mut stage = Stage::new(name);
    stage.add_job(job);
    stage
}

fn step(node: &Node) -> Step {
    let entry = match node {
        Node::Scalar(task) => return Step::new(task.as_str(), task.as_str()),
        Node::Mapping(map) if map.len() == 1 => map.first(),
        _ => None,
    };
    let Some((key, body)) = entry else {
        return Step::new(node.str_or(NAME_PARAM, UNNAMED_STEP), node.str_or("task", UNKNOWN_TASK));
    };

    if key == "run" {
        return match body {
            Node::Scalar(command) => Step::script(command.as_str()),
            _ => {
                let command = body.str_or("command", "");
                match body.str(NAME_PARAM) {
                    Some(name) => Step::named_script(name, command),
                    None => Step::script(command),
                }
            }
        };
    }

    let mut inputs: IndexMap<String, String> = body
        .as_mapping()
        .map(|params| {
            params
                .iter()
                .map(|(k, v)| (k.clone(), v.to_input_string()))
                .collect()
        })
        .unwrap_or_default();
    let name = inputs.shift_remove(NAME_PARAM).unwrap_or_else(|| key.clone());
    Step::new(name, key.as_str()).with_inputs(inputs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::decode_yaml;

    const CONFIG: &str = "\
version: 2.1
jobs:
  build:
    docker:
      - image: cimg/rust:1.80
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
          paths: [target]
workflows:
  main:
    jobs: [build, deploy]
";

    #[test]
    fn test_jobs_become_stages() {
        let pipeline = convert(&decode_yaml(CONFIG).unwrap());
        assert_eq!(
            pipeline.name_outline(),
            vec![
                (
                    "build".to_string(),
                    vec![(
                        "build".to_string(),
                        vec![
                            "checkout".to_string(),
                            "cargo build".to_string(),
                            "Unit tests".to_string()
                        ]
                    )]
                ),
                (
                    "deploy".to_string(),
                    vec![("deploy".to_string(), vec!["Save target".to_string()])]
                ),
            ]
        );
    }

    #[test]
    fn test_step_kinds() {
        let pipeline = convert(&decode_yaml(CONFIG).unwrap());
        let build = &pipeline.stages()[0].jobs[0];
        assert_eq!(build.steps[0].task, "checkout");
        assert_eq!(build.steps[2].script_command(), Some("cargo test"));

        let cache = &pipeline.stages()[1].jobs[0].steps[0];
        assert_eq!(cache.task, "save_cache");
        assert_eq!(cache.inputs.get("name"), None);
        assert_eq!(cache.inputs["key"], "v1-target");
        assert_eq!(cache.inputs["paths"], r#"["target"]"#);
    }

    #[test]
    fn test_legacy_sequence_form() {
        let doc = decode_yaml("jobs:\n  - name: lint\n    steps: [checkout]\n  - steps: []\n").unwrap();
        assert_eq!(convert(&doc).stage_names(), ["lint", UNNAMED_JOB]);
    }
}
