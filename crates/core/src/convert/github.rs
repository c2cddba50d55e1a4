//! GitHub Actions converter.
//!
//! Workflows have no stage level: every job becomes a stage named by its id
//! holding a single job named by its `name`.

use crate::ir::{Job, Pipeline, Stage, Step, UNKNOWN_TASK, UNNAMED_JOB, UNNAMED_STEP, Variant};
use crate::loader::Node;

pub fn convert(doc: &Node) -> Pipeline {
    let mut pipeline = Pipeline::new(Variant::GitHubActions);

    match doc.get("jobs") {
        Some(Node::Mapping(jobs)) => {
            for (id, job_node) in jobs {
                let name = job_node.str("name").unwrap_or(id);
                pipeline.add_stage(stage(id, job(name, job_node)));
            }
        }
        Some(Node::Sequence(jobs)) => {
            for job_node in jobs {
                let name = job_node.first_str(&["name", "id"]).unwrap_or(UNNAMED_JOB);
                let id = job_node.str("id").unwrap_or(name);
                pipeline.add_stage(stage(id, job(name, job_node)));
            }
        }
        _ => {}
    }
    pipeline
}

fn stage(id: &str, job: Job) -> Stage {
    let mut stage = Stage::new(id);
    stage.add_job(job);
    stage
}

fn job(name: &str, node: &Node) -> Job {
    let mut job = Job::new(name);
    for step_node in node.seq("steps") {
        job.add_step(step(step_node));
    }
    job
}

fn step(node: &Node) -> Step {
    let condition = node.str("if").map(ToOwned::to_owned);
    let name = node.first_str(&["name", "id"]);

    if let Some(command) = node.str("run") {
        return Step::named_script(name.unwrap_or(command), command).with_condition(condition);
    }

    let uses = node.str("uses");
    let name = name.or(uses).unwrap_or(UNNAMED_STEP);
    Step::new(name, uses.unwrap_or(UNKNOWN_TASK))
        .with_inputs(node.string_map("with"))
        .with_condition(condition)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::decode_yaml;

    const WORKFLOW: &str = "\
name: CI
on: [push]
jobs:
  lint:
    runs-on: ubuntu-latest
    steps:
      - uses: actions/checkout@v4
      - name: Clippy
        run: cargo clippy
  test:
    name: Unit tests
    runs-on: ubuntu-latest
    steps:
      - name: Setup
        uses: actions/setup-node@v4
        with:
          node-version: 20
        if: github.event_name == 'push'
      - run: npm test
";

    #[test]
    fn test_jobs_in_declaration_order() {
        let pipeline = convert(&decode_yaml(WORKFLOW).unwrap());
        assert_eq!(pipeline.stage_names(), ["lint", "test"]);
        assert_eq!(pipeline.stages()[1].jobs[0].name, "Unit tests");
    }

    #[test]
    fn test_steps() {
        let pipeline = convert(&decode_yaml(WORKFLOW).unwrap());
        let lint = &pipeline.stages()[0].jobs[0];
        assert_eq!(lint.name, "lint");
        assert_eq!(lint.steps[0].name, "actions/checkout@v4");
        assert_eq!(lint.steps[0].task, "actions/checkout@v4");
        assert_eq!(lint.steps[1].script_command(), Some("cargo clippy"));

        let test = &pipeline.stages()[1].jobs[0];
        assert_eq!(test.steps[0].inputs["node-version"], "20");
        assert_eq!(
            test.steps[0].condition.as_deref(),
            Some("github.event_name == 'push'")
        );
        assert_eq!(test.steps[1].name, "npm test");
    }

    #[test]
    fn test_legacy_sequence_form() {
        let doc = decode_yaml("jobs:\n  - name: build\n  - steps: []\n").unwrap();
        let pipeline = convert(&doc);
        assert_eq!(pipeline.stage_names(), ["build", UNNAMED_JOB]);
    }

    #[test]
    fn test_step_without_run_or_uses() {
        let doc = decode_yaml("jobs:\n  a:\n    steps:\n      - {}\n").unwrap();
        let pipeline = convert(&doc);
        let step = &pipeline.stages()[0].jobs[0].steps[0];
        assert_eq!(step.task, UNKNOWN_TASK);
        assert_eq!(step.name, UNNAMED_STEP);
    }
}
