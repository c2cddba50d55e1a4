//! Bamboo Specs converter.

use crate::ir::{Job, Pipeline, Stage, Step, UNKNOWN_TASK, UNNAMED_JOB, UNNAMED_STAGE, UNNAMED_STEP, Variant};
use crate::loader::Node;

pub fn convert(doc: &Node) -> Pipeline {
    let mut pipeline = Pipeline::new(Variant::Bamboo);

    let mut stages = doc.seq("stages");
    if stages.is_empty() {
        stages = doc.get("plan").map_or(&[][..], |plan| plan.seq("stages"));
    }

    for entry in stages {
        let (name, body) = stage_entry(entry);
        let mut stage = Stage::new(name);
        for job_entry in body.map_or(&[][..], |body| body.seq("jobs")) {
            stage.add_job(job(doc, job_entry));
        }
        pipeline.add_stage(stage);
    }
    pipeline
}

/// Stage name and the node holding its `jobs`.
fn stage_entry(entry: &Node) -> (&str, Option<&Node>) {
    match entry {
        Node::Scalar(name) => (name.as_str(), None),
        Node::Mapping(map) => {
            if let Some(name) = entry.str("name") {
                return (name, Some(entry));
            }
            match map.first() {
                Some((name, body)) if map.len() == 1 => (name.as_str(), Some(body)),
                _ => (UNNAMED_STAGE, Some(entry)),
            }
        }
        _ => (UNNAMED_STAGE, None),
    }
}

fn job(doc: &Node, entry: &Node) -> Job {
    let (name, definition) = match entry {
        // Plain names refer to a top-level job definition.
        Node::Scalar(name) => (name.as_str(), doc.get(name)),
        _ => (
            entry.first_str(&["displayName", "name", "key"]).unwrap_or(UNNAMED_JOB),
            Some(entry),
        ),
    };

    let mut job = Job::new(name);
    if let Some(definition) = definition {
        let tasks = match definition.seq("tasks") {
            [] => definition.seq("steps"),
            tasks => tasks,
        };
        for task in tasks {
            job.add_step(step(task));
        }
    }
    job
}

fn step(node: &Node) -> Step {
    if let Node::Scalar(task) = node {
        return Step::new(task.as_str(), task.as_str());
    }

    if let Some(script) = node.get("script") {
        return script_step(script);
    }

    if let Some(any) = node.get("any-task") {
        let plugin = any.str("plugin-key").unwrap_or(UNKNOWN_TASK);
        let name = any.str("description").unwrap_or(plugin);
        return Step::new(name, plugin).with_inputs(any.string_map("configuration"));
    }

    if let Some(task) = node.str("task") {
        return Step::new(node.str_or("name", UNNAMED_STEP), task)
            .with_inputs(node.string_map("inputs"))
            .with_condition(node.str("condition").map(ToOwned::to_owned));
    }

    match node.as_mapping() {
        Some(map) if map.len() == 1 => {
            let Some((task, body)) = map.first() else {
                return Step::new(UNNAMED_STEP, UNKNOWN_TASK);
            };
            let inputs = body
                .as_mapping()
                .map(|params| {
                    params
                        .iter()
                        .map(|(k, v)| (k.clone(), v.to_input_string()))
                        .collect()
                })
                .unwrap_or_default();
            let name = body.str("description").unwrap_or(task.as_str());
            Step::new(name, task.as_str()).with_inputs(inputs)
        }
        _ => Step::new(node.str_or("name", UNNAMED_STEP), UNKNOWN_TASK),
    }
}

fn script_step(script: &Node) -> Step {
    let lines: Vec<&str> = match script {
        Node::Scalar(command) => vec![command.as_str()],
        Node::Sequence(items) => items.iter().filter_map(Node::as_str).collect(),
        Node::Mapping(_) => script
            .get("scripts")
            .map(|scripts| match scripts {
                Node::Scalar(command) => vec![command.as_str()],
                other => other.items().iter().filter_map(Node::as_str).collect(),
            })
            .unwrap_or_default(),
        Node::Null => Vec::new(),
    };
    let command = lines.join("\n");
    match script.str("description") {
        Some(description) => Step::named_script(description, command),
        None => Step::script(command),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::decode_yaml;

    const SPECS: &str = "\
version: 2
plan:
  project-key: PROJ
  key: APP
  name: App
stages:
  - Build Stage:
      jobs:
        - Compile
  - Test Stage:
      jobs:
        - Unit
Compile:
  tasks:
    - checkout
    - script:
        description: Build jar
        scripts:
          - mvn package
Unit:
  tasks:
    - script: mvn test
    - any-task:
        plugin-key: com.atlassian.bamboo.plugins.maven:task.builder.mvn3
        description: Verify
        configuration:
          goal: verify
";

    #[test]
    fn test_stage_and_job_references() {
        let pipeline = convert(&decode_yaml(SPECS).unwrap());
        assert_eq!(
            pipeline.name_outline(),
            vec![
                (
                    "Build Stage".to_string(),
                    vec![(
                        "Compile".to_string(),
                        vec!["checkout".to_string(), "Build jar".to_string()]
                    )]
                ),
                (
                    "Test Stage".to_string(),
                    vec![(
                        "Unit".to_string(),
                        vec!["mvn test".to_string(), "Verify".to_string()]
                    )]
                ),
            ]
        );
    }

    #[test]
    fn test_task_kinds() {
        let pipeline = convert(&decode_yaml(SPECS).unwrap());
        let unit = &pipeline.stages()[1].jobs[0];
        assert_eq!(unit.steps[0].script_command(), Some("mvn test"));
        assert_eq!(
            unit.steps[1].task,
            "com.atlassian.bamboo.plugins.maven:task.builder.mvn3"
        );
        assert_eq!(unit.steps[1].inputs["goal"], "verify");
    }

    #[test]
    fn test_plan_nested_stages_with_inline_jobs() {
        let doc = decode_yaml(
            "plan:\n  stages:\n    - name: Build\n      jobs:\n        - displayName: Compile\n          steps:\n            - name: Run\n              task: Maven\n              inputs:\n                goal: package\n    - Deploy\n",
        )
        .unwrap();
        let pipeline = convert(&doc);
        assert_eq!(pipeline.stage_names(), ["Build", "Deploy"]);
        let step = &pipeline.stages()[0].jobs[0].steps[0];
        assert_eq!(step.name, "Run");
        assert_eq!(step.task, "Maven");
        assert_eq!(step.inputs["goal"], "package");
        assert!(pipeline.stages()[1].jobs.is_empty());
    }

    #[test]
    fn test_missing_job_definition_yields_empty_job() {
        let doc = decode_yaml("stages:\n  - S:\n      jobs: [Ghost]\n").unwrap();
        let pipeline = convert(&doc);
        assert_eq!(pipeline.stages()[0].jobs[0].name, "Ghost");
        assert!(pipeline.stages()[0].jobs[0].steps.is_empty());
    }
}
