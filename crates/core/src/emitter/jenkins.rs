//! Jenkins Emitter
//!
//! Writes a declarative Jenkinsfile. Script steps become `sh` calls; steps
//! without a shell equivalent are kept as `// name: task` comments.

use super::Emitter;
use crate::error::Result;
use crate::ir::{Pipeline, Stage, Step, Variant};
use crate::loader::groovy_quote;
use serde::{Deserialize, Serialize};
use std::fmt::Write;

const INDENT: &str = "    ";

/// Jenkins declarative pipeline emitter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct JenkinsEmitter {
    /// Agent label; `agent any` when unset or `"any"`
    pub agent: Option<String>,
}

impl JenkinsEmitter {
    /// Create an emitter with the default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Run on agents with the given label.
    #[must_use]
    pub fn with_agent(mut self, label: impl Into<String>) -> Self {
        self.agent = Some(label.into());
        self
    }

    fn agent_line(&self) -> String {
        match &self.agent {
            Some(label) if label != "any" => format!("agent {{ label {} }}", groovy_quote(label)),
            _ => "agent any".to_string(),
        }
    }

    fn render(&self, pipeline: &Pipeline) -> String {
        let mut out = String::new();
        out.push_str("pipeline {\n");
        line(&mut out, 1, &self.agent_line());
        line(&mut out, 1, "stages {");
        for stage in pipeline.stages() {
            render_stage(&mut out, stage);
        }
        line(&mut out, 1, "}");
        out.push_str("}\n");
        out
    }
}

fn line(out: &mut String, depth: usize, text: &str) {
    let _ = writeln!(out, "{}{text}", INDENT.repeat(depth));
}

fn render_stage(out: &mut String, stage: &Stage) {
    line(out, 2, &format!("stage({}) {{", groovy_quote(&stage.name)));
    line(out, 3, "steps {");
    let mut steps = stage.steps().peekable();
    if steps.peek().is_none() {
        line(out, 4, "echo 'No steps defined'");
    }
    for step in steps {
        line(out, 4, &step_line(step));
    }
    line(out, 3, "}");
    line(out, 2, "}");
}

fn step_line(step: &Step) -> String {
    match step.script_command() {
        Some(command) if step.name == command => format!("sh {}", groovy_quote(command)),
        Some(command) => format!(
            "sh(script: {}, label: {})",
            groovy_quote(command),
            groovy_quote(&step.name)
        ),
        None => format!("// {}: {}", step.name.replace('\n', " "), step.task),
    }
}

impl Emitter for JenkinsEmitter {
    fn emit(&self, pipeline: &Pipeline) -> Result<String> {
        Ok(self.render(pipeline))
    }

    fn format_name(&self) -> &'static str {
        "jenkinsfile-declarative"
    }

    fn file_extension(&self) -> &'static str {
        ".groovy"
    }

    fn variant(&self) -> Variant {
        Variant::Jenkins
    }

    fn description(&self) -> &'static str {
        "Declarative Jenkinsfile"
    }
}
