//! Converters from decoded dialect structures to the pipeline IR.
//!
//! Every dialect has one converter function; [`convert`] selects it through
//! an exhaustive match on [`Dialect`], so adding a dialect without a
//! converter does not compile. Converters preserve declaration order and
//! fall back to the `Unnamed *` defaults where the source omits a name.

mod aws;
mod azure;
mod bamboo;
mod circleci;
mod github;
pub(crate) mod gitlab;
mod jenkins;

use crate::dialect::Dialect;
use crate::error::{Error, Result};
use crate::ir::Pipeline;
use crate::loader::Node;

/// Name of the synthetic job holding a stage's steps, for dialects
/// without a job level.
fn stage_job_name(stage: &str) -> String {
    format!("{stage}_job")
}

/// Converter input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    /// An existing IR instance
    Pipeline(Pipeline),
    /// A decoded YAML/JSON document
    Document(Node),
    /// Cleaned script text (Jenkins Groovy)
    Script(String),
}

impl From<Pipeline> for Source {
    fn from(pipeline: Pipeline) -> Self {
        Self::Pipeline(pipeline)
    }
}

impl From<Node> for Source {
    fn from(node: Node) -> Self {
        Self::Document(node)
    }
}

/// Convert a source into a pipeline of the dialect's variant.
///
/// A [`Source::Pipeline`] already of that variant is returned unchanged.
///
/// # Errors
///
/// Returns [`Error::TypeMismatch`] for a pipeline of another variant, and
/// the dialect converter's error otherwise.
pub fn convert(dialect: Dialect, source: Source) -> Result<Pipeline> {
    let expected = dialect.variant();
    let pipeline = match source {
        Source::Pipeline(pipeline) if pipeline.variant() == expected => {
            tracing::debug!(%dialect, "Pipeline already of target variant; passing through");
            return Ok(pipeline);
        }
        Source::Pipeline(pipeline) => {
            return Err(Error::TypeMismatch {
                expected,
                found: pipeline.variant(),
            });
        }
        Source::Document(doc) => from_document(dialect, &doc)?,
        Source::Script(script) => from_script(dialect, &script)?,
    };

    tracing::debug!(
        %dialect,
        stages = pipeline.stages().len(),
        "Converted pipeline"
    );
    Ok(pipeline)
}

fn from_document(dialect: Dialect, doc: &Node) -> Result<Pipeline> {
    match dialect {
        Dialect::AzurePipelines => Ok(azure::convert(doc)),
        Dialect::GitlabCi => Ok(gitlab::convert(doc)),
        Dialect::GithubActions => Ok(github::convert(doc)),
        Dialect::JenkinsfileScripted => Err(Error::structural(
            "jenkinsfile-scripted input must be Groovy script text",
        )),
        Dialect::JenkinsfileDeclarative => jenkins::convert_declarative(doc),
        Dialect::Bamboo => Ok(bamboo::convert(doc)),
        Dialect::Circleci => Ok(circleci::convert(doc)),
        Dialect::Codepipeline => Ok(aws::convert(doc)),
    }
}

fn from_script(dialect: Dialect, script: &str) -> Result<Pipeline> {
    if dialect.is_script() {
        jenkins::convert_script(script)
    } else {
        Err(Error::structural(format!(
            "{dialect} input must be a YAML or JSON document"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{Stage, Variant};
    use crate::loader::decode_json;

    #[test]
    fn test_pass_through_returns_same_pipeline() {
        let mut pipeline = Pipeline::new(Variant::Jenkins);
        pipeline.add_stage(Stage::new("Build"));
        let expected = pipeline.clone();

        let scripted = convert(Dialect::JenkinsfileScripted, pipeline.clone().into()).unwrap();
        let declarative = convert(Dialect::JenkinsfileDeclarative, pipeline.into()).unwrap();
        assert_eq!(scripted, expected);
        assert_eq!(declarative, expected);
    }

    #[test]
    fn test_wrong_variant_is_type_mismatch() {
        let pipeline = Pipeline::new(Variant::GitLabCi);
        let err = convert(Dialect::Circleci, pipeline.into()).unwrap_err();
        assert_eq!(
            err,
            Error::TypeMismatch {
                expected: Variant::CircleCi,
                found: Variant::GitLabCi
            }
        );
    }

    #[test]
    fn test_script_for_yaml_dialect_is_rejected() {
        let err = convert(Dialect::Bamboo, Source::Script("stage('A')".into())).unwrap_err();
        assert!(matches!(err, Error::StructuralViolation { .. }));
    }

    #[test]
    fn test_scripted_requires_script() {
        let doc = decode_json(r#"{"stages": ["A"]}"#).unwrap();
        let err = convert(Dialect::JenkinsfileScripted, doc.into()).unwrap_err();
        assert!(matches!(err, Error::StructuralViolation { .. }));
    }
}
