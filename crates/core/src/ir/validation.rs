//! IR Validation
//!
//! Structural checks over a converted pipeline. Converters never reject
//! these shapes on their own (missing names fall back to defaults); the
//! validator is for callers that want to flag them before emission.

use super::schema::Pipeline;
use std::collections::HashSet;
use thiserror::Error;

/// Validation errors for pipeline IR
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Pipeline has no stages")]
    NoStages,

    #[error("Stage #{index} has an empty name")]
    EmptyStageName { index: usize },

    #[error("Stage '{stage}' is declared more than once; jobs attach to the first declaration")]
    DuplicateStage { stage: String },

    #[error("Stage '{stage}' has no jobs")]
    EmptyStage { stage: String },

    #[error("Job '{job}' in stage '{stage}' has an empty name")]
    EmptyJobName { stage: String, job: String },

    #[error("Step '{step}' in job '{job}' has an empty task")]
    EmptyTask { job: String, step: String },
}

/// Validator for pipeline IR
pub struct IrValidator<'a> {
    pipeline: &'a Pipeline,
}

impl<'a> IrValidator<'a> {
    /// Create a new validator for the given pipeline
    #[must_use]
    pub fn new(pipeline: &'a Pipeline) -> Self {
        Self { pipeline }
    }

    /// Validate the whole tree, collecting every problem found
    ///
    /// # Errors
    /// Returns all validation errors when at least one check fails
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if self.pipeline.is_empty() {
            errors.push(ValidationError::NoStages);
        }

        let mut seen = HashSet::new();
        for (index, stage) in self.pipeline.stages().iter().enumerate() {
            if stage.name.trim().is_empty() {
                errors.push(ValidationError::EmptyStageName { index });
            } else if !seen.insert(stage.name.as_str()) {
                errors.push(ValidationError::DuplicateStage {
                    stage: stage.name.clone(),
                });
            }

            if stage.jobs.is_empty() {
                errors.push(ValidationError::EmptyStage {
                    stage: stage.name.clone(),
                });
            }

            for job in &stage.jobs {
                if job.name.trim().is_empty() {
                    errors.push(ValidationError::EmptyJobName {
                        stage: stage.name.clone(),
                        job: job.name.clone(),
                    });
                }
                for step in &job.steps {
                    if step.task.trim().is_empty() {
                        errors.push(ValidationError::EmptyTask {
                            job: job.name.clone(),
                            step: step.name.clone(),
                        });
                    }
                }
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Validate a pipeline with [`IrValidator`]
///
/// # Errors
/// Returns all validation errors when at least one check fails
pub fn validate(pipeline: &Pipeline) -> Result<(), Vec<ValidationError>> {
    IrValidator::new(pipeline).validate()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{Job, Stage, Step, Variant};

    #[test]
    fn test_empty_pipeline() {
        let pipeline = Pipeline::new(Variant::Jenkins);
        assert_eq!(validate(&pipeline), Err(vec![ValidationError::NoStages]));
    }

    #[test]
    fn test_valid_pipeline() {
        let mut pipeline = Pipeline::new(Variant::Jenkins);
        pipeline.add_stage(Stage::new("Build"));
        assert!(pipeline.add_job_to_stage("Build", Job::new("Build_job").with_step(Step::script("make"))));
        assert!(validate(&pipeline).is_ok());
    }

    #[test]
    fn test_collects_all_errors() {
        let mut pipeline = Pipeline::new(Variant::GitLabCi);
        pipeline.add_stage(Stage::new("Build"));
        pipeline.add_stage(Stage::new("Build"));
        pipeline.add_stage(Stage::new(""));
        assert!(pipeline.add_job_to_stage("Build", Job::new("compile").with_step(Step::new("Run", ""))));

        let errors = validate(&pipeline).unwrap_err();
        assert!(errors.contains(&ValidationError::DuplicateStage {
            stage: "Build".to_string()
        }));
        assert!(errors.contains(&ValidationError::EmptyStageName { index: 2 }));
        assert!(errors.contains(&ValidationError::EmptyTask {
            job: "compile".to_string(),
            step: "Run".to_string()
        }));
        assert!(errors.contains(&ValidationError::EmptyStage {
            stage: "Build".to_string()
        }));
    }
}
