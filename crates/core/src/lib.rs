//! pipeshift-core - cross-format CI/CD pipeline translation
//!
//! Reads pipeline definitions written for one CI/CD system, converts them
//! into a shared intermediate representation and emits that representation
//! for any supported system.
//!
//! # Phases
//!
//! 1. [`classify()`] guesses the dialect of unlabelled text.
//! 2. [`preprocess`] strips Markdown fences, comments and debug calls.
//! 3. [`loader`] decodes YAML or JSON into a [`loader::Node`] tree, or keeps
//!    Groovy script text as is.
//! 4. [`convert`] maps the decoded structure into an [`ir::Pipeline`].
//! 5. [`emitter`] renders a pipeline as native text for its variant.
//!
//! [`parser`] chains steps 2 to 4, and [`translate`] adds step 5.
//!
//! # Example
//!
//! ```
//! use pipeshift_core::{Dialect, EmitOptions, translate};
//!
//! let gitlab = "stages: [build]\ncompile:\n  stage: build\n  script: [make]\n";
//! let groovy = translate(
//!     gitlab,
//!     Dialect::GitlabCi,
//!     Dialect::JenkinsfileDeclarative,
//!     &EmitOptions::default(),
//! )
//! .unwrap();
//! assert!(groovy.contains("sh 'make'"));
//! ```
//!
//! The crate performs no filesystem, network or environment access.

pub mod classify;
pub mod convert;
pub mod dialect;
pub mod emitter;
pub mod error;
pub mod ir;
pub mod loader;
pub mod parser;
pub mod preprocess;

pub use classify::{Classification, ClassifyPolicy, classify, classify_with};
pub use convert::Source;
pub use dialect::{Dialect, DialectInfo};
pub use emitter::{EmitOptions, Emitter, EmitterRegistry};
pub use error::{Error, Result};
pub use ir::{Job, Pipeline, Stage, Step, Variant};
pub use parser::{PipelineParser, parse, translate};
