//! Pipeline Intermediate Representation
//!
//! A structural skeleton shared by every dialect: stages, jobs and steps
//! with their names, tasks, inputs and conditions. Triggers, environments
//! and other dialect features are deliberately not represented.

mod schema;
mod validation;

pub use schema::*;
pub use validation::*;
