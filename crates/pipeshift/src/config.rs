//! Optional `pipeshift.toml` configuration
//!
//! The `[emit]` table deserialises straight into the core's `EmitOptions`,
//! so per-target settings never need to pass through the CLI code.

use crate::errors::{CliError, Result};
use pipeshift_core::{ClassifyPolicy, EmitOptions};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// File looked up in the working directory when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "pipeshift.toml";

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub classify: ClassifySection,
    pub emit: EmitOptions,
}

/// `[classify]` table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ClassifySection {
    pub policy: ClassifyPolicy,
}

impl Config {
    /// Parse configuration text; `path` is only used for diagnostics.
    pub fn from_toml(path: &Path, text: String) -> Result<Self> {
        toml::from_str(&text).map_err(|e| CliError::config_parse(path, text.clone(), &e))
    }

    /// Load the configuration file named by `explicit`, or `pipeshift.toml`
    /// from `cwd` when it exists, or fall back to defaults.
    ///
    /// An explicit path that cannot be read is an error; a missing default
    /// file is not.
    pub fn load(explicit: Option<&Path>, cwd: &Path) -> Result<Self> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => {
                let candidate = cwd.join(DEFAULT_CONFIG_FILE);
                if !candidate.is_file() {
                    tracing::debug!("No configuration file, using defaults");
                    return Ok(Self::default());
                }
                candidate
            }
        };
        Self::read(&path)
    }

    fn read(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| CliError::file("read config", path, e))?;
        let config = Self::from_toml(path, text)?;
        tracing::debug!(path = %path.display(), policy = %config.classify.policy, "Loaded configuration");
        Ok(config)
    }
}
