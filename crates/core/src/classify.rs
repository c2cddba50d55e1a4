//! Format classification.
//!
//! Guesses the dialect of raw pipeline text with ordered keyword heuristics.
//! Two policies are offered: [`ClassifyPolicy::Permissive`] follows the
//! ordered rules below and accepts partial keyword matches, while
//! [`ClassifyPolicy::Strict`] only accepts a dialect when every keyword in
//! its metadata row is present. Both are pure functions of the text.

use crate::dialect::Dialect;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;

static AWS_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::expect_used)]
    Regex::new(r"(?i)aws\s+codepipeline").expect("AWS marker pattern is valid")
});

/// Which heuristic the classifier applies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassifyPolicy {
    /// Ordered partial-match rules; first match wins (default).
    #[default]
    Permissive,
    /// A dialect is accepted only when all of its keywords occur.
    Strict,
}

impl fmt::Display for ClassifyPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Permissive => write!(f, "permissive"),
            Self::Strict => write!(f, "strict"),
        }
    }
}

/// Result of classifying a piece of text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Classification {
    /// Detected dialect, `None` when unknown
    pub format: Option<Dialect>,
    /// File extension, including the dot
    pub extension: &'static str,
    /// Language tag for syntax highlighting
    pub language: &'static str,
}

impl Classification {
    /// The result for text no rule matched.
    pub const UNKNOWN: Self = Self {
        format: None,
        extension: ".txt",
        language: "text",
    };

    const fn yaml(dialect: Dialect) -> Self {
        Self {
            format: Some(dialect),
            extension: ".yaml",
            language: "yaml",
        }
    }

    fn from_table(dialect: Dialect) -> Self {
        let info = dialect.info();
        Self {
            format: Some(dialect),
            extension: info.file_extension,
            language: info.language,
        }
    }

    /// The format tag, `"unknown"` when no dialect matched.
    #[must_use]
    pub fn format_tag(&self) -> &'static str {
        self.format.map_or("unknown", Dialect::tag)
    }

    /// `(formatTag, fileExtension, languageTag)`.
    #[must_use]
    pub fn as_tuple(&self) -> (&'static str, &'static str, &'static str) {
        (self.format_tag(), self.extension, self.language)
    }

    /// Whether a dialect was recognised.
    #[must_use]
    pub const fn is_known(&self) -> bool {
        self.format.is_some()
    }
}

/// Classify text with the permissive policy.
#[must_use]
pub fn classify(text: &str) -> Classification {
    classify_with(text, ClassifyPolicy::Permissive)
}

/// Classify text with an explicit policy.
#[must_use]
pub fn classify_with(text: &str, policy: ClassifyPolicy) -> Classification {
    let result = match policy {
        ClassifyPolicy::Permissive => permissive(text),
        ClassifyPolicy::Strict => strict(text),
    };
    tracing::debug!(%policy, format = result.format_tag(), "Classified pipeline text");
    result
}

fn permissive(text: &str) -> Classification {
    let has = |token: &str| text.contains(token);

    if AWS_MARKER.is_match(text) {
        return Classification::yaml(Dialect::Codepipeline);
    }

    if has("jobs") && has("stages") {
        // Without a provider marker this branch still shadows the rules
        // below; only the structural fallback is consulted.
        if has("gitlab-ci") {
            return Classification::yaml(Dialect::GitlabCi);
        }
        if has("github") {
            return Classification::yaml(Dialect::GithubActions);
        }
    } else if has("pipeline") && has("stages") {
        if has("agent") {
            return Classification::from_table(Dialect::JenkinsfileScripted);
        }
        return Classification::yaml(Dialect::JenkinsfileDeclarative);
    } else if has("plan") && has("stages") {
        return Classification::yaml(Dialect::Bamboo);
    } else if has("workflows") && has("jobs") {
        return Classification::yaml(Dialect::Circleci);
    } else if has("trigger") && has("pool") && has("steps") {
        return Classification::yaml(Dialect::AzurePipelines);
    }

    if has("apiVersion: apps/v1")
        && has("kind: Deployment")
        && has("pipeline")
        && has("stages")
    {
        return Classification::yaml(Dialect::Codepipeline);
    }

    Classification::UNKNOWN
}

fn strict(text: &str) -> Classification {
    let lowered = text.to_lowercase();
    crate::dialect::table()
        .find(|(_, info)| info.keywords.iter().all(|k| lowered.contains(k)))
        .map_or(Classification::UNKNOWN, |(dialect, _)| {
            Classification::from_table(dialect)
        })
}
