//! Dialect tags and their static metadata.
//!
//! The tag set is closed: every tag maps to one converter and one pipeline
//! variant, and carries the keywords, file extension and language used by
//! the classifier and by callers choosing a file name or highlighter.

use crate::error::Error;
use crate::ir::Variant;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A supported CI/CD configuration format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Dialect {
    /// `azure-pipelines`
    AzurePipelines,
    /// `gitlab-ci`
    GitlabCi,
    /// `github-actions`
    GithubActions,
    /// `jenkinsfile-scripted`
    JenkinsfileScripted,
    /// `jenkinsfile-declarative`
    JenkinsfileDeclarative,
    /// `bamboo`
    Bamboo,
    /// `circleci`
    Circleci,
    /// `codepipeline`
    Codepipeline,
}

/// Static metadata for one dialect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DialectInfo {
    /// Tag used on the command line and in the dispatch table
    pub tag: &'static str,
    /// Tokens the strict classifier requires
    pub keywords: &'static [&'static str],
    /// Conventional file extension, including the dot
    pub file_extension: &'static str,
    /// Language tag for syntax highlighting
    pub language: &'static str,
}

static TABLE: [(Dialect, DialectInfo); 8] = [
    (
        Dialect::AzurePipelines,
        DialectInfo {
            tag: "azure-pipelines",
            keywords: &["trigger", "stages", "pool", "jobs"],
            file_extension: ".yaml",
            language: "yaml",
        },
    ),
    (
        Dialect::GitlabCi,
        DialectInfo {
            tag: "gitlab-ci",
            keywords: &["stages", "jobs", "gitlab"],
            file_extension: ".yaml",
            language: "yaml",
        },
    ),
    (
        Dialect::GithubActions,
        DialectInfo {
            tag: "github-actions",
            keywords: &["jobs", "runs-on", "steps"],
            file_extension: ".yaml",
            language: "yaml",
        },
    ),
    (
        Dialect::JenkinsfileScripted,
        DialectInfo {
            tag: "jenkinsfile-scripted",
            keywords: &["pipeline", "agent", "stages"],
            file_extension: ".groovy",
            language: "groovy",
        },
    ),
    (
        Dialect::JenkinsfileDeclarative,
        DialectInfo {
            tag: "jenkinsfile-declarative",
            keywords: &["pipeline", "stages", "agent"],
            file_extension: ".groovy",
            language: "groovy",
        },
    ),
    (
        Dialect::Bamboo,
        DialectInfo {
            tag: "bamboo",
            keywords: &["plan", "stages"],
            file_extension: ".yaml",
            language: "yaml",
        },
    ),
    (
        Dialect::Circleci,
        DialectInfo {
            tag: "circleci",
            keywords: &["workflows", "jobs"],
            file_extension: ".yaml",
            language: "yaml",
        },
    ),
    (
        Dialect::Codepipeline,
        DialectInfo {
            tag: "codepipeline",
            keywords: &["aws", "codepipeline"],
            file_extension: ".yaml",
            language: "yaml",
        },
    ),
];

impl Dialect {
    /// All dialects in metadata-table order.
    pub const ALL: [Self; 8] = [
        Self::AzurePipelines,
        Self::GitlabCi,
        Self::GithubActions,
        Self::JenkinsfileScripted,
        Self::JenkinsfileDeclarative,
        Self::Bamboo,
        Self::Circleci,
        Self::Codepipeline,
    ];

    /// Metadata row for this dialect.
    #[must_use]
    pub fn info(self) -> &'static DialectInfo {
        // TABLE rows follow the enum declaration order.
        &TABLE[self as usize].1
    }

    /// The dialect's tag.
    #[must_use]
    pub fn tag(self) -> &'static str {
        self.info().tag
    }

    /// The pipeline variant this dialect converts into.
    #[must_use]
    pub const fn variant(self) -> Variant {
        match self {
            Self::AzurePipelines => Variant::AzureDevOps,
            Self::GitlabCi => Variant::GitLabCi,
            Self::GithubActions => Variant::GitHubActions,
            Self::JenkinsfileScripted | Self::JenkinsfileDeclarative => Variant::Jenkins,
            Self::Bamboo => Variant::Bamboo,
            Self::Circleci => Variant::CircleCi,
            Self::Codepipeline => Variant::Aws,
        }
    }

    /// Whether input for this dialect is Groovy script text.
    #[must_use]
    pub const fn is_script(self) -> bool {
        matches!(self, Self::JenkinsfileScripted | Self::JenkinsfileDeclarative)
    }
}

impl Variant {
    /// The dialect used when emitting or re-reading this variant.
    #[must_use]
    pub const fn default_dialect(self) -> Dialect {
        match self {
            Self::AzureDevOps => Dialect::AzurePipelines,
            Self::GitHubActions => Dialect::GithubActions,
            Self::GitLabCi => Dialect::GitlabCi,
            Self::Jenkins => Dialect::JenkinsfileDeclarative,
            Self::Bamboo => Dialect::Bamboo,
            Self::CircleCi => Dialect::Circleci,
            Self::Aws => Dialect::Codepipeline,
        }
    }
}

/// The full metadata table, in classifier order.
pub fn table() -> impl Iterator<Item = (Dialect, &'static DialectInfo)> {
    TABLE.iter().map(|(dialect, info)| (*dialect, info))
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for Dialect {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        TABLE
            .iter()
            .find(|(_, info)| info.tag == wanted)
            .map(|(dialect, _)| *dialect)
            .ok_or_else(|| Error::unsupported(s))
    }
}
