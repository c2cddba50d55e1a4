//! Structural loading of normalized text.
//!
//! YAML and JSON payloads decode into [`Node`], a small order-preserving
//! tree every converter walks with explicit defaults. Groovy scripts are not
//! parsed: stage declarations and `sh` steps are located by pattern search,
//! which only recognises literal `stage('name')` / `stage("name")` calls.

use crate::convert::Source;
use crate::error::{Error, Result};
use crate::ir::Step;
use crate::preprocess::Normalized;
use indexmap::IndexMap;
use regex::Regex;
use std::sync::LazyLock;

static STAGE_DECL: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::expect_used)]
    Regex::new(r#"stage\s*\(\s*['"]([^'"]+)['"]\s*\)"#).expect("stage pattern is valid")
});

static SH_STEP: LazyLock<Regex> = LazyLock::new(|| {
    const QUOTED: &str = r#"'''(?:[^\\]|\\[\s\S])*?'''|"""(?:[^\\]|\\[\s\S])*?"""|'(?:[^'\\\n]|\\.)*'|"(?:[^"\\\n]|\\.)*""#;
    let pattern = format!(
        r"\bsh\b\s*\(?\s*(?:script\s*:\s*)?(?P<script>{QUOTED})(?:\s*,\s*label\s*:\s*(?P<label>{QUOTED}))?"
    );
    #[allow(clippy::expect_used)]
    Regex::new(&pattern).expect("sh step pattern is valid")
});

/// Decoded generic structure.
///
/// Mapping keys keep their declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Node {
    /// Null or absent value
    #[default]
    Null,
    /// String, number or boolean, kept as text
    Scalar(String),
    /// Ordered list
    Sequence(Vec<Self>),
    /// Ordered mapping
    Mapping(IndexMap<String, Self>),
}

static EMPTY: [Node; 0] = [];

impl Node {
    /// Look up a key in a mapping node.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Self> {
        match self {
            Self::Mapping(map) => map.get(key),
            _ => None,
        }
    }

    /// Scalar text of this node.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Scalar(text) => Some(text),
            _ => None,
        }
    }

    /// Entries of a mapping node.
    #[must_use]
    pub fn as_mapping(&self) -> Option<&IndexMap<String, Self>> {
        match self {
            Self::Mapping(map) => Some(map),
            _ => None,
        }
    }

    /// Items of a sequence node, empty for anything else.
    #[must_use]
    pub fn items(&self) -> &[Self] {
        match self {
            Self::Sequence(items) => items,
            _ => &EMPTY,
        }
    }

    /// Whether this node is null.
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Scalar text under `key`.
    #[must_use]
    pub fn str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Self::as_str)
    }

    /// Scalar text under the first of `keys` that holds one.
    #[must_use]
    pub fn first_str(&self, keys: &[&str]) -> Option<&str> {
        keys.iter().find_map(|key| self.str(key))
    }

    /// Scalar text under `key`, or `default` when absent or not a scalar.
    #[must_use]
    pub fn str_or(&self, key: &str, default: &str) -> String {
        self.str(key).unwrap_or(default).to_string()
    }

    /// Sequence under `key`, empty when absent or not a sequence.
    #[must_use]
    pub fn seq(&self, key: &str) -> &[Self] {
        self.get(key).map_or(&EMPTY[..], Self::items)
    }

    /// Mapping under `key` flattened to string values.
    ///
    /// Nested values are rendered as compact JSON; absent or non-mapping
    /// values yield an empty map.
    #[must_use]
    pub fn string_map(&self, key: &str) -> IndexMap<String, String> {
        self.get(key)
            .and_then(Self::as_mapping)
            .map(|map| {
                map.iter()
                    .map(|(k, v)| (k.clone(), v.to_input_string()))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Render this node as a single input value.
    #[must_use]
    pub fn to_input_string(&self) -> String {
        match self {
            Self::Null => String::new(),
            Self::Scalar(text) => text.clone(),
            nested => nested.to_json().to_string(),
        }
    }

    /// Convert into a JSON value.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Self::Null => serde_json::Value::Null,
            Self::Scalar(text) => serde_json::Value::String(text.clone()),
            Self::Sequence(items) => items.iter().map(Self::to_json).collect(),
            Self::Mapping(map) => serde_json::Value::Object(
                map.iter().map(|(k, v)| (k.clone(), v.to_json())).collect(),
            ),
        }
    }
}

impl From<serde_yaml::Value> for Node {
    fn from(value: serde_yaml::Value) -> Self {
        use serde_yaml::Value;
        match value {
            Value::Null => Self::Null,
            Value::Bool(b) => Self::Scalar(b.to_string()),
            Value::Number(n) => Self::Scalar(n.to_string()),
            Value::String(s) => Self::Scalar(s),
            Value::Sequence(items) => Self::Sequence(items.into_iter().map(Self::from).collect()),
            Value::Mapping(map) => Self::Mapping(
                map.into_iter()
                    .map(|(k, v)| (yaml_key(k), Self::from(v)))
                    .collect(),
            ),
            Value::Tagged(tagged) => Self::from(tagged.value),
        }
    }
}

fn yaml_key(key: serde_yaml::Value) -> String {
    match Node::from(key) {
        Node::Scalar(text) => text,
        Node::Null => "null".to_string(),
        nested => nested.to_json().to_string(),
    }
}

impl From<serde_json::Value> for Node {
    fn from(value: serde_json::Value) -> Self {
        use serde_json::Value;
        match value {
            Value::Null => Self::Null,
            Value::Bool(b) => Self::Scalar(b.to_string()),
            Value::Number(n) => Self::Scalar(n.to_string()),
            Value::String(s) => Self::Scalar(s),
            Value::Array(items) => Self::Sequence(items.into_iter().map(Self::from).collect()),
            Value::Object(map) => {
                Self::Mapping(map.into_iter().map(|(k, v)| (k, Self::from(v))).collect())
            }
        }
    }
}

/// Decode YAML into a document root.
///
/// # Errors
///
/// Returns [`Error::Decode`] for malformed YAML, [`Error::EmptyInput`] for a
/// null or empty document, and [`Error::StructuralViolation`] when the root
/// is not a mapping.
pub fn decode_yaml(text: &str) -> Result<Node> {
    let value: serde_yaml::Value = serde_yaml::from_str(text)?;
    document_root(Node::from(value))
}

/// Decode JSON into a document root.
///
/// # Errors
///
/// Same conditions as [`decode_yaml`].
pub fn decode_json(text: &str) -> Result<Node> {
    let value: serde_json::Value = serde_json::from_str(text)?;
    document_root(Node::from(value))
}

fn document_root(node: Node) -> Result<Node> {
    match &node {
        Node::Null => Err(Error::EmptyInput),
        Node::Mapping(map) if map.is_empty() => Err(Error::EmptyInput),
        Node::Mapping(_) => Ok(node),
        _ => Err(Error::structural("document root must be a mapping")),
    }
}

/// Turn normalized text into converter input.
///
/// # Errors
///
/// Propagates decode failures from [`decode_yaml`] and [`decode_json`].
pub fn load(normalized: Normalized) -> Result<Source> {
    match normalized {
        Normalized::Yaml(text) => decode_yaml(&text).map(Source::Document),
        Normalized::Json(text) => decode_json(&text).map(Source::Document),
        Normalized::Script(text) => Ok(Source::Script(text)),
    }
}

/// A stage declaration found in a Groovy script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptStage {
    /// Literal stage name
    pub name: String,
    /// `sh` steps between this declaration and the next one
    pub steps: Vec<Step>,
}

/// Extract stage declarations and their `sh` steps, in script order.
///
/// Steps are attributed to the closest preceding stage declaration; nested
/// or computed stage names are not recognised.
#[must_use]
pub fn extract_jenkins_stages(script: &str) -> Vec<ScriptStage> {
    let decls: Vec<_> = STAGE_DECL.captures_iter(script).collect();
    decls
        .iter()
        .enumerate()
        .filter_map(|(index, caps)| {
            let whole = caps.get(0)?;
            let name = caps.get(1)?.as_str().to_string();
            let end = decls
                .get(index + 1)
                .and_then(|next| next.get(0))
                .map_or(script.len(), |m| m.start());
            let steps = extract_sh_steps(&script[whole.end()..end]);
            Some(ScriptStage { name, steps })
        })
        .collect()
}

/// Extract `sh` steps from a fragment of Groovy.
#[must_use]
pub fn extract_sh_steps(fragment: &str) -> Vec<Step> {
    SH_STEP
        .captures_iter(fragment)
        .filter_map(|caps| {
            let command = unquote(caps.name("script")?.as_str());
            Some(match caps.name("label") {
                Some(label) => Step::named_script(unquote(label.as_str()), command),
                None => Step::script(command),
            })
        })
        .collect()
}

fn unquote(literal: &str) -> String {
    let inner = ["'''", "\"\"\"", "'", "\""]
        .iter()
        .find_map(|quote| {
            literal
                .strip_prefix(quote)
                .and_then(|rest| rest.strip_suffix(quote))
        })
        .unwrap_or(literal);

    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.next() {
                Some(escaped @ ('\\' | '\'' | '"')) => out.push(escaped),
                Some(other) => {
                    out.push('\\');
                    out.push(other);
                }
                None => out.push('\\'),
            }
        } else {
            out.push(c);
        }
    }
    out
}

/// Quote text as a Groovy string literal the `sh` extractor reads back.
///
/// Multi-line text uses a triple-quoted literal.
#[must_use]
pub fn groovy_quote(text: &str) -> String {
    let escaped = text.replace('\\', "\\\\").replace('\'', "\\'");
    if text.contains('\n') {
        format!("'''{escaped}'''")
    } else {
        format!("'{escaped}'")
    }
}
