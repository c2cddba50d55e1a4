//! Per-dialect text normalization.
//!
//! Raw candidate text usually arrives wrapped in Markdown fences and with
//! stray blank lines. YAML payloads are cleaned line by line without
//! touching indentation; Jenkins Groovy is stripped of comments, known
//! placeholder tokens and debug output before token extraction.

use crate::dialect::Dialect;
use crate::error::{Error, Result};
use regex::Regex;
use std::sync::LazyLock;

/// YAML document-start marker inserted when missing.
pub const DOCUMENT_START: &str = "---";

/// Placeholder tokens some generators leave behind in Groovy output.
const PLACEHOLDERS: [&str; 2] = ["AWS-GetAtt-Placeholder", "AWS-Sub-Placeholder"];

macro_rules! pattern {
    ($name:ident, $re:expr) => {
        static $name: LazyLock<Regex> = LazyLock::new(|| {
            #[allow(clippy::expect_used)]
            Regex::new($re).expect(concat!(stringify!($name), " is a valid pattern"))
        });
    };
}

pattern!(FENCED_BLOCK, r"(?s)```(?i:yaml|yml|json|groovy)?[ \t]*\r?\n(.*?)```");
pattern!(GROOVY_PIPELINE, r"\A\s*pipeline\s*\{");

/// Normalized payload, ready for the structural loader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Normalized {
    /// YAML text starting with a document marker
    Yaml(String),
    /// JSON text (AWS CodePipeline only)
    Json(String),
    /// Cleaned Groovy script (Jenkins)
    Script(String),
}

impl Normalized {
    /// The normalized text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Yaml(text) | Self::Json(text) | Self::Script(text) => text,
        }
    }
}

/// Normalize raw text for the given dialect.
///
/// # Errors
///
/// Returns [`Error::EmptyInput`] when nothing is left after cleaning.
pub fn normalize(text: &str, dialect: Dialect) -> Result<Normalized> {
    let payload = extract_fenced(text).unwrap_or(text);

    let normalized = match dialect {
        Dialect::JenkinsfileScripted => Normalized::Script(clean_script(payload)),
        Dialect::JenkinsfileDeclarative => {
            let script = clean_script(payload);
            if is_groovy_pipeline(&script) {
                Normalized::Script(script)
            } else {
                Normalized::Yaml(clean_yaml(payload))
            }
        }
        Dialect::Codepipeline if payload.trim_start().starts_with('{') => {
            Normalized::Json(payload.trim().to_string())
        }
        _ => Normalized::Yaml(clean_yaml(payload)),
    };

    let remaining = normalized.as_str().trim();
    if remaining.is_empty() || remaining == DOCUMENT_START {
        return Err(Error::EmptyInput);
    }

    tracing::trace!(%dialect, bytes = normalized.as_str().len(), "Normalized pipeline text");
    Ok(normalized)
}

/// Body of the first fenced code block, if any.
#[must_use]
pub fn extract_fenced(text: &str) -> Option<&str> {
    FENCED_BLOCK
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Clean YAML text while preserving indentation.
///
/// Remaining fence lines and blank lines are dropped, trailing whitespace is
/// trimmed per line, and a `---` marker is prepended when absent.
#[must_use]
pub fn clean_yaml(text: &str) -> String {
    let mut lines: Vec<&str> = text
        .trim()
        .lines()
        .map(str::trim_end)
        .filter(|line| !line.is_empty() && !line.trim_start().starts_with("```"))
        .collect();

    if lines.first().is_some_and(|first| !first.starts_with(DOCUMENT_START)) {
        lines.insert(0, DOCUMENT_START);
    }
    lines.join("\n")
}

/// Debug calls dropped from Groovy code.
const DEBUG_CALLS: [&str; 2] = ["println", "echo"];

/// Clean a Jenkins Groovy script.
///
/// Comments and `println(...)` / `echo(...)` calls are only removed from
/// code; string literals pass through untouched.
#[must_use]
pub fn clean_script(script: &str) -> String {
    let mut script = strip_code_noise(script);
    for placeholder in PLACEHOLDERS {
        script = script.replace(placeholder, "");
    }

    script
        .lines()
        .map(str::trim_end)
        .filter(|line| !line.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Single pass over Groovy source dropping `/* */` and `//` comments and
/// debug calls found outside string literals.
///
/// A `//` directly preceded by `:` is kept (URL scheme).
fn strip_code_noise(script: &str) -> String {
    let bytes = script.as_bytes();
    let mut out = String::with_capacity(script.len());
    let mut copied = 0;
    let mut i = 0;

    while i < bytes.len() {
        let rest = &script[i..];
        if let Some(end) = literal_end(script, i) {
            i = end;
            continue;
        }

        let skip_to = if rest.starts_with("/*") {
            Some(rest[2..].find("*/").map_or(bytes.len(), |e| i + 2 + e + 2))
        } else if rest.starts_with("//") && (i == 0 || bytes[i - 1] != b':') {
            Some(rest.find('\n').map_or(bytes.len(), |e| i + e))
        } else {
            debug_call_end(script, i)
        };

        if let Some(end) = skip_to {
            out.push_str(&script[copied..i]);
            i = end;
            copied = end;
        } else {
            i += rest.chars().next().map_or(1, char::len_utf8);
        }
    }
    out.push_str(&script[copied..]);
    out
}

/// End of the string literal starting at `start`, if one starts there.
///
/// Single-line literals end at the closing quote or the end of the line;
/// triple-quoted literals may span lines. Backslash escapes are honoured.
fn literal_end(script: &str, start: usize) -> Option<usize> {
    let bytes = script.as_bytes();
    let quote = *bytes.get(start).filter(|b| matches!(**b, b'\'' | b'"'))?;
    let triple = [quote; 3];
    let multiline = bytes[start..].starts_with(&triple);

    let mut i = start + if multiline { 3 } else { 1 };
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b'\n' if !multiline => return Some(i),
            b if b == quote => {
                if !multiline {
                    return Some(i + 1);
                }
                if bytes[i..].starts_with(&triple) {
                    return Some(i + 3);
                }
                i += 1;
            }
            _ => i += 1,
        }
    }
    Some(bytes.len())
}

/// End of a `println(...)` / `echo(...)` call starting at `start`.
fn debug_call_end(script: &str, start: usize) -> Option<usize> {
    let bytes = script.as_bytes();
    if start > 0 && (bytes[start - 1].is_ascii_alphanumeric() || matches!(bytes[start - 1], b'_' | b'.')) {
        return None;
    }
    let rest = &script[start..];
    let name = DEBUG_CALLS.iter().find(|name| rest.starts_with(*name))?;
    let args = rest[name.len()..].trim_start();
    if !args.starts_with('(') {
        return None;
    }

    let mut i = script.len() - args.len() + 1;
    let mut depth = 1;
    while i < bytes.len() {
        if let Some(end) = literal_end(script, i) {
            i = end;
            continue;
        }
        match bytes[i] {
            b'(' => depth += 1,
            b')' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i + 1);
                }
            }
            _ => {}
        }
        i += 1;
    }
    None
}

/// Whether cleaned text is a Groovy `pipeline { ... }` block.
#[must_use]
pub fn is_groovy_pipeline(script: &str) -> bool {
    GROOVY_PIPELINE.is_match(script)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_yaml_inserts_marker_and_keeps_indentation() {
        let raw = "\n\nstages:   \n\n  - stage: Build\n    jobs: []\n\n";
        assert_eq!(
            clean_yaml(raw),
            "---\nstages:\n  - stage: Build\n    jobs: []"
        );
    }

    #[test]
    fn test_clean_yaml_keeps_existing_marker() {
        assert_eq!(clean_yaml("--- \na: 1"), "---\na: 1");
    }

    #[test]
    fn test_fenced_block_is_extracted() {
        let raw = "Here is your pipeline:\n```yaml\njobs:\n  build: {}\n```\nEnjoy!";
        let normalized = normalize(raw, Dialect::GithubActions).unwrap();
        assert_eq!(normalized, Normalized::Yaml("---\njobs:\n  build: {}".into()));
    }

    #[test]
    fn test_bare_fence() {
        assert_eq!(extract_fenced("```\na: 1\n```"), Some("a: 1\n"));
        assert_eq!(extract_fenced("a: 1"), None);
    }

    #[test]
    fn test_empty_after_cleaning() {
        assert_eq!(normalize("  \n```yaml\n```\n", Dialect::Bamboo), Err(Error::EmptyInput));
        assert_eq!(normalize("// nothing\n", Dialect::JenkinsfileScripted), Err(Error::EmptyInput));
    }

    #[test]
    fn test_clean_script() {
        let raw = "/* header\n spans lines */\nnode {\n  // checkout first\n  stage('Build') {\n    println(\"debug\")\n    sh 'make' // inline\n    git url: 'https://example.com/repo.git'\n    echo(\"AWS-Sub-Placeholder\")\n  }\n\n\n}\n";
        assert_eq!(
            clean_script(raw),
            "node {\n  stage('Build') {\n    sh 'make'\n    git url: 'https://example.com/repo.git'\n  }\n}"
        );
    }

    #[test]
    fn test_placeholders_removed() {
        assert_eq!(clean_script("sh 'deploy AWS-GetAtt-Placeholder'"), "sh 'deploy '");
    }

    #[test]
    fn test_aws_json_detection() {
        let json = normalize("```json\n{\"stages\": []}\n```", Dialect::Codepipeline).unwrap();
        assert!(matches!(json, Normalized::Json(_)));

        let yaml = normalize("stages: []", Dialect::Codepipeline).unwrap();
        assert!(matches!(yaml, Normalized::Yaml(_)));
    }

    #[test]
    fn test_declarative_groovy_vs_yaml() {
        let groovy = "pipeline {\n  stages {\n    stage('A') { steps { sh 'x' } }\n  }\n}";
        assert!(matches!(
            normalize(groovy, Dialect::JenkinsfileDeclarative).unwrap(),
            Normalized::Script(_)
        ));

        let yaml = "pipeline:\n  stages:\n    - name: A\n";
        assert!(matches!(
            normalize(yaml, Dialect::JenkinsfileDeclarative).unwrap(),
            Normalized::Yaml(_)
        ));
    }

    #[test]
    fn test_globs_inside_strings_survive() {
        assert_eq!(clean_script("sh 'ls src/**/*.rs'"), "sh 'ls src/**/*.rs'");
        assert_eq!(clean_script("sh \"rm -f out/**/*.o\" /* old */"), "sh \"rm -f out/**/*.o\"");
    }

    #[test]
    fn test_double_slash_inside_strings_survives() {
        assert_eq!(clean_script("sh 'cp a//b c' // copy"), "sh 'cp a//b c'");
        assert_eq!(
            clean_script("sh '''\n  rsync src// dst\n'''"),
            "sh '''\n  rsync src// dst\n'''"
        );
        assert_eq!(clean_script(r"sh 'it\'s // fine'"), r"sh 'it\'s // fine'");
    }

    #[test]
    fn test_unquoted_url_scheme_is_not_a_comment() {
        assert_eq!(
            clean_script("git url: https://example.com/x.git"),
            "git url: https://example.com/x.git"
        );
        assert_eq!(clean_script("def a = 1 //comment"), "def a = 1");
    }

    #[test]
    fn test_debug_calls_only_removed_from_code() {
        assert_eq!(clean_script("sh 'echo(hi) && make'"), "sh 'echo(hi) && make'");
        assert_eq!(clean_script("println(\"a (b) c\")\nsh 'x'"), "sh 'x'");
        assert_eq!(clean_script("recho(1)"), "recho(1)");
        assert_eq!(clean_script("echo 'plain'"), "echo 'plain'");
    }

    #[test]
    fn test_capitalised_fence_tag() {
        let raw = "```Groovy\npipeline {\n  stages {\n    stage('A') { steps { sh 'x' } }\n  }\n}\n```";
        assert!(matches!(
            normalize(raw, Dialect::JenkinsfileDeclarative).unwrap(),
            Normalized::Script(_)
        ));
        assert_eq!(extract_fenced("```YAML\na: 1\n```"), Some("a: 1\n"));
    }
}
