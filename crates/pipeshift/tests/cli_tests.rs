//! End-to-end tests for the pipeshift binary

#![allow(clippy::unwrap_used, clippy::expect_used)]

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

const GITLAB: &str = "\
stages:
  - build
  - test
compile:
  stage: build
  script:
    - cargo build
unit:
  stage: test
  script:
    - cargo test
";

const CIRCLECI: &str = "\
version: 2.1
jobs:
  build:
    docker:
      - image: cimg/rust:1.80
    steps:
      - checkout
      - run: cargo build
workflows:
  main:
    jobs: [build]
";

fn test_dir() -> TempDir {
    tempfile::Builder::new()
        .prefix("pipeshift_test_")
        .tempdir()
        .expect("Failed to create temp directory")
}

/// Binary running in an isolated directory with no configuration in scope.
fn pipeshift(dir: &TempDir) -> Command {
    #[allow(deprecated)]
    let mut cmd = Command::cargo_bin("pipeshift").unwrap();
    cmd.current_dir(dir.path())
        .env_remove("PIPESHIFT_CONFIG")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_classify_file() {
    let dir = test_dir();
    fs::write(dir.path().join("config.yml"), CIRCLECI).unwrap();

    pipeshift(&dir)
        .args(["classify", "config.yml"])
        .assert()
        .success()
        .stdout("circleci .yaml yaml\n");
}

#[test]
fn test_classify_stdin_json() {
    let dir = test_dir();
    let output = pipeshift(&dir)
        .args(["classify", "-", "--json"])
        .write_stdin("just some notes")
        .output()
        .unwrap();

    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["format"], "unknown");
    assert_eq!(json["language"], "text");
}

#[test]
fn test_parse_prints_ir_json() {
    let dir = test_dir();
    let output = pipeshift(&dir)
        .args(["parse", "--from", "gitlab-ci"])
        .write_stdin(GITLAB)
        .output()
        .unwrap();

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["stages"][1]["name"], "test");
    assert_eq!(json["stages"][1]["jobs"][0]["steps"][0]["name"], "cargo test");
}

#[test]
fn test_parse_check_fails_on_empty_stage() {
    let dir = test_dir();
    pipeshift(&dir)
        .args(["parse", "--from", "gitlab-ci", "--check"])
        .write_stdin("stages: [build, deploy]\nb:\n  stage: build\n  script: [make]\n")
        .assert()
        .code(1)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("Stage 'deploy' has no jobs"));
}

#[test]
fn test_parse_unsupported_tag() {
    let dir = test_dir();
    pipeshift(&dir)
        .args(["parse", "--from", "travis"])
        .write_stdin(GITLAB)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Unsupported pipeline type: travis"));
}

#[test]
fn test_translate_gitlab_to_jenkins() {
    let dir = test_dir();
    fs::write(dir.path().join(".gitlab-ci.yml"), GITLAB).unwrap();

    pipeshift(&dir)
        .args(["translate", ".gitlab-ci.yml", "--from", "gitlab-ci", "--to", "jenkinsfile-declarative"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("pipeline {"))
        .stdout(predicate::str::contains("stage('test')"))
        .stdout(predicate::str::contains("sh 'cargo test'"));
}

#[test]
fn test_translate_classifies_source() {
    let dir = test_dir();
    pipeshift(&dir)
        .args(["translate", "--to", "gitlab-ci"])
        .write_stdin(CIRCLECI)
        .assert()
        .success()
        .stdout(predicate::str::contains("stages:\n- build\n"))
        .stdout(predicate::str::contains("- cargo build"));
}

#[test]
fn test_translate_unknown_source_is_an_error() {
    let dir = test_dir();
    pipeshift(&dir)
        .args(["translate", "--to", "circleci"])
        .write_stdin("hello world")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Could not determine the pipeline format"));
}

#[test]
fn test_translate_to_codepipeline_requires_actions() {
    let dir = test_dir();
    pipeshift(&dir)
        .args(["translate", "--from", "gitlab-ci", "--to", "codepipeline"])
        .write_stdin("stages: [build]\n")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("no actions in stage build"));
}

#[test]
fn test_config_file_in_working_directory() {
    let dir = test_dir();
    fs::write(
        dir.path().join("pipeshift.toml"),
        "[emit.circleci]\nimage = \"cimg/rust:1.80\"\nworkflow = \"release\"\n",
    )
    .unwrap();

    pipeshift(&dir)
        .args(["translate", "--from", "gitlab-ci", "--to", "circleci"])
        .write_stdin(GITLAB)
        .assert()
        .success()
        .stdout(predicate::str::contains("image: cimg/rust:1.80"))
        .stdout(predicate::str::contains("release:"));
}

#[test]
fn test_config_from_environment() {
    let dir = test_dir();
    let config = dir.path().join("alt.toml");
    fs::write(&config, "[classify]\npolicy = \"strict\"\n").unwrap();

    // Matches the permissive Azure rule but lacks the "jobs" keyword strict mode needs.
    let partial = "trigger: [main]\npool:\n  vmImage: ubuntu-latest\nsteps: []\n";
    pipeshift(&dir)
        .args(["classify"])
        .write_stdin(partial)
        .assert()
        .success()
        .stdout("azure-pipelines .yaml yaml\n");
    pipeshift(&dir)
        .env("PIPESHIFT_CONFIG", &config)
        .args(["classify"])
        .write_stdin(partial)
        .assert()
        .success()
        .stdout("unknown .txt text\n");
}

#[test]
fn test_invalid_config_is_reported() {
    let dir = test_dir();
    fs::write(dir.path().join("pipeshift.toml"), "[output]\ncolor = true\n").unwrap();

    pipeshift(&dir)
        .args(["translate", "--from", "gitlab-ci", "--to", "circleci"])
        .write_stdin(GITLAB)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Configuration parsing failed"));
}

#[test]
fn test_missing_input_file() {
    let dir = test_dir();
    pipeshift(&dir)
        .args(["classify", "nope.yml"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Failed to read"));
}

#[test]
fn test_formats_table() {
    let dir = test_dir();
    pipeshift(&dir)
        .arg("formats")
        .assert()
        .success()
        .stdout(predicate::str::contains("jenkinsfile-scripted"))
        .stdout(predicate::str::contains("AWS CodePipeline"));
}

#[test]
fn test_debug_logs_go_to_stderr() {
    let dir = test_dir();
    pipeshift(&dir)
        .args(["--level", "debug", "classify"])
        .write_stdin(CIRCLECI)
        .assert()
        .success()
        .stdout("circleci .yaml yaml\n")
        .stderr(predicate::str::contains("Classified"));
}
