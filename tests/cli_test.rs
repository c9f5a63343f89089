//! Binary tests for the offline commands.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use assert_cmd::Command;
use predicates::prelude::*;
use std::io::Write;
use tempfile::NamedTempFile;

fn config(json: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{json}").unwrap();
    file
}

fn lunga(config: &NamedTempFile) -> Command {
    let mut cmd = Command::cargo_bin("lunga-rs").unwrap();
    cmd.arg("--config").arg(config.path()).env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_clean_argument() {
    let cfg = config("{}");
    lunga(&cfg)
        .args(["clean", "<s>[INST]  Hello\n\nworld [/INST]</s>"])
        .assert()
        .success()
        .stdout("Hello world\n");
}

#[test]
fn test_clean_stdin() {
    let cfg = config("{}");
    lunga(&cfg)
        .arg("clean")
        .write_stdin("<|im_start|>assistant text<|im_end|>\n")
        .assert()
        .success()
        .stdout("assistant text\n");
}

#[test]
fn test_clean_json() {
    let cfg = config("{}");
    lunga(&cfg)
        .args(["--format", "json", "clean", "Human: hi"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"cleaned\": \"hi\""));
}

#[test]
fn test_models_lists_catalog() {
    let cfg = config(r#"{"model": "Llama 3.1 8B (Free)"}"#);
    lunga(&cfg)
        .arg("models")
        .assert()
        .success()
        .stdout(
            predicate::str::contains("Mistral 7B (Free)")
                .and(predicate::str::contains("x-ai/grok-4-fast:free"))
                .and(predicate::str::contains("* Llama 3.1 8B (Free)")),
        );
}

#[test]
fn test_bad_config_fails_with_json_error() {
    let cfg = config("{ nope");
    lunga(&cfg)
        .args(["--format", "json", "clean", "x"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("\"error\": \"config\""));
}

#[test]
fn test_ask_without_api_key_fails() {
    let cfg = config("{}");
    lunga(&cfg)
        .env_remove("OPENROUTER_API_KEY")
        .args(["ask", "hello"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("OPENROUTER_API_KEY"));
}

#[test]
fn test_unknown_model_rejected() {
    let cfg = config("{}");
    lunga(&cfg)
        .env_remove("OPENROUTER_API_KEY")
        .args(["ask", "hello", "--model", "gpt-nine"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("gpt-nine"));
}
