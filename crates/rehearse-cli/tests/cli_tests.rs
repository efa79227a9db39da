//! CLI integration tests using assert_cmd.

use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// A `rehearse` command isolated from the caller's config and keys.
fn rehearse(dir: &Path) -> Command {
    #[allow(deprecated)]
    let mut cmd = Command::cargo_bin("rehearse").unwrap();
    cmd.current_dir(dir)
        .env("HOME", dir)
        .env_remove("REHEARSE_GEMINI_KEY")
        .env_remove("REHEARSE_OPENAI_KEY")
        .env_remove("RUST_LOG");
    cmd
}

/// Config pointing at a port nothing listens on, so every LLM call fails fast.
const OFFLINE_CONFIG: &str = r#"
default_provider = "openai"
max_retries = 1
retry_delay_ms = 0

[providers.openai]
type = "openai"
api_key = "sk-test"
base_url = "http://127.0.0.1:9"

[practice]
max_questions = 5
storage_dir = "./storage"
"#;

const STORED_MEMORY: &str = r#"{
  "user_id": "alice",
  "sessions": [{
    "timestamp": "2025-01-01T12:00:00Z",
    "user_id": "alice",
    "role": "Sales",
    "summary_text": "Warm rapport but the close was weak.",
    "weak_spot_topics": ["closing", "objection_handling"],
    "strength_topics": ["rapport"],
    "evaluations": [{
      "question": "How do you handle pricing objections?",
      "answer": "I reframe around value.",
      "scores": {"clarity": 7, "technical_or_role_fit": 6, "structure_STAR": 4, "confidence": 8, "brevity": 7},
      "weak_spots": ["closing"],
      "strengths": ["rapport"],
      "comments": "Add a concrete result."
    }]
  }],
  "weak_spots": {"closing": 1, "objection_handling": 1}
}"#;

fn seed_memory(dir: &Path) {
    std::fs::create_dir_all(dir.join("storage")).unwrap();
    std::fs::write(dir.join("storage/alice_memory.json"), STORED_MEMORY).unwrap();
}

#[test]
fn help_output() {
    let dir = TempDir::new().unwrap();
    rehearse(dir.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("mock interview coach"));
}

#[test]
fn version_output() {
    let dir = TempDir::new().unwrap();
    rehearse(dir.path())
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("rehearse"));
}

#[test]
fn roles_lists_question_banks() {
    let dir = TempDir::new().unwrap();
    rehearse(dir.path())
        .arg("roles")
        .assert()
        .success()
        .stdout(predicate::str::contains("Software Engineer"))
        .stdout(predicate::str::contains("Customer Support"))
        .stdout(predicate::str::contains("system_design"));
}

#[test]
fn init_creates_config() {
    let dir = TempDir::new().unwrap();

    rehearse(dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Created rehearse.toml"));
    assert!(dir.path().join("rehearse.toml").exists());

    rehearse(dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists"));
}

#[test]
fn weak_spots_without_history() {
    let dir = TempDir::new().unwrap();
    rehearse(dir.path())
        .args(["weak-spots", "--user", "nobody"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No weak spots recorded for nobody"));
}

#[test]
fn weak_spots_from_stored_sessions() {
    let dir = TempDir::new().unwrap();
    seed_memory(dir.path());
    rehearse(dir.path())
        .args(["weak-spots", "--user", "alice", "--top-k", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("closing"))
        .stdout(predicate::str::contains("objection_handling").not());
}

#[test]
fn review_renders_latest_session() {
    let dir = TempDir::new().unwrap();
    seed_memory(dir.path());

    rehearse(dir.path())
        .args(["review", "--user", "alice"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Interview review: Sales"))
        .stdout(predicate::str::contains("Structural Integrity (STAR)"));

    rehearse(dir.path())
        .args(["review", "--user", "alice", "--format", "markdown"])
        .assert()
        .success()
        .stdout(predicate::str::contains("### 1. How do you handle pricing objections?"));
}

#[test]
fn review_writes_html_file() {
    let dir = TempDir::new().unwrap();
    seed_memory(dir.path());

    rehearse(dir.path())
        .args(["review", "--user", "alice", "--format", "html", "--output", "out/review.html"])
        .assert()
        .success();

    let html = std::fs::read_to_string(dir.path().join("out/review.html")).unwrap();
    assert!(html.contains("<li>closing</li>"));
}

#[test]
fn review_writes_markdown_file() {
    let dir = TempDir::new().unwrap();
    seed_memory(dir.path());

    rehearse(dir.path())
        .args(["review", "--user", "alice", "--format", "markdown", "--output", "review.md"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Review written to"));

    let md = std::fs::read_to_string(dir.path().join("review.md")).unwrap();
    assert!(md.contains("- closing"));
}

#[test]
fn review_rejects_unknown_format() {
    let dir = TempDir::new().unwrap();
    rehearse(dir.path())
        .args(["review", "--user", "alice", "--format", "pdf"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown format"));
}

#[test]
fn invalid_user_id_is_rejected() {
    let dir = TempDir::new().unwrap();
    rehearse(dir.path())
        .args(["weak-spots", "--user", "../etc"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("user id"));
}

#[test]
fn practice_rejects_out_of_range_question_count() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("rehearse.toml"), OFFLINE_CONFIG).unwrap();
    rehearse(dir.path())
        .args(["practice", "--user", "bob", "--role", "Sales", "--max-questions", "3"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("max_questions must be between 5 and 8"));
}

#[test]
fn practice_rejects_unknown_tone() {
    let dir = TempDir::new().unwrap();
    rehearse(dir.path())
        .args(["practice", "--user", "bob", "--role", "Sales", "--tone", "sarcastic"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown tone"));
}

#[test]
fn practice_without_provider_fails() {
    let dir = TempDir::new().unwrap();
    rehearse(dir.path())
        .args(["practice", "--user", "bob", "--role", "Sales"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not configured"));
}

#[test]
fn practice_completes_with_evaluator_offline() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("rehearse.toml"), OFFLINE_CONFIG).unwrap();

    rehearse(dir.path())
        .args(["practice", "--user", "bob", "--role", "Software Engineer"])
        .write_stdin("first\n\nsecond\nthird\nfourth\nfifth\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Q1: Tell me about a time you debugged"))
        .stdout(predicate::str::contains("Please type an answer"))
        .stdout(predicate::str::contains("Thank you, that concludes this mock interview."))
        .stdout(predicate::str::contains("5-question"));

    let stored: serde_json::Value = serde_json::from_str(
        &std::fs::read_to_string(dir.path().join("storage/bob_memory.json")).unwrap(),
    )
    .unwrap();
    assert_eq!(stored["sessions"].as_array().unwrap().len(), 1);
    assert_eq!(stored["weak_spots"]["Unable to evaluate - API error"], 1);

    rehearse(dir.path())
        .args(["weak-spots", "--user", "bob"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Unable to evaluate - API error"));
}

#[test]
fn practice_stopped_early_saves_nothing() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("rehearse.toml"), OFFLINE_CONFIG).unwrap();

    rehearse(dir.path())
        .args(["practice", "--user", "carol", "--role", "Sales"])
        .write_stdin("only one answer\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("nothing was saved"));

    assert!(!dir.path().join("storage/carol_memory.json").exists());
}
