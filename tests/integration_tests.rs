use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn treeline() -> Command {
    Command::cargo_bin("treeline").expect("binary exists")
}

fn fixtures_dir() -> &'static str {
    concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures")
}

// ---------------------------------------------------------------------------
// CLI smoke tests
// ---------------------------------------------------------------------------

#[test]
fn test_help_output() {
    treeline()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("dependency graph"));
}

#[test]
fn test_analyze_json_output() {
    treeline()
        .args(["--no-cache", "analyze", fixtures_dir()])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"nodes\""))
        .stdout(predicate::str::contains("\"links\""))
        .stdout(predicate::str::contains("entry_points"));
}

#[test]
fn test_analyze_text_output() {
    treeline()
        .args(["--no-cache", "--format", "text", "analyze", fixtures_dir()])
        .assert()
        .success()
        .stdout(predicate::str::contains("entry_points"));
}

#[test]
fn test_analyze_with_quality_reports_issues() {
    treeline()
        .args(["--no-cache", "analyze", fixtures_dir(), "--quality"])
        .assert()
        .success()
        .stdout(predicate::str::contains("hardcoded_secret"))
        .stdout(predicate::str::contains("sql_injection"));
}

#[test]
fn test_file_subcommand_outline() {
    let file = format!("{}/app.py", fixtures_dir());
    treeline()
        .args(["file", &file])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"functions\""))
        .stdout(predicate::str::contains("cyclomatic"))
        .stdout(predicate::str::contains("App"));
}

#[test]
fn test_missing_directory_fails() {
    treeline()
        .args(["analyze", "/nonexistent/tree"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error"));
}

#[test]
fn test_missing_file_fails() {
    treeline()
        .args(["file", "/nonexistent/app.py"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error"));
}

// ---------------------------------------------------------------------------
// Behavior
// ---------------------------------------------------------------------------

#[test]
fn test_two_module_scenario_end_to_end() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("a.py"), "import os\n\ndef f():\n    pass\n").unwrap();
    fs::write(
        dir.path().join("b.py"),
        "from a import f\n\ndef g():\n    f()\n",
    )
    .unwrap();

    let output = treeline()
        .args(["--no-cache", "analyze"])
        .arg(dir.path())
        .output()
        .unwrap();
    assert!(output.status.success());
    let bundle: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();

    assert_eq!(bundle["insights"]["entry_points"], serde_json::json!(["b"]));
    assert!(bundle["module_metrics"]["a"]["functions"] == 1);
    assert!(bundle["module_metrics"]["b"]["functions"] == 1);

    // Every link endpoint must be a known node id.
    let nodes = bundle["graph"]["nodes"].as_array().unwrap();
    let ids: std::collections::HashSet<u64> =
        nodes.iter().map(|n| n["id"].as_u64().unwrap()).collect();
    for link in bundle["graph"]["links"].as_array().unwrap() {
        assert!(ids.contains(&link["source"].as_u64().unwrap()));
        assert!(ids.contains(&link["target"].as_u64().unwrap()));
    }

    // b imports a, and b.g calls a.f.
    let node_id = |name: &str| {
        nodes
            .iter()
            .find(|n| n["name"] == name)
            .map(|n| n["id"].as_u64().unwrap())
            .unwrap()
    };
    let links = bundle["graph"]["links"].as_array().unwrap();
    assert!(links.iter().any(|l| l["type"] == "imports"
        && l["source"].as_u64() == Some(node_id("b"))
        && l["target"].as_u64() == Some(node_id("a"))));
    assert!(links.iter().any(|l| l["type"] == "calls"
        && l["source"].as_u64() == Some(node_id("b.g"))
        && l["target"].as_u64() == Some(node_id("a.f"))));
}

#[test]
fn test_cache_file_written_and_reused() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("a.py"), "def f():\n    pass\n").unwrap();

    let first = treeline().arg("analyze").arg(dir.path()).output().unwrap();
    assert!(first.status.success());
    assert!(dir.path().join(".treeline_cache.json").exists());

    let second = treeline().arg("analyze").arg(dir.path()).output().unwrap();
    assert!(second.status.success());
    assert_eq!(first.stdout, second.stdout);
}

#[test]
fn test_ignore_file_excludes_directory() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join(".treeline-ignore"), "generated/\n").unwrap();
    fs::write(dir.path().join("main.py"), "def main():\n    pass\n").unwrap();
    fs::create_dir(dir.path().join("generated")).unwrap();
    fs::write(
        dir.path().join("generated/gen.py"),
        "def gen():\n    pass\n",
    )
    .unwrap();

    let output = treeline()
        .args(["--no-cache", "analyze"])
        .arg(dir.path())
        .output()
        .unwrap();
    assert!(output.status.success());
    let bundle: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert!(bundle["module_metrics"].get("main").is_some());
    assert!(bundle["module_metrics"].get("generated.gen").is_none());
}

#[test]
fn test_runs_are_deterministic() {
    let first = treeline()
        .args(["--no-cache", "analyze", fixtures_dir()])
        .output()
        .unwrap();
    let second = treeline()
        .args(["--no-cache", "analyze", fixtures_dir()])
        .output()
        .unwrap();
    assert!(first.status.success());
    assert_eq!(first.stdout, second.stdout);
}
