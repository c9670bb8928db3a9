use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn tlv_schema() -> Command {
    Command::cargo_bin("tlv-schema").unwrap()
}

fn write_schema(dir: &TempDir, name: &str, contents: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, contents).unwrap();
    path
}

// ---------------------------------------------------------------------------
// Help and version
// ---------------------------------------------------------------------------

#[test]
fn help_exits_zero() {
    tlv_schema()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("TLV Schema compiler"));
}

#[test]
fn version_exits_zero() {
    tlv_schema().arg("--version").assert().success();
}

#[test]
fn validate_help_mentions_silent_flag() {
    tlv_schema()
        .args(["validate", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--silent"));
}

// ---------------------------------------------------------------------------
// validate
// ---------------------------------------------------------------------------

#[test]
fn validate_a_clean_schema_exits_zero() {
    let dir = TempDir::new().unwrap();
    let schema = write_schema(
        &dir,
        "sample.tlv",
        "temperature-sample => STRUCTURE\n{\n  temperature [1] : FLOAT,\n  timestamp   [2] : UNSIGNED INTEGER\n}\n",
    );
    tlv_schema().arg("validate").arg(&schema).assert().success();
}

#[test]
fn validate_reports_one_error_for_a_duplicate_field() {
    let dir = TempDir::new().unwrap();
    let schema = write_schema(
        &dir,
        "dup.tlv",
        "fg => FIELD GROUP { f1 [0]: INTEGER, f2 [1]: INTEGER, f1 [2]: STRING }\ns => STRUCTURE { includes fg }\n",
    );
    tlv_schema()
        .arg("validate")
        .arg(&schema)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("ERROR"));
}

#[test]
fn validate_silent_suppresses_diagnostic_output() {
    let dir = TempDir::new().unwrap();
    let schema = write_schema(&dir, "bad.tlv", "a => b\nb => c\nc => a\n");
    tlv_schema()
        .args(["validate", "--silent"])
        .arg(&schema)
        .assert()
        .code(3)
        .stderr(predicate::str::is_empty());
}

#[test]
fn validate_requires_at_least_one_file() {
    tlv_schema().arg("validate").assert().failure();
}

#[test]
fn validate_reports_an_io_error_for_a_missing_file() {
    tlv_schema()
        .arg("validate")
        .arg("/nonexistent/does-not-exist.tlv")
        .assert()
        .failure()
        .stderr(predicate::str::contains("could not read"));
}

// ---------------------------------------------------------------------------
// dump
// ---------------------------------------------------------------------------

#[test]
fn dump_prints_the_loaded_definition() {
    let dir = TempDir::new().unwrap();
    let schema = write_schema(&dir, "vendor.tlv", "acme => VENDOR [ id 9 ]\n");
    tlv_schema()
        .arg("dump")
        .arg(&schema)
        .assert()
        .success()
        .stdout(predicate::str::contains("VENDOR definition: acme"));
}

#[test]
fn dump_requires_at_least_one_file() {
    tlv_schema().arg("dump").assert().failure();
}

// ---------------------------------------------------------------------------
// unittest
// ---------------------------------------------------------------------------

#[test]
fn unittest_with_no_names_runs_every_scenario_and_exits_zero() {
    tlv_schema().arg("unittest").assert().success();
}

#[test]
fn unittest_can_be_narrowed_to_one_scenario() {
    tlv_schema()
        .args(["unittest", "-v", "1", "e1_happy_path_structure"])
        .assert()
        .success()
        .stdout(predicate::str::contains("e1_happy_path_structure"));
}

#[test]
fn unittest_rejects_an_unknown_scenario_name() {
    tlv_schema()
        .args(["unittest", "not-a-real-scenario"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown scenario"));
}
