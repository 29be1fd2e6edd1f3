//! End-to-end tests for the `idp_config_cli` binary.

use std::path::PathBuf;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::PredicateBooleanExt;
use predicates::str::contains;
use tempfile::TempDir;

const RECORD: &str = r#"
application: orders
namespace: team-a
environments:
  development:
    replicas: 1
    resources:
      requests: { cpu: 100m, memory: 128Mi }
      limits: { cpu: 500m, memory: 512Mi }
    environment:
      LOG_LEVEL: debug
  production:
    replicas: 1
    resources:
      requests: { cpu: 250m, memory: 256Mi }
      limits: { cpu: "1", memory: 1Gi }
    database:
      type: postgresql
      size: small
"#;

const ENV_SMALL: &str = r#"
replicas: 2
resources:
  requests: { cpu: 100m, memory: 128Mi }
  limits: { cpu: 500m, memory: 512Mi }
"#;

const ENV_LARGE: &str = r#"
replicas: 500
resources:
  requests: { cpu: 100m, memory: 128Mi }
  limits: { cpu: 500m, memory: 512Mi }
"#;

fn write(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, contents).expect("write fixture");
    path
}

fn cli() -> assert_cmd::Command {
    cargo_bin_cmd!("idp_config_cli")
}

#[test]
fn version_prints_name() {
    cli()
        .arg("version")
        .assert()
        .success()
        .stdout(contains("idp_config_cli"));
}

#[test]
fn validate_record_reports_production_warning() {
    let dir = tempfile::tempdir().unwrap();
    let file = write(&dir, "orders.yaml", RECORD);
    cli()
        .arg("validate")
        .arg(&file)
        .assert()
        .success()
        .stdout(contains("\"valid\": true"))
        .stdout(contains("environments.production.replicas"));
}

#[test]
fn invalid_environment_exits_with_two() {
    let dir = tempfile::tempdir().unwrap();
    let file = write(&dir, "large.yaml", ENV_LARGE);
    cli()
        .args(["validate", "--environment", "staging"])
        .arg(&file)
        .assert()
        .code(2)
        .stdout(contains("\"valid\": false"))
        .stdout(contains("exceeds the maximum"));
}

#[test]
fn environment_file_needs_environment_flag() {
    let dir = tempfile::tempdir().unwrap();
    let file = write(&dir, "small.yaml", ENV_SMALL);
    cli()
        .arg("validate")
        .arg(&file)
        .assert()
        .code(1)
        .stdout(contains("--environment is required"));
}

#[test]
fn missing_file_fails() {
    let dir = tempfile::tempdir().unwrap();
    cli()
        .arg("validate")
        .arg(dir.path().join("absent.yaml"))
        .assert()
        .code(1)
        .stdout(contains("absent.yaml"));
}

#[test]
fn preview_renders_database_document() {
    let dir = tempfile::tempdir().unwrap();
    let file = write(&dir, "orders.yaml", RECORD);
    cli()
        .args(["preview", "--environment", "production"])
        .arg(&file)
        .assert()
        .success()
        .stdout(contains("kind: EnvironmentPreview"))
        .stdout(contains("name: orders-production-db"))
        .stdout(contains("orders-development").not());
}

#[test]
fn preview_unknown_environment_fails() {
    let dir = tempfile::tempdir().unwrap();
    let file = write(&dir, "orders.yaml", RECORD);
    cli()
        .args(["preview", "--environment", "qa"])
        .arg(&file)
        .assert()
        .code(1)
        .stdout(contains("not found"));
}

#[test]
fn diff_of_environment_files() {
    let dir = tempfile::tempdir().unwrap();
    let a = write(&dir, "small.yaml", ENV_SMALL);
    let b = write(&dir, "large.yaml", ENV_LARGE);
    cli()
        .arg("diff")
        .arg(&a)
        .arg(&b)
        .assert()
        .success()
        .stdout(contains("\"path\": \"replicas\""))
        .stdout(contains("\"kind\": \"changed\""));
}

#[test]
fn diff_of_records_is_keyed_by_environment() {
    let dir = tempfile::tempdir().unwrap();
    let a = write(&dir, "a.yaml", RECORD);
    let b = write(&dir, "b.yaml", &RECORD.replace("LOG_LEVEL: debug", "LOG_LEVEL: info"));
    cli()
        .arg("diff")
        .arg(&a)
        .arg(&b)
        .assert()
        .success()
        .stdout(contains("\"development\""))
        .stdout(contains("environment.LOG_LEVEL"))
        .stdout(contains("\"production\": {"));
}

#[test]
fn diff_record_environment_against_file() {
    let dir = tempfile::tempdir().unwrap();
    let a = write(&dir, "orders.yaml", RECORD);
    let b = write(&dir, "small.yaml", ENV_SMALL);
    cli()
        .args(["diff", "--environment", "development"])
        .arg(&a)
        .arg(&b)
        .assert()
        .success()
        .stdout(contains("environment.LOG_LEVEL"))
        .stdout(contains("\"kind\": \"removed\""));
}

#[test]
fn templates_lists_builtins() {
    cli()
        .arg("templates")
        .assert()
        .success()
        .stdout(contains("web-application"))
        .stdout(contains("scheduled-job"));
}

#[test]
fn templates_from_missing_dir_fails() {
    let dir = tempfile::tempdir().unwrap();
    cli()
        .args(["templates", "--dir"])
        .arg(dir.path().join("nope"))
        .assert()
        .code(1);
}
