// ABOUTME: Integration tests for the settle CLI commands.
// ABOUTME: Validates --help output, init, classify, and failures before any network call.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;

const CLUSTER: &str = "/subscriptions/sub-1/resourceGroups/rg-1/providers/Microsoft.ContainerService/managedClusters/aks-1";

fn settle_cmd() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("settle"))
}

#[test]
fn help_shows_commands() {
    settle_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("init"))
        .stdout(predicate::str::contains("deploy"))
        .stdout(predicate::str::contains("clean"))
        .stdout(predicate::str::contains("classify"));
}

#[test]
fn init_creates_config_file() {
    let temp_dir = tempfile::tempdir().unwrap();
    let config_path = temp_dir.path().join("settle.yml");

    settle_cmd()
        .current_dir(temp_dir.path())
        .args(["init", "--cluster", CLUSTER])
        .assert()
        .success();

    assert!(config_path.exists(), "settle.yml should be created");
    let content = fs::read_to_string(&config_path).unwrap();
    assert!(content.contains("cluster:"), "Config should have cluster field");
    assert!(content.contains("aks-1"));
}

#[test]
fn init_refuses_to_overwrite_existing_config() {
    let temp_dir = tempfile::tempdir().unwrap();
    let config_path = temp_dir.path().join("settle.yml");

    fs::write(&config_path, "existing: config").unwrap();

    settle_cmd()
        .current_dir(temp_dir.path())
        .arg("init")
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn classify_prints_builtin_strategies() {
    let temp_dir = tempfile::tempdir().unwrap();

    settle_cmd()
        .current_dir(temp_dir.path())
        .args(["classify", "Deployment", "Pod", "Job", "Service"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Deployment: rollout-status"))
        .stdout(predicate::str::contains("Pod: readiness-wait"))
        .stdout(predicate::str::contains("Job: job-completion"))
        .stdout(predicate::str::contains("Service: no-check"));
}

#[test]
fn classify_uses_configured_kinds() {
    let temp_dir = tempfile::tempdir().unwrap();
    fs::write(
        temp_dir.path().join("settle.yml"),
        format!("cluster: {CLUSTER}\nstability:\n  kinds:\n    Certificate: readiness-wait\n"),
    )
    .unwrap();

    settle_cmd()
        .current_dir(temp_dir.path())
        .args(["--json", "classify", "Certificate"])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""event":"classify""#))
        .stdout(predicate::str::contains(r#""strategy":"readiness-wait""#));
}

#[test]
fn deploy_without_config_fails() {
    let temp_dir = tempfile::tempdir().unwrap();
    fs::write(temp_dir.path().join("app.yaml"), "kind: Pod\nmetadata:\n  name: probe\n").unwrap();

    settle_cmd()
        .current_dir(temp_dir.path())
        .args(["deploy", "-f", "app.yaml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("configuration file not found"));
}

#[test]
fn deploy_requires_manifest_files() {
    settle_cmd()
        .arg("deploy")
        .assert()
        .failure()
        .stderr(predicate::str::contains("--filename"));
}

#[test]
fn deploy_rejects_manifest_without_name() {
    let temp_dir = tempfile::tempdir().unwrap();
    fs::write(temp_dir.path().join("settle.yml"), format!("cluster: {CLUSTER}\n")).unwrap();
    fs::write(temp_dir.path().join("app.yaml"), "kind: Pod\nmetadata: {}\n").unwrap();

    settle_cmd()
        .current_dir(temp_dir.path())
        .args(["deploy", "-f", "app.yaml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("metadata.name"));
}

#[test]
fn clean_without_credential_fails_before_contacting_cluster() {
    let temp_dir = tempfile::tempdir().unwrap();
    fs::write(
        temp_dir.path().join("settle.yml"),
        format!("cluster: {CLUSTER}\nendpoint: http://127.0.0.1:9\ncredential_env: SETTLE_TEST_UNSET_TOKEN\n"),
    )
    .unwrap();
    fs::write(
        temp_dir.path().join("app.yaml"),
        "kind: Deployment\nmetadata:\n  name: web\n  namespace: prod\n",
    )
    .unwrap();

    settle_cmd()
        .current_dir(temp_dir.path())
        .env_remove("SETTLE_TEST_UNSET_TOKEN")
        .args(["clean", "-f", "app.yaml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("SETTLE_TEST_UNSET_TOKEN"));
}

#[tokio::test(flavor = "multi_thread")]
async fn deploy_warns_about_failures_beyond_the_first() {
    use wiremock::matchers::{body_string_contains, method};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_string_contains("rollout status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "properties": {"provisioningState": "Succeeded", "exitCode": 1, "logs": "timed out"}
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "properties": {"provisioningState": "Succeeded", "exitCode": 0, "logs": "configured"}
        })))
        .mount(&server)
        .await;

    let temp_dir = tempfile::tempdir().unwrap();
    fs::write(
        temp_dir.path().join("settle.yml"),
        format!(
            "cluster: {CLUSTER}\nendpoint: {}\ncredential_env: SETTLE_TEST_TOKEN\n",
            server.uri()
        ),
    )
    .unwrap();
    fs::write(
        temp_dir.path().join("app.yaml"),
        "kind: Deployment\nmetadata:\n  name: web\n  namespace: prod\n---\nkind: Deployment\nmetadata:\n  name: api\n  namespace: prod\n",
    )
    .unwrap();

    settle_cmd()
        .current_dir(temp_dir.path())
        .env("SETTLE_TEST_TOKEN", "token")
        .args(["deploy", "-f", "app.yaml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error: waiting for resources to be stable"))
        .stderr(predicate::str::contains(
            "Warning: 1 more object(s) also failed to become stable",
        ));
}
