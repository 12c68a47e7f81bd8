//! Integration tests for the `sitedeploy` binary.
//!
//! Argument parsing, help output, completions and exit codes. Dashboard
//! calls go to a local wiremock server through the hidden `--base-url`.
#![allow(clippy::unwrap_used)]

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a command for the binary with env isolation.
///
/// Clears all `SITEDEPLOY_*` env vars and points config directories at a
/// nonexistent path so tests never touch the user's real configuration.
fn sitedeploy_cmd() -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("sitedeploy");
    cmd.env("HOME", "/tmp/sitedeploy-cli-test-nonexistent")
        .env("XDG_CONFIG_HOME", "/tmp/sitedeploy-cli-test-nonexistent")
        .env("NO_COLOR", "1")
        .env_remove("SITEDEPLOY_PROFILE")
        .env_remove("SITEDEPLOY_API_KEY")
        .env_remove("SITEDEPLOY_ORG")
        .env_remove("SITEDEPLOY_OUTPUT")
        .env_remove("SITEDEPLOY_TIMEOUT")
        .env_remove("SITEDEPLOY_GOOGLE_KEY")
        .env_remove("SITEDEPLOY_BASE_URL")
        .env_remove("RUST_LOG");
    cmd
}

/// Concatenate stdout + stderr from a command output for flexible matching.
fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

const DEPLOY_ARGS: [&str; 9] = [
    "deploy",
    "-s",
    "Q2AA-0001,Q2AA-0002",
    "-n",
    "GB_MTB",
    "-c",
    "EMEA - BTQ Template",
    "-w",
    "10.10.20.0/24",
];

/// A dashboard with organization `RISA` (id 100) and the given networks.
async fn mock_dashboard(networks: serde_json::Value) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/organizations"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([{ "id": "100", "name": "RISA" }])),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/organizations/100/networks"))
        .respond_with(ResponseTemplate::new(200).set_body_json(networks))
        .mount(&server)
        .await;
    server
}

/// Run the binary off the async runtime so the mock server keeps serving.
async fn run_against(server: &MockServer, args: Vec<&'static str>) -> std::process::Output {
    let uri = server.uri();
    tokio::task::spawn_blocking(move || {
        sitedeploy_cmd()
            .args(["--base-url", &uri, "-k", "test-key", "-o", "RISA"])
            .args(args)
            .output()
            .unwrap()
    })
    .await
    .unwrap()
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let output = sitedeploy_cmd().output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    let text = combined_output(&output);
    assert!(text.contains("Usage"), "Expected 'Usage' in output:\n{text}");
}

#[test]
fn test_help_flag() {
    sitedeploy_cmd().arg("--help").assert().success().stdout(
        predicate::str::contains("Meraki")
            .and(predicate::str::contains("deploy"))
            .and(predicate::str::contains("migrate"))
            .and(predicate::str::contains("add-devices")),
    );
}

#[test]
fn test_version_flag() {
    sitedeploy_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("sitedeploy"));
}

#[test]
fn test_deploy_help_lists_short_flags() {
    sitedeploy_cmd()
        .args(["deploy", "--help"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("--ignore-existing")
                .and(predicate::str::contains("--guest-wifi"))
                .and(predicate::str::contains("-w, --subnet")),
        );
}

// ── Shell completions ───────────────────────────────────────────────

#[test]
fn test_completions_bash() {
    sitedeploy_cmd()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty().not());
}

#[test]
fn test_completions_zsh() {
    sitedeploy_cmd()
        .args(["completions", "zsh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#compdef"));
}

// ── Usage errors ────────────────────────────────────────────────────

#[test]
fn test_invalid_subcommand() {
    let output = sitedeploy_cmd().arg("foobar").output().unwrap();
    assert_eq!(output.status.code(), Some(2));
    let text = combined_output(&output);
    assert!(text.contains("foobar"), "Expected the bad subcommand in output:\n{text}");
}

#[test]
fn test_deploy_missing_required_flags() {
    let output = sitedeploy_cmd()
        .args(["deploy", "-n", "GB_MTB"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    let text = combined_output(&output);
    assert!(text.contains("--serial"), "Expected missing flag in output:\n{text}");
}

#[test]
fn test_invalid_region() {
    let output = sitedeploy_cmd()
        .args(["--region", "mars", "migrate", "-n", "GB_MTB", "-t", "BTQ"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
}

// ── Configuration ───────────────────────────────────────────────────

#[test]
fn test_deploy_without_credentials() {
    sitedeploy_cmd()
        .args(["-o", "RISA"])
        .args(DEPLOY_ARGS)
        .assert()
        .code(3)
        .stdout(predicate::str::contains("@ ERROR: No API key configured"))
        .stderr(predicate::str::contains("config init"));
}

#[test]
fn test_unknown_profile() {
    sitedeploy_cmd()
        .args(["-p", "apac", "-k", "key", "-o", "RISA"])
        .args(DEPLOY_ARGS)
        .assert()
        .code(2)
        .stdout(predicate::str::contains("Profile 'apac' not found"));
}

/// A config directory holding two profiles, `emea` being the default.
fn config_dir(base_url: &str) -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    let app = dir.path().join("sitedeploy");
    std::fs::create_dir_all(&app).unwrap();
    std::fs::write(
        app.join("config.toml"),
        format!(
            "default_profile = \"emea\"\n\n\
             [profiles.emea]\n\
             organization = \"RISA\"\n\
             api_key = \"plain-key\"\n\
             base_url = \"{base_url}\"\n\n\
             [profiles.apac]\n\
             organization = \"RISA APAC\"\n"
        ),
    )
    .unwrap();
    dir
}

#[test]
fn test_config_profiles_marks_default() {
    let dir = config_dir("http://127.0.0.1:9");
    sitedeploy_cmd()
        .env("XDG_CONFIG_HOME", dir.path())
        .args(["config", "profiles"])
        .assert()
        .success()
        .stdout("apac\nemea *\n");
}

#[test]
fn test_config_use_switches_default() {
    let dir = config_dir("http://127.0.0.1:9");
    sitedeploy_cmd()
        .env("XDG_CONFIG_HOME", dir.path())
        .args(["config", "use", "apac"])
        .assert()
        .success();
    let written = std::fs::read_to_string(dir.path().join("sitedeploy/config.toml")).unwrap();
    assert!(written.contains("default_profile = \"apac\""), "config:\n{written}");
}

#[test]
fn test_config_show_masks_plaintext_key() {
    let dir = config_dir("http://127.0.0.1:9");
    sitedeploy_cmd()
        .env("XDG_CONFIG_HOME", dir.path())
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[profiles.emea]").and(predicate::str::contains("plain-key").not()));
}

#[test]
fn test_config_show_no_config() {
    sitedeploy_cmd()
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[defaults]"));
}

// ── Against a mock dashboard ────────────────────────────────────────

#[tokio::test(flavor = "multi_thread")]
async fn test_deploy_onto_existing_network_is_a_conflict() {
    let server = mock_dashboard(json!([{ "id": "N_1", "name": "GB_MTB" }])).await;
    Mock::given(method("POST"))
        .and(path("/api/v1/organizations/100/inventory/claim"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let output = run_against(&server, DEPLOY_ARGS.to_vec()).await;

    assert_eq!(output.status.code(), Some(2));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("@ Template is"), "transcript:\n{stdout}");
    assert!(
        stdout.contains("@ ERROR: Network 'GB_MTB' already exists"),
        "transcript:\n{stdout}"
    );
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("--ignore-existing"), "diagnostic:\n{stderr}");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_profile_supplies_organization_and_key() {
    let server = mock_dashboard(json!([{ "id": "N_1", "name": "GB_MTB" }])).await;
    let dir = config_dir(&server.uri());
    let config_home = dir.path().to_path_buf();

    let output = tokio::task::spawn_blocking(move || {
        sitedeploy_cmd()
            .env("XDG_CONFIG_HOME", config_home)
            .args(DEPLOY_ARGS)
            .output()
            .unwrap()
    })
    .await
    .unwrap();

    assert_eq!(output.status.code(), Some(2));
    let requests = server.received_requests().await.unwrap();
    let key = requests[0].headers.get("x-cisco-meraki-api-key").unwrap();
    assert_eq!(key.to_str().unwrap(), "plain-key");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_bad_site_name_fails_before_any_mutation() {
    let server = mock_dashboard(json!([])).await;

    let output = run_against(
        &server,
        vec![
            "deploy", "-s", "Q2AA-0001", "-n", "GBMTB", "-c", "EMEA - BTQ Template", "-w",
            "10.10.20.0/24",
        ],
    )
    .await;

    assert_eq!(output.status.code(), Some(2));
    let requests = server.received_requests().await.unwrap();
    assert!(requests.iter().all(|r| r.method.as_str() == "GET"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_rejected_api_key_exits_with_auth_code() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/organizations"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({ "errors": ["Invalid API key"] })))
        .mount(&server)
        .await;

    let output = run_against(&server, vec!["migrate", "-n", "GB_MTB", "-t", "BTQ"]).await;
    assert_eq!(output.status.code(), Some(3));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_rejected_key_names_the_profile_in_use() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/organizations"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({ "errors": ["Invalid API key"] })))
        .mount(&server)
        .await;
    let dir = config_dir(&server.uri());
    let config_home = dir.path().to_path_buf();

    let output = tokio::task::spawn_blocking(move || {
        sitedeploy_cmd()
            .env("XDG_CONFIG_HOME", config_home)
            .args(["migrate", "-n", "GB_MTB", "-t", "BTQ"])
            .output()
            .unwrap()
    })
    .await
    .unwrap();

    assert_eq!(output.status.code(), Some(3));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("--profile emea"), "diagnostic:\n{stderr}");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_unknown_organization_is_not_found() {
    let server = mock_dashboard(json!([])).await;
    let uri = server.uri();

    let output = tokio::task::spawn_blocking(move || {
        sitedeploy_cmd()
            .args(["--base-url", &uri, "-k", "test-key", "-o", "NOPE"])
            .args(["add-devices", "-s", "Q2AA-0001", "-n", "GB_MTB"])
            .output()
            .unwrap()
    })
    .await
    .unwrap();

    assert_eq!(output.status.code(), Some(2));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Organization 'NOPE' not found"), "transcript:\n{stdout}");
}
