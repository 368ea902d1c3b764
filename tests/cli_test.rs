//! Integration tests for the gwa command-line surface

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const PETSTORE_JSON: &str = r#"{
    "openapi": "3.0.0",
    "info": {"title": "Swagger Petstore", "version": "1.0.0"},
    "servers": [{"url": "https://petstore.example.com/api"}],
    "paths": {
        "/pets": {"get": {}, "post": {}},
        "/pets/{petId}": {"get": {}}
    }
}"#;

const RATE_LIMITING_PLUGIN: &str = r#"name: Rate Limiting
url: https://docs.konghq.com/hub/kong-inc/rate-limiting/
bcgov: false
description: Rate limit how many HTTP requests can be made in a period
---
name: rate-limiting
enabled: false
tags: []
config:
  minute: 10
  policy: local
"#;

const IP_ANONYMITY_PLUGIN: &str = r#"name: IP Anonymity
url: https://github.com/bcgov/gwa-ip-anonymity
bcgov: true
description: Masks client addresses
---
name: gwa-ip-anonymity
enabled: false
tags: []
config:
  ipv4_mask: 24
  ipv6_mask: 64
"#;

#[test]
fn test_help_lists_commands() {
    let mut cmd = Command::cargo_bin("gwa").unwrap();

    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("init"))
        .stdout(predicate::str::contains("new"))
        .stdout(predicate::str::contains("validate"))
        .stdout(predicate::str::contains("plugins"))
        .stdout(predicate::str::contains("acl"))
        .stdout(predicate::str::contains("publish-gateway"));
}

#[test]
fn test_version_flag() {
    let mut cmd = Command::cargo_bin("gwa").unwrap();

    cmd.arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("gwa"));
}

#[test]
fn test_init_writes_env_file() {
    let temp_dir = TempDir::new().unwrap();
    let mut cmd = Command::cargo_bin("gwa").unwrap();

    cmd.current_dir(temp_dir.path())
        .arg("init")
        .arg("--namespace")
        .arg("sampler")
        .arg("--client-id")
        .arg("sampler-ci")
        .arg("--client-secret")
        .arg("s3cret")
        .assert()
        .success()
        .stdout(predicate::str::contains(".env file successfully generated"));

    let contents = std::fs::read_to_string(temp_dir.path().join(".env")).unwrap();
    assert_eq!(
        contents,
        "GWA_NAMESPACE=sampler\nCLIENT_ID=sampler-ci\nCLIENT_SECRET=s3cret\nGWA_ENV=dev\n"
    );
}

#[test]
fn test_init_rejects_invalid_namespace() {
    let temp_dir = TempDir::new().unwrap();
    let mut cmd = Command::cargo_bin("gwa").unwrap();

    cmd.current_dir(temp_dir.path())
        .arg("init")
        .arg("--namespace")
        .arg("Bad")
        .arg("--client-id")
        .arg("sampler-ci")
        .arg("--client-secret")
        .arg("s3cret")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Action Failed"))
        .stderr(predicate::str::contains("too short"))
        .stderr(predicate::str::contains("a-z, 0-9 and dashes"));

    assert!(!temp_dir.path().join(".env").exists());
}

#[test]
fn test_init_refuses_existing_env_file() {
    let temp_dir = TempDir::new().unwrap();
    std::fs::write(temp_dir.path().join(".env"), "GWA_NAMESPACE=sampler\n").unwrap();
    let mut cmd = Command::cargo_bin("gwa").unwrap();

    cmd.current_dir(temp_dir.path())
        .arg("init")
        .arg("--namespace")
        .arg("sampler")
        .arg("--client-id")
        .arg("sampler-ci")
        .arg("--client-secret")
        .arg("s3cret")
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "You already have an .env file in this project",
        ));
}

#[test]
fn test_new_generates_gateway_config() {
    let temp_dir = TempDir::new().unwrap();
    std::fs::write(temp_dir.path().join("petstore.json"), PETSTORE_JSON).unwrap();
    let mut cmd = Command::cargo_bin("gwa").unwrap();

    cmd.current_dir(temp_dir.path())
        .arg("new")
        .arg("petstore.json")
        .arg("--team")
        .arg("core-team")
        .assert()
        .success()
        .stdout(predicate::str::contains("File petstore.yaml generated"));

    let config = std::fs::read_to_string(temp_dir.path().join("petstore.yaml")).unwrap();
    assert!(config.contains("_format_version"));
    assert!(config.contains("name: swagger-petstore"));
    assert!(config.contains("url: https://petstore.example.com/api"));
    assert!(config.contains("- core-team"));
    assert!(config.contains("name: swagger-petstore-pets"));
}

#[test]
fn test_new_embeds_known_plugins() {
    let temp_dir = TempDir::new().unwrap();
    std::fs::write(temp_dir.path().join("petstore.json"), PETSTORE_JSON).unwrap();
    std::fs::create_dir(temp_dir.path().join("plugins")).unwrap();
    std::fs::write(
        temp_dir.path().join("plugins/rate-limiting.yaml"),
        RATE_LIMITING_PLUGIN,
    )
    .unwrap();
    let mut cmd = Command::cargo_bin("gwa").unwrap();

    cmd.current_dir(temp_dir.path())
        .arg("new")
        .arg("petstore.json")
        .arg("--team")
        .arg("core-team")
        .arg("--plugins")
        .arg("rate-limiting")
        .assert()
        .success();

    let config = std::fs::read_to_string(temp_dir.path().join("petstore.yaml")).unwrap();
    assert!(config.contains("plugins:"));
    assert!(config.contains("name: rate-limiting"));
    assert!(config.contains("enabled: true"));
    assert!(config.contains("minute: 10"));
}

#[test]
fn test_new_warns_on_unknown_plugins() {
    let temp_dir = TempDir::new().unwrap();
    std::fs::write(temp_dir.path().join("petstore.json"), PETSTORE_JSON).unwrap();
    let mut cmd = Command::cargo_bin("gwa").unwrap();

    cmd.current_dir(temp_dir.path())
        .arg("new")
        .arg("petstore.json")
        .arg("--team")
        .arg("core-team")
        .arg("--plugins")
        .arg("no-such-plugin")
        .assert()
        .success()
        .stderr(predicate::str::contains(
            "The following plugins are named incorrectly or are not supported: no-such-plugin",
        ));
}

#[test]
fn test_new_requires_input() {
    let mut cmd = Command::cargo_bin("gwa").unwrap();

    cmd.arg("new")
        .assert()
        .failure()
        .stderr(predicate::str::contains("required"));
}

#[test]
fn test_validate_accepts_clean_config() {
    let temp_dir = TempDir::new().unwrap();
    let config = "services:\n- name: sample\n  url: http://sample.local\n  routes:\n  - name: sample-route\n    paths:\n    - /\n";
    std::fs::write(temp_dir.path().join("gateway.yaml"), config).unwrap();
    let mut cmd = Command::cargo_bin("gwa").unwrap();

    cmd.current_dir(temp_dir.path())
        .arg("validate")
        .arg("gateway.yaml")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "gateway.yaml is a valid gateway config",
        ));
}

#[test]
fn test_validate_reports_structural_problems() {
    let temp_dir = TempDir::new().unwrap();
    let config = "services:\n- url: http://sample.local\n  routes:\n  - paths:\n    - /\n";
    std::fs::write(temp_dir.path().join("gateway.yaml"), config).unwrap();
    let mut cmd = Command::cargo_bin("gwa").unwrap();

    cmd.current_dir(temp_dir.path())
        .arg("validate")
        .arg("gateway.yaml")
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed validation"))
        .stderr(predicate::str::contains("service 0 has no name"))
        .stderr(predicate::str::contains("route 0 has no name"));
}

#[test]
fn test_validate_missing_file_fails() {
    let temp_dir = TempDir::new().unwrap();
    let mut cmd = Command::cargo_bin("gwa").unwrap();

    cmd.current_dir(temp_dir.path())
        .arg("validate")
        .arg("missing.yaml")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read missing.yaml"));
}

#[test]
fn test_plugins_lists_catalogue() {
    let temp_dir = TempDir::new().unwrap();
    std::fs::create_dir(temp_dir.path().join("plugins")).unwrap();
    std::fs::write(
        temp_dir.path().join("plugins/rate-limiting.yaml"),
        RATE_LIMITING_PLUGIN,
    )
    .unwrap();
    std::fs::write(
        temp_dir.path().join("plugins/gwa-ip-anonymity.yaml"),
        IP_ANONYMITY_PLUGIN,
    )
    .unwrap();
    let mut cmd = Command::cargo_bin("gwa").unwrap();

    cmd.current_dir(temp_dir.path())
        .arg("plugins")
        .assert()
        .success()
        .stdout(predicate::str::contains("GWA Plugins"))
        .stdout(predicate::str::contains("Rate Limiting"))
        .stdout(predicate::str::contains("IP Anonymity *"));
}

#[test]
fn test_publish_gateway_requires_namespace() {
    let temp_dir = TempDir::new().unwrap();
    let mut cmd = Command::cargo_bin("gwa").unwrap();

    cmd.current_dir(temp_dir.path())
        .env_remove("GWA_NAMESPACE")
        .arg("publish-gateway")
        .assert()
        .failure()
        .stderr(predicate::str::contains("You do not have a namespace set"));
}

#[test]
fn test_publish_gateway_alias() {
    let temp_dir = TempDir::new().unwrap();
    let mut cmd = Command::cargo_bin("gwa").unwrap();

    cmd.current_dir(temp_dir.path())
        .env_remove("GWA_NAMESPACE")
        .arg("pg")
        .arg("--dry-run")
        .assert()
        .failure()
        .stderr(predicate::str::contains("You do not have a namespace set"));
}
