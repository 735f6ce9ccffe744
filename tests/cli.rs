use assert_cmd::Command;
use predicates::prelude::*;
use std::io::Write;

fn cli() -> Command {
    let mut cmd = Command::cargo_bin("csiv2-sas").unwrap();
    cmd.env("RUST_LOG", "off");
    cmd
}

fn stdout_json(cmd: &mut Command) -> serde_json::Value {
    let output = cmd.assert().success().get_output().stdout.clone();
    serde_json::from_slice(&output).expect("stdout is JSON")
}

#[test]
fn test_encode_then_decode_name() {
    let encoded = stdout_json(cli().args(["encode-name", "alice@default"]));
    let hex = encoded.as_str().unwrap().to_string();
    assert!(hex.starts_with("0401"));

    let decoded = stdout_json(cli().args(["decode-name", &hex]));
    assert_eq!(decoded["name"], "alice@default");
    assert_eq!(decoded["mechanism"], "0606678102010101");
}

#[test]
fn test_decode_name_rejects_bad_hex() {
    cli()
        .args(["decode-name", "zz"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not valid hex"));
}

#[test]
fn test_decode_name_rejects_wrong_mechanism() {
    // exported name with a one-byte OID that is not GSSUP
    cli()
        .args(["decode-name", "0401000105000000026869"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Not a GSSUP exported name"));
}

#[test]
fn test_decode_context_error() {
    let hex = concat!(
        "0000",
        "0004",
        "00000000",
        "0000000000000000",
        "00000004",
        "00000001",
        "00000000",
    );
    let body = stdout_json(cli().args(["decode-context", hex]));
    assert_eq!(body["msg"], "context_error");
    assert_eq!(body["major_status"], 4);
    assert_eq!(body["minor_status"], 1);
}

#[test]
fn test_components_from_config_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
host: ejb.example.com
ssl_port: 3529
ior_security:
  transport:
    integrity: required
    confidentiality: required
  authentication:
    realm: default
    required: true
  identity:
    caller_propagation: supported
"#
    )
    .unwrap();

    let views = stdout_json(cli().arg("--config").arg(file.path()).arg("components"));
    let views = views.as_array().unwrap();
    assert_eq!(views.len(), 2);
    assert_eq!(views[0]["tag"], 20);
    assert_eq!(views[1]["tag"], 33);
    assert_eq!(views[0]["decoded"]["port"], 3529);

    let mechs = views[1]["decoded"]["mechanism_list"].as_array().unwrap();
    assert_eq!(mechs.len(), 1);
}

#[test]
fn test_components_with_defaults() {
    let views = stdout_json(cli().arg("components"));
    let views = views.as_array().unwrap();
    assert!(views.iter().any(|v| v["tag"] == 33));
    // no SSL port configured
    assert!(views.iter().all(|v| v["tag"] != 20));
}

#[test]
fn test_missing_config_file_fails() {
    cli()
        .args(["--config", "/nonexistent/csiv2.yaml", "components"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load configuration"));
}
