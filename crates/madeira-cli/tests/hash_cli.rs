//! Integration tests for `madeira hash`.

mod support;

use std::fs;

use predicates::prelude::*;
use tempfile::tempdir;

use support::cli;

// echo -n "hello" | openssl dgst -sha256 -binary | base64
const HELLO_SHA256: &str = "LPJNul+wow4m6DsqxbninhsWHlwfp0JecwQzYpOLmCQ=";

#[test]
fn hash_data_prints_base64_digest() {
    cli()
        .args(["hash", "data", "hello"])
        .assert()
        .success()
        .stdout(predicate::str::contains(HELLO_SHA256));
}

#[test]
fn hash_file_matches_data_digest() {
    let temp = tempdir().expect("create temp dir");
    let path = temp.path().join("payload.txt");
    fs::write(&path, "hello").expect("write payload");

    cli()
        .arg("hash")
        .arg("file")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::starts_with(HELLO_SHA256));
}

#[test]
fn hash_stdin_matches_data_digest() {
    cli()
        .args(["hash", "stdin"])
        .write_stdin("hello")
        .assert()
        .success()
        .stdout(predicate::str::contains(HELLO_SHA256));
}

#[test]
fn hash_json_output_names_algorithm() {
    let output = cli()
        .args(["--format", "json", "hash", "--algorithm", "sha512", "data", "hello"])
        .output()
        .expect("run madeira");
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).expect("valid JSON");
    assert_eq!(json["algorithm"], "sha512");
    assert_eq!(json["source"], "<data>");
    assert_ne!(json["digest"], HELLO_SHA256);
}

#[test]
fn hash_unknown_algorithm_fails() {
    cli()
        .args(["hash", "data", "hello", "--algorithm", "md5"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unsupported hash algorithm 'md5'"));
}

#[test]
fn hash_zip_member_of_packaged_function() {
    let temp = tempdir().expect("create temp dir");
    let source = temp.path().join("handler.py");
    let archive = temp.path().join("function.zip");
    fs::write(&source, "hello").expect("write source");

    cli()
        .arg("package")
        .arg("function")
        .arg(&source)
        .arg("--output")
        .arg(&archive)
        .assert()
        .success();

    cli()
        .arg("hash")
        .arg("zip-member")
        .arg(&archive)
        .arg("handler")
        .assert()
        .success()
        .stdout(predicate::str::starts_with(HELLO_SHA256));

    cli()
        .arg("hash")
        .arg("zip-member")
        .arg(&archive)
        .arg("missing.py")
        .assert()
        .failure()
        .stderr(predicate::str::contains("archive does not contain member missing.py"));
}
