//! Smoke tests for the shipped binaries.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use std::process::Command;

#[test]
fn parley_chat_reports_a_missing_config() {
    let out = Command::new(env!("CARGO_BIN_EXE_parley-chat"))
        .arg("/nonexistent/parley.yaml")
        .env("RUST_LOG", "error")
        .output()
        .expect("spawn parley-chat");

    assert!(!out.status.success());
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("parley-chat exited"), "stderr={stderr}");
}

#[test]
fn parley_broker_reports_a_missing_config() {
    let out = Command::new(env!("CARGO_BIN_EXE_parley-broker"))
        .arg("/nonexistent/parley.yaml")
        .env("RUST_LOG", "error")
        .output()
        .expect("spawn parley-broker");

    assert!(!out.status.success());
}
