//! CLI tests for the lf-filter binary.
//!
//! These tests verify payload filtering through the binary, config loading
//! in both formats, and the exit code contract.

use assert_cmd::Command;
use predicates::prelude::*;
use std::io::Write;
use tempfile::NamedTempFile;

/// Get a Command for the lf-filter binary.
fn lf_filter() -> Command {
    let mut cmd = Command::cargo_bin("lf-filter").expect("lf-filter binary should exist");
    cmd.env_remove("LF_CONFIG")
        .env_remove("LF_LOG")
        .env_remove("LF_LOG_FORMAT")
        .env_remove("RUST_LOG");
    cmd
}

fn config_file(suffix: &str, content: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(suffix)
        .tempfile()
        .expect("create temp config");
    file.write_all(content.as_bytes()).expect("write temp config");
    file
}

fn json_config() -> NamedTempFile {
    config_file(
        ".json",
        r#"{
            "service": "orders",
            "logged_fields": {"Orders.Create": ["id", "amount"]},
            "trimmed_fields": {"orders.update": ["card"]}
        }"#,
    )
}

const BODY: &str = r#"{"id": 7, "card": "4111", "amount": 10}"#;

// ============================================================================
// Filtering
// ============================================================================

mod filtering {
    use super::*;

    #[test]
    fn shorten_from_stdin() {
        let config = json_config();
        lf_filter()
            .arg("--config")
            .arg(config.path())
            .args(["shorten", "--handler", "orders.create"])
            .write_stdin(BODY)
            .assert()
            .success()
            .stdout(r#"{"id": 7, "amount": 10}"#);
    }

    #[test]
    fn trim_from_stdin() {
        let config = json_config();
        lf_filter()
            .arg("--config")
            .arg(config.path())
            .args(["trim", "--handler", "ORDERS.UPDATE"])
            .write_stdin(BODY)
            .assert()
            .success()
            .stdout(r#"{"id": 7, "card": "TRIMMED_CONTENT", "amount": 10}"#);
    }

    #[test]
    fn trim_from_input_file() {
        let config = json_config();
        let input = config_file(".json", BODY);
        lf_filter()
            .args(["trim", "--handler", "orders.update", "--input"])
            .arg(input.path())
            .arg("--config")
            .arg(config.path())
            .assert()
            .success()
            .stdout(predicate::str::contains("TRIMMED_CONTENT"));
    }

    #[test]
    fn unknown_handler_passes_through() {
        let config = json_config();
        lf_filter()
            .arg("--config")
            .arg(config.path())
            .args(["shorten", "--handler", "orders.delete"])
            .write_stdin(BODY)
            .assert()
            .success()
            .stdout(BODY);
    }

    #[test]
    fn empty_input_gives_empty_output() {
        let config = json_config();
        lf_filter()
            .arg("--config")
            .arg(config.path())
            .args(["shorten", "--handler", "orders.create"])
            .write_stdin("")
            .assert()
            .success()
            .stdout("");
    }

    #[test]
    fn malformed_input_is_not_an_error() {
        let config = json_config();
        lf_filter()
            .arg("--config")
            .arg(config.path())
            .args(["trim", "--handler", "orders.update"])
            .write_stdin(r#"{"card": "41"#)
            .assert()
            .success()
            .stdout(r#"{"card": "41"#)
            .stderr(predicate::str::contains("lf_filter::finder"));
    }

    #[test]
    fn malformed_input_is_not_passed_through_by_shorten() {
        let config = json_config();
        lf_filter()
            .arg("--config")
            .arg(config.path())
            .args(["shorten", "--handler", "orders.create"])
            .write_stdin(r#"{"card": "4111", "id": "7"#)
            .assert()
            .success()
            .stdout("{}");
    }

    #[test]
    fn config_path_from_env() {
        let config = json_config();
        lf_filter()
            .env("LF_CONFIG", config.path())
            .args(["shorten", "--handler", "orders.create"])
            .write_stdin(BODY)
            .assert()
            .success()
            .stdout(r#"{"id": 7, "amount": 10}"#);
    }
}

// ============================================================================
// Check
// ============================================================================

mod check {
    use super::*;

    #[test]
    fn check_prints_summary() {
        let config = json_config();
        let output = lf_filter()
            .arg("--config")
            .arg(config.path())
            .arg("check")
            .output()
            .expect("run lf-filter");
        assert!(output.status.success());

        let summary: serde_json::Value =
            serde_json::from_slice(&output.stdout).expect("summary is JSON");
        assert_eq!(summary["status"], "valid");
        assert_eq!(summary["service"], "orders");
        assert_eq!(summary["format"], "jsonl");
        assert_eq!(summary["logged_handlers"], serde_json::json!(["orders.create"]));
        assert_eq!(summary["trimmed_handlers"], serde_json::json!(["orders.update"]));
        assert_eq!(summary["shadowed_trimmed_handlers"], serde_json::json!([]));
    }

    #[test]
    fn check_toml_config() {
        let config = config_file(
            ".toml",
            r#"
service = "billing"
level = "warn"

[trimmed_fields]
"payments.charge" = ["card_number"]
"#,
        );
        lf_filter()
            .arg("--config")
            .arg(config.path())
            .arg("check")
            .assert()
            .success()
            .stdout(predicate::str::contains("\"billing\""))
            .stdout(predicate::str::contains("payments.charge"));
    }

    #[test]
    fn check_reports_shadowed_trimmed_handlers() {
        let config = config_file(
            ".json",
            r#"{
                "logged_fields": {"Orders.Create": ["id"]},
                "trimmed_fields": {"orders.create": ["card"]}
            }"#,
        );
        let output = lf_filter()
            .arg("--config")
            .arg(config.path())
            .arg("check")
            .output()
            .expect("run lf-filter");
        assert!(output.status.success());

        let summary: serde_json::Value =
            serde_json::from_slice(&output.stdout).expect("summary is JSON");
        assert_eq!(
            summary["shadowed_trimmed_handlers"],
            serde_json::json!(["orders.create"])
        );
    }

    #[test]
    fn check_without_config_uses_defaults() {
        lf_filter()
            .arg("check")
            .assert()
            .success()
            .stdout(predicate::str::contains("\"system\""));
    }
}

// ============================================================================
// Errors and exit codes
// ============================================================================

mod errors {
    use super::*;

    #[test]
    fn missing_subcommand_is_args_error() {
        lf_filter()
            .assert()
            .code(10)
            .stderr(predicate::str::contains("Usage"));
    }

    #[test]
    fn missing_handler_is_args_error() {
        lf_filter()
            .arg("shorten")
            .write_stdin(BODY)
            .assert()
            .code(10)
            .stderr(predicate::str::contains("--handler"));
    }

    #[test]
    fn help_exits_zero() {
        lf_filter()
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("shorten"));
    }

    #[test]
    fn missing_config_file_is_config_error() {
        lf_filter()
            .args(["--config", "/nonexistent/lf.json", "check"])
            .assert()
            .code(11)
            .stderr(predicate::str::contains("ERR_CONFIG"));
    }

    #[test]
    fn unsupported_extension_is_config_error() {
        let config = config_file(".yaml", "service: x");
        lf_filter()
            .arg("--config")
            .arg(config.path())
            .arg("check")
            .assert()
            .code(11)
            .stderr(predicate::str::contains("unsupported config format"));
    }

    #[test]
    fn case_colliding_handlers_are_config_error() {
        let config = config_file(
            ".json",
            r#"{"logged_fields": {"Orders": ["a"], "orders": ["b"]}}"#,
        );
        lf_filter()
            .arg("--config")
            .arg(config.path())
            .arg("check")
            .assert()
            .code(11)
            .stderr(predicate::str::contains("only by case"));
    }

    #[test]
    fn unreadable_input_is_io_error() {
        lf_filter()
            .args(["trim", "--handler", "x", "--input", "/nonexistent/body.json"])
            .assert()
            .code(12)
            .stderr(predicate::str::contains("ERR_IO"));
    }
}
