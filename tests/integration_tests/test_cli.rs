// integration tests for the polcfg binary

use crate::common::*;

// ============================================================================
// compile
// ============================================================================

#[test]
fn test_compile_prints_canonical_form() {
    let output = run_polcfg(&["compile", "size > 1024MB and last_mod > 86400"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(
        output.status.success(),
        "compile should succeed.\nstderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert_eq!(
        stdout,
        "(size > 1GB) AND (last_mod > 1d)\nattributes: size,last_mod\n"
    );
}

#[test]
fn test_compile_json_output() {
    let (output, json) = run_polcfg_json(&["compile", "last_mod > 1s"]);
    assert!(output.status.success());

    assert_eq!(json["jsonrpc"], "2.0");
    let result = &json["result"];
    assert_eq!(result["canonical"], "last_mod > 1s");
    assert_eq!(result["attributes"], serde_json::json!(["last_mod"]));
    assert_eq!(result["conditions"], 1);
}

#[test]
fn test_compile_error_exit_code() {
    let output = run_polcfg(&["compile", "size > -5MB"]);
    assert_eq!(output.status.code(), Some(2));

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("Positive value expected for size criteria, line 1"),
        "stderr: {}",
        stderr
    );
}

#[test]
fn test_compile_error_json_suggestion() {
    let (output, json) = run_polcfg_json(&["compile", "sise > 1GB"]);
    assert_eq!(output.status.code(), Some(2));

    assert_eq!(json["error"]["code"], -32002);
    assert_eq!(json["error"]["data"]["suggestions"], serde_json::json!(["size"]));
}

#[test]
fn test_compile_with_status_manager() {
    let output = run_polcfg(&[
        "compile",
        "status == archived",
        "--status-manager",
        "lhsm",
        "--status",
        "new,archived",
    ]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("status == \"archived\"\n"));
    assert!(stdout.contains("attributes: status[0]"));
}

#[test]
fn test_compile_status_from_document() {
    let file = write_document(DOCUMENT);
    let path = file.path().to_str().unwrap();

    let output = run_polcfg(&[
        "--config",
        path,
        "compile",
        "status == lost",
        "--status-manager",
        "lhsm",
    ]);
    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("allowed values are new, modified, archived"));
}

#[test]
fn test_compile_truncated_output() {
    let output = run_polcfg(&["compile", "owner == root", "--max-length", "5"]);
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).starts_with("owner\n"));
    assert!(String::from_utf8_lossy(&output.stderr).contains("truncated"));
}

// ============================================================================
// target
// ============================================================================

#[test]
fn test_target_expression() {
    let file = write_document(DOCUMENT);
    let path = file.path().to_str().unwrap();

    let output = run_polcfg(&["--config", path, "target", "big inter not logs"]);
    assert!(output.status.success());
    assert_eq!(
        String::from_utf8_lossy(&output.stdout),
        "(size > 1GB) AND (NOT (name  =~  \"*.log\"))\nattributes: name,size\n"
    );
}

// ============================================================================
// check
// ============================================================================

#[test]
fn test_check_valid_document() {
    let file = write_document(DOCUMENT);
    let path = file.path().to_str().unwrap();

    let output = run_polcfg(&["--config", path, "check"]);
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains(": OK"));
    assert!(stdout.contains("policies: 1"));
    assert!(stdout.contains("default: * => last_mod > 90d"));
}

#[test]
fn test_check_json_lists_rules() {
    let file = write_document(DOCUMENT);
    let path = file.path().to_str().unwrap();

    let (output, json) = run_polcfg_json(&["--config", path, "check"]);
    assert!(output.status.success());

    let policy = &json["result"]["policies"][0];
    assert_eq!(policy["name"], "cleanup");
    assert_eq!(policy["status_manager"], "lhsm");
    assert_eq!(policy["rules"][1]["condition"], "status == \"archived\"");
    assert_eq!(json["result"]["fileclasses"].as_array().unwrap().len(), 3);
}

#[test]
fn test_check_reports_all_errors() {
    let file = write_document(
        r#"{
    fileclasses: { logs: "nme == x" },
    policies: [
        { name: "p", rules: [
            { name: "r1", target: "missing", condition: "size > 1" },
            { name: "r2", condition: "size > -5MB" },
        ] },
    ],
}"#,
    );
    let path = file.path().to_str().unwrap();

    let output = run_polcfg(&["--config", path, "check"]);
    assert_eq!(output.status.code(), Some(5));

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("3 error(s)"), "stderr: {}", stderr);
    assert!(stderr.contains("fileclasses.logs: Unknown or unsupported criteria 'nme'"));
    assert!(stderr.contains("policies[0] (p).rules[1] (r2): Positive value expected for size criteria, line 6"));
}

#[test]
fn test_check_missing_document() {
    let output = run_polcfg(&["--config", "/nonexistent/policy.json5", "check"]);
    assert_eq!(output.status.code(), Some(3));
}

#[test]
fn test_check_uses_env_var() {
    let file = write_document(DOCUMENT);

    let output = std::process::Command::new(polcfg_binary_path())
        .args(["--no-json", "check"])
        .env("POLCFG_CONFIG", file.path())
        .output()
        .expect("Failed to run polcfg");
    assert!(output.status.success());
}

// ============================================================================
// criteria, template, defaults
// ============================================================================

#[test]
fn test_criteria_names() {
    let output = run_polcfg(&["criteria", "--names"]);
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    let names: Vec<&str> = stdout.lines().collect();
    assert_eq!(names.len(), 18);
    assert!(names.contains(&"last_mod"));
    assert!(names.contains(&"xattr.<name>"));
}

#[test]
fn test_criteria_format() {
    let output = run_polcfg(&["criteria", "--format", "{name}:{type}"]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.lines().any(|l| l == "size:size"));
    assert!(stdout.lines().any(|l| l == "last_access:duration"));
}

#[test]
fn test_template_and_defaults() {
    let output = run_polcfg(&["template"]);
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).starts_with("# trigger configuration"));

    let output = run_polcfg(&["defaults"]);
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("check_interval"));
}

#[test]
fn test_invalid_arguments() {
    let output = run_polcfg(&["compile"]);
    assert_eq!(output.status.code(), Some(4));
}

#[test]
fn test_help() {
    let output = run_polcfg(&["--help"]);
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("Compile and check filesystem policy rules"));
}
