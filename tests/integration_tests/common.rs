// shared utilities for integration tests

#![allow(dead_code)]

use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Output};

use polcfg::conditions::{get_bool_expr, BoolExpr, SmInstance, StatusManager};
use polcfg::syntax::{parse_bool_expr, Block, ConfigItem};
use polcfg::ConfigError;

/// path to the polcfg binary built for this test run
pub fn polcfg_binary_path() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_polcfg"))
}

/// run polcfg with text output forced
pub fn run_polcfg(args: &[&str]) -> Output {
    Command::new(polcfg_binary_path())
        .arg("--no-json")
        .args(args)
        .env_remove("POLCFG_CONFIG")
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to run polcfg")
}

/// run polcfg with JSON output and parse stdout
pub fn run_polcfg_json(args: &[&str]) -> (Output, serde_json::Value) {
    let output = Command::new(polcfg_binary_path())
        .arg("--json")
        .args(args)
        .env_remove("POLCFG_CONFIG")
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to run polcfg");

    let stdout = String::from_utf8_lossy(&output.stdout);
    let json = serde_json::from_str(stdout.trim()).unwrap_or_else(|e| {
        panic!("polcfg should print JSON: {}\nstdout: {}", e, stdout);
    });
    (output, json)
}

/// write a policy document to a scratch file
pub fn write_document(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(".json5")
        .tempfile()
        .expect("Failed to create temp file");
    file.write_all(content.as_bytes())
        .expect("Failed to write policy document");
    file
}

/// `rule { <text> }` with the expression on line 2
pub fn rule_block(text: &str) -> ConfigItem {
    let expr = parse_bool_expr(text, 2).expect("expression should parse");
    ConfigItem::Block(Block::new("rule", 1).with_bool_expr(expr, 2))
}

pub fn compile(text: &str) -> Result<BoolExpr, ConfigError> {
    get_bool_expr(&rule_block(text), "rule", None)
}

pub fn lhsm() -> SmInstance {
    SmInstance::new(
        0,
        StatusManager::new("lhsm", ["new", "modified", "archived"]),
    )
}

pub const DOCUMENT: &str = r#"{
    status_managers: { lhsm: ["new", "modified", "archived"] },
    fileclasses: {
        logs: 'name == "*.log"',
        big: "size > 1GB",
        scratch: "tree == /scratch",
    },
    policies: [
        {
            name: "cleanup",
            status_manager: "lhsm",
            scope: "type == file",
            rules: [
                { name: "old_logs", target: "logs union scratch", condition: "last_access > 30d" },
                { name: "big_archived", target: "big inter not logs", condition: "status == archived" },
                { name: "default", condition: "last_mod > 90d" },
            ],
        },
    ],
    trigger: { check_interval: "5min", high_threshold_pct: "85%", low_threshold_pct: "75%" },
}"#;
