// integration tests for configuration modules and policy documents

use polcfg::config;
use polcfg::modules::{ModuleRegistry, TriggerConfig, MODULE_MASK_ALL, MODULE_MASK_TRIGGER};
use polcfg::syntax::Block;

use crate::common::{write_document, DOCUMENT};

fn root_with_trigger(json: serde_json::Value) -> Block {
    Block::new("root", 0).with_block(Block::from_json("trigger", &json).unwrap())
}

#[test]
fn test_trigger_from_json_block() {
    let root = root_with_trigger(serde_json::json!({
        "check_interval": "5min",
        "high_threshold_pct": "85%",
        "low_threshold_pct": 70,
        "max_action_count": "10k",
        "notify": true,
    }));

    let trigger = TriggerConfig::from_block(&root).unwrap();
    assert_eq!(trigger.check_interval, 300);
    assert_eq!(trigger.high_threshold_pct, 85.0);
    assert_eq!(trigger.low_threshold_pct, 70.0);
    assert_eq!(trigger.max_action_count, 10_000);
    assert!(trigger.notify);
}

#[test]
fn test_registry_reads_selected_modules() {
    let root = root_with_trigger(serde_json::json!({ "check_interval": "-1s" }));

    let mut registry = ModuleRegistry::with_builtin();
    assert!(registry.read_all(&root, 0).is_ok(), "trigger not selected");

    let err = registry.read_all(&root, MODULE_MASK_TRIGGER).unwrap_err();
    assert!(err
        .to_string()
        .starts_with("Error reading configuration for module 'trigger':\n"));
}

#[test]
fn test_template_and_defaults() {
    let registry = ModuleRegistry::with_builtin();

    let template = registry.write_template();
    assert!(template.starts_with("# trigger configuration\n"));
    assert!(template.contains("trigger\n{\n"));
    assert!(template.contains("    check_interval"));

    let defaults = registry.write_defaults();
    assert!(defaults.contains("= 5min ;"));
    assert!(defaults.contains("= stderr ;"));
}

#[test]
fn test_reload_keeps_fixed_parameters() {
    let mut registry = ModuleRegistry::with_builtin();
    let initial = root_with_trigger(serde_json::json!({ "report_file": "stdout" }));
    registry.read_all(&initial, MODULE_MASK_ALL).unwrap();

    let changed = root_with_trigger(serde_json::json!({
        "report_file": "/var/log/other.log",
        "high_threshold_pct": "95%",
    }));
    assert!(registry.reload_all(&changed, MODULE_MASK_ALL).is_ok());
}

#[test]
fn test_compile_policy_document() {
    let file = write_document(DOCUMENT);
    let doc = config::load(file.path()).unwrap();
    let compiled = doc.compile().unwrap();

    assert_eq!(compiled.fileclasses.len(), 3);
    assert_eq!(compiled.policies.len(), 1);

    let policy = &compiled.policies[0];
    assert_eq!(policy.rules.len(), 3);
    assert_eq!(
        policy.rules[0].target.as_ref().unwrap().to_string(),
        "(name  =~  \"*.log\") OR (tree == \"/scratch\")"
    );
    assert_eq!(policy.rules[1].condition.to_string(), "status == \"archived\"");
    assert!(policy.rules[2].target.is_none());
    assert!(compiled.modules.get("trigger").is_some());
}

#[test]
fn test_document_errors_carry_lines() {
    let text = "{\n  fileclasses: {\n    big: \"size > -1GB\",\n  },\n}";
    let errors = config::parse(text).unwrap().compile().unwrap_err();
    assert_eq!(
        errors,
        vec!["fileclasses.big: Positive value expected for size criteria, line 3".to_string()]
    );
}
