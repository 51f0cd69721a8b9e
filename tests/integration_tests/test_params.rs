// integration tests for typed parameter extraction

use polcfg::error::ErrorKind;
use polcfg::params::{
    check_unknown_parameters, get_bool_param, get_duration_param, get_float_param,
    get_int64_param, get_int_param, get_size_param, get_string_param, read_scalar_params,
    ParamFlags, ParamTarget, ScalarParam,
};
use polcfg::syntax::Block;

fn policy_block() -> Block {
    Block::new("migration_policy", 20)
        .with_var("check_interval", "5min", 21)
        .with_var("high_threshold_pct", "85%", 22)
        .with_var("max_size", "10GB", 23)
        .with_var("nb_threads", "8", 24)
        .with_var("max_count", "2M", 25)
        .with_var("lru_sort", "yes", 26)
        .with_var("report", "/var/log/report.log/", 27)
}

// ============================================================================
// typed getters
// ============================================================================

#[test]
fn test_duration_and_percentage() {
    let b = policy_block();

    let interval = get_duration_param(&b, "migration_policy", "check_interval", ParamFlags::NONE, None)
        .unwrap();
    assert_eq!(interval, Some(300));

    let pct = get_float_param(
        &b,
        "migration_policy",
        "high_threshold_pct",
        ParamFlags::NONE.allow_pct_sign(),
        None,
    )
    .unwrap();
    assert_eq!(pct, Some(85.0));
}

#[test]
fn test_percentage_needs_flag() {
    let b = policy_block();
    let err = get_float_param(&b, "migration_policy", "high_threshold_pct", ParamFlags::NONE, None)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidFormat);
    assert!(err.to_string().contains("'migration_policy::high_threshold_pct', line 22"));
}

#[test]
fn test_numeric_getters() {
    let b = policy_block();
    let name = "migration_policy";

    assert_eq!(
        get_size_param(&b, name, "max_size", ParamFlags::NONE, None).unwrap(),
        Some(10 * 1024 * 1024 * 1024)
    );
    assert_eq!(
        get_int_param(&b, name, "nb_threads", ParamFlags::NONE.not_null(), None).unwrap(),
        Some(8)
    );
    assert_eq!(
        get_int64_param(&b, name, "max_count", ParamFlags::NONE, None).unwrap(),
        Some(2_000_000)
    );
    assert_eq!(
        get_bool_param(&b, name, "lru_sort", ParamFlags::NONE, None).unwrap(),
        Some(true)
    );
}

#[test]
fn test_string_flags() {
    let b = policy_block();
    let value = get_string_param(
        &b,
        "migration_policy",
        "report",
        ParamFlags::NONE.absolute_path().remove_final_slash(),
        None,
    )
    .unwrap();
    assert_eq!(value.as_deref(), Some("/var/log/report.log"));

    let b = Block::new("notify", 1).with_var("mail", "nobody", 2);
    let err = get_string_param(&b, "notify", "mail", ParamFlags::NONE.mail(), None).unwrap_err();
    assert_eq!(err.to_string(), "Invalid mail address in 'notify::mail', line 2");
}

#[test]
fn test_mandatory_parameter_missing() {
    let b = policy_block();
    let err = get_string_param(
        &b,
        "migration_policy",
        "archive_id",
        ParamFlags::NONE.mandatory(),
        None,
    )
    .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MandatoryMissing);
    assert_eq!(
        err.to_string(),
        "Missing mandatory parameter 'archive_id' in block 'migration_policy', line 20"
    );
}

#[test]
fn test_extra_arguments() {
    let b = Block::from_json(
        "hints",
        &serde_json::json!({ "archive_cmd": ["/bin/copy", "--fast", "--verify"] }),
    )
    .unwrap();

    let err = get_string_param(&b, "hints", "archive_cmd", ParamFlags::NONE, None).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Structural);

    let mut extra = Vec::new();
    let cmd = get_string_param(&b, "hints", "archive_cmd", ParamFlags::NONE, Some(&mut extra))
        .unwrap();
    assert_eq!(cmd.as_deref(), Some("/bin/copy"));
    assert_eq!(extra, vec!["--fast", "--verify"]);
}

// ============================================================================
// tables and unknown parameters
// ============================================================================

#[test]
fn test_read_scalar_params_table() {
    let b = policy_block();

    let mut interval = 60;
    let mut threads = 1;
    let mut lru = false;
    let mut missing = 42;

    read_scalar_params(
        &b,
        "migration_policy",
        [
            ScalarParam::new(
                "check_interval",
                ParamFlags::NONE.positive(),
                ParamTarget::Duration(&mut interval),
            ),
            ScalarParam::new("nb_threads", ParamFlags::NONE, ParamTarget::Int(&mut threads)),
            ScalarParam::new("lru_sort", ParamFlags::NONE, ParamTarget::Bool(&mut lru)),
            ScalarParam::new("absent", ParamFlags::NONE, ParamTarget::Int64(&mut missing)),
        ],
    )
    .unwrap();

    assert_eq!(interval, 300);
    assert_eq!(threads, 8);
    assert!(lru);
    assert_eq!(missing, 42);
}

#[test]
fn test_read_scalar_params_stops_on_error() {
    let b = Block::new("p", 1).with_var("threads", "many", 2);
    let mut threads = 1;
    let err = read_scalar_params(
        &b,
        "p",
        [ScalarParam::new("threads", ParamFlags::NONE, ParamTarget::Int(&mut threads))],
    )
    .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidFormat);
    assert_eq!(threads, 1);
}

#[test]
fn test_unknown_parameters_with_suggestion() {
    let b = Block::new("trigger", 3)
        .with_var("check_intervl", "5min", 4)
        .with_var("notify", "yes", 5)
        .with_var("completely_wrong", "1", 6);

    let unknown = check_unknown_parameters(&b, "trigger", &["check_interval", "notify"]);
    assert_eq!(unknown.len(), 2);
    assert_eq!(unknown[0].name, "check_intervl");
    assert_eq!(unknown[0].line, 4);
    assert_eq!(unknown[0].suggestion.as_deref(), Some("check_interval"));
    assert_eq!(unknown[1].name, "completely_wrong");
    assert!(unknown[1].suggestion.is_none());
}
