// integration tests for condition compilation and printing

use crate::common::{compile, lhsm, rule_block};
use polcfg::conditions::{
    create_condition, get_bool_expr, print_bool_expr, AttrMask, BoolOp, Comparator, CompareValue,
    Criterion, NodeType, PrintError,
};
use polcfg::error::ErrorKind;
use polcfg::units::{GIGA_BYTE, HOUR};
use proptest::prelude::*;

// ============================================================================
// single conditions
// ============================================================================

#[test]
fn test_last_mod_condition() {
    let expr = compile("last_mod > 1s").unwrap();

    assert_eq!(expr.root.node_type(), NodeType::Condition);
    let cond = expr.root.condition().unwrap();
    assert_eq!(cond.criterion, Criterion::LastMod);
    assert_eq!(cond.op, Comparator::Greater);
    assert_eq!(cond.value, CompareValue::Duration(1));
    assert_eq!(expr.attr_mask, AttrMask::LAST_MOD);
}

#[test]
fn test_negative_size_reports_line() {
    let err = compile("size > -5MB").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ConstraintViolated);
    assert_eq!(
        err.to_string(),
        "Positive value expected for size criteria, line 2"
    );
}

#[test]
fn test_any_level_path_is_rewritten() {
    let expr = compile("path == \"/fs/a/**/b\"").unwrap();
    let cond = expr.root.condition().unwrap();
    assert_eq!(cond.op, Comparator::Like);
    assert_eq!(cond.value, CompareValue::Str("/fs/a/*/b".into()));
    assert!(cond.any_level);

    let expr = compile("tree == \"/fs/**/core.?\"").unwrap();
    let cond = expr.root.condition().unwrap();
    assert_eq!(cond.value, CompareValue::Str("/fs/*/core.[!/]".into()));
}

#[test]
fn test_string_constraints() {
    let err = compile("name == \"\"").unwrap_err();
    assert_eq!(
        err.to_string(),
        "non-empty string expected for name parameter, line 2"
    );

    let err = compile("name == \"a/b\"").unwrap_err();
    assert_eq!(err.to_string(), "no slash (/) expected in name parameter, line 2");

    let err = compile("owner == \"**\"").unwrap_err();
    assert_eq!(
        err.to_string(),
        "double star wildcard (**) not expected in owner parameter, line 2"
    );
}

#[test]
fn test_unknown_criterion_suggests() {
    let err = compile("last_mdo > 1d").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnknownIdentifier);
    assert!(err.to_string().contains("(did you mean 'last_mod'?)"));
}

#[test]
fn test_status_needs_context() {
    assert!(compile("status == new").is_err());

    let smi = lhsm();
    let expr = get_bool_expr(&rule_block("status == new"), "rule", Some(&smi)).unwrap();
    assert_eq!(expr.attr_mask, AttrMask::status(0));

    let err = get_bool_expr(&rule_block("status == lost"), "rule", Some(&smi)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ConstraintViolated);
}

// ============================================================================
// trees
// ============================================================================

#[test]
fn test_compound_expression() {
    let expr = compile("type == file and (size > 1GB or not owner == root)").unwrap();

    assert_eq!(expr.root.bool_op(), Some(BoolOp::And));
    assert_eq!(expr.root.condition_count(), 3);
    assert_eq!(
        expr.attr_mask,
        AttrMask::TYPE | AttrMask::SIZE | AttrMask::OWNER
    );
    assert_eq!(
        expr.to_string(),
        "(type == file) AND ((size > 1GB) OR (NOT (owner == \"root\")))"
    );
}

#[test]
fn test_appends_nest_to_the_left() {
    let mut expr = compile("size > 1GB").unwrap();
    expr.append_condition(Criterion::LastAccess, Comparator::Greater, CompareValue::Duration(HOUR));
    expr.append_condition(Criterion::Owner, Comparator::Equal, CompareValue::Str("root".into()));

    assert_eq!(
        expr.to_string(),
        "((size > 1GB) AND (last_access > 1h)) AND (owner == \"root\")"
    );
    assert_eq!(
        expr.attr_mask,
        AttrMask::SIZE | AttrMask::LAST_ACCESS | AttrMask::OWNER
    );
}

#[test]
fn test_procedural_builder_from_scratch() {
    let mut node = create_condition(Criterion::Size, Comparator::GreaterEq, CompareValue::Size(GIGA_BYTE));
    node.append_condition(Criterion::Depth, Comparator::Less, CompareValue::Int(4));

    assert_eq!(node.to_string(), "(size >= 1GB) AND (depth < 4)");
    assert!(node.owns_children());
}

#[test]
fn test_print_with_limit() {
    let expr = compile("size > 1GB and last_mod > 1d").unwrap();
    let full = expr.to_string();

    assert_eq!(print_bool_expr(&expr.root, full.len()).unwrap(), full);

    match print_bool_expr(&expr.root, 10) {
        Err(PrintError::Truncated {
            partial, needed, ..
        }) => {
            assert_eq!(partial, &full[..10]);
            assert_eq!(needed, full.len());
        }
        other => panic!("expected truncation, got {:?}", other),
    }
}

// ============================================================================
// print / re-parse round trip
// ============================================================================

#[test]
fn test_any_level_condition_prints_written_form() {
    let first = compile(r#"path == "/fs/**/tmp?""#).unwrap();
    let cond = first.root.condition().unwrap();
    assert_eq!(cond.value, CompareValue::Str("/fs/*/tmp[!/]".into()));
    assert!(cond.any_level);

    let printed = first.to_string();
    assert_eq!(printed, r#"path  =~  "/fs/**/tmp?""#);
    assert_eq!(compile(&printed).unwrap(), first);
}

#[test]
fn test_backslash_values_survive_printing() {
    for text in [r#"owner == "x\\""#, r#"owner == "a\\\"b""#, r#"name != "q\"z""#] {
        let first = compile(text).unwrap();
        let printed = first.to_string();
        assert_eq!(compile(&printed).unwrap(), first, "{}", printed);
    }

    let expr = compile(r#"owner == "x\\""#).unwrap();
    assert_eq!(expr.root.condition().unwrap().value, CompareValue::Str("x\\".into()));
    assert_eq!(expr.to_string(), r#"owner == "x\\""#);

    let expr = compile(r#"owner == "a\\\"b""#).unwrap();
    assert_eq!(expr.root.condition().unwrap().value, CompareValue::Str("a\\\"b".into()));
}

/// write `raw` as a quoted expression value
fn quote(raw: &str) -> String {
    let mut out = String::from("\"");
    for c in raw.chars() {
        if c == '"' || c == '\\' {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('"');
    out
}

fn path_text() -> impl Strategy<Value = String> {
    prop::collection::vec(
        prop::sample::select(vec!["**", "*", "fs", "tmp?", "a*.c", "x\\", "q\"z", "f\\?"]),
        1..5,
    )
    .prop_map(|parts| format!("/{}", parts.join("/")))
}

fn word_text() -> impl Strategy<Value = String> {
    prop::collection::vec(
        prop::sample::select(vec!["a", "bc", "*", "?", "\\", "\"", "-", "."]),
        1..5,
    )
    .prop_map(|parts| parts.concat())
}

fn condition_text() -> impl Strategy<Value = String> {
    prop_oneof![
        (0i64..5000, prop::sample::select(vec!["", "KB", "MB", "GB"]))
            .prop_map(|(n, unit)| format!("size > {}{}", n, unit)),
        (0i64..1000, prop::sample::select(vec!["s", "min", "h", "d", "w"]))
            .prop_map(|(n, unit)| format!("last_access >= {}{}", n, unit)),
        (0i32..64).prop_map(|n| format!("depth <= {}", n)),
        word_text().prop_map(|s| format!("owner != {}", quote(&s))),
        word_text().prop_map(|s| format!("name == {}", quote(&s))),
        (prop::sample::select(vec!["path", "tree"]), prop::sample::select(vec!["==", "!="]), path_text())
            .prop_map(|(criterion, op, p)| format!("{} {} {}", criterion, op, quote(&p))),
        ("[a-z]{1,6}", word_text())
            .prop_map(|(attr, s)| format!("xattr.user.{} == {}", attr, quote(&s))),
        prop::sample::select(vec!["file", "dir", "symlink", "fifo"])
            .prop_map(|t| format!("type == {}", t)),
    ]
}

fn expression_text() -> impl Strategy<Value = String> {
    condition_text().prop_recursive(4, 16, 2, |inner| {
        prop_oneof![
            (inner.clone(), inner.clone()).prop_map(|(l, r)| format!("({}) and ({})", l, r)),
            (inner.clone(), inner.clone()).prop_map(|(l, r)| format!("({}) or ({})", l, r)),
            inner.prop_map(|e| format!("not ({})", e)),
        ]
    })
}

proptest! {
    #[test]
    fn test_print_reparse_round_trip(text in expression_text()) {
        let first = compile(&text).unwrap();
        let printed = first.to_string();
        let second = compile(&printed).unwrap();

        prop_assert_eq!(&second, &first);
        prop_assert_eq!(&second.to_string(), &printed);
    }
}
