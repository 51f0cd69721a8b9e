// integration tests for fileclass definitions and set expressions

use std::sync::Arc;

use crate::common::compile;
use polcfg::conditions::{
    get_set_expr, AttrMask, BoolExpr, BoolOp, Comparator, CompareValue, Criterion,
    FileClassRegistry, NodeType,
};
use polcfg::error::ErrorKind;
use polcfg::syntax::{parse_bool_expr, parse_set_expr, Block, ConfigItem};

fn fileclass(name: &str, text: &str, line: u32) -> Block {
    let expr = parse_bool_expr(text, line + 2).unwrap();
    Block::new("FileClass", line)
        .with_id(name)
        .with_block(Block::new("definition", line + 1).with_bool_expr(expr, line + 2))
}

fn registry() -> FileClassRegistry {
    let filesets = Block::new("Filesets", 1)
        .with_block(fileclass("logs", "name == \"*.log\"", 2))
        .with_block(fileclass("big", "size > 1GB", 6))
        .with_block(fileclass("scratch", "tree == \"/scratch\"", 10));
    FileClassRegistry::read_fileclasses(&filesets, None).unwrap()
}

fn target(text: &str, registry: &FileClassRegistry) -> polcfg::error::Result<BoolExpr> {
    let item = ConfigItem::Block(
        Block::new("target", 20).with_set_expr(parse_set_expr(text).unwrap(), 21),
    );
    get_set_expr(&item, "target", registry)
}

#[test]
fn test_read_fileclasses() {
    let registry = registry();
    assert_eq!(registry.len(), 3);

    let logs = registry.get("LOGS").expect("lookup is case-insensitive");
    assert_eq!(logs.name, "logs");
    assert_eq!(logs.attr_mask, AttrMask::NAME);
    assert_eq!(logs.definition.to_string(), "name  =~  \"*.log\"");
}

#[test]
fn test_duplicate_fileclass() {
    let filesets = Block::new("Filesets", 1)
        .with_block(fileclass("logs", "name == \"*.log\"", 2))
        .with_block(fileclass("Logs", "size > 1", 6));
    let err = FileClassRegistry::read_fileclasses(&filesets, None).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Structural);
    assert!(err.to_string().ends_with(", line 6"));
}

#[test]
fn test_fileclass_without_definition() {
    let filesets = Block::new("Filesets", 1).with_block(Block::new("FileClass", 4).with_id("empty"));
    let err = FileClassRegistry::read_fileclasses(&filesets, None).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MandatoryMissing);
    assert_eq!(
        err.to_string(),
        "Missing mandatory parameter 'definition' in block 'FileClass empty', line 4"
    );
}

#[test]
fn test_set_algebra() {
    let registry = registry();
    let expr = target("logs union (big inter not scratch)", &registry).unwrap();

    assert_eq!(expr.root.bool_op(), Some(BoolOp::Or));
    assert!(expr.root.is_owned());
    assert_eq!(
        expr.attr_mask,
        AttrMask::NAME | AttrMask::SIZE | AttrMask::FULLPATH
    );
    assert_eq!(
        expr.to_string(),
        "(name  =~  \"*.log\") OR ((size > 1GB) AND (NOT (tree == \"/scratch\")))"
    );

    let children = expr.root.children();
    assert!(!children[0].is_owned(), "fileclass leaf is shared");
    assert!(children[1].is_owned());
}

#[test]
fn test_undefined_fileclass() {
    let registry = registry();
    let err = target("logs union bgi", &registry).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnknownIdentifier);
    assert_eq!(
        err.to_string(),
        "FileClass 'bgi' is undefined (did you mean 'big'?), line 21"
    );
}

#[test]
fn test_shared_definition_freed_once() {
    let registry = registry();
    let definition = Arc::downgrade(&registry.get("big").unwrap().definition);

    let mut expr = target("big", &registry).unwrap();
    assert_eq!(expr.root.node_type(), NodeType::Condition);
    assert!(!expr.root.is_owned());
    assert_eq!(definition.strong_count(), 2);

    // appending wraps the shared definition instead of modifying it
    expr.append_condition(Criterion::Owner, Comparator::Equal, CompareValue::Str("root".into()));
    assert!(expr.root.is_owned());
    assert_eq!(registry.get("big").unwrap().definition.to_string(), "size > 1GB");

    drop(registry);
    assert_eq!(definition.strong_count(), 1, "expression keeps the definition alive");

    drop(expr);
    assert!(definition.upgrade().is_none());
}

#[test]
fn test_register_compiled_expression() {
    let mut registry = FileClassRegistry::new();
    registry.register("old", compile("last_access > 30d").unwrap()).unwrap();

    let expr = target("not old", &registry).unwrap();
    assert_eq!(expr.attr_mask, AttrMask::LAST_ACCESS);
    assert_eq!(expr.to_string(), "NOT (last_access > 30d)");
}
