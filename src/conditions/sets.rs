//! fileclass definitions and set expressions over them
//!
//! a fileclass is a named boolean expression. the registry owns each
//! definition; expressions built from fileclass names hold shared references
//! to those definitions instead of copies, so a definition is released once,
//! when the registry and every expression using it are gone.

use std::sync::Arc;

use tracing::debug;

use super::compile::{get_bool_expr, single_expression};
use super::status::SmInstance;
use super::types::{AttrMask, BoolExpr, BoolNode, Subtree};
use crate::error::{ConfigError, Result};
use crate::matching::suggest;
use crate::syntax::{Block, ConfigItem, ItemType, SetOp, SetSyntax};

pub const FILECLASS_BLOCK: &str = "FileClass";
pub const DEFINITION_BLOCK: &str = "definition";

#[derive(Debug, Clone)]
pub struct FileClass {
    pub name: String,
    pub definition: Arc<BoolNode>,
    pub attr_mask: AttrMask,
}

/// named fileclass definitions, looked up case-insensitively
#[derive(Debug, Clone, Default)]
pub struct FileClassRegistry {
    classes: Vec<FileClass>,
}

impl FileClassRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// add a definition; names must be unique regardless of case
    pub fn register(&mut self, name: impl Into<String>, expr: BoolExpr) -> Result<()> {
        let name = name.into();
        if self.get(&name).is_some() {
            return Err(ConfigError::DuplicateFileClass(name));
        }
        self.classes.push(FileClass {
            name,
            definition: expr.root.into_shared(),
            attr_mask: expr.attr_mask,
        });
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&FileClass> {
        self.classes
            .iter()
            .find(|fc| fc.name.eq_ignore_ascii_case(name))
    }

    pub fn iter(&self) -> impl Iterator<Item = &FileClass> {
        self.classes.iter()
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// read every `FileClass <name> { definition { <expr> } }` block
    pub fn read_fileclasses(parent: &Block, smi: Option<&SmInstance>) -> Result<Self> {
        let mut registry = Self::new();

        for fc_block in parent.blocks(FILECLASS_BLOCK) {
            let name = fc_block.id.as_deref().ok_or_else(|| {
                ConfigError::structural(format!(
                    "Fileclass name expected for block '{}', line {}",
                    FILECLASS_BLOCK, fc_block.line
                ))
            })?;

            let definition =
                fc_block
                    .item(DEFINITION_BLOCK)
                    .ok_or_else(|| ConfigError::MissingParameter {
                        block: format!("{} {}", FILECLASS_BLOCK, name),
                        var: DEFINITION_BLOCK.to_string(),
                        line: fc_block.line,
                    })?;

            let expr = get_bool_expr(definition, DEFINITION_BLOCK, smi)?;
            registry.register(name, expr).map_err(|e| e.at_line(fc_block.line))?;
        }

        debug!(count = registry.len(), "loaded fileclasses");
        Ok(registry)
    }
}

/// compile a set expression into a boolean expression over definitions
///
/// a bare fileclass name yields a shared reference to its definition; union
/// becomes OR, intersection AND and negation NOT, each an owned node.
pub fn build_set_expr(
    set: &SetSyntax,
    mask: &mut AttrMask,
    registry: &FileClassRegistry,
) -> Result<Subtree> {
    match set {
        SetSyntax::Singleton(name) => {
            let fc = registry
                .get(name)
                .ok_or_else(|| ConfigError::UndefinedFileClass {
                    name: name.clone(),
                    suggestion: suggest(name, registry.iter().map(|fc| fc.name.as_str())),
                })?;
            *mask |= fc.attr_mask;
            Ok(Subtree::shared(&fc.definition))
        }
        SetSyntax::Unary {
            op: SetOp::Not,
            set,
        } => Ok(Subtree::owned(BoolNode::Not(build_set_expr(
            set, mask, registry,
        )?))),
        SetSyntax::Binary { op, left, right } => {
            let make: fn(Subtree, Subtree) -> BoolNode = match op {
                SetOp::Union => BoolNode::Or,
                SetOp::Inter => BoolNode::And,
                SetOp::Not => return Err(unexpected_set_operator()),
            };
            let left = build_set_expr(left, mask, registry)?;
            let right = build_set_expr(right, mask, registry)?;
            Ok(Subtree::owned(make(left, right)))
        }
        SetSyntax::Unary { .. } => Err(unexpected_set_operator()),
    }
}

fn unexpected_set_operator() -> ConfigError {
    ConfigError::structural("Unexpected set operator in expression")
}

/// compile the fileclass set expression held by a configuration block
pub fn get_set_expr(
    item: &ConfigItem,
    block_name: &str,
    registry: &FileClassRegistry,
) -> Result<BoolExpr> {
    let sub = single_expression(
        item,
        block_name,
        ItemType::Set,
        "Union/intersection/negation of classes expected",
        "A single expression is expected",
    )?;
    let ConfigItem::Set { expr, line } = sub else {
        return Err(unexpected_set_operator());
    };

    let mut attr_mask = AttrMask::EMPTY;
    let root = build_set_expr(expr, &mut attr_mask, registry).map_err(|e| e.at_line(*line))?;
    let expr = BoolExpr::new(root, attr_mask);

    debug!(block = block_name, expr = %expr, attrs = %attr_mask, "compiled fileclass set");
    Ok(expr)
}
