//! compilation of parsed boolean expressions, and the procedural builder

use std::mem;

use tracing::debug;

use super::criteria::interpret_condition;
use super::status::SmInstance;
use super::types::{AttrMask, BoolExpr, BoolNode, Comparator, CompareTriplet, CompareValue, Criterion, Subtree};
use crate::error::{ConfigError, Result};
use crate::syntax::{BoolSyntax, ConfigItem, ItemType, SyntaxBoolOp};

/// compile a parsed boolean expression
///
/// every attribute read by a condition is added to `mask`. parenthesized
/// sub-expressions are compiled as their content.
pub fn build_bool_expr(
    syntax: &BoolSyntax,
    mask: &mut AttrMask,
    smi: Option<&SmInstance>,
) -> Result<BoolNode> {
    match syntax {
        BoolSyntax::Condition(kv) => {
            let (triplet, attrs) = interpret_condition(kv, smi)?;
            *mask |= attrs;
            Ok(BoolNode::Condition(Box::new(triplet)))
        }
        BoolSyntax::Unary {
            op: SyntaxBoolOp::Identity,
            expr,
        } => build_bool_expr(expr, mask, smi),
        BoolSyntax::Unary {
            op: SyntaxBoolOp::Not,
            expr,
        } => Ok(BoolNode::Not(Subtree::owned(build_bool_expr(
            expr, mask, smi,
        )?))),
        BoolSyntax::Binary { op, left, right } => {
            let make: fn(Subtree, Subtree) -> BoolNode = match op {
                SyntaxBoolOp::And => BoolNode::And,
                SyntaxBoolOp::Or => BoolNode::Or,
                _ => return Err(unexpected_operator()),
            };
            let left = build_bool_expr(left, mask, smi)?;
            let right = build_bool_expr(right, mask, smi)?;
            Ok(make(Subtree::owned(left), Subtree::owned(right)))
        }
        BoolSyntax::Unary { .. } => Err(unexpected_operator()),
    }
}

fn unexpected_operator() -> ConfigError {
    ConfigError::structural("Unexpected boolean operator in expression")
}

/// the one expression item of an expression block
///
/// `wrong_kind` and `not_single` start the messages for a block whose first
/// item has the wrong kind, or that holds more than one item.
pub(crate) fn single_expression<'a>(
    item: &'a ConfigItem,
    block_name: &str,
    expected: ItemType,
    wrong_kind: &str,
    not_single: &str,
) -> Result<&'a ConfigItem> {
    let block = item.as_block().ok_or_else(|| {
        ConfigError::structural(format!("'{}' is expected to be a block", block_name))
    })?;

    let first = block.items.first().ok_or_else(|| ConfigError::EmptyBlock {
        block: block_name.to_string(),
        line: block.line,
    })?;

    if first.item_type() != expected {
        return Err(ConfigError::structural(format!(
            "{} in block '{}', line {}",
            wrong_kind,
            block_name,
            first.line()
        )));
    }
    if block.items.len() > 1 {
        return Err(ConfigError::structural(format!(
            "{} in block '{}', line {}",
            not_single, block_name, block.line
        )));
    }

    Ok(first)
}

/// compile the boolean expression held by a configuration block
///
/// the block must contain exactly one boolean expression. the returned mask
/// covers exactly the attributes the expression reads. status conditions are
/// only accepted when `smi` gives the status manager in context.
pub fn get_bool_expr(
    item: &ConfigItem,
    block_name: &str,
    smi: Option<&SmInstance>,
) -> Result<BoolExpr> {
    let sub = single_expression(
        item,
        block_name,
        ItemType::BoolExpr,
        "Boolean expression expected",
        "A single boolean expression is expected",
    )?;
    let ConfigItem::BoolExpr { expr, line } = sub else {
        return Err(unexpected_operator());
    };

    let mut attr_mask = AttrMask::EMPTY;
    let root = build_bool_expr(expr, &mut attr_mask, smi).map_err(|e| e.at_line(*line))?;
    let expr = BoolExpr::new(Subtree::owned(root), attr_mask);

    debug!(block = block_name, expr = %expr, attrs = %attr_mask, "compiled boolean expression");
    Ok(expr)
}

/// build a single-condition node
pub fn create_condition(criterion: Criterion, op: Comparator, value: CompareValue) -> BoolNode {
    BoolNode::Condition(Box::new(CompareTriplet::new(criterion, op, value)))
}

impl BoolNode {
    /// replace this node with `(previous) AND (condition)`
    pub fn append_condition(&mut self, criterion: Criterion, op: Comparator, value: CompareValue) {
        self.append_triplet(CompareTriplet::new(criterion, op, value));
    }

    /// like [`BoolNode::append_condition`], for a fully specified triplet
    pub fn append_triplet(&mut self, triplet: CompareTriplet) {
        let previous = mem::replace(self, BoolNode::Condition(Box::default()));
        *self = BoolNode::And(
            Subtree::owned(previous),
            Subtree::owned(BoolNode::Condition(Box::new(triplet))),
        );
    }
}

impl Subtree {
    /// AND a condition onto this subtree
    ///
    /// a shared definition is never modified: it is wrapped in a new owned node.
    pub fn append_triplet(&mut self, triplet: CompareTriplet) {
        match self {
            Subtree::Owned(node) => node.append_triplet(triplet),
            Subtree::Shared(shared) => {
                let leaf = Subtree::owned(BoolNode::Condition(Box::new(triplet)));
                *self = Subtree::owned(BoolNode::And(Subtree::Shared(shared.clone()), leaf));
            }
        }
    }
}

impl BoolExpr {
    /// AND a condition onto this expression, recording the attribute it reads
    pub fn append_condition(&mut self, criterion: Criterion, op: Comparator, value: CompareValue) {
        self.append_triplet(CompareTriplet::new(criterion, op, value), None);
    }

    /// a status condition reads the status attribute of `smi`; without a
    /// status manager it adds no attribute to the mask
    pub fn append_triplet(&mut self, triplet: CompareTriplet, smi: Option<&SmInstance>) {
        self.attr_mask |= match (triplet.criterion, smi) {
            (Criterion::Status, Some(smi)) => smi.attr_mask(),
            (criterion, _) => criterion.descr().attr_mask,
        };
        self.root.append_triplet(triplet);
    }
}
