//! policy condition compiler
//!
//! turns parsed configuration expressions into compiled trees:
//! - criteria: `criterion <op> value` resolved into typed compare triplets
//! - compile: boolean expressions (AND, OR, NOT) plus the procedural builder
//! - sets: fileclass definitions and union/intersection/negation over them
//! - print: canonical text rendering
//!
//! every compiled expression comes with the mask of attributes it reads.

mod compile;
mod criteria;
mod print;
mod sets;
mod status;
mod types;
mod wildcard;

pub use compile::{build_bool_expr, create_condition, get_bool_expr};
pub use criteria::{
    criteria_to_condition, interpret_condition, lookup_criterion, CriterionDescr, CriterionFlags,
    ValueType, CRITERIA,
};
pub use print::{print_bool_expr, PrintError};
pub use sets::{build_set_expr, get_set_expr, FileClass, FileClassRegistry};
pub use status::{SmInstance, StatusManager};
pub use types::{
    AttrMask, BoolExpr, BoolNode, BoolOp, Comparator, CompareTriplet, CompareValue, Criterion,
    FileType, NodeType, Subtree,
};
pub use wildcard::{has_any_level, has_wildcards, process_any_level, restore_any_level};
