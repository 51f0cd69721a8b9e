//! canonical text rendering of compiled expressions
//!
//! conditions render as `criterion op value`, strings double-quoted; unary
//! nodes as `NOT (x)`; binary nodes as `(l) AND (r)` or `(l) OR (r)`. sizes and
//! durations use the largest exact unit so the text parses back to the same
//! expression. `**` patterns print in their written form and backslashes are
//! escaped.

use std::fmt::{self, Write};

use thiserror::Error;

use super::types::{BoolExpr, BoolNode, CompareTriplet, CompareValue, Criterion, Subtree};
use super::wildcard::restore_any_level;
use crate::units::{format_duration, format_size};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PrintError {
    #[error("rendered expression needs {needed} bytes, limit is {limit}")]
    Truncated {
        /// the longest prefix that fits
        partial: String,
        needed: usize,
        limit: usize,
    },
}

fn write_quoted(f: &mut fmt::Formatter<'_>, s: &str) -> fmt::Result {
    f.write_char('"')?;
    for c in s.chars() {
        if c == '"' || c == '\\' {
            f.write_char('\\')?;
        }
        f.write_char(c)?;
    }
    f.write_char('"')
}

impl fmt::Display for CompareTriplet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.criterion, &self.xattr_name) {
            (Criterion::Xattr, Some(attr)) => write!(f, "xattr.{}", attr)?,
            (criterion, _) => f.write_str(criterion.as_str())?,
        }
        write!(f, " {} ", self.op)?;

        match &self.value {
            CompareValue::Str(s) if self.any_level => write_quoted(f, &restore_any_level(s)),
            CompareValue::Str(s) => write_quoted(f, s),
            CompareValue::Int(n) => write!(f, "{}", n),
            CompareValue::Size(bytes) => f.write_str(&format_size(*bytes)),
            CompareValue::Duration(secs) => f.write_str(&format_duration(*secs)),
            CompareValue::Type(t) => f.write_str(t.as_str()),
        }
    }
}

impl fmt::Display for BoolNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoolNode::Condition(triplet) => write!(f, "{}", triplet),
            BoolNode::Not(expr) => write!(f, "NOT ({})", expr),
            BoolNode::And(left, right) => write!(f, "({}) AND ({})", left, right),
            BoolNode::Or(left, right) => write!(f, "({}) OR ({})", left, right),
        }
    }
}

impl fmt::Display for Subtree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&**self, f)
    }
}

impl fmt::Display for BoolExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.root, f)
    }
}

/// render `node` into at most `limit` bytes
pub fn print_bool_expr(node: &BoolNode, limit: usize) -> Result<String, PrintError> {
    let text = node.to_string();
    if text.len() <= limit {
        return Ok(text);
    }

    let mut cut = limit;
    while !text.is_char_boundary(cut) {
        cut -= 1;
    }
    Err(PrintError::Truncated {
        partial: text[..cut].to_string(),
        needed: text.len(),
        limit,
    })
}
