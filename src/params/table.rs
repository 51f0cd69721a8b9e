//! table-driven reading of scalar parameters

use std::fmt;

use serde::Serialize;
use tracing::warn;

use super::extract::{
    get_bool_param, get_duration_param, get_float_param, get_int64_param, get_int_param,
    get_size_param, get_string_param,
};
use super::flags::ParamFlags;
use crate::error::Result;
use crate::matching::suggest;
use crate::syntax::{Block, ConfigItem};

/// where a parameter's value is stored
#[derive(Debug)]
pub enum ParamTarget<'a> {
    String(&'a mut String),
    Bool(&'a mut bool),
    /// seconds
    Duration(&'a mut i64),
    /// bytes
    Size(&'a mut i64),
    Int(&'a mut i32),
    Int64(&'a mut i64),
    Float(&'a mut f64),
}

#[derive(Debug)]
pub struct ScalarParam<'a> {
    pub name: &'static str,
    pub flags: ParamFlags,
    pub target: ParamTarget<'a>,
}

impl<'a> ScalarParam<'a> {
    pub fn new(name: &'static str, flags: ParamFlags, target: ParamTarget<'a>) -> Self {
        Self {
            name,
            flags,
            target,
        }
    }
}

/// read every parameter of the table; absent optional parameters keep their
/// current value. stops at the first error.
pub fn read_scalar_params<'a, I>(block: &Block, block_name: &str, params: I) -> Result<()>
where
    I: IntoIterator<Item = ScalarParam<'a>>,
{
    for param in params {
        let (name, flags) = (param.name, param.flags);
        match param.target {
            ParamTarget::String(t) => {
                if let Some(v) = get_string_param(block, block_name, name, flags, None)? {
                    *t = v;
                }
            }
            ParamTarget::Bool(t) => {
                if let Some(v) = get_bool_param(block, block_name, name, flags, None)? {
                    *t = v;
                }
            }
            ParamTarget::Duration(t) => {
                if let Some(v) = get_duration_param(block, block_name, name, flags, None)? {
                    *t = v;
                }
            }
            ParamTarget::Size(t) => {
                if let Some(v) = get_size_param(block, block_name, name, flags, None)? {
                    *t = v;
                }
            }
            ParamTarget::Int(t) => {
                if let Some(v) = get_int_param(block, block_name, name, flags, None)? {
                    *t = v;
                }
            }
            ParamTarget::Int64(t) => {
                if let Some(v) = get_int64_param(block, block_name, name, flags, None)? {
                    *t = v;
                }
            }
            ParamTarget::Float(t) => {
                if let Some(v) = get_float_param(block, block_name, name, flags, None)? {
                    *t = v;
                }
            }
        }
    }
    Ok(())
}

/// whether an unknown item is a parameter or a sub-block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UnknownKind {
    Parameter,
    Block,
}

/// a parameter or sub-block nobody asked for
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnknownParameter {
    pub kind: UnknownKind,
    pub block: String,
    pub name: String,
    pub line: u32,
    pub suggestion: Option<String>,
}

impl fmt::Display for UnknownParameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            UnknownKind::Parameter => write!(
                f,
                "unknown parameter '{}' in block '{}' line {}",
                self.name, self.block, self.line
            )?,
            UnknownKind::Block => write!(
                f,
                "unknown block '{}' as sub-block of '{}' line {}",
                self.name, self.block, self.line
            )?,
        }
        if let Some(s) = &self.suggestion {
            write!(f, " (did you mean '{}'?)", s)?;
        }
        Ok(())
    }
}

/// report items of `block` whose name is not in `allowed` (case-insensitive)
///
/// each finding is logged as a warning and returned.
pub fn check_unknown_parameters(
    block: &Block,
    block_name: &str,
    allowed: &[&str],
) -> Vec<UnknownParameter> {
    let mut unknown = Vec::new();

    for item in &block.items {
        let (kind, name) = match item {
            ConfigItem::Var(kv) => (UnknownKind::Parameter, kv.name.as_str()),
            ConfigItem::Block(b) => (UnknownKind::Block, b.name.as_str()),
            _ => continue,
        };
        if allowed.iter().any(|a| a.eq_ignore_ascii_case(name)) {
            continue;
        }

        let finding = UnknownParameter {
            kind,
            block: block_name.to_string(),
            name: name.to_string(),
            line: item.line(),
            suggestion: suggest(name, allowed.iter().copied()),
        };
        warn!("{}", finding);
        unknown.push(finding);
    }

    unknown
}
