//! criteria table and resolution of `criterion <op> value` into conditions

use serde::Serialize;
use tracing::trace;

use super::status::SmInstance;
use super::types::{AttrMask, Comparator, CompareTriplet, CompareValue, Criterion, FileType};
use super::wildcard::{has_any_level, has_wildcards, process_any_level};
use crate::error::{ConfigError, Result};
use crate::matching::suggest;
use crate::syntax::{KeyValue, Operator};
use crate::units::{parse_duration, parse_int, parse_size};

/// type of the value a criterion compares against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueType {
    String,
    Int,
    Size,
    Duration,
    Type,
}

impl ValueType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValueType::String => "string",
            ValueType::Int => "int",
            ValueType::Size => "size",
            ValueType::Duration => "duration",
            ValueType::Type => "type",
        }
    }
}

/// validation rules attached to a criterion
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CriterionFlags {
    /// accepts ordering operators, not only == and !=
    pub comparable: bool,
    /// numeric value must be >= 0
    pub positive: bool,
    /// numeric value must be != 0
    pub not_null: bool,
    pub not_empty: bool,
    pub no_slash: bool,
    pub no_wildcards: bool,
    /// `**` may be used to match any number of path components
    pub allow_any_depth: bool,
    /// name is `xattr.<attribute>`
    pub xattr: bool,
    /// value is checked against the status manager in context
    pub status: bool,
}

impl CriterionFlags {
    pub const NONE: CriterionFlags = CriterionFlags {
        comparable: false,
        positive: false,
        not_null: false,
        not_empty: false,
        no_slash: false,
        no_wildcards: false,
        allow_any_depth: false,
        xattr: false,
        status: false,
    };

    pub const fn comparable(mut self) -> Self {
        self.comparable = true;
        self
    }

    pub const fn positive(mut self) -> Self {
        self.positive = true;
        self
    }

    pub const fn not_null(mut self) -> Self {
        self.not_null = true;
        self
    }

    pub const fn not_empty(mut self) -> Self {
        self.not_empty = true;
        self
    }

    pub const fn no_slash(mut self) -> Self {
        self.no_slash = true;
        self
    }

    pub const fn no_wildcards(mut self) -> Self {
        self.no_wildcards = true;
        self
    }

    pub const fn allow_any_depth(mut self) -> Self {
        self.allow_any_depth = true;
        self
    }

    pub const fn xattr(mut self) -> Self {
        self.xattr = true;
        self
    }

    pub const fn status(mut self) -> Self {
        self.status = true;
        self
    }
}

/// static description of a criterion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CriterionDescr {
    pub criterion: Criterion,
    pub name: &'static str,
    pub value_type: ValueType,
    #[serde(skip)]
    pub attr_mask: AttrMask,
    pub flags: CriterionFlags,
}

const fn descr(
    criterion: Criterion,
    name: &'static str,
    value_type: ValueType,
    attr_mask: AttrMask,
    flags: CriterionFlags,
) -> CriterionDescr {
    CriterionDescr {
        criterion,
        name,
        value_type,
        attr_mask,
        flags,
    }
}

const NONE: CriterionFlags = CriterionFlags::NONE;

pub static CRITERIA: [CriterionDescr; 18] = [
    descr(
        Criterion::Path,
        "path",
        ValueType::String,
        AttrMask::FULLPATH,
        NONE.allow_any_depth().not_empty(),
    ),
    descr(
        Criterion::Tree,
        "tree",
        ValueType::String,
        AttrMask::FULLPATH,
        NONE.allow_any_depth().not_empty(),
    ),
    descr(
        Criterion::Filename,
        "name",
        ValueType::String,
        AttrMask::NAME,
        NONE.not_empty().no_slash(),
    ),
    descr(
        Criterion::Owner,
        "owner",
        ValueType::String,
        AttrMask::OWNER,
        NONE.not_empty(),
    ),
    descr(
        Criterion::Group,
        "group",
        ValueType::String,
        AttrMask::GROUP,
        NONE.not_empty(),
    ),
    descr(
        Criterion::Pool,
        "ost_pool",
        ValueType::String,
        AttrMask::STRIPE_INFO,
        NONE,
    ),
    descr(Criterion::Type, "type", ValueType::Type, AttrMask::TYPE, NONE),
    descr(
        Criterion::Size,
        "size",
        ValueType::Size,
        AttrMask::SIZE,
        NONE.comparable().positive(),
    ),
    descr(
        Criterion::Depth,
        "depth",
        ValueType::Int,
        AttrMask::DEPTH,
        NONE.comparable().positive(),
    ),
    descr(
        Criterion::DirCount,
        "dircount",
        ValueType::Int,
        AttrMask::DIRCOUNT,
        NONE.comparable().positive(),
    ),
    descr(
        Criterion::OstIndex,
        "ost_index",
        ValueType::Int,
        AttrMask::STRIPE_ITEMS,
        NONE.positive(),
    ),
    descr(
        Criterion::LastAccess,
        "last_access",
        ValueType::Duration,
        AttrMask::LAST_ACCESS,
        NONE.comparable().positive(),
    ),
    descr(
        Criterion::LastMod,
        "last_mod",
        ValueType::Duration,
        AttrMask::LAST_MOD,
        NONE.comparable().positive(),
    ),
    descr(
        Criterion::LastArchive,
        "last_archive",
        ValueType::Duration,
        AttrMask::LAST_ARCHIVE,
        NONE.comparable().positive(),
    ),
    descr(
        Criterion::LastRestore,
        "last_restore",
        ValueType::Duration,
        AttrMask::LAST_RESTORE,
        NONE.comparable().positive(),
    ),
    descr(
        Criterion::Creation,
        "creation",
        ValueType::Duration,
        AttrMask::CREATION_TIME,
        NONE.comparable().positive(),
    ),
    descr(
        Criterion::Xattr,
        "xattr",
        ValueType::String,
        AttrMask::XATTRS,
        NONE.xattr(),
    ),
    descr(
        Criterion::Status,
        "status",
        ValueType::String,
        AttrMask::EMPTY,
        NONE.status().no_wildcards(),
    ),
];

const XATTR_PREFIX: &str = "xattr.";

impl Criterion {
    pub fn descr(&self) -> &'static CriterionDescr {
        CRITERIA
            .iter()
            .find(|d| d.criterion == *self)
            .unwrap_or(&CRITERIA[0])
    }

    pub fn as_str(&self) -> &'static str {
        self.descr().name
    }
}

/// find the descriptor for a criterion name (case-insensitive)
///
/// any name starting with `xattr.` selects the extended attribute criterion.
pub fn lookup_criterion(name: &str) -> Result<&'static CriterionDescr> {
    let is_xattr = name
        .get(..XATTR_PREFIX.len())
        .is_some_and(|p| p.eq_ignore_ascii_case(XATTR_PREFIX));
    if is_xattr {
        return Ok(Criterion::Xattr.descr());
    }

    CRITERIA
        .iter()
        .filter(|d| !d.flags.xattr)
        .find(|d| d.name.eq_ignore_ascii_case(name))
        .ok_or_else(|| ConfigError::UnknownCriterion {
            name: name.to_string(),
            suggestion: suggest(name, CRITERIA.iter().map(|d| d.name)),
        })
}

fn map_operator(op: Operator) -> Option<Comparator> {
    match op {
        Operator::Equal => Some(Comparator::Equal),
        Operator::Diff => Some(Comparator::Diff),
        Operator::Gt => Some(Comparator::Greater),
        Operator::GtEq => Some(Comparator::GreaterEq),
        Operator::Lt => Some(Comparator::Less),
        Operator::LtEq => Some(Comparator::LessEq),
        Operator::Cmd => None,
    }
}

/// resolve a parsed condition into a compare triplet
///
/// returns the triplet and the attributes it reads: the criterion's static
/// attribute, or the status bit of `smi` for the status criterion.
pub fn interpret_condition(
    kv: &KeyValue,
    smi: Option<&SmInstance>,
) -> Result<(CompareTriplet, AttrMask)> {
    let descr = lookup_criterion(&kv.name)?;
    criteria_to_condition(kv, descr, smi)
}

/// resolve a condition against an already selected descriptor
pub fn criteria_to_condition(
    kv: &KeyValue,
    descr: &CriterionDescr,
    smi: Option<&SmInstance>,
) -> Result<(CompareTriplet, AttrMask)> {
    let flags = descr.flags;
    let name = if flags.xattr {
        kv.name.as_str()
    } else {
        descr.name
    };

    let attr_mask = if flags.status {
        match smi {
            Some(smi) => smi.attr_mask(),
            None => {
                return Err(ConfigError::structural(format!(
                    "'{}' criteria is not expected in this context",
                    name
                )))
            }
        }
    } else {
        descr.attr_mask
    };

    let mut op = map_operator(kv.op).ok_or_else(|| {
        ConfigError::invalid(format!(
            "Illegal comparator for {} criteria: '{}'",
            name, kv.op
        ))
    })?;

    let mut triplet = CompareTriplet::new(descr.criterion, op, CompareValue::default());

    triplet.value = match descr.value_type {
        ValueType::String => {
            let mut value = kv.value.clone();

            if flags.not_empty && value.is_empty() {
                return Err(ConfigError::constraint(format!(
                    "non-empty string expected for {} parameter",
                    name
                )));
            }
            if flags.no_slash && value.contains('/') {
                return Err(ConfigError::constraint(format!(
                    "no slash (/) expected in {} parameter",
                    name
                )));
            }
            if has_wildcards(&value) {
                if flags.no_wildcards {
                    return Err(ConfigError::constraint(format!(
                        "No wildcard is allowed in {} criteria",
                        name
                    )));
                }
                op = match op {
                    Comparator::Equal => Comparator::Like,
                    Comparator::Diff => Comparator::Unlike,
                    other => other,
                };
            }

            if flags.xattr {
                let attr = kv.name.get(XATTR_PREFIX.len()..).unwrap_or_default();
                if attr.is_empty() {
                    return Err(ConfigError::invalid(format!(
                        "attribute name expected after '{}' in {} criteria",
                        XATTR_PREFIX, name
                    )));
                }
                triplet.xattr_name = Some(attr.to_string());
            } else if flags.status {
                if let Some(smi) = smi {
                    if !smi.manager.is_valid_status(&value) {
                        return Err(ConfigError::constraint(format!(
                            "Invalid status '{}' for '{}' status manager: allowed values are {}",
                            value,
                            smi.name(),
                            smi.manager.allowed_values()
                        )));
                    }
                }
            } else if has_any_level(&value) {
                if !flags.allow_any_depth {
                    return Err(ConfigError::constraint(format!(
                        "double star wildcard (**) not expected in {} parameter",
                        name
                    )));
                }
                value = process_any_level(&value)?;
                triplet.any_level = true;
            }

            CompareValue::Str(value)
        }
        ValueType::Size => {
            let size = parse_size(&kv.value).ok_or_else(|| {
                ConfigError::invalid(format!(
                    "{} criteria: invalid format for size: '{}'",
                    name, kv.value
                ))
            })?;
            check_int_value(name, size, flags)?;
            CompareValue::Size(size)
        }
        ValueType::Int => {
            let int = parse_int(&kv.value).ok_or_else(|| {
                ConfigError::invalid(format!(
                    "{} criteria: integer expected: '{}'",
                    name, kv.value
                ))
            })?;
            check_int_value(name, int as i64, flags)?;
            CompareValue::Int(int)
        }
        ValueType::Duration => {
            let secs = parse_duration(&kv.value).ok_or_else(|| {
                ConfigError::invalid(format!(
                    "{} criteria: duration expected: '{}'",
                    name, kv.value
                ))
            })?;
            check_int_value(name, secs, flags)?;
            CompareValue::Duration(secs)
        }
        ValueType::Type => {
            let file_type = FileType::parse(&kv.value).ok_or_else(|| {
                ConfigError::invalid(
                    "Illegal condition on type: file, directory, symlink, chr, blk, fifo or sock expected.",
                )
            })?;
            CompareValue::Type(file_type)
        }
    };

    if !flags.comparable && !op.is_equality() {
        return Err(ConfigError::constraint(format!(
            "Illegal comparator for {} criteria: == or != expected",
            name
        )));
    }
    triplet.op = op;

    trace!(criterion = name, op = op.as_str().trim(), "resolved condition");
    Ok((triplet, attr_mask))
}

fn check_int_value(name: &str, value: i64, flags: CriterionFlags) -> Result<()> {
    if flags.positive && value < 0 {
        return Err(ConfigError::constraint(format!(
            "Positive value expected for {} criteria",
            name
        )));
    }
    if flags.not_null && value == 0 {
        return Err(ConfigError::constraint(format!(
            "Null value not allowed for {} criteria",
            name
        )));
    }
    Ok(())
}
