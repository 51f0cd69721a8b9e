//! typed extraction of `name = value` parameters from a block
//!
//! each getter returns `Ok(None)` when the parameter is absent and not
//! mandatory. extra arguments following the value are moved into
//! `extra_args` when the caller provides it; extras without storage are an
//! error. every diagnostic names the block, the parameter and the line.

use crate::error::{ConfigError, Result};
use crate::syntax::{Block, KeyValue};
use crate::units::{parse_bool, parse_duration, parse_size, split_float_prefix, split_int_prefix};

use super::flags::ParamFlags;

const STDIO_NAMES: [&str; 3] = ["stdout", "stderr", "syslog"];
const WILDCARDS: &[char] = &['*', '?', '[', ']', '{', '}'];

fn lookup<'a>(
    block: &'a Block,
    block_name: &str,
    var: &str,
    flags: ParamFlags,
    extra_args: Option<&mut Vec<String>>,
) -> Result<Option<&'a KeyValue>> {
    let Some(kv) = block.var(var) else {
        if flags.mandatory {
            return Err(ConfigError::MissingParameter {
                block: block_name.to_string(),
                var: var.to_string(),
                line: block.line,
            });
        }
        return Ok(None);
    };

    match extra_args {
        Some(storage) => *storage = kv.extra_args.clone(),
        None if !kv.extra_args.is_empty() => {
            return Err(ConfigError::structural(format!(
                "Unexpected options for parameter '{}::{}', line {}",
                block_name, var, kv.line
            )))
        }
        None => {}
    }

    Ok(Some(kv))
}

fn invalid(block_name: &str, kv: &KeyValue, expected: &str) -> ConfigError {
    ConfigError::invalid(format!(
        "Invalid value for '{}::{}', line {}: {}",
        block_name, kv.name, kv.line, expected
    ))
}

fn check_sign<T: PartialOrd + Default>(
    block_name: &str,
    kv: &KeyValue,
    value: T,
    flags: ParamFlags,
) -> Result<T> {
    if flags.positive && value < T::default() {
        return Err(ConfigError::constraint(format!(
            "Positive value expected for '{}::{}', line {}.",
            block_name, kv.name, kv.line
        )));
    }
    if flags.not_null && value == T::default() {
        return Err(ConfigError::constraint(format!(
            "'{}::{}' must not be null, line {}.",
            block_name, kv.name, kv.line
        )));
    }
    Ok(value)
}

fn is_mail_address(value: &str) -> bool {
    match value.split_once('@') {
        Some((user, host)) => !user.is_empty() && !host.is_empty(),
        None => false,
    }
}

/// read a string parameter
pub fn get_string_param(
    block: &Block,
    block_name: &str,
    var: &str,
    flags: ParamFlags,
    extra_args: Option<&mut Vec<String>>,
) -> Result<Option<String>> {
    let Some(kv) = lookup(block, block_name, var, flags, extra_args)? else {
        return Ok(None);
    };
    let mut value = kv.value.clone();

    if flags.stdio_allowed
        && STDIO_NAMES
            .iter()
            .any(|name| value.eq_ignore_ascii_case(name))
    {
        return Ok(Some(value));
    }

    let constraint = |what: &str| {
        ConfigError::constraint(format!(
            "{} '{}::{}', line {}",
            what, block_name, kv.name, kv.line
        ))
    };

    if flags.not_empty && value.is_empty() {
        return Err(constraint("Unexpected empty parameter"));
    }
    if flags.absolute_path && !value.starts_with('/') {
        return Err(constraint("Absolute path expected for parameter"));
    }
    if flags.no_wildcards && value.contains(WILDCARDS) {
        return Err(constraint("Wildcards are not allowed in"));
    }
    if flags.mail && !is_mail_address(&value) {
        return Err(constraint("Invalid mail address in"));
    }
    if flags.remove_final_slash && value.len() > 1 && value.ends_with('/') {
        value.pop();
    }

    Ok(Some(value))
}

/// read a boolean parameter (0/1, true/false, yes/no, enabled/disabled)
pub fn get_bool_param(
    block: &Block,
    block_name: &str,
    var: &str,
    flags: ParamFlags,
    extra_args: Option<&mut Vec<String>>,
) -> Result<Option<bool>> {
    let Some(kv) = lookup(block, block_name, var, flags, extra_args)? else {
        return Ok(None);
    };

    parse_bool(&kv.value).map(Some).ok_or_else(|| {
        invalid(
            block_name,
            kv,
            "boolean expected (0, 1, true, false, yes, no, enabled, disabled)",
        )
    })
}

/// read a duration parameter, in seconds
pub fn get_duration_param(
    block: &Block,
    block_name: &str,
    var: &str,
    flags: ParamFlags,
    extra_args: Option<&mut Vec<String>>,
) -> Result<Option<i64>> {
    let Some(kv) = lookup(block, block_name, var, flags, extra_args)? else {
        return Ok(None);
    };

    let secs = parse_duration(&kv.value)
        .ok_or_else(|| invalid(block_name, kv, "duration expected. Eg: 10s"))?;
    check_sign(block_name, kv, secs, flags).map(Some)
}

/// read a size parameter, in bytes
pub fn get_size_param(
    block: &Block,
    block_name: &str,
    var: &str,
    flags: ParamFlags,
    extra_args: Option<&mut Vec<String>>,
) -> Result<Option<i64>> {
    let Some(kv) = lookup(block, block_name, var, flags, extra_args)? else {
        return Ok(None);
    };

    let bytes = parse_size(&kv.value)
        .ok_or_else(|| invalid(block_name, kv, "size expected. Eg: 10MB"))?;
    check_sign(block_name, kv, bytes, flags).map(Some)
}

/// read a 32-bit integer parameter
pub fn get_int_param(
    block: &Block,
    block_name: &str,
    var: &str,
    flags: ParamFlags,
    extra_args: Option<&mut Vec<String>>,
) -> Result<Option<i32>> {
    let Some(kv) = lookup(block, block_name, var, flags, extra_args)? else {
        return Ok(None);
    };

    let (digits, rest) = split_int_prefix(&kv.value, true);
    let value: i32 = digits
        .parse()
        .map_err(|_| invalid(block_name, kv, "integer expected."))?;
    if !rest.is_empty() {
        return Err(invalid(
            block_name,
            kv,
            &format!("extra characters '{}' found after integer {}.", rest, value),
        ));
    }
    check_sign(block_name, kv, value, flags).map(Some)
}

/// read a 64-bit integer parameter with an optional `k`, `M`, `G` or `T`
/// suffix (powers of 1000)
pub fn get_int64_param(
    block: &Block,
    block_name: &str,
    var: &str,
    flags: ParamFlags,
    extra_args: Option<&mut Vec<String>>,
) -> Result<Option<i64>> {
    let Some(kv) = lookup(block, block_name, var, flags, extra_args)? else {
        return Ok(None);
    };

    let (digits, suffix) = split_int_prefix(&kv.value, true);
    let value: i64 = digits
        .parse()
        .map_err(|_| invalid(block_name, kv, "integer expected."))?;

    let factor: i64 = match suffix.to_ascii_lowercase().as_str() {
        "" => 1,
        "k" => 1_000,
        "m" => 1_000_000,
        "g" => 1_000_000_000,
        "t" => 1_000_000_000_000,
        _ => {
            return Err(ConfigError::invalid(format!(
                "Invalid suffix for '{}::{}', line {}: '{}'. Only 'k', 'M', 'G' or 'T' are allowed.",
                block_name, kv.name, kv.line, suffix
            )))
        }
    };
    let value = value
        .checked_mul(factor)
        .ok_or_else(|| invalid(block_name, kv, "integer expected."))?;

    check_sign(block_name, kv, value, flags).map(Some)
}

/// read a float parameter, optionally written as a percentage (`85%`)
pub fn get_float_param(
    block: &Block,
    block_name: &str,
    var: &str,
    flags: ParamFlags,
    extra_args: Option<&mut Vec<String>>,
) -> Result<Option<f64>> {
    let Some(kv) = lookup(block, block_name, var, flags, extra_args)? else {
        return Ok(None);
    };

    let (number, rest) = split_float_prefix(&kv.value);
    let value: f64 = number
        .parse()
        .map_err(|_| invalid(block_name, kv, "float expected."))?;

    let pct_ok = flags.allow_pct_sign && rest == "%";
    if !rest.is_empty() && !pct_ok {
        return Err(invalid(
            block_name,
            kv,
            &format!("extra characters '{}' found after float {:.2}.", rest, value),
        ));
    }

    check_sign(block_name, kv, value, flags).map(Some)
}
