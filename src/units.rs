//! value conversion utilities for configuration values
//!
//! supports formats:
//! - sizes: "100", "10KB", "2 MB", "1g" (1024-based)
//! - durations: "30", "10s", "5min", "2h", "3d", "1w", "1y"
//! - booleans: 0/1, true/false, yes/no, enabled/disabled
//! - integers: plain signed 32-bit values

use lazy_static::lazy_static;
use regex::Regex;

pub const KILO_BYTE: i64 = 1024;
pub const MEGA_BYTE: i64 = 1024 * KILO_BYTE;
pub const GIGA_BYTE: i64 = 1024 * MEGA_BYTE;
pub const TERA_BYTE: i64 = 1024 * GIGA_BYTE;
pub const PETA_BYTE: i64 = 1024 * TERA_BYTE;

pub const MINUTE: i64 = 60;
pub const HOUR: i64 = 60 * MINUTE;
pub const DAY: i64 = 24 * HOUR;
pub const WEEK: i64 = 7 * DAY;
pub const YEAR: i64 = 365 * DAY;

lazy_static! {
    static ref NUMBER_WITH_UNIT: Regex =
        Regex::new(r"^\s*([+-]?[0-9]+)\s*([A-Za-z]*)\s*$").expect("valid regex");
}

/// split "10MB" into (10, "MB")
fn split_value_unit(s: &str) -> Option<(i64, &str)> {
    let caps = NUMBER_WITH_UNIT.captures(s)?;
    let value: i64 = caps.get(1)?.as_str().parse().ok()?;
    let unit = caps.get(2).map(|m| m.as_str()).unwrap_or("");
    Some((value, unit))
}

/// parse a size with an optional unit suffix, in bytes
pub fn parse_size(s: &str) -> Option<i64> {
    let (value, unit) = split_value_unit(s)?;

    let factor = match unit.to_ascii_lowercase().as_str() {
        "" | "b" => 1,
        "k" | "kb" => KILO_BYTE,
        "m" | "mb" => MEGA_BYTE,
        "g" | "gb" => GIGA_BYTE,
        "t" | "tb" => TERA_BYTE,
        "p" | "pb" => PETA_BYTE,
        _ => return None,
    };

    value.checked_mul(factor)
}

/// parse a duration with an optional unit suffix, in seconds
pub fn parse_duration(s: &str) -> Option<i64> {
    let (value, unit) = split_value_unit(s)?;

    let factor = match unit.to_ascii_lowercase().as_str() {
        "" | "s" | "sec" => 1,
        "m" | "min" => MINUTE,
        "h" | "hour" => HOUR,
        "d" | "day" => DAY,
        "w" | "week" => WEEK,
        "y" | "year" => YEAR,
        _ => return None,
    };

    value.checked_mul(factor)
}

/// parse a boolean value
pub fn parse_bool(s: &str) -> Option<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "enabled" => Some(true),
        "0" | "false" | "no" | "disabled" => Some(false),
        _ => None,
    }
}

/// parse a signed 32-bit integer (no trailing characters)
pub fn parse_int(s: &str) -> Option<i32> {
    s.trim().parse().ok()
}

/// render a size with the largest unit that divides it exactly
pub fn format_size(bytes: i64) -> String {
    const UNITS: [(i64, &str); 5] = [
        (PETA_BYTE, "PB"),
        (TERA_BYTE, "TB"),
        (GIGA_BYTE, "GB"),
        (MEGA_BYTE, "MB"),
        (KILO_BYTE, "KB"),
    ];

    if bytes != 0 {
        for (factor, suffix) in UNITS {
            if bytes % factor == 0 {
                return format!("{}{}", bytes / factor, suffix);
            }
        }
    }
    bytes.to_string()
}

/// render a duration with the largest unit that divides it exactly
pub fn format_duration(seconds: i64) -> String {
    const UNITS: [(i64, &str); 5] = [
        (YEAR, "y"),
        (WEEK, "w"),
        (DAY, "d"),
        (HOUR, "h"),
        (MINUTE, "min"),
    ];

    if seconds != 0 {
        for (factor, suffix) in UNITS {
            if seconds % factor == 0 {
                return format!("{}{}", seconds / factor, suffix);
            }
        }
    }
    format!("{}s", seconds)
}

/// split a leading decimal number from its trailing text: "85%" -> ("85", "%")
pub(crate) fn split_float_prefix(s: &str) -> (&str, &str) {
    let s = s.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;

    if end < bytes.len() && (bytes[end] == b'+' || bytes[end] == b'-') {
        end += 1;
    }
    let digits_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    if end < bytes.len() && bytes[end] == b'.' {
        end += 1;
        while end < bytes.len() && bytes[end].is_ascii_digit() {
            end += 1;
        }
    }
    // no digits at all: nothing numeric to split
    if !s[digits_start..end].bytes().any(|b| b.is_ascii_digit()) {
        return ("", s);
    }
    // exponent, only when followed by digits
    if end < bytes.len() && (bytes[end] == b'e' || bytes[end] == b'E') {
        let mut exp_end = end + 1;
        if exp_end < bytes.len() && (bytes[exp_end] == b'+' || bytes[exp_end] == b'-') {
            exp_end += 1;
        }
        if exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
                exp_end += 1;
            }
            end = exp_end;
        }
    }

    (&s[..end], s[end..].trim())
}

/// split a leading integer from its trailing text: "10k" -> ("10", "k")
pub(crate) fn split_int_prefix(s: &str, signed: bool) -> (&str, &str) {
    let s = s.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;

    if signed && end < bytes.len() && (bytes[end] == b'+' || bytes[end] == b'-') {
        end += 1;
    }
    let digits_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    if end == digits_start {
        return ("", s);
    }

    (&s[..end], s[end..].trim())
}
