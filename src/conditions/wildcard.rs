//! shell-pattern helpers for string criteria

use crate::error::{ConfigError, Result};

const WILDCARDS: &[char] = &['*', '?', '[', ']', '{', '}'];

/// whether the value contains shell wildcard characters
pub fn has_wildcards(value: &str) -> bool {
    value.contains(WILDCARDS)
}

/// whether the value uses the any-depth `**` pattern
pub fn has_any_level(value: &str) -> bool {
    value.contains("**")
}

/// rewrite a `**` pattern for plain shell matching
///
/// every `**` must be a whole path component: preceded by `/` or the start
/// and followed by `/` or the end. unescaped `?` becomes `[!/]` so it does
/// not match a separator, then each `**` collapses to `*`.
pub fn process_any_level(value: &str) -> Result<String> {
    let bytes = value.as_bytes();
    let mut from = 0;
    while let Some(pos) = value[from..].find("**").map(|p| p + from) {
        let before_ok = pos == 0 || bytes[pos - 1] == b'/';
        let after = pos + 2;
        let after_ok = after == bytes.len() || bytes[after] == b'/';
        if !before_ok || !after_ok {
            return Err(ConfigError::invalid(format!(
                "Character before and after '**' must be a '/' in '{}'",
                value
            )));
        }
        from = after;
    }

    let mut out = String::with_capacity(value.len() + 8);
    let mut chars = value.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' if chars.peek() == Some(&'?') => {
                out.push('\\');
                out.push('?');
                chars.next();
            }
            '?' => out.push_str("[!/]"),
            _ => out.push(c),
        }
    }

    Ok(out.replace("**", "*"))
}

/// text form of a value rewritten by [`process_any_level`]
///
/// a `*` that is a whole path component prints as `**` and `[!/]` as `?`, so
/// compiling the result gives back the same value. escaped characters are
/// copied as written.
pub fn restore_any_level(value: &str) -> String {
    let bytes = value.as_bytes();
    let mut out = String::with_capacity(value.len() + 4);
    let mut chars = value.char_indices();
    while let Some((i, c)) = chars.next() {
        match c {
            '\\' => {
                out.push('\\');
                if let Some((_, next)) = chars.next() {
                    out.push(next);
                }
            }
            '[' if value[i..].starts_with("[!/]") => {
                out.push('?');
                // skip "!/]"
                for _ in 0..3 {
                    chars.next();
                }
            }
            '*' if (i == 0 || bytes[i - 1] == b'/')
                && (i + 1 == bytes.len() || bytes[i + 1] == b'/') =>
            {
                out.push_str("**");
            }
            _ => out.push(c),
        }
    }
    out
}
