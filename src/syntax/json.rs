//! conversion of JSON documents into configuration blocks
//!
//! - scalars become `key = value` items (numbers and booleans as their text)
//! - arrays of scalars become a value followed by extra arguments
//! - objects become sub-blocks; a key like "FileClass logs" gives the block an id
//! - arrays of objects become repeated sub-blocks
//!
//! JSON carries no line information, so every item is tagged with line 0.

use serde_json::Value as JsonValue;

use super::{Block, ConfigItem, KeyValue, ParseError};

impl Block {
    /// build a block from a JSON object
    pub fn from_json(name: &str, json: &JsonValue) -> Result<Block, ParseError> {
        let (name, id) = split_block_key(name);
        let obj = json
            .as_object()
            .ok_or_else(|| ParseError::msg(format!("block '{}' must be an object", name)))?;

        let mut block = Block::new(name, 0);
        block.id = id;

        for (key, value) in obj {
            match value {
                JsonValue::Object(_) => {
                    block.items.push(ConfigItem::Block(Block::from_json(key, value)?));
                }
                JsonValue::Array(arr) if arr.iter().all(JsonValue::is_object) && !arr.is_empty() => {
                    for v in arr {
                        block.items.push(ConfigItem::Block(Block::from_json(key, v)?));
                    }
                }
                JsonValue::Array(arr) => {
                    let mut values = arr
                        .iter()
                        .map(|v| scalar_text(key, v))
                        .collect::<Result<Vec<_>, _>>()?
                        .into_iter();
                    let first = values.next().ok_or_else(|| {
                        ParseError::msg(format!("empty value list for '{}'", key))
                    })?;
                    block.items.push(ConfigItem::Var(
                        KeyValue::new(key.as_str(), first, 0).with_extra_args(values),
                    ));
                }
                _ => {
                    let text = scalar_text(key, value)?;
                    block
                        .items
                        .push(ConfigItem::Var(KeyValue::new(key.as_str(), text, 0)));
                }
            }
        }

        Ok(block)
    }
}

fn split_block_key(key: &str) -> (&str, Option<String>) {
    match key.trim().split_once(char::is_whitespace) {
        Some((name, id)) => (name, Some(id.trim().to_string())),
        None => (key.trim(), None),
    }
}

fn scalar_text(key: &str, value: &JsonValue) -> Result<String, ParseError> {
    match value {
        JsonValue::String(s) => Ok(s.clone()),
        JsonValue::Number(n) => Ok(n.to_string()),
        JsonValue::Bool(b) => Ok(b.to_string()),
        JsonValue::Null => Err(ParseError::msg(format!(
            "null value not supported for '{}'",
            key
        ))),
        _ => Err(ParseError::msg(format!(
            "nested value not supported for '{}'",
            key
        ))),
    }
}
