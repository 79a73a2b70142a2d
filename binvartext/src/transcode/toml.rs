//! TOML transcoding: convert variant values to TOML text.
//!
//! Mapping:
//!   - Bool, Int, Real, String      -> TOML scalars
//!   - Array, IntArray, StringArray -> TOML array
//!   - Dictionary                   -> TOML table (string keys only)
//!   - geometry, FloatArray         -> `{ Name = [ reals ] }`
//!   - Vector2Array and friends     -> `{ Name = [ [ reals ], ... ] }`
//!   - NodePath, Object, InputEvent -> `{ Name = "canonical text" }`
//!
//! Lossy edges:
//!   - TOML has no null type; Nil values cause an error.
//!   - TOML has no binary type; ByteArray and Image cause an error.
//!   - TOML table keys are strings; dictionaries with other keys cause an error.
//!   - TOML requires the top-level value to be a table.

use libvartext::{Value, WriteOptions};
use toml_edit::{Array, DocumentMut, Formatted, InlineTable, Item, Table};

use super::{lower, Lowered};

/// Encode a value as a TOML string.
pub fn encode(value: &Value, options: &WriteOptions<'_>) -> Result<String, String> {
    match value {
        Value::Dictionary(_) => match value_to_toml(value, options)? {
            Item::Table(table) => {
                let mut doc = DocumentMut::new();
                for (key, item) in table.iter() {
                    doc[key] = item.clone();
                }
                Ok(doc.to_string())
            }
            _ => Err("Internal error: expected table".to_string()),
        },
        _ => Err("TOML requires the top-level value to be a dictionary".to_string()),
    }
}

fn string_key(key: &Value) -> Result<&str, String> {
    key.as_str()
        .ok_or_else(|| format!("TOML table keys must be strings, got {}", key.type_name()))
}

fn reals(values: &[f64]) -> toml_edit::Value {
    let mut arr = Array::new();
    for f in values {
        arr.push(*f);
    }
    toml_edit::Value::Array(arr)
}

fn single_key(name: &str, value: toml_edit::Value) -> Item {
    let mut inline = InlineTable::new();
    inline.insert(name, value);
    Item::Value(toml_edit::Value::InlineTable(inline))
}

/// Force an item into a value that can sit inside an array or inline table.
fn inline(item: Item) -> Result<toml_edit::Value, String> {
    match item {
        Item::Value(val) => Ok(val),
        Item::Table(t) => Ok(toml_edit::Value::InlineTable(t.into_inline_table())),
        _ => Err("Unexpected TOML item type".to_string()),
    }
}

fn value_to_toml(value: &Value, options: &WriteOptions<'_>) -> Result<Item, String> {
    let native = match lower(value, options) {
        Lowered::Reals(name, values) => return Ok(single_key(name, reals(&values))),
        Lowered::RealGroups(name, groups) => {
            let mut arr = Array::new();
            for group in &groups {
                arr.push(reals(group));
            }
            return Ok(single_key(name, toml_edit::Value::Array(arr)));
        }
        Lowered::Text(name, text) => {
            return Ok(single_key(name, toml_edit::Value::String(Formatted::new(text))))
        }
        Lowered::Native(native) => native,
    };
    let scalar = |v: toml_edit::Value| Ok(Item::Value(v));
    match native {
        Value::Nil => Err("TOML has no null type".to_string()),
        Value::Bool(b) => scalar(toml_edit::Value::Boolean(Formatted::new(*b))),
        Value::Int(n) => scalar(toml_edit::Value::Integer(Formatted::new(*n))),
        Value::Real(f) => scalar(toml_edit::Value::Float(Formatted::new(*f))),
        Value::String(s) => scalar(toml_edit::Value::String(Formatted::new(s.clone()))),
        Value::ByteArray(_) | Value::Image(_) => Err("TOML has no binary data type".to_string()),
        Value::IntArray(a) => {
            let mut arr = Array::new();
            for n in a {
                arr.push(i64::from(*n));
            }
            scalar(toml_edit::Value::Array(arr))
        }
        Value::StringArray(a) => {
            let mut arr = Array::new();
            for s in a {
                arr.push(s.as_str());
            }
            scalar(toml_edit::Value::Array(arr))
        }
        Value::Array(items) => {
            let mut arr = Array::new();
            for v in items {
                arr.push(inline(value_to_toml(v, options)?)?);
            }
            scalar(toml_edit::Value::Array(arr))
        }
        Value::Dictionary(dict) => {
            let mut table = Table::new();
            for (k, v) in dict {
                table.insert(string_key(k)?, value_to_toml(v, options)?);
            }
            Ok(Item::Table(table))
        }
        other => Err(format!("TOML cannot represent {}", other.type_name())),
    }
}
