//! Bridge from parsed TOML sections to the core's config shapes.
//!
//! The core consumes either flat key/value options (simple config) or a
//! [`ConfigItem`] tree (structured config); it never sees TOML itself.

use contracts::{ConfigItem, ConfigValue};
use toml::Value;

/// Convert a plugin's TOML section into a config tree rooted at `name`.
///
/// Scalar entries become children with a single value, scalar arrays become
/// children with multiple values, nested tables become nested blocks, and
/// arrays of tables become repeated blocks under the same key.
pub fn plugin_tree(name: &str, section: &Value) -> ConfigItem {
    let mut root = ConfigItem::new(name);
    if let Value::Table(table) = section {
        for (key, value) in table {
            append_entry(&mut root, key, value);
        }
    } else if let Some(v) = scalar(section) {
        root.values.push(v);
    }
    root
}

fn append_entry(parent: &mut ConfigItem, key: &str, value: &Value) {
    match value {
        Value::Table(_) => {
            parent.children.push(plugin_tree(key, value));
        }
        Value::Array(items) if items.iter().all(|i| matches!(i, Value::Table(_))) => {
            for item in items {
                parent.children.push(plugin_tree(key, item));
            }
        }
        Value::Array(items) => {
            let mut child = ConfigItem::new(key);
            child.values.extend(items.iter().filter_map(scalar));
            parent.children.push(child);
        }
        _ => {
            let mut child = ConfigItem::new(key);
            if let Some(v) = scalar(value) {
                child.values.push(v);
            }
            parent.children.push(child);
        }
    }
}

fn scalar(value: &Value) -> Option<ConfigValue> {
    match value {
        Value::String(s) => Some(ConfigValue::String(s.clone())),
        Value::Integer(i) => Some(ConfigValue::Number(*i as f64)),
        Value::Float(f) => Some(ConfigValue::Number(*f)),
        Value::Boolean(b) => Some(ConfigValue::Boolean(*b)),
        Value::Datetime(d) => Some(ConfigValue::String(d.to_string())),
        Value::Array(_) | Value::Table(_) => None,
    }
}

/// Flatten a plugin's TOML section into stringified key/value options for
/// simple config. Nested tables and arrays are skipped; the allow-list check
/// happens in the registry.
pub fn flat_options(section: &Value) -> Vec<(String, String)> {
    let mut options = Vec::new();
    if let Value::Table(table) = section {
        for (key, value) in table {
            match value {
                Value::String(s) => options.push((key.clone(), s.clone())),
                Value::Integer(i) => options.push((key.clone(), i.to_string())),
                Value::Float(f) => options.push((key.clone(), f.to_string())),
                Value::Boolean(b) => options.push((key.clone(), b.to_string())),
                Value::Datetime(d) => options.push((key.clone(), d.to_string())),
                Value::Array(_) | Value::Table(_) => {}
            }
        }
    }
    options
}
