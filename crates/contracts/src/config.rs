//! Structured configuration tree handed to tree-configurable plugins.
//!
//! The core never parses configuration syntax; an external collaborator
//! (TOML, JSON, ...) produces this tree and the registry forwards it.

use serde::{Deserialize, Serialize};

/// A single typed configuration value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConfigValue {
    String(String),
    Number(f64),
    Boolean(bool),
}

impl ConfigValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ConfigValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            ConfigValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ConfigValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }
}

impl std::fmt::Display for ConfigValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigValue::String(s) => f.write_str(s),
            ConfigValue::Number(n) => write!(f, "{n}"),
            ConfigValue::Boolean(b) => write!(f, "{b}"),
        }
    }
}

/// One node of the configuration tree: a key, its values, and nested blocks.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ConfigItem {
    pub key: String,
    pub values: Vec<ConfigValue>,
    pub children: Vec<ConfigItem>,
}

impl ConfigItem {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            values: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn with_value(mut self, value: ConfigValue) -> Self {
        self.values.push(value);
        self
    }

    pub fn with_child(mut self, child: ConfigItem) -> Self {
        self.children.push(child);
        self
    }

    /// The single string value of this item, if it has exactly one and it is a
    /// string. The common shape for scalar options.
    pub fn single_string(&self) -> Option<&str> {
        match self.values.as_slice() {
            [ConfigValue::String(s)] => Some(s),
            _ => None,
        }
    }

    /// First child with the given key, matched case-insensitively.
    pub fn child(&self, key: &str) -> Option<&ConfigItem> {
        self.children.iter().find(|c| c.key.eq_ignore_ascii_case(key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_string_requires_exactly_one_string() {
        let item = ConfigItem::new("Host").with_value(ConfigValue::String("db1".into()));
        assert_eq!(item.single_string(), Some("db1"));

        let two = ConfigItem::new("Host")
            .with_value(ConfigValue::String("a".into()))
            .with_value(ConfigValue::String("b".into()));
        assert_eq!(two.single_string(), None);

        let num = ConfigItem::new("Port").with_value(ConfigValue::Number(3306.0));
        assert_eq!(num.single_string(), None);
    }

    #[test]
    fn child_lookup_is_case_insensitive() {
        let tree = ConfigItem::new("Plugin")
            .with_child(ConfigItem::new("Interval").with_value(ConfigValue::Number(30.0)));
        assert!(tree.child("interval").is_some());
        assert!(tree.child("missing").is_none());
    }
}
