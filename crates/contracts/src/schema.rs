//! Data sets (schemas) and their data sources.

use serde::{Deserialize, Serialize};

use crate::ValueKind;

/// One typed measurement slot inside a data set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataSource {
    /// Slot name (e.g. `"value"`, `"rx"`, `"tx"`).
    pub name: String,
    /// Counter or gauge.
    pub kind: ValueKind,
    /// Advisory lower bound; `NaN` means unbounded.
    pub min: f64,
    /// Advisory upper bound; `NaN` means unbounded.
    pub max: f64,
}

impl DataSource {
    /// Unbounded gauge source.
    pub fn gauge(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: ValueKind::Gauge,
            min: f64::NAN,
            max: f64::NAN,
        }
    }

    /// Counter source with the conventional `[0, inf)` range.
    pub fn counter(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: ValueKind::Counter,
            min: 0.0,
            max: f64::NAN,
        }
    }

    /// Set an advisory range.
    pub fn with_range(mut self, min: f64, max: f64) -> Self {
        self.min = min;
        self.max = max;
        self
    }
}

/// A named, ordered list of typed measurement slots a value list must match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataSet {
    /// Type name value lists reference at dispatch.
    pub name: String,
    /// Slots, in the order values must appear.
    pub sources: Vec<DataSource>,
}

impl DataSet {
    pub fn new(name: impl Into<String>, sources: Vec<DataSource>) -> Self {
        Self {
            name: name.into(),
            sources,
        }
    }

    /// Number of slots a matching value list must carry.
    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}
