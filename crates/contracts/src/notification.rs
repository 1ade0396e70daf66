//! Notifications delivered to log subscribers.

use serde::{Deserialize, Serialize};

/// Notification severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Okay,
    Warning,
    Failure,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Okay => "okay",
            Severity::Warning => "warning",
            Severity::Failure => "failure",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One event fanned out to every registered log subscriber.
///
/// Carries the same four identifiers as a value list so subscribers can
/// correlate events with the series they concern.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub severity: Severity,
    pub message: String,
    /// Seconds since epoch; `0` means "fill in at dispatch".
    pub time: u64,
    pub host: String,
    pub plugin: String,
    pub plugin_instance: String,
    pub type_instance: String,
    /// Associated schema type, if the event concerns one.
    pub type_name: Option<String>,
}

impl Notification {
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            message: message.into(),
            time: 0,
            host: String::new(),
            plugin: String::new(),
            plugin_instance: String::new(),
            type_instance: String::new(),
            type_name: None,
        }
    }

    pub fn with_plugin(mut self, plugin: impl Into<String>) -> Self {
        self.plugin = plugin.into();
        self
    }

    pub fn with_plugin_instance(mut self, instance: impl Into<String>) -> Self {
        self.plugin_instance = instance.into();
        self
    }

    pub fn with_type_instance(mut self, instance: impl Into<String>) -> Self {
        self.type_instance = instance.into();
        self
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    pub fn with_type_name(mut self, type_name: impl Into<String>) -> Self {
        self.type_name = Some(type_name.into());
        self
    }

    pub fn with_time(mut self, time: u64) -> Self {
        self.time = time;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_ordering_matches_urgency() {
        assert!(Severity::Okay < Severity::Warning);
        assert!(Severity::Warning < Severity::Failure);
    }

    #[test]
    fn builder_fills_identifiers() {
        let n = Notification::new(Severity::Warning, "disk almost full")
            .with_plugin("df")
            .with_plugin_instance("root")
            .with_type_name("percent");
        assert_eq!(n.plugin, "df");
        assert_eq!(n.plugin_instance, "root");
        assert_eq!(n.type_name.as_deref(), Some("percent"));
        assert_eq!(n.time, 0);
    }
}
