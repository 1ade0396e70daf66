//! # Config Loader
//!
//! Configuration loading and parsing module.
//!
//! Responsibilities:
//! - Parse TOML/JSON configuration files into [`DaemonConfig`]
//! - Validate configuration legality
//! - Bridge plugin sections into the core's config shapes and feed them to
//!   the registry
//!
//! # Example
//!
//! ```no_run
//! use config_loader::ConfigLoader;
//! use std::path::Path;
//!
//! let config = ConfigLoader::load_from_path(Path::new("harvestd.toml")).unwrap();
//! println!("interval: {}s", config.interval_secs);
//! ```

mod parser;
mod tree;
mod validator;

pub use parser::ConfigFormat;
pub use tree::{flat_options, plugin_tree};

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;
use ::validator::Validate;

use contracts::CoreError;
use registry::{ConfigKind, PluginRegistry};

/// Daemon-level settings plus raw per-plugin sections.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct DaemonConfig {
    /// Hostname override; resolved from the system when unset.
    pub hostname: Option<String>,
    /// Global scheduler tick in seconds.
    #[validate(range(min = 1))]
    pub interval_secs: u64,
    /// Logging settings.
    pub log: LogConfig,
    /// Prometheus endpoint port (None = disabled).
    pub metrics_port: Option<u16>,
    /// Raw per-plugin configuration sections, keyed by plugin name.
    pub plugin: BTreeMap<String, toml::Value>,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            hostname: None,
            interval_secs: 10,
            log: LogConfig::default(),
            metrics_port: None,
            plugin: BTreeMap::new(),
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Default level when `RUST_LOG` is unset.
    pub level: String,
    /// Output format: json / pretty / compact.
    pub format: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

/// Configuration loader
///
/// Provides static methods to load configuration from files or strings.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from file path
    ///
    /// Automatically detects format from file extension (.toml / .json).
    ///
    /// # Errors
    /// - File read failure
    /// - Unsupported format
    /// - Parse failure
    /// - Validation failure
    pub fn load_from_path(path: &Path) -> Result<DaemonConfig, CoreError> {
        let format = Self::detect_format(path)?;
        let content = Self::read_file(path)?;
        Self::load_from_str(&content, format)
    }

    /// Load configuration from string
    ///
    /// # Errors
    /// - Parse failure
    /// - Validation failure
    pub fn load_from_str(content: &str, format: ConfigFormat) -> Result<DaemonConfig, CoreError> {
        let config = parser::parse(content, format)?;
        validator::validate(&config)?;
        Ok(config)
    }

    /// Serialize DaemonConfig to TOML string
    pub fn to_toml(config: &DaemonConfig) -> Result<String, CoreError> {
        toml::to_string_pretty(config)
            .map_err(|e| CoreError::config_parse(format!("TOML serialize error: {e}")))
    }

    /// Serialize DaemonConfig to JSON string
    pub fn to_json(config: &DaemonConfig) -> Result<String, CoreError> {
        serde_json::to_string_pretty(config)
            .map_err(|e| CoreError::config_parse(format!("JSON serialize error: {e}")))
    }
}

impl ConfigLoader {
    /// Infer configuration format from file extension
    fn detect_format(path: &Path) -> Result<ConfigFormat, CoreError> {
        let ext = path.extension().and_then(|e| e.to_str()).ok_or_else(|| {
            CoreError::config_parse("cannot determine file format from extension")
        })?;

        ConfigFormat::from_extension(ext)
            .ok_or_else(|| CoreError::config_parse(format!("unsupported config format: .{ext}")))
    }

    /// Read configuration file content
    fn read_file(path: &Path) -> Result<String, CoreError> {
        Ok(std::fs::read_to_string(path)?)
    }
}

/// Feed every plugin section to its registered config callback.
///
/// Offending options are logged and skipped; prior plugin state is retained.
/// A section for a plugin without a config callback is ignored with a
/// warning. Containment per section: one bad plugin never blocks another.
pub fn apply_to_registry(config: &DaemonConfig, registry: &PluginRegistry) {
    for (name, section) in &config.plugin {
        match registry.config_kind(name) {
            Some(ConfigKind::Tree) => {
                let tree = plugin_tree(name, section);
                if let Err(e) = registry.configure_tree(name, &tree) {
                    warn!(plugin = %name, error = %e, "structured config rejected, section ignored");
                }
            }
            Some(ConfigKind::Simple) => {
                for (key, value) in flat_options(section) {
                    if let Err(e) = registry.configure_simple(name, &key, &value) {
                        warn!(plugin = %name, key = %key, error = %e, "config option ignored");
                    }
                }
            }
            None => {
                warn!(plugin = %name, "config section for plugin without config callback, ignored");
            }
        }
    }
}
