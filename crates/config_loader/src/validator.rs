//! Configuration validation
//!
//! Rules:
//! - interval_secs >= 1
//! - hostname (when set) within the identifier length bound
//! - plugin section names non-empty and within the identifier length bound
//! - log format one of json / pretty / compact

use contracts::{check_name, CoreError};
use ::validator::Validate;

use crate::DaemonConfig;

const LOG_FORMATS: &[&str] = &["json", "pretty", "compact"];

/// Validate a parsed daemon configuration.
///
/// Returns the first error encountered, or Ok(()).
pub fn validate(config: &DaemonConfig) -> Result<(), CoreError> {
    config.validate().map_err(|e| {
        CoreError::config_validation("daemon", e.to_string())
    })?;

    if let Some(hostname) = &config.hostname {
        check_name("host", hostname)?;
        if hostname.is_empty() {
            return Err(CoreError::config_validation(
                "hostname",
                "must not be empty when set",
            ));
        }
    }

    if !LOG_FORMATS.contains(&config.log.format.as_str()) {
        return Err(CoreError::config_validation(
            "log.format",
            format!(
                "unknown format '{}', expected one of {LOG_FORMATS:?}",
                config.log.format
            ),
        ));
    }

    for name in config.plugin.keys() {
        if name.is_empty() {
            return Err(CoreError::config_validation(
                "plugin",
                "plugin section name must not be empty",
            ));
        }
        check_name("plugin", name)?;
    }

    Ok(())
}
