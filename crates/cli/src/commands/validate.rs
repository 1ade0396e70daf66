//! `validate` command implementation.

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use crate::cli::ValidateArgs;

/// Validation result for JSON output
#[derive(Serialize)]
struct ValidationResult {
    valid: bool,
    config_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    warnings: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<ConfigSummary>,
}

#[derive(Serialize)]
struct ConfigSummary {
    hostname: Option<String>,
    interval_secs: u64,
    plugin_count: usize,
    metrics_port: Option<u16>,
}

/// Execute the `validate` command
pub fn run_validate(args: &ValidateArgs) -> Result<()> {
    info!(config = %args.config.display(), "Validating configuration");

    let result = validate_config(args);

    if args.json {
        let json = serde_json::to_string_pretty(&result)
            .context("Failed to serialize validation result")?;
        println!("{}", json);
    } else {
        print_validation_result(&result);
    }

    if result.valid {
        Ok(())
    } else {
        anyhow::bail!("Configuration validation failed")
    }
}

fn validate_config(args: &ValidateArgs) -> ValidationResult {
    let config_path = args.config.display().to_string();

    // Check file exists
    if !args.config.exists() {
        return ValidationResult {
            valid: false,
            config_path,
            error: Some(format!("File not found: {}", args.config.display())),
            warnings: None,
            summary: None,
        };
    }

    // Try to load and validate
    match config_loader::ConfigLoader::load_from_path(&args.config) {
        Ok(config) => {
            let warnings = collect_warnings(&config);

            ValidationResult {
                valid: true,
                config_path,
                error: None,
                warnings: if warnings.is_empty() {
                    None
                } else {
                    Some(warnings)
                },
                summary: Some(ConfigSummary {
                    hostname: config.hostname.clone(),
                    interval_secs: config.interval_secs,
                    plugin_count: config.plugin.len(),
                    metrics_port: config.metrics_port,
                }),
            }
        }
        Err(e) => ValidationResult {
            valid: false,
            config_path,
            error: Some(e.to_string()),
            warnings: None,
            summary: None,
        },
    }
}

/// Collect configuration warnings (non-fatal issues)
fn collect_warnings(config: &config_loader::DaemonConfig) -> Vec<String> {
    let mut warnings = Vec::new();

    if config.plugin.is_empty() {
        warnings.push(
            "No plugin sections configured - only built-in sinks will be active".to_string(),
        );
    }

    for (name, section) in &config.plugin {
        let is_empty = section.as_table().map(|t| t.is_empty()).unwrap_or(false);
        if is_empty {
            warnings.push(format!("Plugin '{}' has an empty configuration section", name));
        }
    }

    if config.interval_secs > 3600 {
        warnings.push(format!(
            "interval_secs = {} is over an hour - samples will be sparse",
            config.interval_secs
        ));
    }

    warnings
}

fn print_validation_result(result: &ValidationResult) {
    if result.valid {
        println!("✓ Configuration is valid: {}", result.config_path);

        if let Some(ref summary) = result.summary {
            println!(
                "\n  Hostname: {}",
                summary.hostname.as_deref().unwrap_or("(system)")
            );
            println!("  Interval: {}s", summary.interval_secs);
            println!("  Plugins: {}", summary.plugin_count);
            match summary.metrics_port {
                Some(port) => println!("  Metrics port: {}", port),
                None => println!("  Metrics port: disabled"),
            }
        }

        if let Some(ref warnings) = result.warnings {
            println!("\n⚠ Warnings:");
            for warning in warnings {
                println!("  - {}", warning);
            }
        }
    } else {
        println!("✗ Configuration is invalid: {}", result.config_path);
        if let Some(ref error) = result.error {
            println!("\n  Error: {}", error);
        }
    }
}
