//! `info` command implementation.

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use crate::cli::InfoArgs;

/// Configuration info for JSON output
#[derive(Serialize)]
struct ConfigInfo {
    daemon: DaemonInfo,
    plugins: Vec<PluginInfo>,
}

#[derive(Serialize)]
struct DaemonInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    hostname: Option<String>,
    interval_secs: u64,
    log_level: String,
    log_format: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    metrics_port: Option<u16>,
}

#[derive(Serialize)]
struct PluginInfo {
    name: String,
    option_count: usize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    options: Vec<String>,
}

/// Execute the `info` command
pub fn run_info(args: &InfoArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration info");

    if !args.config.exists() {
        anyhow::bail!("Configuration file not found: {}", args.config.display());
    }

    let config = config_loader::ConfigLoader::load_from_path(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    if args.json {
        let info = build_config_info(&config, args);
        let json =
            serde_json::to_string_pretty(&info).context("Failed to serialize config info")?;
        println!("{}", json);
    } else {
        print_config_info(&config, args);
    }

    Ok(())
}

fn build_config_info(config: &config_loader::DaemonConfig, args: &InfoArgs) -> ConfigInfo {
    let plugins = config
        .plugin
        .iter()
        .map(|(name, section)| {
            let keys: Vec<String> = section
                .as_table()
                .map(|t| t.keys().cloned().collect())
                .unwrap_or_default();
            PluginInfo {
                name: name.clone(),
                option_count: keys.len(),
                options: if args.plugins { keys } else { Vec::new() },
            }
        })
        .collect();

    ConfigInfo {
        daemon: DaemonInfo {
            hostname: config.hostname.clone(),
            interval_secs: config.interval_secs,
            log_level: config.log.level.clone(),
            log_format: config.log.format.clone(),
            metrics_port: config.metrics_port,
        },
        plugins,
    }
}

fn print_config_info(config: &config_loader::DaemonConfig, args: &InfoArgs) {
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║                  harvestd Configuration                      ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");

    // Daemon settings
    println!("⚙️  Daemon");
    println!(
        "   ├─ Hostname: {}",
        config.hostname.as_deref().unwrap_or("(system)")
    );
    println!("   ├─ Interval: {}s", config.interval_secs);
    println!(
        "   ├─ Logging: {} ({})",
        config.log.level, config.log.format
    );
    match config.metrics_port {
        Some(port) => println!("   └─ Metrics port: {}", port),
        None => println!("   └─ Metrics port: disabled"),
    }

    // Plugins
    println!("\n🔌 Plugins ({})", config.plugin.len());
    let count = config.plugin.len();
    for (i, (name, section)) in config.plugin.iter().enumerate() {
        let is_last = i == count - 1;
        let prefix = if is_last { "└─" } else { "├─" };
        let child_prefix = if is_last { "   " } else { "│  " };

        let keys: Vec<&String> = section
            .as_table()
            .map(|t| t.keys().collect())
            .unwrap_or_default();

        println!("   {} {}", prefix, name);

        if args.plugins && !keys.is_empty() {
            for (j, key) in keys.iter().enumerate() {
                let key_is_last = j == keys.len() - 1;
                let key_prefix = if key_is_last { "└─" } else { "├─" };
                println!("   {}  {} {}", child_prefix, key_prefix, key);
            }
        } else {
            println!("   {}  └─ {} options", child_prefix, keys.len());
        }
    }

    println!();
}
