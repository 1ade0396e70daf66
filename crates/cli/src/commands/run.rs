//! `run` command implementation.

use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use dispatcher::{Dispatcher, LogNotifier, LogWriter};
use registry::PluginRegistry;
use scheduler::Scheduler;

use crate::cli::RunArgs;

/// Execute the `run` command
pub async fn run_daemon(args: &RunArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration");

    // Validate config path
    if !args.config.exists() {
        anyhow::bail!("Configuration file not found: {}", args.config.display());
    }

    // Load and parse configuration
    let mut config = config_loader::ConfigLoader::load_from_path(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    // Apply CLI overrides
    if let Some(ref hostname) = args.hostname {
        info!(hostname = %hostname, "Overriding hostname from CLI");
        config.hostname = Some(hostname.clone());
    }
    if let Some(interval) = args.interval {
        info!(interval = interval, "Overriding interval from CLI");
        config.interval_secs = interval;
    }
    if let Some(port) = args.metrics_port {
        config.metrics_port = if port == 0 { None } else { Some(port) };
    }

    info!(
        hostname = ?config.hostname,
        interval_secs = config.interval_secs,
        plugins = config.plugin.len(),
        "Configuration loaded"
    );

    // Dry run - just validate and exit
    if args.dry_run {
        info!("Dry run mode - configuration is valid, exiting");
        print_config_summary(&config);
        return Ok(());
    }

    // Prometheus endpoint; tracing was already set up in main
    if let Some(port) = config.metrics_port {
        observability::init_metrics_only(port)
            .context("Failed to start metrics endpoint")?;
    }

    // Assemble the runtime
    let registry = Arc::new(PluginRegistry::new());

    let mut dispatcher =
        Dispatcher::new(Arc::clone(&registry)).with_default_interval(config.interval_secs);
    if let Some(ref hostname) = config.hostname {
        dispatcher = dispatcher.with_hostname(hostname.clone());
    }
    let dispatcher = Arc::new(dispatcher);

    // Built-in sinks so dispatched data is visible even with no plugins loaded
    registry.register_write("log", Arc::new(LogWriter::new("log")));
    registry.register_log("log", Arc::new(LogNotifier::new("log")));

    // Feed plugin sections to their config callbacks
    config_loader::apply_to_registry(&config, &registry);

    let scheduler = Scheduler::new(Arc::clone(&registry), Arc::clone(&dispatcher))
        .with_interval(Duration::from_secs(config.interval_secs));

    info!("Starting daemon...");

    // Run until Ctrl+C / SIGTERM; the scheduler shuts plugins down itself
    if let Err(e) = scheduler.run(shutdown_signal()).await {
        warn!(error = %e, "Scheduler exited with error");
        let snapshot = dispatcher.metrics().snapshot();
        info!(
            values_dispatched = snapshot.values_dispatched,
            values_rejected = snapshot.values_rejected,
            "Dispatch totals at exit"
        );
        return Err(e).context("Daemon execution failed");
    }

    let snapshot = dispatcher.metrics().snapshot();
    info!(
        values_dispatched = snapshot.values_dispatched,
        values_rejected = snapshot.values_rejected,
        write_failures = snapshot.write_failures,
        notifications_dispatched = snapshot.notifications_dispatched,
        "harvestd finished"
    );
    Ok(())
}

/// Resolve when Ctrl+C or SIGTERM arrives
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

/// Print configuration summary for dry-run mode
fn print_config_summary(config: &config_loader::DaemonConfig) {
    println!("\n=== Configuration Summary ===\n");
    println!("Daemon:");
    println!(
        "  Hostname: {}",
        config.hostname.as_deref().unwrap_or("(system)")
    );
    println!("  Interval: {}s", config.interval_secs);
    match config.metrics_port {
        Some(port) => println!("  Metrics port: {port}"),
        None => println!("  Metrics port: disabled"),
    }

    println!("\nPlugins ({}):", config.plugin.len());
    for (name, section) in &config.plugin {
        let options = section.as_table().map(|t| t.len()).unwrap_or(0);
        println!("  - {name} ({options} options)");
    }

    println!();
}
