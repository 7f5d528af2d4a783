//! `run` command implementation.

use anyhow::{Context, Result};
use std::time::Duration;
use tracing::{info, warn};

use crate::cli::RunArgs;
use crate::error::CliError;
use crate::pipeline::{InputSource, Pipeline, PipelineConfig};

/// Execute the `run` command
pub async fn run_pipeline(args: &RunArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration");

    if !args.config.exists() {
        return Err(CliError::config_not_found(&args.config).into());
    }

    let blueprint = config_loader::ConfigLoader::load_from_path(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    info!(
        strategy = ?blueprint.router.strategy,
        channels = blueprint.channels.len(),
        routes = blueprint.routes.len(),
        "Configuration loaded"
    );

    if args.dry_run {
        info!("Dry run mode - configuration is valid, exiting");
        print_config_summary(&blueprint);
        return Ok(());
    }

    let pipeline = Pipeline::new(PipelineConfig {
        blueprint,
        input: InputSource::from_arg(&args.input),
        timeout: (args.timeout > 0).then(|| Duration::from_secs(args.timeout)),
        metrics_port: (args.metrics_port > 0).then_some(args.metrics_port),
    });

    // Shutdown fires the cancel handle; the pipeline then drains its consumers.
    let cancel = pipeline.cancel_handle();
    let signal_task = tokio::spawn(async move {
        match shutdown_signal().await {
            Ok(()) => {
                warn!("Received shutdown signal, stopping pipeline...");
                cancel.cancel();
            }
            Err(e) => warn!(error = %e, "Shutdown signal handler unavailable"),
        }
    });

    info!("Starting pipeline...");
    let result = pipeline.run().await;
    signal_task.abort();

    let stats = result.context("Pipeline execution failed")?;
    info!(
        records = stats.records_read,
        written = stats.records_written(),
        throughput = format!("{:.2}", stats.throughput()),
        "Pipeline completed"
    );
    stats.print_summary();

    info!("Record Router finished");
    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM
async fn shutdown_signal() -> std::io::Result<()> {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let mut terminate = signal(SignalKind::terminate())?;
        tokio::select! {
            result = tokio::signal::ctrl_c() => result,
            _ = terminate.recv() => Ok(()),
        }
    }

    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c().await
    }
}

/// Print configuration summary for dry-run mode
fn print_config_summary(blueprint: &contracts::RouterBlueprint) {
    println!("\n=== Configuration Summary ===\n");
    println!("Strategy: {:?}", blueprint.router.strategy);
    if let Some(ref default) = blueprint.router.default_channel {
        println!("Default channel: {}", default);
    }

    println!("\nChannels ({}):", blueprint.channels.len());
    for channel in &blueprint.channels {
        println!(
            "  - {} (capacity {}, {:?} sink)",
            channel.name, channel.capacity, channel.sink
        );
    }

    if !blueprint.routes.is_empty() {
        println!("\nRoutes ({}):", blueprint.routes.len());
        for (i, route) in blueprint.routes.iter().enumerate() {
            println!("  {}. {:?} -> {}", i + 1, route.matcher, route.channel);
        }
    }

    println!();
}
