//! `validate` command implementation.

use anyhow::{Context, Result};
use contracts::{DispatchStrategy, RouterBlueprint};
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
    version: String,
    strategy: DispatchStrategy,
    channel_count: usize,
    route_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    default_channel: Option<String>,
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

    if !args.config.exists() {
        return ValidationResult {
            valid: false,
            config_path,
            error: Some(format!("File not found: {}", args.config.display())),
            warnings: None,
            summary: None,
        };
    }

    match config_loader::ConfigLoader::load_from_path(&args.config) {
        Ok(blueprint) => {
            let warnings = collect_warnings(&blueprint);
            ValidationResult {
                valid: true,
                config_path,
                error: None,
                warnings: (!warnings.is_empty()).then_some(warnings),
                summary: Some(ConfigSummary {
                    version: format!("{:?}", blueprint.version),
                    strategy: blueprint.router.strategy,
                    channel_count: blueprint.channels.len(),
                    route_count: blueprint.routes.len(),
                    default_channel: blueprint.router.default_channel.clone(),
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

/// Non-fatal configuration issues
fn collect_warnings(blueprint: &RouterBlueprint) -> Vec<String> {
    let mut warnings = Vec::new();

    match blueprint.router.strategy {
        DispatchStrategy::ContentBased => {
            if blueprint.routes.is_empty() && blueprint.router.default_channel.is_none() {
                warnings.push("No routes and no default channel - every record is dropped".into());
            } else if blueprint.router.default_channel.is_none() {
                warnings.push("No default channel - unmatched records are dropped".into());
            }
            for name in blueprint.unrouted_channels() {
                warnings.push(format!("Channel '{name}' is not reachable by any route"));
            }
        }
        strategy => {
            if !blueprint.routes.is_empty() {
                warnings.push(format!("routes are ignored by the {strategy:?} strategy"));
            }
            if blueprint.router.default_channel.is_some() {
                warnings.push(format!(
                    "router.default_channel is ignored by the {strategy:?} strategy"
                ));
            }
        }
    }

    warnings
}

fn print_validation_result(result: &ValidationResult) {
    if result.valid {
        println!("✓ Configuration is valid: {}", result.config_path);

        if let Some(ref summary) = result.summary {
            println!("\n  Version: {}", summary.version);
            println!("  Strategy: {:?}", summary.strategy);
            println!("  Channels: {}", summary.channel_count);
            println!("  Routes: {}", summary.route_count);
            if let Some(ref default) = summary.default_channel {
                println!("  Default channel: {}", default);
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
