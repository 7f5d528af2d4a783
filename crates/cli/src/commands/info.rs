//! `info` command implementation.

use std::collections::HashMap;

use anyhow::{Context, Result};
use contracts::{DispatchStrategy, MatcherConfig, RouterBlueprint, SinkType};
use serde::Serialize;
use tracing::info;

use crate::cli::InfoArgs;

/// Configuration info for JSON output
#[derive(Serialize)]
struct ConfigInfo {
    version: String,
    strategy: DispatchStrategy,
    #[serde(skip_serializing_if = "Option::is_none")]
    default_channel: Option<String>,
    channels: Vec<ChannelInfo>,
    routes: Vec<RouteInfo>,
}

#[derive(Serialize)]
struct ChannelInfo {
    name: String,
    capacity: usize,
    sink: SinkType,
    #[serde(skip_serializing_if = "HashMap::is_empty")]
    params: HashMap<String, String>,
}

#[derive(Serialize)]
struct RouteInfo {
    order: usize,
    channel: String,
    matcher: MatcherConfig,
}

/// Execute the `info` command
pub fn run_info(args: &InfoArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration info");

    if !args.config.exists() {
        anyhow::bail!("Configuration file not found: {}", args.config.display());
    }

    let blueprint = config_loader::ConfigLoader::load_from_path(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    if args.json {
        let info = build_config_info(&blueprint, args.params);
        let json =
            serde_json::to_string_pretty(&info).context("Failed to serialize config info")?;
        println!("{}", json);
    } else {
        print_config_info(&blueprint, args.params);
    }

    Ok(())
}

fn build_config_info(blueprint: &RouterBlueprint, with_params: bool) -> ConfigInfo {
    let channels = blueprint
        .channels
        .iter()
        .map(|c| ChannelInfo {
            name: c.name.clone(),
            capacity: c.capacity,
            sink: c.sink,
            params: if with_params {
                c.params.clone()
            } else {
                HashMap::new()
            },
        })
        .collect();

    let routes = blueprint
        .routes
        .iter()
        .enumerate()
        .map(|(i, r)| RouteInfo {
            order: i + 1,
            channel: r.channel.clone(),
            matcher: r.matcher.clone(),
        })
        .collect();

    ConfigInfo {
        version: format!("{:?}", blueprint.version),
        strategy: blueprint.router.strategy,
        default_channel: blueprint.router.default_channel.clone(),
        channels,
        routes,
    }
}

fn describe_matcher(matcher: &MatcherConfig) -> String {
    match matcher {
        MatcherConfig::Contains { value } => format!("contains {value:?}"),
        MatcherConfig::StartsWith { value } => format!("starts with {value:?}"),
        MatcherConfig::EndsWith { value } => format!("ends with {value:?}"),
        MatcherConfig::Equals { value } => format!("equals {value:?}"),
        MatcherConfig::Regex { pattern } => format!("matches /{pattern}/"),
        MatcherConfig::Even => "even integer".to_string(),
        MatcherConfig::Odd => "odd integer".to_string(),
    }
}

fn print_config_info(blueprint: &RouterBlueprint, with_params: bool) {
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║               Record Router Configuration                    ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");

    println!("🔀 Router");
    println!("   ├─ Version: {:?}", blueprint.version);
    println!("   ├─ Strategy: {:?}", blueprint.router.strategy);
    match &blueprint.router.default_channel {
        Some(default) => println!("   └─ Default channel: {}", default),
        None => println!("   └─ Default channel: (none, unmatched records dropped)"),
    }

    println!("\n📦 Channels ({})", blueprint.channels.len());
    for (i, channel) in blueprint.channels.iter().enumerate() {
        let is_last = i == blueprint.channels.len() - 1;
        let prefix = if is_last { "└─" } else { "├─" };
        let child_prefix = if is_last { "   " } else { "│  " };

        println!(
            "   {} {} (capacity {}, {:?} sink)",
            prefix, channel.name, channel.capacity, channel.sink
        );

        if with_params && !channel.params.is_empty() {
            let mut params: Vec<_> = channel.params.iter().collect();
            params.sort();
            for (j, (key, value)) in params.iter().enumerate() {
                let param_prefix = if j == params.len() - 1 { "└─" } else { "├─" };
                println!("   {}  {} {} = {}", child_prefix, param_prefix, key, value);
            }
        }
    }

    if !blueprint.routes.is_empty() {
        println!("\n🧭 Routes ({}, first match wins)", blueprint.routes.len());
        for (i, route) in blueprint.routes.iter().enumerate() {
            let prefix = if i == blueprint.routes.len() - 1 {
                "└─"
            } else {
                "├─"
            };
            println!(
                "   {} {}. {} → {}",
                prefix,
                i + 1,
                describe_matcher(&route.matcher),
                route.channel
            );
        }
    }

    println!();
}
