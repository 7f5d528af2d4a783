//! Configuration validation
//!
//! Rules:
//! - at least one channel
//! - channel names non-empty and unique
//! - capacity > 0
//! - routes and the default channel reference declared channels
//! - regex matchers compile
//! - sink required params present

use std::collections::HashSet;

use contracts::{ContractError, MatcherConfig, RouterBlueprint, SinkType};
use regex::Regex;

/// Validate a RouterBlueprint
///
/// Returns the first error encountered.
pub fn validate(blueprint: &RouterBlueprint) -> Result<(), ContractError> {
    validate_channels(blueprint)?;
    validate_routes(blueprint)?;
    validate_default_channel(blueprint)?;
    validate_sinks(blueprint)?;
    Ok(())
}

fn validate_channels(blueprint: &RouterBlueprint) -> Result<(), ContractError> {
    if blueprint.channels.is_empty() {
        return Err(ContractError::config_validation(
            "channels",
            "at least one channel is required",
        ));
    }

    let mut seen = HashSet::new();
    for (i, channel) in blueprint.channels.iter().enumerate() {
        if channel.name.trim().is_empty() {
            return Err(ContractError::config_validation(
                format!("channels[{i}].name"),
                "channel name must not be empty",
            ));
        }
        if !seen.insert(channel.name.as_str()) {
            return Err(ContractError::config_validation(
                format!("channels[name={}]", channel.name),
                "duplicate channel name",
            ));
        }
        if channel.capacity == 0 {
            return Err(ContractError::config_validation(
                format!("channels[{}].capacity", channel.name),
                "capacity must be > 0",
            ));
        }
    }
    Ok(())
}

fn validate_routes(blueprint: &RouterBlueprint) -> Result<(), ContractError> {
    for (i, route) in blueprint.routes.iter().enumerate() {
        if blueprint.channel(&route.channel).is_none() {
            return Err(ContractError::config_validation(
                format!("routes[{i}].channel"),
                format!("unknown channel '{}'", route.channel),
            ));
        }
        if let MatcherConfig::Regex { pattern } = &route.matcher {
            Regex::new(pattern).map_err(|e| {
                ContractError::config_validation(
                    format!("routes[{i}].matcher.pattern"),
                    format!("invalid regex: {e}"),
                )
            })?;
        }
    }
    Ok(())
}

fn validate_default_channel(blueprint: &RouterBlueprint) -> Result<(), ContractError> {
    if let Some(name) = &blueprint.router.default_channel {
        if blueprint.channel(name).is_none() {
            return Err(ContractError::config_validation(
                "router.default_channel",
                format!("unknown channel '{name}'"),
            ));
        }
    }
    Ok(())
}

fn validate_sinks(blueprint: &RouterBlueprint) -> Result<(), ContractError> {
    for channel in &blueprint.channels {
        match channel.sink {
            SinkType::Log => {}
            SinkType::File => {
                let has_path = channel.params.get("path").is_some_and(|p| !p.is_empty());
                if !has_path {
                    return Err(ContractError::config_validation(
                        format!("channels[{}].params.path", channel.name),
                        "file sink requires 'path' parameter",
                    ));
                }
            }
        }
    }
    Ok(())
}
