//! RouterBlueprint - Config Loader output
//!
//! Declarative description of a routing setup: output channels, the sink that
//! consumes each channel, and the ordered content routes between them.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Configuration version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConfigVersion {
    #[default]
    V1,
}

/// Complete routing blueprint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouterBlueprint {
    /// Configuration version
    #[serde(default)]
    pub version: ConfigVersion,

    /// Dispatch strategy and fallback
    #[serde(default)]
    pub router: RouterConfig,

    /// Output channels, each drained by one sink
    pub channels: Vec<ChannelConfig>,

    /// Content routes, evaluated in declaration order
    #[serde(default)]
    pub routes: Vec<RouteConfig>,
}

/// Router-level settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RouterConfig {
    /// How records are spread over channels
    #[serde(default)]
    pub strategy: DispatchStrategy,

    /// Channel receiving records no route matched (content_based only)
    #[serde(default)]
    pub default_channel: Option<String>,
}

/// Dispatch strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DispatchStrategy {
    /// First matching route wins, then the default channel
    #[default]
    ContentBased,
    /// Rotate over all channels
    RoundRobin,
    /// Every record to every channel
    Broadcast,
}

/// Output channel configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelConfig {
    /// Channel name
    pub name: String,

    /// Bounded queue capacity
    #[serde(default = "default_capacity")]
    pub capacity: usize,

    /// Consumer draining this channel
    #[serde(default)]
    pub sink: SinkType,

    /// Sink-specific parameters
    #[serde(default)]
    pub params: HashMap<String, String>,
}

fn default_capacity() -> usize {
    100
}

/// Sink type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SinkType {
    /// Log output
    #[default]
    Log,
    /// Line-per-record file output (`path` param)
    File,
}

/// A single content route
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteConfig {
    /// Destination channel name
    pub channel: String,

    /// Content test selecting this route
    pub matcher: MatcherConfig,
}

/// Content test over a text record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MatcherConfig {
    /// Record contains `value`
    Contains { value: String },
    /// Record starts with `value`
    StartsWith { value: String },
    /// Record ends with `value`
    EndsWith { value: String },
    /// Record equals `value`
    Equals { value: String },
    /// Record matches the regular expression `pattern`
    Regex { pattern: String },
    /// Record is an even integer
    Even,
    /// Record is an odd integer
    Odd,
}

impl RouterBlueprint {
    /// Look up a channel by name
    pub fn channel(&self, name: &str) -> Option<&ChannelConfig> {
        self.channels.iter().find(|c| c.name == name)
    }

    /// Names of channels that no route and no default point at
    ///
    /// Only meaningful for the content_based strategy, where such channels
    /// never receive a record.
    pub fn unrouted_channels(&self) -> Vec<&str> {
        self.channels
            .iter()
            .map(|c| c.name.as_str())
            .filter(|name| {
                let routed = self.routes.iter().any(|r| r.channel == *name);
                let is_default = self.router.default_channel.as_deref() == Some(*name);
                !routed && !is_default
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn channel(name: &str) -> ChannelConfig {
        ChannelConfig {
            name: name.into(),
            capacity: 10,
            sink: SinkType::Log,
            params: HashMap::new(),
        }
    }

    fn sample_blueprint() -> RouterBlueprint {
        RouterBlueprint {
            version: ConfigVersion::V1,
            router: RouterConfig {
                strategy: DispatchStrategy::ContentBased,
                default_channel: Some("other".into()),
            },
            channels: vec![channel("even"), channel("odd"), channel("other"), channel("spare")],
            routes: vec![
                RouteConfig {
                    channel: "even".into(),
                    matcher: MatcherConfig::Even,
                },
                RouteConfig {
                    channel: "odd".into(),
                    matcher: MatcherConfig::Odd,
                },
            ],
        }
    }

    #[test]
    fn test_channel_lookup() {
        let bp = sample_blueprint();
        assert_eq!(bp.channel("odd").map(|c| c.capacity), Some(10));
        assert!(bp.channel("missing").is_none());
    }

    #[test]
    fn test_unrouted_channels() {
        let bp = sample_blueprint();
        assert_eq!(bp.unrouted_channels(), vec!["spare"]);
    }

    #[test]
    fn test_matcher_serde_tagging() {
        let json = r#"{"kind":"contains","value":"ERROR"}"#;
        let m: MatcherConfig = serde_json::from_str(json).unwrap();
        assert_eq!(
            m,
            MatcherConfig::Contains {
                value: "ERROR".into()
            }
        );

        let even: MatcherConfig = serde_json::from_str(r#"{"kind":"even"}"#).unwrap();
        assert_eq!(even, MatcherConfig::Even);
    }

    #[test]
    fn test_defaults() {
        let json = r#"{"channels":[{"name":"only"}]}"#;
        let bp: RouterBlueprint = serde_json::from_str(json).unwrap();
        assert_eq!(bp.version, ConfigVersion::V1);
        assert_eq!(bp.router.strategy, DispatchStrategy::ContentBased);
        assert_eq!(bp.channels[0].capacity, 100);
        assert_eq!(bp.channels[0].sink, SinkType::Log);
        assert!(bp.routes.is_empty());
    }
}
