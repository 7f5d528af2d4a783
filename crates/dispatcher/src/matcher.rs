//! LineMatcher - configured predicates over text records

use contracts::{MatcherConfig, Predicate, RouteConfig};
use regex::Regex;

use crate::channel::OutputChannel;
use crate::error::RoutingError;
use crate::table::RoutingTable;

/// Compiled form of a [`MatcherConfig`]
#[derive(Debug, Clone)]
pub enum LineMatcher {
    Contains(String),
    StartsWith(String),
    EndsWith(String),
    Equals(String),
    Regex(Regex),
    /// Line parses as an even integer
    Even,
    /// Line parses as an odd integer
    Odd,
}

impl LineMatcher {
    /// Compile a matcher; only regex patterns can fail
    pub fn from_config(config: &MatcherConfig) -> Result<Self, regex::Error> {
        Ok(match config {
            MatcherConfig::Contains { value } => Self::Contains(value.clone()),
            MatcherConfig::StartsWith { value } => Self::StartsWith(value.clone()),
            MatcherConfig::EndsWith { value } => Self::EndsWith(value.clone()),
            MatcherConfig::Equals { value } => Self::Equals(value.clone()),
            MatcherConfig::Regex { pattern } => Self::Regex(Regex::new(pattern)?),
            MatcherConfig::Even => Self::Even,
            MatcherConfig::Odd => Self::Odd,
        })
    }

    pub fn is_match(&self, line: &str) -> bool {
        match self {
            Self::Contains(value) => line.contains(value.as_str()),
            Self::StartsWith(value) => line.starts_with(value.as_str()),
            Self::EndsWith(value) => line.ends_with(value.as_str()),
            Self::Equals(value) => line == value,
            Self::Regex(re) => re.is_match(line),
            Self::Even => parse_int(line).is_some_and(|n| n % 2 == 0),
            Self::Odd => parse_int(line).is_some_and(|n| n % 2 != 0),
        }
    }
}

fn parse_int(line: &str) -> Option<i64> {
    line.trim().parse().ok()
}

impl Predicate<String> for LineMatcher {
    #[inline]
    fn matches(&self, record: &String) -> bool {
        self.is_match(record)
    }
}

/// Build a text routing table from configured routes
///
/// `channels` must contain every channel the routes and the default name.
pub fn build_routing_table(
    routes: &[RouteConfig],
    default_channel: Option<&str>,
    channels: &[OutputChannel<String>],
) -> Result<RoutingTable<String>, RoutingError> {
    let lookup = |name: &str| {
        channels
            .iter()
            .find(|c| c.name() == name)
            .cloned()
            .ok_or_else(|| RoutingError::UnknownChannel(name.to_string()))
    };

    let mut builder = RoutingTable::builder();
    for route in routes {
        let matcher =
            LineMatcher::from_config(&route.matcher).map_err(|e| RoutingError::InvalidMatcher {
                channel: route.channel.clone(),
                message: e.to_string(),
            })?;
        builder = builder.route(matcher, lookup(&route.channel)?);
    }
    if let Some(name) = default_channel {
        builder = builder.otherwise(lookup(name)?);
    }
    builder.build()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matcher(config: MatcherConfig) -> LineMatcher {
        LineMatcher::from_config(&config).unwrap()
    }

    #[test]
    fn test_text_matchers() {
        let contains = matcher(MatcherConfig::Contains {
            value: "ERROR".into(),
        });
        assert!(contains.is_match("2024 ERROR disk full"));
        assert!(!contains.is_match("2024 INFO ok"));

        let starts = matcher(MatcherConfig::StartsWith { value: "#".into() });
        assert!(starts.is_match("# comment"));

        let ends = matcher(MatcherConfig::EndsWith {
            value: ".csv".into(),
        });
        assert!(ends.is_match("data.csv"));

        let equals = matcher(MatcherConfig::Equals {
            value: "stop".into(),
        });
        assert!(equals.is_match("stop"));
        assert!(!equals.is_match("stop "));
    }

    #[test]
    fn test_regex_matcher() {
        let re = matcher(MatcherConfig::Regex {
            pattern: r"^\d{3}-\d{4}$".into(),
        });
        assert!(re.is_match("555-1234"));
        assert!(!re.is_match("5551234"));
    }

    #[test]
    fn test_invalid_regex() {
        let result = LineMatcher::from_config(&MatcherConfig::Regex {
            pattern: "(unclosed".into(),
        });
        assert!(result.is_err());
    }

    #[test]
    fn test_parity() {
        let even = matcher(MatcherConfig::Even);
        let odd = matcher(MatcherConfig::Odd);
        assert!(even.is_match("4"));
        assert!(even.is_match(" -10 "));
        assert!(odd.is_match("7"));
        assert!(odd.is_match("-3"));
        assert!(!even.is_match("x"));
        assert!(!odd.is_match("x"));
        assert!(!odd.is_match("3.5"));
    }

    #[test]
    fn test_build_routing_table() {
        let (even, _rx1) = OutputChannel::bounded("even", 4);
        let (odd, _rx2) = OutputChannel::bounded("odd", 4);
        let (other, _rx3) = OutputChannel::bounded("other", 4);
        let routes = vec![
            RouteConfig {
                channel: "even".into(),
                matcher: MatcherConfig::Even,
            },
            RouteConfig {
                channel: "odd".into(),
                matcher: MatcherConfig::Odd,
            },
        ];

        let table = build_routing_table(&routes, Some("other"), &[even, odd, other]).unwrap();
        assert_eq!(table.select(&"4".to_string()).unwrap().name(), "even");
        assert_eq!(table.select(&"7".to_string()).unwrap().name(), "odd");
        assert_eq!(table.select(&"x".to_string()).unwrap().name(), "other");
    }

    #[test]
    fn test_build_routing_table_unknown_channel() {
        let (even, _rx) = OutputChannel::bounded("even", 4);
        let routes = vec![RouteConfig {
            channel: "missing".into(),
            matcher: MatcherConfig::Even,
        }];

        let err = build_routing_table(&routes, None, &[even]).unwrap_err();
        assert!(matches!(err, RoutingError::UnknownChannel(name) if name == "missing"));
    }
}
