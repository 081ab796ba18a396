//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for a selector
//! pool. All types derive Serde traits for deserialization from config files.

use std::collections::HashMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::metadata::Value;
use crate::selector::{DEFAULT_FAIL_TIMEOUT, DEFAULT_MAX_FAILS};

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct Config {
    /// Selection policy.
    pub selector: SelectorConfig,

    /// Candidate nodes, in priority order.
    pub nodes: Vec<NodeConfig>,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Selection policy configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SelectorConfig {
    /// Strategy name: round, rand, fifo or hash.
    pub strategy: String,

    /// Failures within `fail_timeout` before a node is skipped.
    pub max_fails: i64,

    /// How long a failure keeps counting (e.g. "10s", "1m").
    #[serde(with = "humantime_serde")]
    pub fail_timeout: Duration,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            strategy: "round".to_string(),
            max_fails: DEFAULT_MAX_FAILS,
            fail_timeout: DEFAULT_FAIL_TIMEOUT,
        }
    }
}

/// A single candidate node.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct NodeConfig {
    /// Unique node identifier.
    pub name: String,

    /// Node address (e.g., "10.0.0.1:8080").
    pub addr: String,

    /// Free-form metadata: weight, backup, maxFails, failTimeout, ...
    #[serde(default, deserialize_with = "skip_nulls")]
    pub metadata: HashMap<String, Value>,
}

/// Null entries read as absent keys.
fn skip_nulls<'de, D>(deserializer: D) -> Result<HashMap<String, Value>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = HashMap::<String, Option<Value>>::deserialize(deserializer)?;
    Ok(raw.into_iter().filter_map(|(k, v)| Some((k, v?))).collect())
}

/// Log output format.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format.
    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}

/// Duration serialization using humantime format.
mod humantime_serde {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&humantime::format_duration(*duration).to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        humantime::parse_duration(&s).map_err(serde::de::Error::custom)
    }
}
