//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check node identity (names present and unique, addresses present)
//! - Validate the strategy name and metrics address
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: Config → Result<(), Vec<ValidationError>>
//! - Node metadata is not validated; the selector reads it best-effort

use std::collections::HashSet;
use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::Config;
use crate::selector::StrategyKind;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("node #{index} has an empty name")]
    EmptyNodeName { index: usize },

    #[error("node '{name}' has an empty address")]
    EmptyNodeAddress { name: String },

    #[error("duplicate node name '{0}'")]
    DuplicateNode(String),

    #[error("unknown selector strategy '{0}'")]
    UnknownStrategy(String),

    #[error("invalid metrics address '{0}'")]
    InvalidMetricsAddress(String),
}

/// Check a parsed configuration, collecting every problem found.
pub fn validate_config(config: &Config) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.selector.strategy.parse::<StrategyKind>().is_err() {
        errors.push(ValidationError::UnknownStrategy(config.selector.strategy.clone()));
    }

    let mut seen = HashSet::new();
    for (index, node) in config.nodes.iter().enumerate() {
        if node.name.trim().is_empty() {
            errors.push(ValidationError::EmptyNodeName { index });
            continue;
        }
        if node.addr.trim().is_empty() {
            errors.push(ValidationError::EmptyNodeAddress {
                name: node.name.clone(),
            });
        }
        if !seen.insert(node.name.as_str()) {
            errors.push(ValidationError::DuplicateNode(node.name.clone()));
        }
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidMetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
