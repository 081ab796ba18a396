//! Passive health reporting.
//!
//! # Responsibilities
//! - Observe request outcomes reported by the dispatch layer
//! - Feed them into the node's failure marker
//!
//! # Design Decisions
//! - A failure increments the count and stamps the time
//! - A success resets the count; the selector's fail window does the rest
//! - No probing here: only real traffic moves the markers

use crate::load_balancer::Node;
use crate::observability::metrics;

/// Result of one request against a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    Failure,
}

impl From<bool> for Outcome {
    fn from(ok: bool) -> Self {
        if ok {
            Outcome::Success
        } else {
            Outcome::Failure
        }
    }
}

/// Record the outcome of a request against `node`.
pub fn report(node: &Node, outcome: Outcome) {
    match outcome {
        Outcome::Failure => {
            node.mark_failure();
            metrics::record_node_failure(&node.name);
            tracing::warn!(
                node = %node.name,
                addr = %node.addr,
                failures = node.failures(),
                "Node failure reported"
            );
        }
        Outcome::Success => {
            let previous = node.failures();
            node.mark_success();
            if previous > 0 {
                tracing::info!(node = %node.name, previous_failures = previous, "Node recovered");
            }
        }
    }
}
