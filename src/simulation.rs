//! Offline runs of the selection pipeline.
//!
//! # Responsibilities
//! - Inject synthetic failures into a pool
//! - Run a selector many times over a snapshot and tally the picks

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::health::passive::{self, Outcome};
use crate::load_balancer::{Node, PoolSnapshot};
use crate::observability::metrics;
use crate::selector::{Context, Selector};

/// `NAME` or `NAME=COUNT`: report COUNT failures (default 1) against a node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailureSpec {
    pub node: String,
    pub count: u32,
}

impl FromStr for FailureSpec {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (node, count) = match s.split_once('=') {
            Some((node, count)) => {
                let count = count
                    .trim()
                    .parse()
                    .map_err(|_| format!("invalid failure count in '{}'", s))?;
                (node.trim(), count)
            }
            None => (s.trim(), 1),
        };
        if node.is_empty() {
            return Err(format!("missing node name in '{}'", s));
        }
        Ok(Self {
            node: node.to_string(),
            count,
        })
    }
}

/// Report the failures described by `specs`. Unknown node names are logged and skipped.
pub fn inject_failures(snapshot: &PoolSnapshot, specs: &[FailureSpec]) {
    for spec in specs {
        match snapshot.get(&spec.node) {
            Some(node) => {
                for _ in 0..spec.count {
                    passive::report(node, Outcome::Failure);
                }
            }
            None => tracing::warn!(node = %spec.node, "Unknown node in failure spec"),
        }
    }
}

/// Tally of a simulation run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Distribution {
    pub draws: u64,
    pub empty: u64,
    pub picks: BTreeMap<String, u64>,
}

impl Distribution {
    pub fn count(&self, node: &str) -> u64 {
        self.picks.get(node).copied().unwrap_or(0)
    }

    /// Share of all draws that picked `node`, in `[0, 1]`.
    pub fn share(&self, node: &str) -> f64 {
        if self.draws == 0 {
            return 0.0;
        }
        self.count(node) as f64 / self.draws as f64
    }
}

impl fmt::Display for Distribution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{:<24} {:>10} {:>8}", "NODE", "PICKS", "SHARE")?;
        for (node, count) in &self.picks {
            writeln!(f, "{:<24} {:>10} {:>7.2}%", node, count, self.share(node) * 100.0)?;
        }
        write!(f, "{:<24} {:>10}", "(none)", self.empty)
    }
}

/// Run `selector` `draws` times over `snapshot`.
///
/// Every node in the snapshot appears in the result, even with zero picks.
pub fn run(
    selector: &Selector<Arc<Node>>,
    snapshot: &PoolSnapshot,
    ctx: &Context,
    draws: u64,
) -> Distribution {
    let mut dist = Distribution {
        draws,
        ..Default::default()
    };
    for node in &snapshot.nodes {
        dist.picks.insert(node.name.clone(), 0);
    }

    for _ in 0..draws {
        match selector.select(ctx, &snapshot.nodes) {
            Some(node) => {
                metrics::record_selection(&node.name);
                *dist.picks.entry(node.name.clone()).or_default() += 1;
            }
            None => dist.empty += 1,
        }
    }

    tracing::debug!(
        version = snapshot.version,
        draws,
        empty = dist.empty,
        strategy = selector.strategy_name(),
        "Simulation finished"
    );
    dist
}
