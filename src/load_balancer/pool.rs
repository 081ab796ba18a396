//! Node pool management.
//!
//! # Responsibilities
//! - Hold the current set of nodes as an immutable, versioned snapshot
//! - Swap in a new snapshot on reload without blocking readers
//! - Carry failure markers over to nodes that survive a reload

use std::collections::HashMap;
use std::sync::Arc;

use arc_swap::ArcSwap;

use crate::config::NodeConfig;
use crate::load_balancer::node::Node;
use crate::observability::metrics;

/// One version of the pool.
#[derive(Debug, Default)]
pub struct PoolSnapshot {
    pub version: u64,
    pub nodes: Vec<Arc<Node>>,
}

impl PoolSnapshot {
    pub fn get(&self, name: &str) -> Option<&Arc<Node>> {
        self.nodes.iter().find(|n| n.name == name)
    }
}

/// Versioned pool of nodes.
#[derive(Debug)]
pub struct NodePool {
    current: ArcSwap<PoolSnapshot>,
}

impl NodePool {
    /// Create a pool at version 1 from configuration.
    pub fn new(configs: &[NodeConfig]) -> Self {
        let nodes = configs.iter().map(|c| Arc::new(Node::from_config(c))).collect();
        let snapshot = PoolSnapshot { version: 1, nodes };
        metrics::record_pool(snapshot.version, snapshot.nodes.len());
        Self {
            current: ArcSwap::from_pointee(snapshot),
        }
    }

    /// The current snapshot. Cheap, lock-free, and stable for as long as it is held.
    pub fn snapshot(&self) -> Arc<PoolSnapshot> {
        self.current.load_full()
    }

    pub fn version(&self) -> u64 {
        self.current.load().version
    }

    /// Replace the pool contents, returning the new version.
    ///
    /// Nodes whose name exists in the current snapshot keep its failure marker.
    pub fn reload(&self, configs: &[NodeConfig]) -> u64 {
        let old = self.current.load_full();
        let markers: HashMap<&str, _> = old
            .nodes
            .iter()
            .map(|n| (n.name.as_str(), n.fail_marker().clone()))
            .collect();

        let mut kept = 0;
        let nodes: Vec<Arc<Node>> = configs
            .iter()
            .map(|c| {
                let node = Node::from_config(c);
                match markers.get(c.name.as_str()) {
                    Some(marker) => {
                        kept += 1;
                        Arc::new(node.with_marker(marker.clone()))
                    }
                    None => Arc::new(node),
                }
            })
            .collect();

        let snapshot = PoolSnapshot {
            version: old.version + 1,
            nodes,
        };
        let version = snapshot.version;
        tracing::info!(
            version,
            nodes = snapshot.nodes.len(),
            kept_markers = kept,
            "Node pool reloaded"
        );
        metrics::record_pool(version, snapshot.nodes.len());
        self.current.store(Arc::new(snapshot));
        version
    }
}
