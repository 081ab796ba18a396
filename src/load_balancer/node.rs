//! Node abstraction.
//!
//! # Responsibilities
//! - Represent a single upstream node
//! - Carry the node's metadata (weight, backup flag, failure overrides)
//! - Hold the node's failure marker, shared across pool reloads

use std::fmt;
use std::sync::Arc;

use crate::config::NodeConfig;
use crate::health::marker::{FailMarker, Markable, Marker};
use crate::metadata::{MapMetadata, Metadata, Metadatable};

/// A single upstream node.
#[derive(Debug)]
pub struct Node {
    /// Unique node name within a pool.
    pub name: String,
    /// Address the node is reached at.
    pub addr: String,
    metadata: MapMetadata,
    marker: Arc<FailMarker>,
}

impl Node {
    /// Create a node with empty metadata and a fresh marker.
    pub fn new(name: impl Into<String>, addr: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            addr: addr.into(),
            metadata: MapMetadata::new(),
            marker: Arc::new(FailMarker::new()),
        }
    }

    /// Build a node from configuration.
    pub fn from_config(config: &NodeConfig) -> Self {
        Self::new(config.name.clone(), config.addr.clone())
            .with_metadata(MapMetadata::from(config.metadata.clone()))
    }

    pub fn with_metadata(mut self, metadata: MapMetadata) -> Self {
        self.metadata = metadata;
        self
    }

    /// Replace the marker, e.g. to keep failure history across a reload.
    pub fn with_marker(mut self, marker: Arc<FailMarker>) -> Self {
        self.marker = marker;
        self
    }

    pub fn fail_marker(&self) -> &Arc<FailMarker> {
        &self.marker
    }

    /// Record a failed request against this node.
    pub fn mark_failure(&self) {
        self.marker.mark();
    }

    /// Record a successful request; clears the failure count.
    pub fn mark_success(&self) {
        self.marker.reset();
    }

    pub fn failures(&self) -> i64 {
        self.marker.count()
    }
}

impl Metadatable for Node {
    fn metadata(&self) -> Option<&dyn Metadata> {
        Some(&self.metadata)
    }
}

impl Markable for Node {
    fn marker(&self) -> Option<&dyn Marker> {
        Some(self.marker.as_ref())
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.name, self.addr)
    }
}
