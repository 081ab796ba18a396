//! Shared utilities for integration tests.

use std::collections::HashMap;
use std::io::Write;
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use tempfile::NamedTempFile;
use upstream_selector::config::NodeConfig;
use upstream_selector::health::FailMarker;
use upstream_selector::load_balancer::Node;
use upstream_selector::metadata::{MapMetadata, Value};

/// Build a node config with the given metadata pairs.
#[allow(dead_code)]
pub fn node_config(name: &str, metadata: &[(&str, Value)]) -> NodeConfig {
    NodeConfig {
        name: name.to_string(),
        addr: format!("{}.upstream:8080", name),
        metadata: metadata
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect::<HashMap<_, _>>(),
    }
}

/// A node whose marker says it failed `count` times, `ago` in the past.
#[allow(dead_code)]
pub fn failed_node(name: &str, metadata: MapMetadata, count: i64, ago: Duration) -> Arc<Node> {
    let marker = Arc::new(FailMarker::with_state(count, SystemTime::now() - ago));
    Arc::new(
        Node::new(name, format!("{}.upstream:8080", name))
            .with_metadata(metadata)
            .with_marker(marker),
    )
}

#[allow(dead_code)]
pub fn healthy_node(name: &str, metadata: MapMetadata) -> Arc<Node> {
    Arc::new(Node::new(name, format!("{}.upstream:8080", name)).with_metadata(metadata))
}

#[allow(dead_code)]
pub fn names(nodes: &[Arc<Node>]) -> Vec<&str> {
    nodes.iter().map(|n| n.name.as_str()).collect()
}

/// Write `content` to a temporary file with the given extension.
#[allow(dead_code)]
pub fn write_config(content: &str, extension: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(&format!(".{}", extension))
        .tempfile()
        .unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}
