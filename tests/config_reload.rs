//! Loading pool files from disk and reloading the pool from them.

use std::sync::Arc;

use upstream_selector::config::{load_config, ConfigError};
use upstream_selector::load_balancer::{Node, NodePool};
use upstream_selector::selector::{Context, Selector};
use upstream_selector::simulation::{self, FailureSpec};

mod common;
use common::write_config;

const POOL_V1: &str = r#"
[selector]
strategy = "fifo"
max_fails = 2
fail_timeout = "30s"

[[nodes]]
name = "east"
addr = "10.0.0.1:443"

[[nodes]]
name = "west"
addr = "10.0.0.2:443"

[[nodes]]
name = "spare"
addr = "10.0.0.3:443"
[nodes.metadata]
backup = true
"#;

const POOL_V2: &str = r#"
[selector]
strategy = "fifo"

[[nodes]]
name = "west"
addr = "10.0.0.2:443"

[[nodes]]
name = "north"
addr = "10.0.0.4:443"
"#;

#[test]
fn test_load_toml_and_select() {
    let file = write_config(POOL_V1, "toml");
    let config = load_config(file.path()).unwrap();
    assert_eq!(config.nodes.len(), 3);

    let pool = NodePool::new(&config.nodes);
    let selector: Selector<Arc<Node>> = Selector::from_config(&config.selector);
    let ctx = Context::new();

    // One failure is under the threshold of two.
    simulation::inject_failures(&pool.snapshot(), &["east".parse::<FailureSpec>().unwrap()]);
    assert_eq!(selector.select(&ctx, &pool.snapshot().nodes).unwrap().name, "east");

    simulation::inject_failures(&pool.snapshot(), &["east=1".parse().unwrap(), "west=2".parse().unwrap()]);
    assert_eq!(selector.select(&ctx, &pool.snapshot().nodes).unwrap().name, "spare");
}

#[test]
fn test_load_json() {
    let file = write_config(
        r#"{"nodes": [{"name": "a", "addr": "x:1", "metadata": {"weight": 5}}]}"#,
        "json",
    );
    let config = load_config(file.path()).unwrap();
    assert_eq!(config.selector.strategy, "round");
    assert_eq!(config.nodes[0].name, "a");
}

#[test]
fn test_invalid_file_is_rejected() {
    let file = write_config("[selector]\nstrategy = \"telepathy\"\n", "toml");
    match load_config(file.path()) {
        Err(ConfigError::Validation(errors)) => assert_eq!(errors.len(), 1),
        other => panic!("expected validation error, got {:?}", other),
    }
}

#[test]
fn test_reload_preserves_failure_history() {
    let v1 = load_config(write_config(POOL_V1, "toml").path()).unwrap();
    let pool = NodePool::new(&v1.nodes);
    simulation::inject_failures(&pool.snapshot(), &["west=4".parse().unwrap()]);
    let held = pool.snapshot();

    let v2 = load_config(write_config(POOL_V2, "toml").path()).unwrap();
    assert_eq!(pool.reload(&v2.nodes), 2);

    let snapshot = pool.snapshot();
    assert_eq!(common::names(&snapshot.nodes), vec!["west", "north"]);
    assert_eq!(snapshot.get("west").unwrap().failures(), 4);

    // Default max_fails of 1: west is still inside its window.
    let selector: Selector<Arc<Node>> = Selector::from_config(&v2.selector);
    assert_eq!(selector.select(&Context::new(), &snapshot.nodes).unwrap().name, "north");

    // A reader holding the old snapshot keeps seeing version 1.
    assert_eq!(held.version, 1);
    assert_eq!(held.nodes.len(), 3);
}
