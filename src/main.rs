//! Upstream selector CLI.
//!
//! Loads a pool file, runs the selection pipeline against it and prints how
//! the picks were distributed.
//!
//! ```text
//! pool.toml ──▶ config ──▶ NodePool ──▶ Selector (fail → backup → strategy) ──▶ report
//!                  ▲
//!                  └── watcher (--watch) ──▶ NodePool::reload
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;

use upstream_selector::config::{load_config, watcher::ConfigWatcher};
use upstream_selector::load_balancer::{Node, NodePool};
use upstream_selector::observability::{logging, metrics};
use upstream_selector::selector::{Context, Selector};
use upstream_selector::simulation::{self, FailureSpec};

#[derive(Parser)]
#[command(name = "upstream-selector")]
#[command(about = "Run the node selection pipeline against a pool file", long_about = None)]
struct Cli {
    /// Pool configuration file (TOML, or JSON with a .json extension).
    #[arg(short, long)]
    config: PathBuf,

    /// Number of selections to run.
    #[arg(short = 'n', long, default_value_t = 1000)]
    draws: u64,

    /// Key for the hash strategy (client address, session id, ...).
    #[arg(long)]
    hash_source: Option<String>,

    /// Report failures before selecting: NAME or NAME=COUNT. Repeatable.
    #[arg(long = "fail", value_name = "NAME[=COUNT]")]
    fails: Vec<FailureSpec>,

    /// Re-run the report whenever the config file changes.
    #[arg(long)]
    watch: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = load_config(&cli.config)?;
    logging::init_logging(&config.observability);

    tracing::info!(
        path = %cli.config.display(),
        nodes = config.nodes.len(),
        strategy = %config.selector.strategy,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        if let Ok(addr) = config.observability.metrics_address.parse() {
            metrics::init_metrics(addr);
        } else {
            tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            );
        }
    }

    let ctx = match cli.hash_source {
        Some(source) => Context::with_hash_source(source),
        None => Context::new(),
    };

    let pool = NodePool::new(&config.nodes);
    simulation::inject_failures(&pool.snapshot(), &cli.fails);

    let mut selector: Selector<Arc<Node>> = Selector::from_config(&config.selector);
    print_report(&selector, &pool, &ctx, cli.draws);

    if !cli.watch {
        return Ok(());
    }

    let (watcher, mut updates) = ConfigWatcher::new(&cli.config);
    let _watcher = watcher.run()?;

    loop {
        tokio::select! {
            update = updates.recv() => {
                let Some(new_config) = update else { break };
                pool.reload(&new_config.nodes);
                selector = Selector::from_config(&new_config.selector);
                print_report(&selector, &pool, &ctx, cli.draws);
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Interrupted, exiting");
                break;
            }
        }
    }

    Ok(())
}

fn print_report(selector: &Selector<Arc<Node>>, pool: &NodePool, ctx: &Context, draws: u64) {
    let snapshot = pool.snapshot();
    let dist = simulation::run(selector, &snapshot, ctx, draws);
    println!(
        "pool v{} | strategy {} | {} draws",
        snapshot.version,
        selector.strategy_name(),
        draws
    );
    println!("{}", dist);
}
