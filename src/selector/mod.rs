//! Node selection subsystem.
//!
//! # Data Flow
//! ```text
//! Pool snapshot (all nodes)
//!     → filter.rs FailFilter (drop nodes inside their failure window)
//!     → filter.rs BackupFilter (drop backups while primaries remain)
//!     → strategy.rs (round-robin / weighted random / fifo / hash)
//!         - weighted.rs RandomWeighted for the random pick
//!     → Selected node, or None when nothing survives
//! ```
//!
//! # Design Decisions
//! - Filters are stateless and return the input borrowed when nothing is removed
//! - Candidates are inspected only through the `Metadatable` and `Markable` capabilities
//! - Malformed metadata never fails a selection; it reads as zero values
//! - An empty result means "no viable candidate" and is not an error

pub mod filter;
pub mod strategy;
pub mod weighted;

use std::borrow::Cow;
use std::time::Duration;

use crate::config::schema::SelectorConfig;
use crate::health::marker::Markable;
use crate::metadata::Metadatable;
use crate::observability::metrics;

pub use filter::{BackupFilter, FailFilter};
pub use strategy::{FifoStrategy, HashStrategy, RandomStrategy, RoundRobinStrategy, StrategyKind};
pub use weighted::RandomWeighted;

/// Metadata key holding a node's weight for the random strategy.
pub const LABEL_WEIGHT: &str = "weight";
/// Metadata key flagging a node as backup.
pub const LABEL_BACKUP: &str = "backup";
/// Metadata key overriding the failure threshold.
pub const LABEL_MAX_FAILS: &str = "maxFails";
/// Metadata key overriding the failure window.
pub const LABEL_FAIL_TIMEOUT: &str = "failTimeout";

pub const DEFAULT_MAX_FAILS: i64 = 1;
pub const DEFAULT_FAIL_TIMEOUT: Duration = Duration::from_secs(10);

/// Per-selection context.
#[derive(Debug, Clone, Default)]
pub struct Context {
    hash_source: Option<String>,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    /// Context carrying a key for the hash strategy (client address, session id, ...).
    pub fn with_hash_source(source: impl Into<String>) -> Self {
        Self {
            hash_source: Some(source.into()),
        }
    }

    pub fn hash_source(&self) -> Option<&str> {
        self.hash_source.as_deref()
    }
}

/// Narrows a candidate list.
///
/// Implementations keep the relative order of surviving candidates and
/// must accept zero or one candidate without any capability present.
pub trait Filter<T: Clone>: Send + Sync {
    fn filter<'a>(&self, ctx: &Context, nodes: &'a [T]) -> Cow<'a, [T]>;

    /// Short name used in logs and metrics.
    fn name(&self) -> &'static str;
}

/// Picks one candidate out of the filtered list.
pub trait Strategy<T>: Send + Sync {
    fn apply(&self, ctx: &Context, nodes: &[T]) -> Option<T>;

    fn name(&self) -> &'static str;
}

/// A filter chain followed by a strategy.
pub struct Selector<T: Clone> {
    filters: Vec<Box<dyn Filter<T>>>,
    strategy: Box<dyn Strategy<T>>,
}

impl<T> Selector<T>
where
    T: Clone,
{
    pub fn new(strategy: Box<dyn Strategy<T>>) -> Self {
        Self {
            filters: Vec::new(),
            strategy,
        }
    }

    /// Append a filter; filters run in the order they were added.
    pub fn with_filter(mut self, filter: Box<dyn Filter<T>>) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn strategy_name(&self) -> &'static str {
        self.strategy.name()
    }

    /// Run the filters in order and let the strategy pick.
    pub fn select(&self, ctx: &Context, nodes: &[T]) -> Option<T> {
        let mut candidates = Cow::Borrowed(nodes);
        for filter in &self.filters {
            let before = candidates.len();
            let narrowed = match filter.filter(ctx, &candidates) {
                Cow::Borrowed(_) => continue,
                Cow::Owned(v) => v,
            };
            metrics::record_filtered(filter.name(), before - narrowed.len());
            candidates = Cow::Owned(narrowed);
            if candidates.is_empty() {
                tracing::debug!(filter = filter.name(), total = nodes.len(), "no candidate left");
                metrics::record_empty_selection();
                return None;
            }
        }

        let picked = self.strategy.apply(ctx, &candidates);
        if picked.is_none() {
            metrics::record_empty_selection();
        }
        picked
    }
}

impl<T> Selector<T>
where
    T: Metadatable + Markable + Clone + Send + Sync + 'static,
{
    /// Build the default chain: fail filter, backup filter, configured strategy.
    pub fn from_config(config: &SelectorConfig) -> Self {
        let kind = StrategyKind::parse_lossy(&config.strategy);
        tracing::debug!(
            strategy = %kind,
            max_fails = config.max_fails,
            fail_timeout = ?config.fail_timeout,
            "building selector"
        );
        Selector::new(kind.build())
            .with_filter(Box::new(FailFilter::<T>::new(config.max_fails, config.fail_timeout)))
            .with_filter(Box::new(BackupFilter::<T>::new()))
    }
}

impl<T: Clone> std::fmt::Debug for Selector<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let filters: Vec<&str> = self.filters.iter().map(|x| x.name()).collect();
        f.debug_struct("Selector")
            .field("filters", &filters)
            .field("strategy", &self.strategy.name())
            .finish()
    }
}
