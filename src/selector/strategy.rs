//! Final-pick strategies.

use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::metadata::{util, Metadatable};
use crate::selector::weighted::RandomWeighted;
use crate::selector::{Context, Strategy, LABEL_WEIGHT};

/// Strategy names accepted in configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StrategyKind {
    #[default]
    RoundRobin,
    Random,
    Fifo,
    Hash,
}

impl StrategyKind {
    /// Parse a strategy name, falling back to round-robin for unknown names.
    pub fn parse_lossy(s: &str) -> Self {
        s.parse().unwrap_or_default()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StrategyKind::RoundRobin => "round",
            StrategyKind::Random => "rand",
            StrategyKind::Fifo => "fifo",
            StrategyKind::Hash => "hash",
        }
    }

    /// Build the strategy this kind names.
    pub fn build<T>(&self) -> Box<dyn Strategy<T>>
    where
        T: Metadatable + Clone + Send + Sync + 'static,
    {
        match self {
            StrategyKind::RoundRobin => Box::new(RoundRobinStrategy::new()),
            StrategyKind::Random => Box::new(RandomStrategy::new()),
            StrategyKind::Fifo => Box::new(FifoStrategy),
            StrategyKind::Hash => Box::new(HashStrategy::new()),
        }
    }
}

impl FromStr for StrategyKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "round" | "rr" | "roundrobin" | "round_robin" => Ok(StrategyKind::RoundRobin),
            "rand" | "random" => Ok(StrategyKind::Random),
            "fifo" | "ha" => Ok(StrategyKind::Fifo),
            "hash" => Ok(StrategyKind::Hash),
            other => Err(format!("unknown strategy: {}", other)),
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rotates through the candidates.
#[derive(Debug, Default)]
pub struct RoundRobinStrategy {
    counter: AtomicUsize,
}

impl RoundRobinStrategy {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<T: Clone> Strategy<T> for RoundRobinStrategy {
    fn apply(&self, _ctx: &Context, nodes: &[T]) -> Option<T> {
        if nodes.is_empty() {
            return None;
        }
        let n = self.counter.fetch_add(1, Ordering::Relaxed);
        Some(nodes[n % nodes.len()].clone())
    }

    fn name(&self) -> &'static str {
        "round"
    }
}

/// Weighted random pick, weight taken from the `weight` metadata key.
///
/// Missing or non-positive weights count as 1.
#[derive(Debug)]
pub struct RandomStrategy {
    sampler: Mutex<RandomWeighted<usize>>,
}

impl RandomStrategy {
    pub fn new() -> Self {
        Self {
            sampler: Mutex::new(RandomWeighted::new()),
        }
    }

    pub fn with_seed(seed: u64) -> Self {
        Self {
            sampler: Mutex::new(RandomWeighted::with_seed(seed)),
        }
    }
}

impl Default for RandomStrategy {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Metadatable + Clone> Strategy<T> for RandomStrategy {
    fn apply(&self, _ctx: &Context, nodes: &[T]) -> Option<T> {
        if nodes.is_empty() {
            return None;
        }

        let mut sampler = self.sampler.lock().unwrap_or_else(|e| e.into_inner());
        sampler.reset();
        for (i, node) in nodes.iter().enumerate() {
            let weight = util::get_int(node.metadata(), &[LABEL_WEIGHT]);
            sampler.add(i, if weight <= 0 { 1 } else { weight });
        }
        nodes.get(sampler.next()).cloned()
    }

    fn name(&self) -> &'static str {
        "rand"
    }
}

/// Always the first candidate; later candidates are only reached when the
/// filters remove the earlier ones.
#[derive(Debug, Default, Clone, Copy)]
pub struct FifoStrategy;

impl<T: Clone> Strategy<T> for FifoStrategy {
    fn apply(&self, _ctx: &Context, nodes: &[T]) -> Option<T> {
        nodes.first().cloned()
    }

    fn name(&self) -> &'static str {
        "fifo"
    }
}

/// Sticky pick keyed by the context's hash source.
///
/// Without a hash source it behaves like [`RandomStrategy`].
#[derive(Debug, Default)]
pub struct HashStrategy {
    fallback: RandomStrategy,
}

impl HashStrategy {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<T: Metadatable + Clone> Strategy<T> for HashStrategy {
    fn apply(&self, ctx: &Context, nodes: &[T]) -> Option<T> {
        if nodes.is_empty() {
            return None;
        }
        match ctx.hash_source() {
            Some(source) => {
                let idx = stable_hash(source) % nodes.len() as u64;
                nodes.get(idx as usize).cloned()
            }
            None => self.fallback.apply(ctx, nodes),
        }
    }

    fn name(&self) -> &'static str {
        "hash"
    }
}

/// FNV-1a, stable across processes and platforms.
pub fn stable_hash(s: &str) -> u64 {
    let mut h: u64 = 0xcbf2_9ce4_8422_2325;
    for b in s.as_bytes() {
        h ^= *b as u64;
        h = h.wrapping_mul(0x0000_0100_0000_01b3);
    }
    h
}
