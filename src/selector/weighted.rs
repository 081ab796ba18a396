//! Weighted random sampling.

use std::time::{SystemTime, UNIX_EPOCH};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

#[derive(Debug, Clone)]
struct WeightedItem<T> {
    item: T,
    weight: i64,
}

/// Draws items with probability proportional to their weight.
///
/// Each instance owns its generator. Build one per pool version, then only
/// draw from it; concurrent use needs external serialization.
#[derive(Debug, Clone)]
pub struct RandomWeighted<T> {
    items: Vec<WeightedItem<T>>,
    /// Exact sum of all weights.
    sum: i128,
    rng: StdRng,
}

impl<T> RandomWeighted<T> {
    /// Create a sampler seeded from the current time.
    pub fn new() -> Self {
        let seed = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or_default();
        Self::with_seed(seed)
    }

    /// Create a sampler with a fixed seed.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            items: Vec::new(),
            sum: 0,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Append an item. Zero and negative weights are accepted as is.
    pub fn add(&mut self, item: T, weight: i64) {
        self.items.push(WeightedItem { item, weight });
        self.sum += i128::from(weight);
    }

    /// Drop all items, keeping the allocation.
    pub fn reset(&mut self) {
        self.items.clear();
        self.sum = 0;
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Sum of all added weights.
    pub fn sum(&self) -> i128 {
        self.sum
    }
}

impl<T: Clone + Default> RandomWeighted<T> {
    /// Draw one item.
    ///
    /// Returns `T::default()` when empty and the first item when the total
    /// weight is not positive.
    pub fn next(&mut self) -> T {
        let Some(first) = self.items.first() else {
            return T::default();
        };
        if self.sum <= 0 {
            return first.item.clone();
        }

        let mut weight = self.rng.gen_range(1..=self.sum);
        for it in &self.items {
            weight -= i128::from(it.weight);
            if weight <= 0 {
                return it.item.clone();
            }
        }

        self.items[self.items.len() - 1].item.clone()
    }
}

impl<T> Default for RandomWeighted<T> {
    fn default() -> Self {
        Self::new()
    }
}
