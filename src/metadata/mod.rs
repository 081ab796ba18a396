//! Per-node metadata.
//!
//! # Data Flow
//! ```text
//! config file [nodes.metadata] table
//!     → value.rs (loosely typed Value)
//!     → MapMetadata (case-insensitive key/value store)
//!     → util.rs (best-effort typed accessors)
//!     → selector filters / strategies
//! ```
//!
//! # Design Decisions
//! - Metadata is an optional capability of a candidate, queried through `Metadatable`
//! - Lookups never fail: absent keys and bad values read as zero values
//! - Keys are case-insensitive

pub mod util;
pub mod value;

use std::collections::HashMap;
use std::sync::Arc;

pub use value::Value;

/// Read access to a node's metadata.
pub trait Metadata: Send + Sync {
    /// Return true if the key is present, regardless of its value.
    fn is_exists(&self, key: &str) -> bool;

    /// Get the raw value for a key.
    fn get(&self, key: &str) -> Option<&Value>;
}

/// Capability of a candidate that carries metadata.
///
/// Types without metadata implement this with an empty body.
pub trait Metadatable {
    fn metadata(&self) -> Option<&dyn Metadata> {
        None
    }
}

impl<T: Metadatable + ?Sized> Metadatable for Arc<T> {
    fn metadata(&self) -> Option<&dyn Metadata> {
        (**self).metadata()
    }
}

impl<T: Metadatable + ?Sized> Metadatable for &T {
    fn metadata(&self) -> Option<&dyn Metadata> {
        (**self).metadata()
    }
}

/// Metadata backed by a hash map with lowercased keys.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MapMetadata {
    values: HashMap<String, Value>,
}

impl MapMetadata {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a value, replacing any previous value under the same key.
    pub fn set(&mut self, key: &str, value: impl Into<Value>) {
        self.values.insert(key.to_lowercase(), value.into());
    }

    /// Builder-style variant of [`MapMetadata::set`].
    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.set(key, value);
        self
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl Metadata for MapMetadata {
    fn is_exists(&self, key: &str) -> bool {
        self.values.contains_key(&key.to_lowercase())
    }

    fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(&key.to_lowercase())
    }
}

impl From<HashMap<String, Value>> for MapMetadata {
    fn from(map: HashMap<String, Value>) -> Self {
        let mut md = MapMetadata::new();
        for (k, v) in map {
            md.set(&k, v);
        }
        md
    }
}
