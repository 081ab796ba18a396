//! Node pool subsystem.
//!
//! # Data Flow
//! ```text
//! config [[nodes]]
//!     → node.rs (Node: name, addr, metadata, failure marker)
//!     → pool.rs (versioned snapshot, swapped atomically on reload)
//!     → selector::Selector::select(snapshot.nodes)
//!     → chosen Arc<Node>
//! ```
//!
//! # Design Decisions
//! - Readers hold an `Arc<PoolSnapshot>`; a reload never mutates a snapshot in use
//! - Failure markers are shared `Arc`s so they survive reloads by node name

pub mod node;
pub mod pool;

pub use node::Node;
pub use pool::{NodePool, PoolSnapshot};
