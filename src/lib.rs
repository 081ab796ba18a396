//! Upstream node selection library.
//!
//! Picks one healthy, policy-compliant node out of a pool: candidates run
//! through an ordered filter chain (failure window, backup role) and a
//! strategy makes the final pick.

pub mod config;
pub mod health;
pub mod load_balancer;
pub mod metadata;
pub mod observability;
pub mod selector;
pub mod simulation;

pub use config::Config;
pub use load_balancer::{Node, NodePool};
pub use selector::{Context, Filter, Selector, Strategy};
