//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! selector, health, pool
//!     → logging.rs (structured log events)
//!     → metrics.rs (counters, gauges)
//!
//! Consumers:
//!     → Log aggregation (stdout)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Structured logging (JSON) for machine parsing
//! - Metrics are cheap; without an installed recorder they are no-ops

pub mod logging;
pub mod metrics;
