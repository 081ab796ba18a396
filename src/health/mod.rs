//! Health tracking subsystem.
//!
//! # Data Flow
//! ```text
//! Request outcome observed by the caller
//!     → passive.rs report()
//!     → marker.rs FailMarker (count + last failure time)
//!     → read by selector::FailFilter on the next selection
//! ```
//!
//! # Design Decisions
//! - Health state is per-node, not per-pool
//! - The selector only reads markers; it never writes them
//! - No active probing

pub mod marker;
pub mod passive;

pub use marker::{FailMarker, Markable, Marker};
pub use passive::{report, Outcome};
