//! Failure markers.
//!
//! # Responsibilities
//! - Expose a node's failure count and last failure time to the selector
//! - Record failures and successes reported by the passive health path
//!
//! # Design Decisions
//! - Count and time are independent atomics; a reader may observe a count
//!   from one update and a time from another
//! - A marker that was never marked reports the UNIX epoch as its time

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Read access to a failure record.
pub trait Marker: Send + Sync {
    /// Number of failures since the last reset.
    fn count(&self) -> i64;

    /// Time of the most recent failure.
    fn time(&self) -> SystemTime;
}

/// Capability of a candidate that carries a failure marker.
///
/// Types without a marker implement this with an empty body.
pub trait Markable {
    fn marker(&self) -> Option<&dyn Marker> {
        None
    }
}

impl<T: Markable + ?Sized> Markable for Arc<T> {
    fn marker(&self) -> Option<&dyn Marker> {
        (**self).marker()
    }
}

impl<T: Markable + ?Sized> Markable for &T {
    fn marker(&self) -> Option<&dyn Marker> {
        (**self).marker()
    }
}

/// Lock-free failure marker.
#[derive(Debug, Default)]
pub struct FailMarker {
    count: AtomicI64,
    /// Nanoseconds since the UNIX epoch, 0 when never marked.
    time_nanos: AtomicI64,
}

impl FailMarker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a marker with a preset state.
    pub fn with_state(count: i64, time: SystemTime) -> Self {
        Self {
            count: AtomicI64::new(count),
            time_nanos: AtomicI64::new(to_nanos(time)),
        }
    }

    /// Record a failure at the current time.
    pub fn mark(&self) {
        self.time_nanos.store(to_nanos(SystemTime::now()), Ordering::Relaxed);
        self.count.fetch_add(1, Ordering::Relaxed);
    }

    /// Clear the failure count. The last failure time is kept.
    pub fn reset(&self) {
        self.count.store(0, Ordering::Relaxed);
    }
}

impl Marker for FailMarker {
    fn count(&self) -> i64 {
        self.count.load(Ordering::Relaxed)
    }

    fn time(&self) -> SystemTime {
        let nanos = self.time_nanos.load(Ordering::Relaxed);
        UNIX_EPOCH + Duration::from_nanos(u64::try_from(nanos).unwrap_or(0))
    }
}

fn to_nanos(time: SystemTime) -> i64 {
    time.duration_since(UNIX_EPOCH)
        .map(|d| i64::try_from(d.as_nanos()).unwrap_or(i64::MAX))
        .unwrap_or(0)
}
