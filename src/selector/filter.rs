//! Candidate filters.
//!
//! Both filters leave pools of zero or one candidate untouched, so a
//! single-node pool always has a last-resort path.

use std::borrow::Cow;
use std::marker::PhantomData;
use std::time::{Duration, SystemTime};

use crate::health::marker::Markable;
use crate::metadata::{util, Metadatable};
use crate::selector::{
    Context, Filter, DEFAULT_FAIL_TIMEOUT, DEFAULT_MAX_FAILS, LABEL_BACKUP, LABEL_FAIL_TIMEOUT,
    LABEL_MAX_FAILS,
};

/// Drops candidates that have failed too often within the fail timeout.
///
/// A candidate is dead when its marker count is at least `max_fails` and
/// its last failure is younger than `fail_timeout`. Both limits can be
/// overridden per candidate through the `maxFails` and `failTimeout`
/// metadata keys. Once the window passes the candidate is eligible again,
/// even though its count was never reset.
///
/// If every candidate of a pool with two or more members is dead, the
/// result is empty.
#[derive(Debug)]
pub struct FailFilter<T> {
    max_fails: i64,
    fail_timeout: Duration,
    _marker: PhantomData<fn(&T)>,
}

impl<T> FailFilter<T> {
    pub fn new(max_fails: i64, fail_timeout: Duration) -> Self {
        Self {
            max_fails,
            fail_timeout,
            _marker: PhantomData,
        }
    }
}

impl<T> Default for FailFilter<T> {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_FAILS, DEFAULT_FAIL_TIMEOUT)
    }
}

impl<T: Metadatable + Markable> FailFilter<T> {
    fn is_dead(&self, node: &T, now: SystemTime) -> bool {
        let mut max_fails = self.max_fails;
        let mut fail_timeout = self.fail_timeout;
        if let Some(md) = node.metadata() {
            if md.is_exists(LABEL_MAX_FAILS) {
                max_fails = util::get_int(Some(md), &[LABEL_MAX_FAILS]);
            }
            if md.is_exists(LABEL_FAIL_TIMEOUT) {
                fail_timeout = util::get_duration(Some(md), &[LABEL_FAIL_TIMEOUT]);
            }
        }
        if max_fails <= 0 {
            max_fails = 1;
        }
        if fail_timeout.is_zero() {
            fail_timeout = DEFAULT_FAIL_TIMEOUT;
        }

        match node.marker() {
            Some(marker) => {
                // A failure stamped in the future is treated as just now.
                let elapsed = now.duration_since(marker.time()).unwrap_or(Duration::ZERO);
                marker.count() >= max_fails && elapsed < fail_timeout
            }
            None => false,
        }
    }
}

impl<T> Filter<T> for FailFilter<T>
where
    T: Metadatable + Markable + Clone,
{
    fn filter<'a>(&self, _ctx: &Context, nodes: &'a [T]) -> Cow<'a, [T]> {
        if nodes.len() <= 1 {
            return Cow::Borrowed(nodes);
        }

        let now = SystemTime::now();
        let Some(i) = nodes.iter().position(|n| self.is_dead(n, now)) else {
            return Cow::Borrowed(nodes);
        };

        let mut alive = Vec::with_capacity(nodes.len() - 1);
        alive.extend_from_slice(&nodes[..i]);
        alive.extend(
            nodes[i + 1..]
                .iter()
                .filter(|n| !self.is_dead(n, now))
                .cloned(),
        );

        tracing::debug!(
            total = nodes.len(),
            alive = alive.len(),
            "fail filter removed dead candidates"
        );
        Cow::Owned(alive)
    }

    fn name(&self) -> &'static str {
        "fail"
    }
}

/// Drops backup candidates while at least one primary remains.
///
/// A candidate is a backup when its `backup` metadata flag is true. A pool
/// made only of backups is returned as is.
#[derive(Debug)]
pub struct BackupFilter<T> {
    _marker: PhantomData<fn(&T)>,
}

impl<T> BackupFilter<T> {
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<T> Default for BackupFilter<T> {
    fn default() -> Self {
        Self::new()
    }
}

fn is_backup<T: Metadatable>(node: &T) -> bool {
    util::get_bool(node.metadata(), &[LABEL_BACKUP])
}

impl<T> Filter<T> for BackupFilter<T>
where
    T: Metadatable + Clone,
{
    fn filter<'a>(&self, _ctx: &Context, nodes: &'a [T]) -> Cow<'a, [T]> {
        if nodes.len() <= 1 || !nodes.iter().any(is_backup) {
            return Cow::Borrowed(nodes);
        }

        let (backups, primaries): (Vec<T>, Vec<T>) =
            nodes.iter().cloned().partition(|n| is_backup(n));

        if primaries.is_empty() {
            return Cow::Owned(backups);
        }
        Cow::Owned(primaries)
    }

    fn name(&self) -> &'static str {
        "backup"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::health::marker::{FailMarker, Marker};
    use crate::metadata::{MapMetadata, Metadata};

    #[derive(Debug)]
    struct TestNode {
        id: &'static str,
        md: MapMetadata,
        marker: Option<FailMarker>,
    }

    impl TestNode {
        fn new(id: &'static str) -> Self {
            Self {
                id,
                md: MapMetadata::new(),
                marker: None,
            }
        }

        fn failed(mut self, count: i64, ago: Duration) -> Self {
            self.marker = Some(FailMarker::with_state(count, SystemTime::now() - ago));
            self
        }

        fn meta(mut self, key: &str, value: impl Into<crate::metadata::Value>) -> Self {
            self.md.set(key, value);
            self
        }
    }

    impl Metadatable for TestNode {
        fn metadata(&self) -> Option<&dyn Metadata> {
            Some(&self.md)
        }
    }

    impl Markable for TestNode {
        fn marker(&self) -> Option<&dyn Marker> {
            self.marker.as_ref().map(|m| m as &dyn Marker)
        }
    }

    fn ids(nodes: &[&TestNode]) -> Vec<&'static str> {
        nodes.iter().map(|n| n.id).collect()
    }

    fn secs(n: u64) -> Duration {
        Duration::from_secs(n)
    }

    #[test]
    fn test_fail_filter_single_candidate_untouched() {
        let f = FailFilter::<&TestNode>::new(1, secs(10));
        let dead = TestNode::new("a").failed(100, secs(1));
        let pool = vec![&dead];
        let out = f.filter(&Context::default(), &pool);
        assert!(matches!(out, Cow::Borrowed(_)));
        assert_eq!(ids(&out), vec!["a"]);

        let empty: Vec<&TestNode> = Vec::new();
        assert!(f.filter(&Context::default(), &empty).is_empty());
    }

    #[test]
    fn test_fail_filter_healthy_pool_not_copied() {
        let f = FailFilter::<&TestNode>::new(3, secs(10));
        let a = TestNode::new("a").failed(2, secs(1));
        let b = TestNode::new("b");
        let pool = vec![&a, &b];
        let out = f.filter(&Context::default(), &pool);
        assert!(matches!(out, Cow::Borrowed(_)));
        assert_eq!(ids(&out), vec!["a", "b"]);
    }

    #[test]
    fn test_fail_filter_window() {
        let f = FailFilter::<&TestNode>::new(3, secs(10));
        let healthy = TestNode::new("h");

        let recent = TestNode::new("x").failed(5, secs(2));
        let pool = vec![&recent, &healthy];
        assert_eq!(ids(&f.filter(&Context::default(), &pool)), vec!["h"]);

        let expired = TestNode::new("x").failed(5, secs(20));
        let pool = vec![&expired, &healthy];
        assert_eq!(ids(&f.filter(&Context::default(), &pool)), vec!["x", "h"]);
    }

    #[test]
    fn test_fail_filter_keeps_order_around_dead() {
        let f = FailFilter::<&TestNode>::new(1, secs(10));
        let a = TestNode::new("a");
        let b = TestNode::new("b").failed(1, secs(1));
        let c = TestNode::new("c");
        let d = TestNode::new("d").failed(3, secs(1));
        let e = TestNode::new("e");
        let pool = vec![&a, &b, &c, &d, &e];
        assert_eq!(ids(&f.filter(&Context::default(), &pool)), vec!["a", "c", "e"]);
    }

    #[test]
    fn test_fail_filter_all_dead_is_empty() {
        let f = FailFilter::<&TestNode>::new(1, secs(10));
        let a = TestNode::new("a").failed(1, secs(1));
        let b = TestNode::new("b").failed(4, secs(3));
        let pool = vec![&a, &b];
        let out = f.filter(&Context::default(), &pool);
        assert!(out.is_empty());
    }

    #[test]
    fn test_fail_filter_per_candidate_override() {
        // Filter defaults would kill both; "a" raises its own threshold.
        let f = FailFilter::<&TestNode>::new(1, secs(10));
        let a = TestNode::new("a").failed(2, secs(1)).meta("maxFails", 5);
        let b = TestNode::new("b").failed(2, secs(1));
        let c = TestNode::new("c");
        let pool = vec![&a, &b, &c];
        assert_eq!(ids(&f.filter(&Context::default(), &pool)), vec!["a", "c"]);

        // "a" shortens its own window so a 5s old failure no longer counts.
        let f = FailFilter::<&TestNode>::new(1, secs(60));
        let a = TestNode::new("a").failed(2, secs(5)).meta("failTimeout", "2s");
        let b = TestNode::new("b").failed(2, secs(5));
        let pool = vec![&a, &b, &c];
        assert_eq!(ids(&f.filter(&Context::default(), &pool)), vec!["a", "c"]);
    }

    #[test]
    fn test_fail_filter_non_positive_limits_fall_back() {
        // max_fails 0 acts as 1; zero timeout acts as the default window.
        let f = FailFilter::<&TestNode>::new(0, Duration::ZERO);
        let a = TestNode::new("a").failed(1, secs(5));
        let b = TestNode::new("b").failed(1, DEFAULT_FAIL_TIMEOUT + secs(5));
        let pool = vec![&a, &b];
        assert_eq!(ids(&f.filter(&Context::default(), &pool)), vec!["b"]);

        // An override that coerces to zero still replaces the filter value.
        let f = FailFilter::<&TestNode>::new(10, secs(10));
        let a = TestNode::new("a").failed(1, secs(1)).meta("maxFails", "bogus");
        let b = TestNode::new("b").failed(1, secs(1));
        let pool = vec![&a, &b];
        assert_eq!(ids(&f.filter(&Context::default(), &pool)), vec!["b"]);
    }

    #[test]
    fn test_fail_filter_future_failure_counts_as_recent() {
        let f = FailFilter::<&TestNode>::new(1, secs(10));
        let mut a = TestNode::new("a");
        a.marker = Some(FailMarker::with_state(1, SystemTime::now() + secs(30)));
        let b = TestNode::new("b");
        let pool = vec![&a, &b];
        assert_eq!(ids(&f.filter(&Context::default(), &pool)), vec!["b"]);
    }

    #[test]
    fn test_backup_filter() {
        let f = BackupFilter::<&TestNode>::new();
        let p1 = TestNode::new("p1");
        let p2 = TestNode::new("p2").meta("backup", false);
        let b1 = TestNode::new("b1").meta("backup", true);
        let b2 = TestNode::new("b2").meta("backup", "true");

        let pool = vec![&p1, &b1];
        assert_eq!(ids(&f.filter(&Context::default(), &pool)), vec!["p1"]);

        let pool = vec![&b1, &b2];
        assert_eq!(ids(&f.filter(&Context::default(), &pool)), vec!["b1", "b2"]);

        let pool = vec![&b1, &p1, &b2];
        assert_eq!(ids(&f.filter(&Context::default(), &pool)), vec!["p1"]);

        let pool = vec![&p1, &b2, &p2, &b1];
        assert_eq!(ids(&f.filter(&Context::default(), &pool)), vec!["p1", "p2"]);
    }

    #[test]
    fn test_backup_filter_passthrough() {
        let f = BackupFilter::<&TestNode>::new();
        let b = TestNode::new("b").meta("backup", true);
        let pool = vec![&b];
        assert!(matches!(f.filter(&Context::default(), &pool), Cow::Borrowed(_)));

        let p1 = TestNode::new("p1");
        let p2 = TestNode::new("p2");
        let pool = vec![&p1, &p2];
        let out = f.filter(&Context::default(), &pool);
        assert!(matches!(out, Cow::Borrowed(_)));
        assert_eq!(ids(&out), vec!["p1", "p2"]);
    }

    #[test]
    fn test_filters_accept_candidates_without_capabilities() {
        #[derive(Debug, Clone, PartialEq)]
        struct Bare(u32);
        impl Metadatable for Bare {}
        impl Markable for Bare {}

        let pool = vec![Bare(1), Bare(2), Bare(3)];
        let ctx = Context::default();
        assert_eq!(FailFilter::<Bare>::default().filter(&ctx, &pool).as_ref(), &pool[..]);
        assert_eq!(BackupFilter::<Bare>::new().filter(&ctx, &pool).as_ref(), &pool[..]);
    }
}
