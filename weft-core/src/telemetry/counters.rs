//! Cheap atomic counters for the weaving pipeline.
//!
//! Counters are advisory: relaxed ordering is fine, nothing synchronizes
//! through them. A snapshot taken mid-flight may be internally skewed by a
//! few events.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Counters incremented along the matching hot path.
#[derive(Debug, Default)]
pub struct WeaveCounters {
    types_seen: AtomicU64,
    types_accepted: AtomicU64,
    types_matched: AtomicU64,
    cache_hits: AtomicU64,
    advice_instantiation_failures: AtomicU64,
    match_evaluation_failures: AtomicU64,
    anomalous_reweaves: AtomicU64,
}

impl WeaveCounters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_type_seen(&self) {
        self.types_seen.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_type_accepted(&self) {
        self.types_accepted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_type_matched(&self) {
        self.types_matched.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_cache_hit(&self) {
        self.cache_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_instantiation_failure(&self) {
        self.advice_instantiation_failures
            .fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_match_evaluation_failure(&self) {
        self.match_evaluation_failures
            .fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_anomalous_reweave(&self) {
        self.anomalous_reweaves.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> CountersSnapshot {
        CountersSnapshot {
            types_seen: self.types_seen.load(Ordering::Relaxed),
            types_accepted: self.types_accepted.load(Ordering::Relaxed),
            types_matched: self.types_matched.load(Ordering::Relaxed),
            cache_hits: self.cache_hits.load(Ordering::Relaxed),
            advice_instantiation_failures: self
                .advice_instantiation_failures
                .load(Ordering::Relaxed),
            match_evaluation_failures: self.match_evaluation_failures.load(Ordering::Relaxed),
            anomalous_reweaves: self.anomalous_reweaves.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time view of the counters, serializable for host tooling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CountersSnapshot {
    pub types_seen: u64,
    pub types_accepted: u64,
    pub types_matched: u64,
    pub cache_hits: u64,
    pub advice_instantiation_failures: u64,
    pub match_evaluation_failures: u64,
    pub anomalous_reweaves: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_accumulate() {
        let counters = WeaveCounters::new();
        counters.record_type_seen();
        counters.record_type_seen();
        counters.record_type_accepted();
        counters.record_anomalous_reweave();
        let snap = counters.snapshot();
        assert_eq!(snap.types_seen, 2);
        assert_eq!(snap.types_accepted, 1);
        assert_eq!(snap.anomalous_reweaves, 1);
        assert_eq!(snap.types_matched, 0);
    }

    #[test]
    fn counters_are_thread_safe() {
        use rayon::prelude::*;
        let counters = WeaveCounters::new();
        (0..1000u32).into_par_iter().for_each(|_| {
            counters.record_type_seen();
        });
        assert_eq!(counters.snapshot().types_seen, 1000);
    }
}
