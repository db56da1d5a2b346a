//! Statistics registry
//!
//! A fixed set of named counters shared by every stage of a run. The counter set
//! is frozen at construction, so lookups never lock and increments are a single
//! atomic add.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};

use metrics::counter;
use serde::Serialize;
use tracing::debug;

/// Concurrency-safe per-category item counters
#[derive(Debug, Default)]
pub struct StatsRegistry {
    counters: BTreeMap<&'static str, AtomicU64>,
}

impl StatsRegistry {
    /// Create a registry holding exactly `names`, all at zero
    pub fn new<I>(names: I) -> Self
    where
        I: IntoIterator<Item = &'static str>,
    {
        Self {
            counters: names
                .into_iter()
                .map(|name| (name, AtomicU64::new(0)))
                .collect(),
        }
    }

    /// Add one to `name`
    ///
    /// Never blocks and never fails; names outside the registry are ignored.
    pub fn increment(&self, name: &str) {
        match self.counters.get_key_value(name) {
            Some((key, value)) => {
                value.fetch_add(1, Ordering::Relaxed);
                counter!("pipeline_stage_items_total", "counter" => *key).increment(1);
            }
            None => debug!(counter = name, "increment on unregistered counter ignored"),
        }
    }

    /// Current value of one counter
    pub fn get(&self, name: &str) -> Option<u64> {
        self.counters
            .get(name)
            .map(|value| value.load(Ordering::Relaxed))
    }

    /// Registered counter names, sorted
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.counters.keys().copied()
    }

    /// Read every counter
    ///
    /// Each value is read independently; counters may be observed mid-run
    /// relative to one another.
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            counters: self
                .counters
                .iter()
                .map(|(name, value)| (name.to_string(), value.load(Ordering::Relaxed)))
                .collect(),
        }
    }
}

/// Point-in-time copy of a [`StatsRegistry`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StatsSnapshot {
    pub counters: BTreeMap<String, u64>,
}

impl StatsSnapshot {
    /// Value of `name`, zero when absent
    pub fn get(&self, name: &str) -> u64 {
        self.counters.get(name).copied().unwrap_or(0)
    }

    /// Sum over all counters
    pub fn total(&self) -> u64 {
        self.counters.values().sum()
    }

    pub fn is_empty(&self) -> bool {
        self.counters.is_empty()
    }
}
