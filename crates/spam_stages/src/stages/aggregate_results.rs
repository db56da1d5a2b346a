//! AggregateResults - buffers every verdict, emits them once input is exhausted

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use contracts::{Inlet, MessageData, Outlet, Stage};
use observability::StatsRegistry;
use tracing::{debug, warn};

use crate::counters;

/// Collects all verdicts, then emits them in arrival order
#[derive(Debug, Clone)]
pub struct AggregateResults {
    stats: Arc<StatsRegistry>,
    collected: Arc<AtomicUsize>,
}

impl AggregateResults {
    pub fn new(stats: Arc<StatsRegistry>) -> Self {
        Self {
            stats,
            collected: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Shared probe reporting how many results were collected
    pub fn collected(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.collected)
    }
}

impl Stage for AggregateResults {
    type Input = MessageData;
    type Output = String;

    fn name(&self) -> &str {
        "aggregate_results"
    }

    async fn run(&mut self, input: Inlet<MessageData>, output: Outlet<String>) {
        let mut results = Vec::new();
        while let Some(data) = input.recv().await {
            results.push(data.verdict);
            self.collected.fetch_add(1, Ordering::Relaxed);
            self.stats.increment(counters::AGGREGATE_RESULTS);
        }

        debug!(results = results.len(), "Input exhausted, emitting results");
        for result in results {
            if output.send(result).await.is_err() {
                warn!("Output conduit closed, stopping stage");
                return;
            }
        }
    }
}
