//! ClassifySpam - MessageId → MessageData

use std::sync::Arc;

use contracts::{Inlet, MessageData, MessageId, Outlet, Stage};
use observability::StatsRegistry;
use tracing::warn;

use crate::counters;

/// Attaches a verdict to every message
///
/// Every message is flagged; the verdict carries the owner's id.
#[derive(Debug, Clone)]
pub struct ClassifySpam {
    stats: Arc<StatsRegistry>,
}

impl ClassifySpam {
    pub fn new(stats: Arc<StatsRegistry>) -> Self {
        Self { stats }
    }
}

impl Stage for ClassifySpam {
    type Input = MessageId;
    type Output = MessageData;

    fn name(&self) -> &str {
        "classify_spam"
    }

    async fn run(&mut self, input: Inlet<MessageId>, output: Outlet<MessageData>) {
        while let Some(id) = input.recv().await {
            let verdict = format!("true {}", id.user_id);
            if output.send(MessageData { id, verdict }).await.is_err() {
                warn!("Output conduit closed, stopping stage");
                return;
            }
            self.stats.increment(counters::CLASSIFY_SPAM);
        }
    }
}
