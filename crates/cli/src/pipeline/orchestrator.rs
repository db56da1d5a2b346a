//! Orchestrator - builds the spam-check pipeline from settings and runs it.

use std::sync::atomic::Ordering;
use std::sync::Arc;

use anyhow::Result;
use contracts::PipelineSettings;
use spam_stages::{counters, spam_check_pipeline};
use tracing::info;

use super::PipelineStats;
use crate::error::CliError;

/// Runs one spam-check pass
pub struct Orchestrator {
    settings: PipelineSettings,
    supervised: bool,
}

impl Orchestrator {
    pub fn new(settings: PipelineSettings) -> Self {
        Self {
            settings,
            supervised: false,
        }
    }

    /// Report stage panics as an error instead of resuming them
    pub fn supervised(mut self, supervised: bool) -> Self {
        self.supervised = supervised;
        self
    }

    /// Run the pipeline to completion
    pub async fn run(self) -> Result<PipelineStats> {
        let stats = Arc::new(counters::registry());
        let check = spam_check_pipeline(&self.settings, Arc::clone(&stats));

        info!(
            pipeline = %self.settings.engine.name,
            stages = ?check.pipeline.stage_names(),
            emails = self.settings.seed.emails.len(),
            supervised = self.supervised,
            "Starting pipeline"
        );

        let handle = check.pipeline.start();
        let report = if self.supervised {
            handle
                .try_wait()
                .await
                .map_err(|e| CliError::pipeline_execution(e.to_string()))?
        } else {
            handle.wait().await
        };

        Ok(PipelineStats {
            pipeline: report.pipeline,
            stages: report.stages,
            drained: report.drained,
            collected: check.collected.load(Ordering::Relaxed),
            duration: report.elapsed,
            counters: stats.snapshot(),
        })
    }
}
