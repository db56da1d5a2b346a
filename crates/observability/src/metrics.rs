//! Pipeline metrics recorded through the `metrics` facade
//!
//! Nothing is exported unless a recorder (e.g. the Prometheus exporter) is installed.

use metrics::{counter, gauge, histogram};

/// Record a pipeline run starting
pub fn record_run_started(pipeline: &str, stages: usize) {
    counter!("pipeline_runs_started_total", "pipeline" => pipeline.to_string()).increment(1);
    gauge!("pipeline_stages", "pipeline" => pipeline.to_string()).set(stages as f64);
}

/// Record a stage task finishing
pub fn record_stage_finished(pipeline: &str, stage: &str, panicked: bool) {
    let status = if panicked { "panicked" } else { "finished" };
    counter!(
        "pipeline_stage_exits_total",
        "pipeline" => pipeline.to_string(),
        "stage" => stage.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}

/// Record a pipeline run completing
pub fn record_run_completed(pipeline: &str, drained: u64, elapsed_ms: f64) {
    counter!("pipeline_runs_completed_total", "pipeline" => pipeline.to_string()).increment(1);
    counter!("pipeline_items_drained_total", "pipeline" => pipeline.to_string())
        .increment(drained);
    histogram!("pipeline_run_duration_ms", "pipeline" => pipeline.to_string()).record(elapsed_ms);
}
