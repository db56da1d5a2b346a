//! `run` command implementation.

use anyhow::{Context, Result};
use contracts::PipelineSettings;
use tracing::info;

use crate::cli::RunArgs;
use crate::error::CliError;
use crate::pipeline::Orchestrator;

/// Execute the `run` command
pub async fn run_pipeline(args: &RunArgs) -> Result<()> {
    let settings = resolve_settings(args)?;

    info!(
        pipeline = %settings.engine.name,
        capacity = settings.engine.conduit_capacity,
        emails = settings.seed.emails.len(),
        messages_per_user = settings.stages.messages_per_user,
        "Configuration resolved"
    );

    if args.metrics_port != 0 {
        observability::init_metrics_only(args.metrics_port)?;
    }

    let stats = Orchestrator::new(settings)
        .supervised(args.supervised)
        .run()
        .await
        .context("Pipeline execution failed")?;

    info!(
        pipeline = %stats.pipeline,
        drained = stats.drained,
        collected = stats.collected,
        duration_ms = stats.duration.as_secs_f64() * 1000.0,
        "Pipeline completed successfully"
    );

    if args.json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
    } else {
        stats.print_summary();
    }

    Ok(())
}

/// Load the configuration file (if any) and apply command-line overrides
fn resolve_settings(args: &RunArgs) -> Result<PipelineSettings> {
    let mut settings = match &args.config {
        Some(path) => {
            info!(config = %path.display(), "Loading configuration");
            if !path.exists() {
                return Err(CliError::config_not_found(path.display().to_string()).into());
            }
            config_loader::ConfigLoader::load_from_path(path)
                .with_context(|| format!("Failed to load config from {}", path.display()))?
        }
        None => PipelineSettings::default(),
    };

    settings.seed.emails.extend(args.emails.iter().cloned());
    if let Some(n) = args.messages_per_user {
        info!(messages_per_user = n, "Overriding messages per user from CLI");
        settings.stages.messages_per_user = n;
    }
    if let Some(capacity) = args.capacity {
        info!(capacity, "Overriding conduit capacity from CLI");
        settings.engine.conduit_capacity = capacity;
    }

    config_loader::ConfigLoader::validate(&settings)
        .map_err(|e| CliError::config_validation(e.to_string()))?;

    if settings.seed.emails.is_empty() {
        return Err(CliError::NoInput.into());
    }

    Ok(settings)
}
