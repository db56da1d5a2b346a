//! # Observability
//!
//! Tracing, Prometheus metrics and the per-run statistics registry.
//!
//! ## Features
//!
//! - Tracing initialization (JSON/Pretty/Compact)
//! - Prometheus metrics export
//! - [`StatsRegistry`]: named atomic counters shared by concurrently running stages
//!
//! ## Usage
//!
//! ```ignore
//! use observability::{init_with_config, ObservabilityConfig, StatsRegistry};
//!
//! init_with_config(ObservabilityConfig::default())?;
//!
//! let stats = std::sync::Arc::new(StatsRegistry::new(["derive_user"]));
//! stats.increment("derive_user");
//! println!("{:?}", stats.snapshot());
//! ```

pub mod metrics;
mod stats;

use anyhow::{Context, Result};
use metrics_exporter_prometheus::PrometheusBuilder;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

// Re-exports
pub use crate::metrics::{record_run_completed, record_run_started, record_stage_finished};
pub use crate::stats::{StatsRegistry, StatsSnapshot};

/// Observability configuration
#[derive(Debug, Clone)]
pub struct ObservabilityConfig {
    /// Log format
    pub log_format: LogFormat,
    /// Prometheus port (None = disabled)
    pub metrics_port: Option<u16>,
    /// Default log level
    pub default_log_level: String,
    /// Let RUST_LOG override `default_log_level`
    pub env_override: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_format: LogFormat::Json,
            metrics_port: None,
            default_log_level: "info".to_string(),
            env_override: true,
        }
    }
}

impl ObservabilityConfig {
    /// Level from a `-v` count; `quiet` pins the level to `warn` and ignores RUST_LOG
    pub fn from_verbosity(verbose: u8, quiet: bool, log_format: LogFormat) -> Self {
        let default_log_level = if quiet {
            "warn"
        } else {
            match verbose {
                0 => "info",
                1 => "debug",
                _ => "trace",
            }
        };

        Self {
            log_format,
            default_log_level: default_log_level.to_string(),
            env_override: !quiet,
            ..Self::default()
        }
    }

    fn filter(&self) -> EnvFilter {
        if self.env_override {
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&self.default_log_level))
        } else {
            EnvFilter::new(&self.default_log_level)
        }
    }
}

/// Log format
#[derive(Debug, Clone, Copy, Default)]
pub enum LogFormat {
    /// JSON structured logs
    #[default]
    Json,
    /// Human-readable
    Pretty,
    /// Compact single line
    Compact,
}

/// Initialize with a custom configuration
pub fn init_with_config(config: ObservabilityConfig) -> Result<()> {
    // 1. Initialize Tracing
    let filter = config.filter();

    match config.log_format {
        LogFormat::Json => {
            let fmt_layer = fmt::layer()
                .json()
                .with_target(true)
                .with_thread_ids(true)
                .with_thread_names(true)
                .with_file(true)
                .with_line_number(true);

            tracing_subscriber::registry()
                .with(filter)
                .with(fmt_layer)
                .try_init()
                .context("Failed to initialize tracing subscriber")?;
        }
        LogFormat::Pretty => {
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().pretty())
                .try_init()
                .context("Failed to initialize tracing subscriber")?;
        }
        LogFormat::Compact => {
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().compact())
                .try_init()
                .context("Failed to initialize tracing subscriber")?;
        }
    }

    // 2. Initialize Prometheus Exporter (if enabled)
    if let Some(port) = config.metrics_port {
        init_metrics_only(port)?;
    }

    tracing::info!(
        log_format = ?config.log_format,
        metrics_port = ?config.metrics_port,
        "Observability initialized"
    );

    Ok(())
}

/// Initialize only the Prometheus exporter
///
/// For callers that already installed their own tracing subscriber.
pub fn init_metrics_only(port: u16) -> Result<()> {
    PrometheusBuilder::new()
        .with_http_listener(([0, 0, 0, 0], port))
        .install()
        .context("Failed to install Prometheus recorder")?;

    tracing::info!(port = port, "Prometheus metrics endpoint initialized");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ObservabilityConfig::default();
        assert_eq!(config.metrics_port, None);
        assert_eq!(config.default_log_level, "info");
        assert!(config.env_override);
        assert!(matches!(config.log_format, LogFormat::Json));
    }

    #[test]
    fn test_from_verbosity() {
        let config = ObservabilityConfig::from_verbosity(0, false, LogFormat::Pretty);
        assert_eq!(config.default_log_level, "info");
        assert!(matches!(config.log_format, LogFormat::Pretty));

        assert_eq!(
            ObservabilityConfig::from_verbosity(1, false, LogFormat::Json).default_log_level,
            "debug"
        );
        assert_eq!(
            ObservabilityConfig::from_verbosity(3, false, LogFormat::Json).default_log_level,
            "trace"
        );

        let quiet = ObservabilityConfig::from_verbosity(2, true, LogFormat::Compact);
        assert_eq!(quiet.default_log_level, "warn");
        assert!(!quiet.env_override);
        assert_eq!(quiet.metrics_port, None);
    }

    #[test]
    fn test_metrics_without_recorder_are_noops() {
        record_run_started("test", 3);
        record_stage_finished("test", "stage", false);
        record_run_completed("test", 10, 1.5);
    }
}
