//! CLI argument definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Spam Pipeline - staged spam-check runner
#[derive(Parser, Debug)]
#[command(
    name = "spam-pipeline",
    author,
    version,
    about = "Staged spam-check pipeline",
    long_about = "Runs emails through a concurrent chain of stages:\n\n\
                  seed -> derive user -> expand messages -> classify spam -> aggregate.\n\
                  Every stage runs as its own task; counters report what each processed."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "SPAM_PIPELINE_VERBOSE")]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log output format
    #[arg(
        long,
        value_enum,
        default_value = "pretty",
        global = true,
        env = "SPAM_PIPELINE_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the spam-check pipeline
    Run(RunArgs),

    /// Validate configuration file without running
    Validate(ValidateArgs),
}

/// Arguments for the `run` command
#[derive(Parser, Debug, Clone)]
pub struct RunArgs {
    /// Path to configuration file (TOML or JSON)
    #[arg(short, long, env = "SPAM_PIPELINE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Email to seed (repeatable, appended to the configured emails)
    #[arg(short, long = "email", value_name = "EMAIL")]
    pub emails: Vec<String>,

    /// Override messages produced per user
    #[arg(long, env = "SPAM_PIPELINE_MESSAGES_PER_USER")]
    pub messages_per_user: Option<usize>,

    /// Override conduit capacity
    #[arg(long, env = "SPAM_PIPELINE_CAPACITY")]
    pub capacity: Option<usize>,

    /// Report stage panics as an error instead of aborting
    #[arg(long)]
    pub supervised: bool,

    /// Metrics server port (0 = disabled)
    #[arg(long, default_value = "0", env = "SPAM_PIPELINE_METRICS_PORT")]
    pub metrics_port: u16,

    /// Print statistics as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `validate` command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Path to configuration file to validate
    #[arg(short, long, default_value = "pipeline.toml")]
    pub config: PathBuf,

    /// Output validation result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Log output format
#[derive(ValueEnum, Clone, Debug, Default)]
pub enum LogFormat {
    /// JSON structured logging
    Json,
    /// Human-readable pretty format
    #[default]
    Pretty,
    /// Compact single-line format
    Compact,
}

impl From<LogFormat> for observability::LogFormat {
    fn from(format: LogFormat) -> Self {
        match format {
            LogFormat::Json => Self::Json,
            LogFormat::Pretty => Self::Pretty,
            LogFormat::Compact => Self::Compact,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_run_with_emails() {
        let cli = Cli::try_parse_from([
            "spam-pipeline",
            "run",
            "--email",
            "a@x.io",
            "-e",
            "b@x.io",
            "--messages-per-user",
            "2",
        ])
        .unwrap();

        match cli.command {
            Commands::Run(args) => {
                assert_eq!(args.emails, vec!["a@x.io", "b@x.io"]);
                assert_eq!(args.messages_per_user, Some(2));
                assert_eq!(args.metrics_port, 0);
                assert!(!args.supervised);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_quiet_conflicts_with_verbose() {
        let result = Cli::try_parse_from(["spam-pipeline", "-q", "-v", "run"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_default_path() {
        let cli = Cli::try_parse_from(["spam-pipeline", "validate"]).unwrap();
        match cli.command {
            Commands::Validate(args) => assert_eq!(args.config, PathBuf::from("pipeline.toml")),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_log_format_maps_to_observability() {
        let cli = Cli::try_parse_from(["spam-pipeline", "--log-format", "compact", "validate"])
            .unwrap();
        let format: observability::LogFormat = cli.log_format.into();
        assert!(matches!(format, observability::LogFormat::Compact));
        assert!(matches!(
            observability::LogFormat::from(LogFormat::Json),
            observability::LogFormat::Json
        ));
    }
}
