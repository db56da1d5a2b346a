//! PipelineSettings - Config Loader output
//!
//! Describes one spam-check run: engine wiring, the seed emails and the stage knobs.

use serde::{Deserialize, Serialize};

/// Configuration version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConfigVersion {
    #[default]
    V1,
}

/// Complete pipeline configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PipelineSettings {
    /// Configuration version
    #[serde(default)]
    pub version: ConfigVersion,

    /// Engine wiring
    #[serde(default)]
    pub engine: EngineSettings,

    /// Initial items fed by the seed stage
    #[serde(default)]
    pub seed: SeedSettings,

    /// Domain stage parameters
    #[serde(default)]
    pub stages: StageSettings,
}

/// Engine settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineSettings {
    /// Pipeline name, used in logs
    #[serde(default = "default_engine_name")]
    pub name: String,

    /// In-flight items per conduit (>= 1)
    #[serde(default = "default_conduit_capacity")]
    pub conduit_capacity: usize,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            name: default_engine_name(),
            conduit_capacity: default_conduit_capacity(),
        }
    }
}

impl EngineSettings {
    /// Named engine with the default capacity
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Override the conduit capacity
    pub fn with_capacity(mut self, conduit_capacity: usize) -> Self {
        self.conduit_capacity = conduit_capacity;
        self
    }
}

fn default_engine_name() -> String {
    "pipeline".to_string()
}

fn default_conduit_capacity() -> usize {
    1
}

/// Seed input
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedSettings {
    /// Emails emitted by the seed stage, in order
    #[serde(default)]
    pub emails: Vec<String>,
}

/// Domain stage parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageSettings {
    /// Messages produced per user by the expand stage
    #[serde(default = "default_messages_per_user")]
    pub messages_per_user: usize,
}

impl Default for StageSettings {
    fn default() -> Self {
        Self {
            messages_per_user: default_messages_per_user(),
        }
    }
}

fn default_messages_per_user() -> usize {
    3
}
