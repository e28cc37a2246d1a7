use serde::{Deserialize, Serialize};

/// Feature flags controlling which optional subsystems are active.
///
/// Loaded from `config.toml` at server startup. Every field defaults to
/// `false` so that a missing or incomplete config file disables all
/// optional features.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct FeatureFlags {
    /// Export request spans over OTLP.
    #[serde(default)]
    pub telemetry: bool,
    /// Run the periodic overdue sweep.
    #[serde(default)]
    pub overdue_sweep: bool,
    /// Enqueue a notification whenever a complaint changes status.
    #[serde(default)]
    pub notifications: bool,
}

fn default_interval_secs() -> u64 {
    3600
}

fn default_window_days() -> i64 {
    2
}

/// Tuning for the overdue sweep and the "approaching deadline" query.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SweepConfig {
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
    /// A non-terminal complaint whose deadline is at most this many days
    /// away counts as approaching.
    #[serde(default = "default_window_days")]
    pub approaching_window_days: i64,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_interval_secs(),
            approaching_window_days: default_window_days(),
        }
    }
}

/// Top-level config file structure matching `config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct AppConfig {
    #[serde(default)]
    pub features: FeatureFlags,
    #[serde(default)]
    pub sweep: SweepConfig,
}
