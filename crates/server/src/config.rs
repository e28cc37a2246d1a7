use shared_types::{AppConfig, FeatureFlags, SweepConfig};
use std::sync::OnceLock;

static CONFIG: OnceLock<AppConfig> = OnceLock::new();

/// Path to the config file, relative to the working directory.
/// Overridable with `APP_CONFIG_PATH`.
const CONFIG_PATH: &str = "config.toml";

fn config_path() -> String {
    std::env::var("APP_CONFIG_PATH").unwrap_or_else(|_| CONFIG_PATH.to_string())
}

/// Parse config file contents. Unparseable input falls back to defaults.
pub fn parse_config(contents: &str) -> AppConfig {
    toml::from_str(contents).unwrap_or_else(|e| {
        tracing::warn!(error = %e, "failed to parse config, using defaults");
        AppConfig::default()
    })
}

/// Read the config file and store it in the global `OnceLock`. Only the
/// first call has effect. A missing file means every flag is off.
pub fn load_config() -> &'static AppConfig {
    CONFIG.get_or_init(|| {
        let path = config_path();
        match std::fs::read_to_string(&path) {
            Ok(contents) => {
                let config = parse_config(&contents);
                tracing::info!(path = %path, features = ?config.features, sweep = ?config.sweep, "config loaded");
                config
            }
            Err(e) => {
                tracing::info!(path = %path, error = %e, "config file not found, using defaults");
                AppConfig::default()
            }
        }
    })
}

/// Loaded feature flags, or all-off defaults before `load_config()` runs.
pub fn feature_flags() -> &'static FeatureFlags {
    static DEFAULT: FeatureFlags = FeatureFlags {
        telemetry: false,
        overdue_sweep: false,
        notifications: false,
    };
    CONFIG.get().map(|c| &c.features).unwrap_or(&DEFAULT)
}

/// Loaded sweep settings, or defaults before `load_config()` runs.
pub fn sweep_config() -> SweepConfig {
    CONFIG.get().map(|c| c.sweep.clone()).unwrap_or_default()
}
