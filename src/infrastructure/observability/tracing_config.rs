use crate::presentation::config::{Environment, LoggingSettings};

/// Configuration for tracing initialization.
#[derive(Debug, Clone)]
pub struct TracingConfig {
    pub environment: String,
    pub json_format: bool,
    /// Filter used when `RUST_LOG` is unset.
    pub default_filter: String,
}

impl TracingConfig {
    pub fn from_settings(settings: &LoggingSettings, environment: Environment) -> Self {
        Self {
            environment: environment.to_string(),
            json_format: settings.json,
            default_filter: format!("{},kerf=debug,tower_http=debug", settings.level),
        }
    }
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self::from_settings(&LoggingSettings::default(), Environment::default())
    }
}
