use std::collections::HashMap;
use std::path::PathBuf;

use config::{Config, ConfigError, File};
use serde::Deserialize;

use super::Environment;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    #[serde(default = "default_service_name")]
    pub service_name: String,
    #[serde(default)]
    pub storage: StorageSettings,
    #[serde(default)]
    pub audio: AudioSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

impl Settings {
    /// Layers `appsettings.{environment}` (optional) under `APP_`-prefixed
    /// environment variables. Nested keys use `__`, e.g.
    /// `APP_STORAGE__URL=s3://bucket/prefix`.
    pub fn load(environment: Environment) -> Result<Self, ConfigError> {
        Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 9080)?
            .add_source(
                File::with_name(&format!("appsettings.{}", environment.as_str())).required(false),
            )
            .add_source(
                config::Environment::with_prefix("APP")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }
}

fn default_service_name() -> String {
    "Pydub".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StorageSettings {
    /// Default object store, e.g. `s3://bucket/prefix`. Path references are
    /// keys inside it; without it they are local files.
    pub url: Option<String>,
    /// Passed verbatim to the object store builders (`aws_region`,
    /// `google_service_account`, ...).
    #[serde(default)]
    pub client_options: HashMap<String, String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AudioSettings {
    pub ffmpeg_path: String,
    pub scratch_dir: Option<PathBuf>,
    pub default_format: String,
    pub segment_concurrency: usize,
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            ffmpeg_path: "ffmpeg".to_string(),
            scratch_dir: None,
            default_format: "mp3".to_string(),
            segment_concurrency: 1,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    pub level: String,
    pub json: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}
