use std::collections::BTreeMap;
use std::path::Path;

use async_trait::async_trait;

use crate::domain::{AudioBuffer, ExportOptions};

#[async_trait]
pub trait AudioEngine: Send + Sync {
    /// Decodes the file at `source`, using `format` as a container hint.
    async fn decode(&self, source: &Path, format: &str) -> Result<AudioBuffer, AudioEngineError>;

    /// Encodes `audio` into `destination`, overwriting it.
    async fn encode(
        &self,
        audio: &AudioBuffer,
        destination: &Path,
        options: &EncodeOptions,
    ) -> Result<(), AudioEngineError>;
}

/// Effective options for one encode. Only fields present in the request's
/// [`ExportOptions`] are set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EncodeOptions {
    pub format: String,
    pub codec: Option<String>,
    pub bitrate: Option<String>,
    pub parameters: Vec<String>,
    pub tags: BTreeMap<String, String>,
    pub id3v2_version: Option<String>,
}

impl EncodeOptions {
    pub fn new(format: impl Into<String>, export: Option<&ExportOptions>) -> Self {
        let Some(export) = export else {
            return Self {
                format: format.into(),
                ..Default::default()
            };
        };

        Self {
            format: format.into(),
            codec: export.codec.clone(),
            bitrate: export.bitrate.clone(),
            parameters: export.parameters.clone().unwrap_or_default(),
            tags: export.tags.clone().unwrap_or_default(),
            id3v2_version: export.id3v2_version.clone(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AudioEngineError {
    #[error("audio decoding failed: {0}")]
    DecodingFailed(String),
    #[error("audio encoding failed: {0}")]
    EncodingFailed(String),
    #[error("unsupported audio format: {0}")]
    UnsupportedFormat(String),
    #[error("invalid export options: {0}")]
    InvalidOptions(String),
    #[error("encoder binary unavailable: {0}")]
    BinaryUnavailable(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
