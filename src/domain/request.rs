use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::reference::Reference;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Input {
    /// The audio file to export.
    pub source: Reference,
    /// Format of the audio file; falls back to the source extension.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
}

/// Encode-time options. Every field is optional and absent fields never
/// reach the encoder.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportOptions {
    /// Destination format; falls back to the destination extension.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub codec: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bitrate: Option<String>,
    /// Additional raw encoder arguments, passed through in order.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Vec<String>>,
    /// Metadata written into the destination file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<BTreeMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id3v2_version: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Output {
    pub destination: Reference,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub export: Option<ExportOptions>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    /// Start of the segment in seconds.
    pub start: f64,
    /// End of the segment in seconds.
    pub end: f64,
    /// File name appended to the output destination.
    pub name: String,
}

impl Segment {
    pub fn start_ms(&self) -> u64 {
        seconds_to_ms(self.start)
    }

    pub fn end_ms(&self) -> u64 {
        seconds_to_ms(self.end)
    }

    /// A segment is valid when both bounds are finite, non-negative and
    /// `start < end`.
    pub fn validate(&self) -> Result<(), String> {
        if !self.start.is_finite() || !self.end.is_finite() {
            return Err(format!("segment '{}' has a non-finite bound", self.name));
        }
        if self.start < 0.0 {
            return Err(format!("segment '{}' starts before zero", self.name));
        }
        if self.start >= self.end {
            return Err(format!(
                "segment '{}' must start before it ends ({} >= {})",
                self.name, self.start, self.end
            ));
        }
        if self.name.trim().is_empty() {
            return Err("segment name must not be empty".to_string());
        }
        Ok(())
    }
}

fn seconds_to_ms(seconds: f64) -> u64 {
    (seconds * 1000.0).round().max(0.0) as u64
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportRequest {
    pub input: Input,
    pub output: Output,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentRequest {
    pub input: Input,
    pub segments: Vec<Segment>,
    pub output: Output,
}
