use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tempfile::NamedTempFile;

use crate::application::ports::{AudioEngine, AudioEngineError, EncodeOptions};
use crate::domain::{AudioBuffer, DEFAULT_BITS_PER_SAMPLE};

use super::audio_decoder::{NativeDecodeError, decode_file};
use super::ffmpeg::{encode_args, run_ffmpeg, to_wav_args};
use super::wav_writer::{write_raw_pcm, write_wav_pcm};

pub const DEFAULT_FFMPEG_BINARY: &str = "ffmpeg";

type PcmWriter = fn(&AudioBuffer, &Path) -> std::io::Result<()>;

/// Decodes natively with symphonia and shells out to ffmpeg for anything
/// symphonia cannot read and for every non-trivial encode.
pub struct FfmpegAudioEngine {
    ffmpeg: PathBuf,
}

impl FfmpegAudioEngine {
    pub fn new(ffmpeg: impl Into<PathBuf>) -> Self {
        Self {
            ffmpeg: ffmpeg.into(),
        }
    }

    pub fn ffmpeg_path(&self) -> &Path {
        &self.ffmpeg
    }

    async fn decode_native(
        &self,
        source: &Path,
        format: &str,
    ) -> Result<AudioBuffer, NativeDecodeError> {
        let source = source.to_path_buf();
        let format = format.to_string();

        tokio::task::spawn_blocking(move || decode_file(&source, &format))
            .await
            .map_err(|e| NativeDecodeError::Failed(format!("decoder task: {}", e)))?
    }

    async fn decode_with_ffmpeg(
        &self,
        source: &Path,
        format: &str,
    ) -> Result<AudioBuffer, AudioEngineError> {
        let staged = stage_file(source, "wav")?;

        run_ffmpeg(
            &self.ffmpeg,
            &to_wav_args(source, format, staged.path()),
            AudioEngineError::DecodingFailed,
        )
        .await?;

        // The staged file is float; the source width is not known here.
        self.decode_native(staged.path(), "wav")
            .await
            .map(|audio| audio.with_bits_per_sample(DEFAULT_BITS_PER_SAMPLE.into()))
            .map_err(|e| AudioEngineError::DecodingFailed(e.to_string()))
    }
}

impl Default for FfmpegAudioEngine {
    fn default() -> Self {
        Self::new(DEFAULT_FFMPEG_BINARY)
    }
}

#[async_trait]
impl AudioEngine for FfmpegAudioEngine {
    async fn decode(&self, source: &Path, format: &str) -> Result<AudioBuffer, AudioEngineError> {
        match self.decode_native(source, format).await {
            Ok(audio) => Ok(audio),
            Err(NativeDecodeError::Failed(reason)) => Err(AudioEngineError::DecodingFailed(reason)),
            Err(NativeDecodeError::Unsupported(reason)) => {
                tracing::info!(
                    format = %format,
                    reason = %reason,
                    "Native decoder cannot read source; falling back to ffmpeg"
                );
                self.decode_with_ffmpeg(source, format).await
            }
        }
    }

    async fn encode(
        &self,
        audio: &AudioBuffer,
        destination: &Path,
        options: &EncodeOptions,
    ) -> Result<(), AudioEngineError> {
        let direct = match options.format.as_str() {
            "raw" => {
                if options.codec.is_some() || !options.parameters.is_empty() {
                    return Err(AudioEngineError::InvalidOptions(
                        "raw output does not accept a codec or parameters".to_string(),
                    ));
                }
                Some(write_raw_pcm as PcmWriter)
            }
            "wav" if options.codec.is_none()
                && options.parameters.is_empty()
                && options.tags.is_empty() =>
            {
                Some(write_wav_pcm as PcmWriter)
            }
            _ => None,
        };

        if let Some(write) = direct {
            return write_blocking(audio, destination, write).await;
        }

        let staged = stage_file(destination, "wav")?;
        write_blocking(audio, staged.path(), write_wav_pcm).await?;

        let args = encode_args(options, staged.path(), destination)?;
        run_ffmpeg(&self.ffmpeg, &args, AudioEngineError::EncodingFailed).await
    }
}

async fn write_blocking(
    audio: &AudioBuffer,
    path: &Path,
    write: PcmWriter,
) -> Result<(), AudioEngineError> {
    let audio = audio.clone();
    let path = path.to_path_buf();

    tokio::task::spawn_blocking(move || write(&audio, &path))
        .await
        .map_err(|e| AudioEngineError::EncodingFailed(format!("writer task: {}", e)))??;

    Ok(())
}

/// Temporary file next to `neighbour`, deleted on drop.
fn stage_file(neighbour: &Path, extension: &str) -> Result<NamedTempFile, AudioEngineError> {
    let dir = neighbour
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(std::env::temp_dir);
    let suffix = format!(".{}", extension);

    Ok(tempfile::Builder::new()
        .prefix("kerf-stage-")
        .suffix(&suffix)
        .tempfile_in(dir)?)
}
