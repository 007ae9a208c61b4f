use std::ffi::{OsStr, OsString};
use std::io;
use std::path::Path;
use std::process::Stdio;

use crate::application::ports::{AudioEngineError, EncodeOptions};

const DEFAULT_ID3V2_VERSION: &str = "4";
const SUPPORTED_ID3V2_VERSIONS: [&str; 2] = ["3", "4"];

/// Runs `{binary} -version` and returns the first line of its output.
pub fn check_ffmpeg_binary(binary: &Path) -> Result<String, AudioEngineError> {
    let output = std::process::Command::new(binary)
        .arg("-version")
        .output()
        .map_err(|e| AudioEngineError::BinaryUnavailable(format!("{}: {}", binary.display(), e)))?;

    if !output.status.success() {
        return Err(AudioEngineError::BinaryUnavailable(format!(
            "{} -version exited with {}",
            binary.display(),
            output.status
        )));
    }

    Ok(String::from_utf8_lossy(&output.stdout)
        .lines()
        .next()
        .unwrap_or_default()
        .to_string())
}

/// Default codec per container when the request names none.
fn default_codec(format: &str) -> Option<&'static str> {
    match format {
        "ogg" => Some("libvorbis"),
        _ => None,
    }
}

/// Arguments converting `input` into a float WAV. A non-empty `format` is
/// passed as the input demuxer so headerless sources (`s16le`, `mulaw`, ...)
/// can be read.
pub fn to_wav_args(input: &Path, format: &str, output: &Path) -> Vec<OsString> {
    let mut args = base_args();
    if !format.is_empty() {
        args.extend([arg("-f"), arg(format)]);
    }
    args.extend([arg("-i"), arg(input)]);
    args.extend(["-vn", "-acodec", "pcm_f32le", "-f", "wav"].map(arg));
    args.push(arg(output));
    args
}

/// Arguments encoding the WAV at `input` into `output` with `options`.
pub fn encode_args(
    options: &EncodeOptions,
    input: &Path,
    output: &Path,
) -> Result<Vec<OsString>, AudioEngineError> {
    let mut args = base_args();
    args.extend([arg("-f"), arg("wav"), arg("-i"), arg(input)]);

    let codec = options
        .codec
        .as_deref()
        .or_else(|| default_codec(&options.format));
    if let Some(codec) = codec {
        args.extend([arg("-acodec"), arg(codec)]);
    }

    if let Some(bitrate) = &options.bitrate {
        args.extend([arg("-b:a"), arg(bitrate)]);
    }

    args.extend(options.parameters.iter().map(arg));

    if !options.tags.is_empty() {
        for (key, value) in &options.tags {
            args.extend([arg("-metadata"), arg(format!("{}={}", key, value))]);
        }

        if options.format == "mp3" {
            let version = options
                .id3v2_version
                .as_deref()
                .unwrap_or(DEFAULT_ID3V2_VERSION);
            if !SUPPORTED_ID3V2_VERSIONS.contains(&version) {
                return Err(AudioEngineError::InvalidOptions(format!(
                    "id3v2_version must be one of {:?}, got {}",
                    SUPPORTED_ID3V2_VERSIONS, version
                )));
            }
            args.extend([arg("-id3v2_version"), arg(version)]);
        }
    }

    args.extend([arg("-f"), arg(&options.format), arg(output)]);
    Ok(args)
}

fn base_args() -> Vec<OsString> {
    ["-hide_banner", "-nostdin", "-loglevel", "error", "-y"]
        .map(arg)
        .to_vec()
}

fn arg(value: impl AsRef<OsStr>) -> OsString {
    value.as_ref().to_os_string()
}

/// Runs ffmpeg to completion, mapping a non-zero exit through `failed`. The
/// child is killed if the returned future is dropped.
pub async fn run_ffmpeg(
    binary: &Path,
    args: &[OsString],
    failed: fn(String) -> AudioEngineError,
) -> Result<(), AudioEngineError> {
    tracing::debug!(binary = %binary.display(), args = ?args, "Running ffmpeg");

    let output = tokio::process::Command::new(binary)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .output()
        .await
        .map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => {
                AudioEngineError::BinaryUnavailable(format!("{}: {}", binary.display(), e))
            }
            _ => AudioEngineError::Io(e),
        })?;

    if output.status.success() {
        return Ok(());
    }

    let stderr = String::from_utf8_lossy(&output.stderr);
    Err(failed(format!(
        "ffmpeg exited with {}: {}",
        output.status,
        stderr.trim()
    )))
}
