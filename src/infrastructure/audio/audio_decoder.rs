use std::fs::File;
use std::path::Path;

use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{CODEC_TYPE_NULL, DecoderOptions};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

use crate::domain::AudioBuffer;

#[derive(Debug, thiserror::Error)]
pub enum NativeDecodeError {
    /// Container or codec the native decoder does not handle.
    #[error("unsupported: {0}")]
    Unsupported(String),
    #[error("{0}")]
    Failed(String),
}

/// Decodes a whole file to interleaved f32 PCM at its native rate and
/// channel layout, keeping the stored sample width when the codec reports
/// one. `format` is used as the probe's extension hint.
pub fn decode_file(path: &Path, format: &str) -> Result<AudioBuffer, NativeDecodeError> {
    let file = File::open(path).map_err(|e| NativeDecodeError::Failed(format!("open: {}", e)))?;
    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    if !format.is_empty() {
        hint.with_extension(format);
    }

    let probed = symphonia::default::get_probe()
        .format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|e| classify("probe", e))?;

    let mut reader = probed.format;

    let track = reader
        .default_track()
        .ok_or_else(|| NativeDecodeError::Failed("no audio track found".to_string()))?;
    if track.codec_params.codec == CODEC_TYPE_NULL {
        return Err(NativeDecodeError::Unsupported("unknown codec".to_string()));
    }

    let track_id = track.id;
    let codec_params = track.codec_params.clone();
    let mut sample_rate = codec_params.sample_rate;
    let mut channels = codec_params.channels.map(|c| c.count());

    let mut decoder = symphonia::default::get_codecs()
        .make(&codec_params, &DecoderOptions::default())
        .map_err(|e| classify("codec", e))?;

    let mut samples: Vec<f32> = Vec::new();

    loop {
        let packet = match reader.next_packet() {
            Ok(p) => p,
            Err(SymphoniaError::IoError(ref e))
                if e.kind() == std::io::ErrorKind::UnexpectedEof =>
            {
                break;
            }
            Err(SymphoniaError::ResetRequired) => break,
            Err(e) => {
                return Err(NativeDecodeError::Failed(format!("packet: {}", e)));
            }
        };

        if packet.track_id() != track_id {
            continue;
        }

        let decoded = match decoder.decode(&packet) {
            Ok(d) => d,
            Err(SymphoniaError::DecodeError(e)) => {
                tracing::warn!(error = %e, "Skipping corrupt audio frame");
                continue;
            }
            Err(e) => {
                return Err(NativeDecodeError::Failed(format!("decode: {}", e)));
            }
        };

        let spec = *decoded.spec();
        let num_frames = decoded.frames();
        if num_frames == 0 {
            continue;
        }
        sample_rate.get_or_insert(spec.rate);
        channels.get_or_insert(spec.channels.count());

        let mut sample_buf = SampleBuffer::<f32>::new(num_frames as u64, spec);
        sample_buf.copy_interleaved_ref(decoded);
        samples.extend_from_slice(sample_buf.samples());
    }

    if samples.is_empty() {
        return Err(NativeDecodeError::Failed(
            "no audio samples decoded".to_string(),
        ));
    }

    let sample_rate = sample_rate
        .ok_or_else(|| NativeDecodeError::Failed("unknown sample rate".to_string()))?;
    let mut audio = AudioBuffer::new(sample_rate, channels.unwrap_or(1), samples);
    if let Some(bits) = codec_params.bits_per_sample {
        audio = audio.with_bits_per_sample(bits);
    }

    tracing::debug!(
        frames = audio.frames(),
        sample_rate = audio.sample_rate(),
        channels = audio.channels(),
        bits_per_sample = audio.bits_per_sample(),
        "Audio decoded to PCM"
    );

    Ok(audio)
}

fn classify(stage: &str, err: SymphoniaError) -> NativeDecodeError {
    match err {
        SymphoniaError::Unsupported(what) => {
            NativeDecodeError::Unsupported(format!("{}: {}", stage, what))
        }
        other => NativeDecodeError::Failed(format!("{}: {}", stage, other)),
    }
}
