use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use crate::domain::AudioBuffer;

const WAVE_FORMAT_PCM: u16 = 1;

/// Integer PCM layouts a buffer can be written at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SampleWidth {
    /// WAV stores 8-bit PCM offset by 128.
    Unsigned8,
    Signed8,
    Signed16,
    Signed24,
    Signed32,
}

impl SampleWidth {
    fn for_wav(bits: u16) -> Self {
        match bits {
            8 => Self::Unsigned8,
            other => Self::signed(other),
        }
    }

    fn signed(bits: u16) -> Self {
        match bits {
            8 => Self::Signed8,
            24 => Self::Signed24,
            32 => Self::Signed32,
            _ => Self::Signed16,
        }
    }

    fn bytes(self) -> usize {
        match self {
            Self::Unsigned8 | Self::Signed8 => 1,
            Self::Signed16 => 2,
            Self::Signed24 => 3,
            Self::Signed32 => 4,
        }
    }

    fn encode(self, sample: f32, out: &mut impl Write) -> io::Result<()> {
        let sample = sample.clamp(-1.0, 1.0) as f64;
        match self {
            Self::Unsigned8 => out.write_all(&[(scale(sample, 8) + 128) as u8]),
            Self::Signed8 => out.write_all(&(scale(sample, 8) as i8).to_le_bytes()),
            Self::Signed16 => out.write_all(&(scale(sample, 16) as i16).to_le_bytes()),
            Self::Signed24 => out.write_all(&(scale(sample, 24) as i32).to_le_bytes()[..3]),
            Self::Signed32 => out.write_all(&(scale(sample, 32) as i32).to_le_bytes()),
        }
    }
}

/// Maps `[-1.0, 1.0]` onto the symmetric range of a `bits`-wide integer.
fn scale(sample: f64, bits: u32) -> i64 {
    let max = ((1i64 << (bits - 1)) - 1) as f64;
    (sample * max).round() as i64
}

/// Writes the buffer as a canonical PCM WAV file at its own sample width.
pub fn write_wav_pcm(audio: &AudioBuffer, path: &Path) -> io::Result<()> {
    let width = SampleWidth::for_wav(audio.bits_per_sample());
    let channels = u16::try_from(audio.channels())
        .map_err(|_| invalid_input("too many channels for WAV"))?;
    let data_size = u32::try_from(audio.samples().len() * width.bytes())
        .ok()
        .filter(|size| *size <= u32::MAX - 36)
        .ok_or_else(|| invalid_input("audio too long for WAV"))?;

    let block_align = channels * width.bytes() as u16;
    let byte_rate = audio.sample_rate() * block_align as u32;
    let bits_per_sample = width.bytes() as u16 * 8;

    let mut out = BufWriter::new(File::create(path)?);
    out.write_all(b"RIFF")?;
    out.write_all(&(36 + data_size).to_le_bytes())?;
    out.write_all(b"WAVE")?;
    out.write_all(b"fmt ")?;
    out.write_all(&16u32.to_le_bytes())?;
    out.write_all(&WAVE_FORMAT_PCM.to_le_bytes())?;
    out.write_all(&channels.to_le_bytes())?;
    out.write_all(&audio.sample_rate().to_le_bytes())?;
    out.write_all(&byte_rate.to_le_bytes())?;
    out.write_all(&block_align.to_le_bytes())?;
    out.write_all(&bits_per_sample.to_le_bytes())?;
    out.write_all(b"data")?;
    out.write_all(&data_size.to_le_bytes())?;
    write_samples(&mut out, audio.samples(), width)?;
    out.flush()
}

/// Writes interleaved signed little-endian samples at the buffer's sample
/// width, with no header.
pub fn write_raw_pcm(audio: &AudioBuffer, path: &Path) -> io::Result<()> {
    let width = SampleWidth::signed(audio.bits_per_sample());
    let mut out = BufWriter::new(File::create(path)?);
    write_samples(&mut out, audio.samples(), width)?;
    out.flush()
}

fn write_samples(out: &mut impl Write, samples: &[f32], width: SampleWidth) -> io::Result<()> {
    for &sample in samples {
        width.encode(sample, out)?;
    }
    Ok(())
}

fn invalid_input(message: &str) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidInput, message.to_string())
}
