use std::ops::Range;
use std::sync::Arc;

/// Sample width used when the source does not report one.
pub const DEFAULT_BITS_PER_SAMPLE: u16 = 16;

/// Decoded interleaved PCM. Immutable once built; slices share the sample
/// storage and only narrow the visible frame range.
///
/// `bits_per_sample` records the integer width the source was stored at, so
/// uncompressed exports keep the source's depth.
#[derive(Debug, Clone)]
pub struct AudioBuffer {
    sample_rate: u32,
    channels: usize,
    samples: Arc<[f32]>,
    frames: Range<usize>,
    bits_per_sample: u16,
}

impl AudioBuffer {
    /// Trailing samples that do not fill a whole frame are dropped.
    pub fn new(sample_rate: u32, channels: usize, samples: Vec<f32>) -> Self {
        let channels = channels.max(1);
        let total_frames = samples.len() / channels;
        Self {
            sample_rate,
            channels,
            samples: samples.into(),
            frames: 0..total_frames,
            bits_per_sample: DEFAULT_BITS_PER_SAMPLE,
        }
    }

    /// Rounds `bits` up to the nearest of 8, 16, 24 or 32.
    pub fn with_bits_per_sample(mut self, bits: u32) -> Self {
        self.bits_per_sample = match bits {
            0 => DEFAULT_BITS_PER_SAMPLE,
            1..=8 => 8,
            9..=16 => 16,
            17..=24 => 24,
            _ => 32,
        };
        self
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    pub fn bits_per_sample(&self) -> u16 {
        self.bits_per_sample
    }

    pub fn frames(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn duration_ms(&self) -> u64 {
        if self.sample_rate == 0 {
            return 0;
        }
        self.frames() as u64 * 1000 / self.sample_rate as u64
    }

    /// Interleaved samples of the visible range.
    pub fn samples(&self) -> &[f32] {
        &self.samples[self.frames.start * self.channels..self.frames.end * self.channels]
    }

    /// View of `[start_ms, end_ms)` relative to this buffer, clamped to its
    /// bounds. An inverted range yields an empty view.
    pub fn slice_ms(&self, start_ms: u64, end_ms: u64) -> Self {
        let len = self.frames.len();
        let start = self.ms_to_frame(start_ms).min(len);
        let end = self.ms_to_frame(end_ms).clamp(start, len);

        Self {
            sample_rate: self.sample_rate,
            channels: self.channels,
            samples: Arc::clone(&self.samples),
            frames: self.frames.start + start..self.frames.start + end,
            bits_per_sample: self.bits_per_sample,
        }
    }

    fn ms_to_frame(&self, ms: u64) -> usize {
        let frame = ms as u128 * self.sample_rate as u128 / 1000;
        usize::try_from(frame).unwrap_or(usize::MAX)
    }
}
