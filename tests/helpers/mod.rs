#![allow(dead_code)]

use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::Notify;

use kerf::application::ports::{
    AudioEngine, AudioEngineError, EncodeOptions, Loader, LoaderError, Persister, PersisterError,
};
use kerf::application::services::{Executor, ScratchSpace};
use kerf::domain::{AudioBuffer, Reference};

/// 16-bit PCM WAV bytes holding `frames` frames of a quiet ramp.
pub fn build_wav(sample_rate: u32, channels: u16, frames: usize) -> Vec<u8> {
    let samples: Vec<i16> = (0..frames * channels as usize)
        .map(|i| ((i % 200) as i16 - 100) * 50)
        .collect();
    let data_size = (samples.len() * 2) as u32;
    let block_align = channels * 2;
    let byte_rate = sample_rate * block_align as u32;

    let mut bytes = Vec::with_capacity(44 + data_size as usize);
    bytes.extend_from_slice(b"RIFF");
    bytes.extend_from_slice(&(36 + data_size).to_le_bytes());
    bytes.extend_from_slice(b"WAVE");
    bytes.extend_from_slice(b"fmt ");
    bytes.extend_from_slice(&16u32.to_le_bytes());
    bytes.extend_from_slice(&1u16.to_le_bytes());
    bytes.extend_from_slice(&channels.to_le_bytes());
    bytes.extend_from_slice(&sample_rate.to_le_bytes());
    bytes.extend_from_slice(&byte_rate.to_le_bytes());
    bytes.extend_from_slice(&block_align.to_le_bytes());
    bytes.extend_from_slice(&16u16.to_le_bytes());
    bytes.extend_from_slice(b"data");
    bytes.extend_from_slice(&data_size.to_le_bytes());
    for sample in samples {
        bytes.extend_from_slice(&sample.to_le_bytes());
    }
    bytes
}

pub fn reference(raw: &str) -> Reference {
    Reference::parse(raw).unwrap()
}

/// In-memory object space keyed by the reference's display form.
#[derive(Default)]
pub struct MemoryTransfer {
    objects: Mutex<HashMap<String, Vec<u8>>>,
    loads: Mutex<Vec<String>>,
    persists: Mutex<Vec<String>>,
    fail_persist_on: Mutex<Option<String>>,
}

impl MemoryTransfer {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn insert(&self, key: &str, data: Vec<u8>) {
        self.objects.lock().unwrap().insert(key.to_string(), data);
    }

    pub fn get(&self, key: &str) -> Option<Vec<u8>> {
        self.objects.lock().unwrap().get(key).cloned()
    }

    pub fn loads(&self) -> Vec<String> {
        self.loads.lock().unwrap().clone()
    }

    pub fn persists(&self) -> Vec<String> {
        self.persists.lock().unwrap().clone()
    }

    pub fn fail_persist_on(&self, key: &str) {
        *self.fail_persist_on.lock().unwrap() = Some(key.to_string());
    }
}

#[async_trait]
impl Loader for MemoryTransfer {
    async fn load(&self, reference: &Reference, destination: &Path) -> Result<(), LoaderError> {
        let key = reference.to_string();
        self.loads.lock().unwrap().push(key.clone());
        let data = self
            .get(&key)
            .ok_or_else(|| LoaderError::NotFound(key.clone()))?;
        tokio::fs::write(destination, data).await?;
        Ok(())
    }
}

#[async_trait]
impl Persister for MemoryTransfer {
    async fn persist(&self, reference: &Reference, source: &Path) -> Result<(), PersisterError> {
        let key = reference.to_string();
        if self.fail_persist_on.lock().unwrap().as_deref() == Some(key.as_str()) {
            return Err(PersisterError::UploadFailed(format!("rejected {}", key)));
        }
        let data = tokio::fs::read(source).await?;
        self.persists.lock().unwrap().push(key.clone());
        self.insert(&key, data);
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct EncodeCall {
    pub frames: usize,
    pub first_sample: Option<f32>,
    pub options: EncodeOptions,
}

/// How [`FakeAudioEngine::encode`] behaves after recording the call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodeBehaviour {
    Write,
    Fail,
    /// Writes the output, signals `encode_started`, then never completes.
    Stall,
}

/// Decodes any file to a fixed buffer and "encodes" by writing a small
/// textual description of what it was given.
pub struct FakeAudioEngine {
    audio: AudioBuffer,
    decoded_formats: Mutex<Vec<String>>,
    encodes: Mutex<Vec<EncodeCall>>,
    encode_count: AtomicUsize,
    fail_decode: bool,
    encode_behaviour: EncodeBehaviour,
    encode_started: Notify,
}

impl FakeAudioEngine {
    fn build(
        audio: AudioBuffer,
        fail_decode: bool,
        encode_behaviour: EncodeBehaviour,
    ) -> Arc<Self> {
        Arc::new(Self {
            audio,
            decoded_formats: Mutex::new(Vec::new()),
            encodes: Mutex::new(Vec::new()),
            encode_count: AtomicUsize::new(0),
            fail_decode,
            encode_behaviour,
            encode_started: Notify::new(),
        })
    }

    pub fn new(audio: AudioBuffer) -> Arc<Self> {
        Self::build(audio, false, EncodeBehaviour::Write)
    }

    /// Ten seconds of mono audio at 1 kHz whose sample `i` equals `i`.
    pub fn ten_seconds() -> Arc<Self> {
        Self::new(counting_buffer(1_000, 10_000))
    }

    pub fn failing_decode() -> Arc<Self> {
        Self::build(counting_buffer(1_000, 1), true, EncodeBehaviour::Write)
    }

    pub fn with_encode(encode_behaviour: EncodeBehaviour) -> Arc<Self> {
        Self::build(counting_buffer(1_000, 10_000), false, encode_behaviour)
    }

    /// Resolves once an encode call is in flight.
    pub async fn encode_started(&self) {
        self.encode_started.notified().await
    }

    pub fn decoded_formats(&self) -> Vec<String> {
        self.decoded_formats.lock().unwrap().clone()
    }

    pub fn encodes(&self) -> Vec<EncodeCall> {
        self.encodes.lock().unwrap().clone()
    }

    pub fn encode_count(&self) -> usize {
        self.encode_count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AudioEngine for FakeAudioEngine {
    async fn decode(&self, _source: &Path, format: &str) -> Result<AudioBuffer, AudioEngineError> {
        self.decoded_formats.lock().unwrap().push(format.to_string());
        if self.fail_decode {
            return Err(AudioEngineError::DecodingFailed("corrupt".to_string()));
        }
        Ok(self.audio.clone())
    }

    async fn encode(
        &self,
        audio: &AudioBuffer,
        destination: &Path,
        options: &EncodeOptions,
    ) -> Result<(), AudioEngineError> {
        self.encode_count.fetch_add(1, Ordering::SeqCst);
        self.encodes.lock().unwrap().push(EncodeCall {
            frames: audio.frames(),
            first_sample: audio.samples().first().copied(),
            options: options.clone(),
        });

        if self.encode_behaviour == EncodeBehaviour::Fail {
            return Err(AudioEngineError::EncodingFailed("encoder crashed".to_string()));
        }

        let body = format!("{}:{}", options.format, audio.frames());
        tokio::fs::write(destination, body).await?;

        if self.encode_behaviour == EncodeBehaviour::Stall {
            self.encode_started.notify_one();
            std::future::pending::<()>().await;
        }
        Ok(())
    }
}

pub fn counting_buffer(sample_rate: u32, frames: usize) -> AudioBuffer {
    AudioBuffer::new(sample_rate, 1, (0..frames).map(|i| i as f32).collect())
}

pub fn executor(transfer: Arc<MemoryTransfer>, engine: Arc<FakeAudioEngine>) -> Executor {
    Executor::new(transfer.clone(), transfer, engine, ScratchSpace::default())
}
