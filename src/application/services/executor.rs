use std::io;
use std::sync::Arc;

use futures::{TryStreamExt, stream};

use crate::application::ports::{
    AudioEngine, AudioEngineError, EncodeOptions, Loader, LoaderError, Persister, PersisterError,
};
use crate::domain::{
    AudioBuffer, ExportRequest, FormatError, Input, Output, Reference, ReferenceError, Segment,
    SegmentRequest, resolve_format,
};

use super::scratch::ScratchSpace;

pub const DEFAULT_OUTPUT_FORMAT: &str = "mp3";

#[derive(Debug, Clone)]
pub struct ExecutorOptions {
    /// Format used when a request carries no export options and the
    /// destination has no extension.
    pub default_format: String,
    /// Maximum number of segments encoded and persisted at once.
    pub segment_concurrency: usize,
}

impl Default for ExecutorOptions {
    fn default() -> Self {
        Self {
            default_format: DEFAULT_OUTPUT_FORMAT.to_string(),
            segment_concurrency: 1,
        }
    }
}

/// Orchestrates load -> decode -> (slice) -> encode -> persist.
///
/// Calls share no state beyond the injected adapters, so the same request
/// can be replayed safely by an at-least-once caller.
pub struct Executor {
    loader: Arc<dyn Loader>,
    persister: Arc<dyn Persister>,
    engine: Arc<dyn AudioEngine>,
    scratch: ScratchSpace,
    options: ExecutorOptions,
}

impl Executor {
    pub fn new(
        loader: Arc<dyn Loader>,
        persister: Arc<dyn Persister>,
        engine: Arc<dyn AudioEngine>,
        scratch: ScratchSpace,
    ) -> Self {
        Self {
            loader,
            persister,
            engine,
            scratch,
            options: ExecutorOptions::default(),
        }
    }

    pub fn with_options(mut self, options: ExecutorOptions) -> Self {
        self.options = options;
        self
    }

    #[tracing::instrument(skip_all, fields(source = %request.input.source.redacted()))]
    pub async fn export(&self, request: &ExportRequest) -> Result<(), ExecutorError> {
        tracing::info!(format = ?request.input.format, "Exporting audio");

        let audio = self.load_source(&request.input).await?;

        self.export_output(&audio, &request.output, None).await
    }

    /// Exports every segment of the source as its own file under
    /// `output.destination`.
    ///
    /// Fail-fast: the first failing segment aborts the call and cancels
    /// segments still in flight. Segments persisted before the failure are
    /// left in place.
    #[tracing::instrument(skip_all, fields(source = %request.input.source.redacted()))]
    pub async fn segment(&self, request: &SegmentRequest) -> Result<(), ExecutorError> {
        tracing::info!(
            format = ?request.input.format,
            segments = request.segments.len(),
            "Segmenting audio"
        );

        for segment in &request.segments {
            segment.validate().map_err(ExecutorError::InvalidSegment)?;
        }

        let audio = self.load_source(&request.input).await?;
        let limit = self.options.segment_concurrency.max(1);

        stream::iter(request.segments.iter().map(Ok::<_, ExecutorError>))
            .map_ok(|segment| (segment, audio.slice_ms(segment.start_ms(), segment.end_ms())))
            .try_for_each_concurrent(limit, |(segment, slice)| {
                self.export_segment(slice, segment, &request.output)
            })
            .await
    }

    async fn export_segment(
        &self,
        slice: AudioBuffer,
        segment: &Segment,
        output: &Output,
    ) -> Result<(), ExecutorError> {
        tracing::info!(
            name = %segment.name,
            start = segment.start,
            end = segment.end,
            frames = slice.frames(),
            "Exporting audio segment"
        );

        let name = segment.name.as_str();
        self.export_output(&slice, output, Some(name)).await
    }

    async fn load_source(&self, input: &Input) -> Result<AudioBuffer, ExecutorError> {
        let format = resolve_format(input.format.as_deref(), &input.source)?;
        if input.format.as_deref().is_none_or(str::is_empty) {
            tracing::info!(
                source = %input.source.redacted(),
                format = %format,
                "Detecting input format"
            );
        }

        let source_file = self.scratch.acquire(&format)?;

        self.loader.load(&input.source, source_file.path()).await?;

        let audio = self
            .engine
            .decode(source_file.path(), &format)
            .await
            .map_err(ExecutorError::DecodeFailed)?;

        tracing::debug!(
            frames = audio.frames(),
            sample_rate = audio.sample_rate(),
            channels = audio.channels(),
            duration_ms = audio.duration_ms(),
            "Audio decoded"
        );

        Ok(audio)
    }

    async fn export_output(
        &self,
        audio: &AudioBuffer,
        output: &Output,
        name: Option<&str>,
    ) -> Result<(), ExecutorError> {
        let destination = match name {
            Some(name) => output.destination.append_name(name),
            None => output.destination.clone(),
        };

        let format = self.output_format(output, &destination)?;
        let options = EncodeOptions::new(format, output.export.as_ref());

        let exported = self.scratch.acquire(&options.format)?;
        let file = exported.path();

        tracing::debug!(
            file = %file.display(),
            options = ?options,
            "Exporting audio starts"
        );

        self.engine
            .encode(audio, file, &options)
            .await
            .map_err(ExecutorError::EncodeFailed)?;

        tracing::info!(file = %file.display(), "Exporting audio completed");

        self.persister.persist(&destination, file).await?;

        tracing::info!(destination = %destination.redacted(), "Audio persisted");

        Ok(())
    }

    fn output_format(
        &self,
        output: &Output,
        destination: &Reference,
    ) -> Result<String, ExecutorError> {
        let explicit = output
            .export
            .as_ref()
            .and_then(|export| export.format.as_deref());

        match resolve_format(explicit, destination) {
            Ok(format) => {
                if explicit.is_none_or(str::is_empty) {
                    tracing::info!(
                        destination = %destination.redacted(),
                        format = %format,
                        "Detecting output format"
                    );
                }
                Ok(format)
            }
            Err(_) if output.export.is_none() => Ok(self.options.default_format.clone()),
            Err(e) => Err(e.into()),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ExecutorError {
    #[error("format undetermined: {0}")]
    FormatUndetermined(String),
    #[error("invalid reference: {0}")]
    InvalidReference(#[from] ReferenceError),
    #[error("invalid segment: {0}")]
    InvalidSegment(String),
    #[error("scratch storage: {0}")]
    Scratch(#[from] io::Error),
    #[error("load failed: {0}")]
    LoadFailed(#[from] LoaderError),
    #[error("decode failed: {0}")]
    DecodeFailed(#[source] AudioEngineError),
    #[error("encode failed: {0}")]
    EncodeFailed(#[source] AudioEngineError),
    #[error("persist failed: {0}")]
    PersistFailed(#[from] PersisterError),
}

impl ExecutorError {
    /// Malformed requests; replaying them cannot succeed.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::FormatUndetermined(_)
                | Self::InvalidReference(_)
                | Self::InvalidSegment(_)
                | Self::EncodeFailed(AudioEngineError::InvalidOptions(_))
        )
    }
}

impl From<FormatError> for ExecutorError {
    fn from(err: FormatError) -> Self {
        match err {
            FormatError::Undetermined(reference) => Self::FormatUndetermined(reference),
            FormatError::InvalidReference(e) => Self::InvalidReference(e),
        }
    }
}
