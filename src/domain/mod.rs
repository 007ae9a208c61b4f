mod audio_buffer;
mod format;
mod reference;
mod request;

pub use audio_buffer::{AudioBuffer, DEFAULT_BITS_PER_SAMPLE};
pub use format::{FormatError, resolve_format};
pub use reference::{PosixPath, Reference, ReferenceError};
pub use request::{ExportOptions, ExportRequest, Input, Output, Segment, SegmentRequest};
