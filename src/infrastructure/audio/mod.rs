pub mod audio_decoder;
mod ffmpeg;
mod ffmpeg_audio_engine;
pub mod wav_writer;

pub use ffmpeg::{check_ffmpeg_binary, encode_args, to_wav_args};
pub use ffmpeg_audio_engine::{DEFAULT_FFMPEG_BINARY, FfmpegAudioEngine};
