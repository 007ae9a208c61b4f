mod audio_engine;
mod loader;
mod persister;

pub use audio_engine::{AudioEngine, AudioEngineError, EncodeOptions};
pub use loader::{Loader, LoaderError};
pub use persister::{Persister, PersisterError};
