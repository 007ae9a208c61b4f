mod environment;
mod settings;

pub use environment::Environment;
pub use settings::{AudioSettings, LoggingSettings, ServerSettings, Settings, StorageSettings};
