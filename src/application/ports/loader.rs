use std::io;
use std::path::Path;

use async_trait::async_trait;

use crate::domain::Reference;

/// Copies the object behind a reference into a local scratch file.
#[async_trait]
pub trait Loader: Send + Sync {
    async fn load(&self, reference: &Reference, destination: &Path) -> Result<(), LoaderError>;
}

#[derive(Debug, thiserror::Error)]
pub enum LoaderError {
    #[error("object not found: {0}")]
    NotFound(String),
    #[error("unsupported reference: {0}")]
    UnsupportedReference(String),
    #[error("download failed: {0}")]
    DownloadFailed(String),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}
