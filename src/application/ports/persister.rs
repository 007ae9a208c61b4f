use std::io;
use std::path::Path;

use async_trait::async_trait;

use crate::domain::Reference;

/// Copies a local scratch file to the object behind a reference.
#[async_trait]
pub trait Persister: Send + Sync {
    async fn persist(&self, reference: &Reference, source: &Path) -> Result<(), PersisterError>;
}

#[derive(Debug, thiserror::Error)]
pub enum PersisterError {
    #[error("unsupported reference: {0}")]
    UnsupportedReference(String),
    #[error("upload failed: {0}")]
    UploadFailed(String),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}
