use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use futures::StreamExt;
use object_store::{PutPayload, WriteMultipart};
use tokio::io::{AsyncReadExt, AsyncWriteExt};

use crate::application::ports::{Loader, LoaderError, Persister, PersisterError};
use crate::domain::Reference;

use super::store_resolver::StoreResolver;

/// Files at or below this size are uploaded with a single PUT.
pub const DEFAULT_MULTIPART_THRESHOLD: u64 = 10 * 1024 * 1024;

const READ_CHUNK_SIZE: usize = 1024 * 1024;
const MAX_IN_FLIGHT_PARTS: usize = 4;

/// [`Loader`] and [`Persister`] over any `object_store` backend.
pub struct ObjectStoreTransfer {
    resolver: Arc<StoreResolver>,
    multipart_threshold: u64,
}

impl ObjectStoreTransfer {
    pub fn new(resolver: Arc<StoreResolver>) -> Self {
        Self {
            resolver,
            multipart_threshold: DEFAULT_MULTIPART_THRESHOLD,
        }
    }

    pub fn with_multipart_threshold(mut self, bytes: u64) -> Self {
        self.multipart_threshold = bytes;
        self
    }
}

#[async_trait]
impl Loader for ObjectStoreTransfer {
    async fn load(&self, reference: &Reference, destination: &Path) -> Result<(), LoaderError> {
        let object = self
            .resolver
            .resolve(reference)
            .map_err(|e| LoaderError::UnsupportedReference(e.to_string()))?;

        let result = object.store.get(&object.path).await.map_err(|e| match e {
            object_store::Error::NotFound { .. } => LoaderError::NotFound(reference.redacted()),
            other => LoaderError::DownloadFailed(other.to_string()),
        })?;

        let mut file = tokio::fs::File::create(destination).await?;
        let mut stream = result.into_stream();
        let mut total_bytes: u64 = 0;

        while let Some(chunk) = stream.next().await {
            let bytes = chunk.map_err(|e| LoaderError::DownloadFailed(e.to_string()))?;
            total_bytes += bytes.len() as u64;
            file.write_all(&bytes).await?;
        }
        file.flush().await?;

        tracing::debug!(
            reference = %reference.redacted(),
            file = %destination.display(),
            bytes = total_bytes,
            "Object loaded"
        );

        Ok(())
    }
}

#[async_trait]
impl Persister for ObjectStoreTransfer {
    async fn persist(&self, reference: &Reference, source: &Path) -> Result<(), PersisterError> {
        let object = self
            .resolver
            .resolve(reference)
            .map_err(|e| PersisterError::UnsupportedReference(e.to_string()))?;

        let size = tokio::fs::metadata(source).await?.len();

        if size <= self.multipart_threshold {
            let data = Bytes::from(tokio::fs::read(source).await?);
            object
                .store
                .put(&object.path, PutPayload::from(data))
                .await
                .map_err(|e| PersisterError::UploadFailed(e.to_string()))?;
        } else {
            let upload = object
                .store
                .put_multipart(&object.path)
                .await
                .map_err(|e| PersisterError::UploadFailed(e.to_string()))?;
            let mut writer = WriteMultipart::new(upload);
            let mut file = tokio::fs::File::open(source).await?;
            let mut buf = vec![0u8; READ_CHUNK_SIZE];

            loop {
                let read = match file.read(&mut buf).await {
                    Ok(0) => break,
                    Ok(n) => n,
                    Err(e) => {
                        let _ = writer.abort().await;
                        return Err(PersisterError::Io(e));
                    }
                };

                if let Err(e) = writer.wait_for_capacity(MAX_IN_FLIGHT_PARTS).await {
                    let _ = writer.abort().await;
                    return Err(PersisterError::UploadFailed(e.to_string()));
                }
                writer.write(&buf[..read]);
            }

            writer
                .finish()
                .await
                .map_err(|e| PersisterError::UploadFailed(e.to_string()))?;
        }

        tracing::debug!(
            reference = %reference.redacted(),
            file = %source.display(),
            bytes = size,
            "Object persisted"
        );

        Ok(())
    }
}
