use std::collections::HashMap;
use std::sync::Arc;

use object_store::local::LocalFileSystem;
use object_store::path::{Path as StorePath, PathPart};
use object_store::{ObjectStore, parse_url_opts};
use url::Url;

use crate::domain::{PosixPath, Reference};

/// A store together with the key of one object inside it.
pub struct ResolvedObject {
    pub store: Arc<dyn ObjectStore>,
    pub path: StorePath,
}

#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error("invalid object path {path}: {reason}")]
    InvalidPath { path: String, reason: String },
    #[error("cannot build store for {url}: {reason}")]
    StoreUnavailable { url: String, reason: String },
    #[error("cannot resolve relative path: {0}")]
    WorkingDirectory(#[from] std::io::Error),
}

struct DefaultStore {
    store: Arc<dyn ObjectStore>,
    url: Option<Url>,
    prefix: StorePath,
}

/// Maps references onto object stores.
///
/// Path references live in the default store when one is configured, and on
/// the local filesystem otherwise. URL references use the default store when
/// scheme and authority match it, and a store built from the URL otherwise.
pub struct StoreResolver {
    default: Option<DefaultStore>,
    local: Arc<LocalFileSystem>,
    client_options: HashMap<String, String>,
}

impl StoreResolver {
    pub fn new(client_options: HashMap<String, String>) -> Self {
        Self {
            default: None,
            local: Arc::new(LocalFileSystem::new()),
            client_options,
        }
    }

    /// Uses the store behind `url` as default; the URL path becomes a key
    /// prefix for path references.
    pub fn with_default_url(mut self, url: &Url) -> Result<Self, ResolveError> {
        let (store, prefix) =
            parse_url_opts(url, &self.client_options).map_err(|e| ResolveError::StoreUnavailable {
                url: Reference::Url(url.clone()).redacted(),
                reason: e.to_string(),
            })?;

        self.default = Some(DefaultStore {
            store: Arc::from(store),
            url: Some(url.clone()),
            prefix,
        });
        Ok(self)
    }

    pub fn with_default_store(mut self, store: Arc<dyn ObjectStore>, prefix: StorePath) -> Self {
        self.default = Some(DefaultStore {
            store,
            url: None,
            prefix,
        });
        self
    }

    pub fn has_default_store(&self) -> bool {
        self.default.is_some()
    }

    pub fn resolve(&self, reference: &Reference) -> Result<ResolvedObject, ResolveError> {
        match reference {
            Reference::Path(path) => self.resolve_path(path),
            Reference::Url(url) => self.resolve_url(url),
        }
    }

    fn resolve_path(&self, path: &PosixPath) -> Result<ResolvedObject, ResolveError> {
        if let Some(default) = &self.default {
            let parts = default
                .prefix
                .parts()
                .chain(path.segments().iter().map(|s| PathPart::from(s.as_str())));
            return Ok(ResolvedObject {
                store: Arc::clone(&default.store),
                path: StorePath::from_iter(parts),
            });
        }

        let display = path.to_string();
        let absolute = if path.is_absolute() {
            std::path::PathBuf::from(&display)
        } else {
            std::env::current_dir()?.join(&display)
        };

        let key = StorePath::from_absolute_path(&absolute).map_err(|e| ResolveError::InvalidPath {
            path: display,
            reason: e.to_string(),
        })?;

        Ok(ResolvedObject {
            store: Arc::clone(&self.local) as Arc<dyn ObjectStore>,
            path: key,
        })
    }

    fn resolve_url(&self, url: &Url) -> Result<ResolvedObject, ResolveError> {
        let default = self
            .default
            .as_ref()
            .filter(|d| same_authority(d.url.as_ref(), url));
        if let Some(default) = default {
            let path =
                StorePath::from_url_path(url.path()).map_err(|e| ResolveError::InvalidPath {
                    path: url.path().to_string(),
                    reason: e.to_string(),
                })?;
            return Ok(ResolvedObject {
                store: Arc::clone(&default.store),
                path,
            });
        }

        let (store, path) =
            parse_url_opts(url, &self.client_options).map_err(|e| ResolveError::StoreUnavailable {
                url: Reference::Url(url.clone()).redacted(),
                reason: e.to_string(),
            })?;

        Ok(ResolvedObject {
            store: Arc::from(store),
            path,
        })
    }
}

fn same_authority(default: Option<&Url>, url: &Url) -> bool {
    default.is_some_and(|d| {
        d.scheme() == url.scheme() && d.host_str() == url.host_str() && d.port() == url.port()
    })
}
