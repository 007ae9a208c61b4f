use std::sync::Arc;

use url::Url;

use crate::presentation::config::StorageSettings;

use super::store_resolver::{ResolveError, StoreResolver};

pub struct StoreFactory;

impl StoreFactory {
    pub fn create(settings: &StorageSettings) -> Result<Arc<StoreResolver>, ResolveError> {
        let resolver = StoreResolver::new(settings.client_options.clone());

        let Some(raw) = settings.url.as_deref().filter(|u| !u.trim().is_empty()) else {
            tracing::info!("No default object store configured; path references are local files");
            return Ok(Arc::new(resolver));
        };

        let url = Url::parse(raw.trim()).map_err(|e| ResolveError::StoreUnavailable {
            url: raw.to_string(),
            reason: e.to_string(),
        })?;
        let resolver = resolver.with_default_url(&url)?;

        tracing::info!(
            scheme = url.scheme(),
            host = url.host_str().unwrap_or_default(),
            "Default object store configured"
        );

        Ok(Arc::new(resolver))
    }
}
