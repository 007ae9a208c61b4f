use std::sync::Arc;

use crate::application::services::Executor;

#[derive(Clone)]
pub struct AppState {
    pub executor: Arc<Executor>,
    pub service_name: String,
}

impl AppState {
    pub fn new(executor: Arc<Executor>, service_name: impl Into<String>) -> Self {
        Self {
            executor,
            service_name: service_name.into(),
        }
    }
}
