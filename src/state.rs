//! Application state management

use std::sync::Arc;

use crate::config::Config;
use crate::document::DocumentService;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: Config,
    document: DocumentService,
}

impl AppState {
    pub fn new(config: Config, document: DocumentService) -> Self {
        Self {
            inner: Arc::new(AppStateInner { config, document }),
        }
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    /// Get the document service
    pub fn document(&self) -> &DocumentService {
        &self.inner.document
    }

    /// Release document caches before the process exits
    pub fn shutdown(&self) {
        tracing::info!("Shutting down application state...");
        self.inner.document.shutdown();
    }
}
