//! Application state shared across handlers.

use std::sync::Arc;

use crate::auth::CodeService;
use crate::config::StorefrontConfig;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// the code store and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    codes: CodeService,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(config: StorefrontConfig) -> Self {
        let codes = CodeService::new(&config.auth);
        Self {
            inner: Arc::new(AppStateInner { config, codes }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the login code store.
    #[must_use]
    pub fn codes(&self) -> &CodeService {
        &self.inner.codes
    }
}
