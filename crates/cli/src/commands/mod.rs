//! Command implementations and the context they share.

pub mod account;
pub mod cart;
pub mod catalog;
pub mod checkout;

use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;
use url::Url;
use vitrine_core::{Email, StoreError};
use vitrine_storefront::auth::{
    AuthError, CodeChallenge, CodeDelivery, CodeService, HttpCodeChallenge,
};
use vitrine_storefront::catalog::{CatalogClient, CatalogError};
use vitrine_storefront::checkout::CheckoutError;
use vitrine_storefront::config::{AuthConfig, CatalogConfig, ConfigError};
use vitrine_storefront::shop::Shop;
use vitrine_storefront::store::FileStore;

/// Errors that end a command.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Checkout(#[from] CheckoutError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Invalid server URL: {0}")]
    ServerUrl(#[from] url::ParseError),

    #[error("Failed to read input: {0}")]
    Input(#[from] std::io::Error),

    #[error("Not logged in. Run `vitrine login <email>` first")]
    NotLoggedIn,

    #[error("Login aborted")]
    Aborted,
}

/// Where login codes come from.
#[derive(Debug, Clone)]
pub enum Challenge {
    /// Codes issued by this process and shown on the terminal.
    Local(CodeService),
    /// Codes issued by a storefront server.
    Remote(HttpCodeChallenge),
}

impl CodeChallenge for Challenge {
    async fn send_code(&self, email: &Email) -> Result<CodeDelivery, AuthError> {
        match self {
            Self::Local(service) => service.send_code(email).await,
            Self::Remote(http) => http.send_code(email).await,
        }
    }

    async fn verify_code(&self, email: &Email, code: &str) -> Result<(), AuthError> {
        match self {
            Self::Local(service) => service.verify_code(email, code).await,
            Self::Remote(http) => http.verify_code(email, code).await,
        }
    }
}

/// Store-backed shop plus the remote services a command may need.
pub struct Context {
    pub shop: Shop,
    pub catalog: CatalogClient,
    pub challenge: Challenge,
}

impl Context {
    /// Open the file store under `data_dir` and connect the catalog and code
    /// services.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog settings in the environment are invalid
    /// or `server` cannot be used as a base URL.
    pub fn open(
        data_dir: PathBuf,
        catalog_url: Option<Url>,
        server: Option<Url>,
    ) -> Result<Self, CliError> {
        let mut catalog_config = CatalogConfig::from_env()?;
        if let Some(url) = catalog_url {
            catalog_config.base_url = url;
        }

        let challenge = match server {
            Some(url) => Challenge::Remote(HttpCodeChallenge::new(&url)?),
            // Nothing can deliver an email from here, so the code is shown
            None => Challenge::Local(CodeService::new(&AuthConfig {
                echo_codes: true,
                ..AuthConfig::default()
            })),
        };

        tracing::debug!(data_dir = %data_dir.display(), "Opening store");
        Ok(Self {
            shop: Shop::open(Arc::new(FileStore::new(data_dir))),
            catalog: CatalogClient::new(&catalog_config),
            challenge,
        })
    }
}
