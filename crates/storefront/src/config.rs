//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All variables are optional.
//!
//! - `VITRINE_HOST` - Bind address (default: 127.0.0.1)
//! - `VITRINE_PORT` - Listen port (default: 3000)
//! - `VITRINE_CATALOG_URL` - Remote product/user API (default: <https://dummyjson.com>)
//! - `VITRINE_CATALOG_CACHE_SECS` - Catalog response cache TTL (default: 300)
//! - `VITRINE_CODE_TTL_SECS` - Login code validity window (default: 300)
//! - `VITRINE_ECHO_CODES` - Echo issued codes in responses, development only (default: false)
//! - `VITRINE_DATA_DIR` - Root of the file-backed store (default: .vitrine)
//! - `VITRINE_LOG_FORMAT` - `pretty` or `json` (default: pretty)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Error event sample rate (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Transaction sample rate (default: 0.0)

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;
use url::Url;

use crate::telemetry::LogFormat;

const DEFAULT_CATALOG_URL: &str = "https://dummyjson.com";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Remote catalog configuration
    pub catalog: CatalogConfig,
    /// Mock code login configuration
    pub auth: AuthConfig,
    /// Root directory of the file-backed store
    pub data_dir: PathBuf,
    /// Log output format
    pub log_format: LogFormat,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
    /// Fraction of error events sent to Sentry
    pub sentry_sample_rate: f32,
    /// Fraction of transactions traced
    pub sentry_traces_sample_rate: f32,
}

/// Remote product and user directory API.
#[derive(Debug, Clone)]
pub struct CatalogConfig {
    /// Base URL, e.g. `https://dummyjson.com`
    pub base_url: Url,
    /// How long fetched catalog responses are reused
    pub cache_ttl: Duration,
}

/// Mock code login settings.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// How long an issued code can be verified
    pub code_ttl: Duration,
    /// Return issued codes in the send-code response
    pub echo_codes: bool,
}

impl Default for StorefrontConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::from([127, 0, 0, 1]),
            port: 3000,
            catalog: CatalogConfig::default(),
            auth: AuthConfig::default(),
            data_dir: PathBuf::from(".vitrine"),
            log_format: LogFormat::Pretty,
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 0.0,
        }
    }
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_url: default_catalog_url(),
            cache_ttl: Duration::from_secs(300),
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            code_ttl: Duration::from_secs(300),
            echo_codes: false,
        }
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let host = parse_env_or("VITRINE_HOST", IpAddr::from([127, 0, 0, 1]))?;
        let port = parse_env_or("VITRINE_PORT", 3000_u16)?;
        let data_dir = PathBuf::from(get_env_or_default("VITRINE_DATA_DIR", ".vitrine"));
        let log_format = parse_env_or("VITRINE_LOG_FORMAT", LogFormat::Pretty)?;

        Ok(Self {
            host,
            port,
            catalog: CatalogConfig::from_env()?,
            auth: AuthConfig::from_env()?,
            data_dir,
            log_format,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
            sentry_sample_rate: parse_env_or("SENTRY_SAMPLE_RATE", 1.0_f32)?,
            sentry_traces_sample_rate: parse_env_or("SENTRY_TRACES_SAMPLE_RATE", 0.0_f32)?,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl CatalogConfig {
    /// Load the catalog settings alone (used by the CLI).
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvVar` for an unparsable URL or TTL.
    pub fn from_env() -> Result<Self, ConfigError> {
        let base_url = match get_optional_env("VITRINE_CATALOG_URL") {
            Some(raw) => Url::parse(&raw).map_err(|e| {
                ConfigError::InvalidEnvVar("VITRINE_CATALOG_URL".to_string(), e.to_string())
            })?,
            None => default_catalog_url(),
        };
        let cache_secs = parse_env_or("VITRINE_CATALOG_CACHE_SECS", 300_u64)?;
        Ok(Self {
            base_url,
            cache_ttl: Duration::from_secs(cache_secs),
        })
    }
}

impl AuthConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let code_ttl_secs = parse_env_or("VITRINE_CODE_TTL_SECS", 300_u64)?;
        if code_ttl_secs == 0 {
            return Err(ConfigError::InvalidEnvVar(
                "VITRINE_CODE_TTL_SECS".to_string(),
                "must be greater than zero".to_string(),
            ));
        }
        let echo_codes = get_optional_env("VITRINE_ECHO_CODES")
            .map(|raw| parse_bool("VITRINE_ECHO_CODES", &raw))
            .transpose()?
            .unwrap_or(false);
        Ok(Self {
            code_ttl: Duration::from_secs(code_ttl_secs),
            echo_codes,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

fn default_catalog_url() -> Url {
    Url::parse(DEFAULT_CATALOG_URL).expect("Invalid default catalog URL")
}

/// Get an optional environment variable. Empty values count as unset.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    get_optional_env(key).unwrap_or_else(|| default.to_string())
}

/// Parse an environment variable, falling back to `default` when unset.
fn parse_env_or<T>(key: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    get_optional_env(key).map_or(Ok(default), |raw| {
        raw.trim()
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
    })
}

/// Accepts the usual spellings of a boolean flag.
fn parse_bool(key: &str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("expected a boolean, got '{other}'"),
        )),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bool_spellings() {
        assert!(parse_bool("X", "TRUE").unwrap());
        assert!(parse_bool("X", " yes ").unwrap());
        assert!(!parse_bool("X", "0").unwrap());
        assert!(!parse_bool("X", "off").unwrap());
    }

    #[test]
    fn test_parse_bool_rejects_garbage() {
        let err = parse_bool("VITRINE_ECHO_CODES", "maybe").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(name, _) if name == "VITRINE_ECHO_CODES"));
    }

    #[test]
    fn test_parse_env_or_default_when_unset() {
        let port = parse_env_or("VITRINE_TEST_SURELY_UNSET_PORT", 4242_u16).unwrap();
        assert_eq!(port, 4242);
    }

    #[test]
    fn test_defaults() {
        let auth = AuthConfig::default();
        assert_eq!(auth.code_ttl, Duration::from_secs(300));
        assert!(!auth.echo_codes);

        let catalog = CatalogConfig::default();
        assert_eq!(catalog.base_url.as_str(), "https://dummyjson.com/");
    }

    #[test]
    fn test_socket_addr() {
        let config = StorefrontConfig {
            host: "127.0.0.1".parse().unwrap(),
            port: 3000,
            catalog: CatalogConfig::default(),
            auth: AuthConfig::default(),
            data_dir: PathBuf::from(".vitrine"),
            log_format: LogFormat::Pretty,
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 0.0,
        };

        let addr = config.socket_addr();
        assert_eq!(addr.ip().to_string(), "127.0.0.1");
        assert_eq!(addr.port(), 3000);
    }
}
