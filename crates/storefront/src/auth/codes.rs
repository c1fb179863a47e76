//! In-memory one-time code store.
//!
//! One pending code per email (keyed case-insensitively), overwritten on every
//! issue. Codes expire after the configured window; `moka` evicts them on the
//! same TTL.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use rand::Rng;
use secrecy::{ExposeSecret, SecretString};
use tokio::time::Instant;
use tracing::{debug, info, instrument};
use vitrine_core::Email;

use super::AuthError;
use super::challenge::{CodeChallenge, CodeDelivery};
use crate::config::AuthConfig;

struct PendingCode {
    code: SecretString,
    expires_at: Instant,
}

/// Issues and verifies login codes.
#[derive(Clone)]
pub struct CodeService {
    inner: Arc<CodeServiceInner>,
}

struct CodeServiceInner {
    codes: Cache<String, Arc<PendingCode>>,
    ttl: Duration,
    echo_codes: bool,
}

impl CodeService {
    #[must_use]
    pub fn new(config: &AuthConfig) -> Self {
        let codes = Cache::builder()
            .max_capacity(10_000)
            .time_to_live(config.code_ttl)
            .build();

        Self {
            inner: Arc::new(CodeServiceInner {
                codes,
                ttl: config.code_ttl,
                echo_codes: config.echo_codes,
            }),
        }
    }

    /// Whether issued codes may be returned to the requester.
    #[must_use]
    pub fn echo_codes(&self) -> bool {
        self.inner.echo_codes
    }

    #[must_use]
    pub fn code_ttl(&self) -> Duration {
        self.inner.ttl
    }

    /// Issue a fresh code for `email`, replacing any pending one.
    #[instrument(skip(self), fields(email = %email))]
    pub async fn issue(&self, email: &Email) -> SecretString {
        let code = generate_code();
        let pending = PendingCode {
            code: SecretString::from(code.clone()),
            expires_at: Instant::now() + self.inner.ttl,
        };
        self.inner
            .codes
            .insert(email.normalized(), Arc::new(pending))
            .await;

        info!("Issued login code");
        if self.inner.echo_codes {
            debug!(code = %code, "Login code (dev echo)");
        }
        SecretString::from(code)
    }

    /// Check `code` against the pending code for `email`.
    ///
    /// A successful check leaves the code in place; the next issue replaces it.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::CodeExpired`] if the pending code is past its
    /// window, or [`AuthError::CodeMismatch`] if none is pending or it differs.
    #[instrument(skip(self, code), fields(email = %email))]
    pub async fn verify(&self, email: &Email, code: &str) -> Result<(), AuthError> {
        let pending = self
            .inner
            .codes
            .get(&email.normalized())
            .await
            .ok_or(AuthError::CodeMismatch)?;

        if Instant::now() >= pending.expires_at {
            debug!("Login code expired");
            return Err(AuthError::CodeExpired);
        }

        if pending.code.expose_secret() != code.trim() {
            debug!("Login code mismatch");
            return Err(AuthError::CodeMismatch);
        }

        info!("Login code verified");
        Ok(())
    }
}

impl std::fmt::Debug for CodeService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CodeService")
            .field("ttl", &self.inner.ttl)
            .field("echo_codes", &self.inner.echo_codes)
            .finish_non_exhaustive()
    }
}

/// In-process challenge, used when the login flow and code store share a process.
impl CodeChallenge for CodeService {
    async fn send_code(&self, email: &Email) -> Result<CodeDelivery, AuthError> {
        let code = self.issue(email).await;
        Ok(CodeDelivery {
            echoed_code: self
                .echo_codes()
                .then(|| code.expose_secret().to_string()),
        })
    }

    async fn verify_code(&self, email: &Email, code: &str) -> Result<(), AuthError> {
        self.verify(email, code).await
    }
}

/// Generate a 6-digit login code.
#[must_use]
pub fn generate_code() -> String {
    let code: u32 = rand::rng().random_range(100_000..1_000_000);
    code.to_string()
}
