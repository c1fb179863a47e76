//! Authentication error types.

use thiserror::Error;
use vitrine_core::EmailError;

use crate::catalog::CatalogError;

/// Errors that can occur during the code login.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Email rejected by the login form pattern.
    #[error("invalid email address")]
    InvalidEmailFormat,

    /// Email could not be parsed.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    /// Code is not six digits.
    #[error("code must be 6 digits")]
    InvalidCodeFormat,

    /// Request body lacked a required field.
    #[error("missing parameter: {0}")]
    MissingParameter(&'static str),

    /// No user record has this email.
    #[error("no account found for {0}")]
    UnknownEmail(String),

    /// Submitted code differs from the pending one, or none is pending.
    #[error("code is wrong or has expired")]
    CodeMismatch,

    /// Pending code outlived its validity window.
    #[error("code is wrong or has expired")]
    CodeExpired,

    /// Resend requested before the countdown finished.
    #[error("wait {remaining_secs}s before requesting a new code")]
    ResendTooSoon { remaining_secs: u64 },

    /// Operation does not apply to the current login step.
    #[error("{0} is not available at this step")]
    WrongStep(&'static str),

    /// User directory could not be queried.
    #[error("user directory error: {0}")]
    Directory(#[from] CatalogError),

    /// Code service could not be reached or answered unexpectedly.
    #[error("code service error: {0}")]
    Transport(String),
}

impl AuthError {
    /// Unknown email or wrong/expired code: retryable, the login step stays put.
    #[must_use]
    pub const fn is_lookup_miss(&self) -> bool {
        matches!(
            self,
            Self::UnknownEmail(_) | Self::CodeMismatch | Self::CodeExpired
        )
    }

    /// Rejected before reaching any service.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::InvalidEmailFormat
                | Self::InvalidEmail(_)
                | Self::InvalidCodeFormat
                | Self::MissingParameter(_)
        )
    }

    /// Directory or code service failure.
    #[must_use]
    pub const fn is_transport(&self) -> bool {
        matches!(self, Self::Directory(_) | Self::Transport(_))
    }
}

impl From<reqwest::Error> for AuthError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(err.to_string())
    }
}
