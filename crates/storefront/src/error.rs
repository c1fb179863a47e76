//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures errors to Sentry before
//! responding to the client. All route handlers should return `Result<T, AppError>`.
//! Bodies are JSON: `{"error": "<message>"}`.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::auth::AuthError;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Authentication operation failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),
}

impl AppError {
    const fn is_server_error(&self) -> bool {
        match self {
            Self::Auth(err) => err.is_transport(),
            Self::BadRequest(_) => false,
        }
    }

    const fn status(&self) -> StatusCode {
        match self {
            Self::Auth(err) => match err {
                AuthError::CodeMismatch | AuthError::CodeExpired => StatusCode::UNAUTHORIZED,
                AuthError::UnknownEmail(_) => StatusCode::NOT_FOUND,
                AuthError::ResendTooSoon { .. } => StatusCode::TOO_MANY_REQUESTS,
                AuthError::WrongStep(_) => StatusCode::CONFLICT,
                AuthError::Directory(_) | AuthError::Transport(_) => StatusCode::BAD_GATEWAY,
                AuthError::InvalidEmailFormat
                | AuthError::InvalidEmail(_)
                | AuthError::InvalidCodeFormat
                | AuthError::MissingParameter(_) => StatusCode::BAD_REQUEST,
            },
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }

    // Don't expose internal error details to clients
    fn public_message(&self) -> String {
        match self {
            Self::Auth(err) => match err {
                AuthError::CodeMismatch | AuthError::CodeExpired => {
                    "Code is wrong or has expired".to_string()
                }
                AuthError::MissingParameter(name) => format!("Missing parameter: {name}"),
                AuthError::InvalidEmailFormat | AuthError::InvalidEmail(_) => {
                    "Invalid email address".to_string()
                }
                AuthError::Directory(_) | AuthError::Transport(_) => {
                    "External service error".to_string()
                }
                other => capitalize(&other.to_string()),
            },
            Self::BadRequest(msg) => msg.clone(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Capture server errors to Sentry
        if self.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let status = self.status();
        let body = Json(json!({ "error": self.public_message() }));
        (status, body).into_response()
    }
}

fn capitalize(message: &str) -> String {
    let mut chars = message.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context from a user ID.
///
/// Call this after successful authentication to associate errors with users.
pub fn set_sentry_user(user_id: &impl ToString, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

/// Add a breadcrumb for user actions.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of user actions
/// leading up to an error.
pub fn add_breadcrumb(category: &str, message: &str, data: &[(&str, &str)]) {
    sentry::add_breadcrumb(breadcrumb(category, message, data));
}

fn breadcrumb(category: &str, message: &str, data: &[(&str, &str)]) -> sentry::Breadcrumb {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    for (key, value) in data {
        breadcrumb.data.insert(
            (*key).to_string(),
            serde_json::Value::String((*value).to_string()),
        );
    }

    breadcrumb
}
