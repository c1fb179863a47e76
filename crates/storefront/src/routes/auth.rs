//! Mock code login API.
//!
//! `send-code` issues a one-time code for an email; `verify-code` checks it.
//! Neither endpoint consults the user directory: that check belongs to the
//! login flow calling them.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use vitrine_core::Email;

use crate::auth::AuthError;
use crate::error::{AppError, Result, add_breadcrumb};
use crate::state::AppState;

// =============================================================================
// Request/Response Types
// =============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct SendCodeRequest {
    pub email: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct VerifyCodeRequest {
    pub email: Option<String>,
    pub code: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SendCodeResponse {
    pub ok: bool,
    /// Issued code, only when echoing is enabled for development.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct OkResponse {
    pub ok: bool,
}

fn body<T>(payload: std::result::Result<Json<T>, JsonRejection>) -> Result<T> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| AppError::BadRequest(rejection.body_text()))
}

fn required(value: Option<String>, name: &'static str) -> Result<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or(AppError::Auth(AuthError::MissingParameter(name)))
}

// =============================================================================
// Handlers
// =============================================================================

/// `POST /api/auth/send-code` `{email}` → `{ok, code?}`.
#[tracing::instrument(skip(state, payload))]
pub async fn send_code(
    State(state): State<AppState>,
    payload: std::result::Result<Json<SendCodeRequest>, JsonRejection>,
) -> Result<Json<SendCodeResponse>> {
    let request = body(payload)?;
    let email = Email::parse(&required(request.email, "email")?).map_err(AuthError::from)?;

    let code = state.codes().issue(&email).await;
    add_breadcrumb(
        "auth",
        "Login code requested",
        &[("email_domain", email.domain())],
    );

    Ok(Json(SendCodeResponse {
        ok: true,
        code: state
            .codes()
            .echo_codes()
            .then(|| code.expose_secret().to_string()),
    }))
}

/// `POST /api/auth/verify-code` `{email, code}` → `{ok}`, or 401 when the code
/// is wrong or expired.
#[tracing::instrument(skip(state, payload))]
pub async fn verify_code(
    State(state): State<AppState>,
    payload: std::result::Result<Json<VerifyCodeRequest>, JsonRejection>,
) -> Result<Json<OkResponse>> {
    let request = body(payload)?;
    let email = required(request.email, "email")?;
    let code = required(request.code, "code")?;

    // An unparseable email can never have a pending code.
    let email = Email::parse(&email).map_err(|_| AuthError::CodeMismatch)?;
    state.codes().verify(&email, &code).await?;
    add_breadcrumb(
        "auth",
        "Login code verified",
        &[("email_domain", email.domain())],
    );

    Ok(Json(OkResponse { ok: true }))
}
