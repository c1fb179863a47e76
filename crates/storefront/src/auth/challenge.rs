//! The request-code / verify-code seam of the login flow.

use std::future::Future;

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::{error, instrument};
use url::Url;
use vitrine_core::Email;

use super::AuthError;

/// Outcome of a code request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CodeDelivery {
    /// The issued code, when the service echoes it for development.
    pub echoed_code: Option<String>,
}

/// Issues and checks one-time login codes.
pub trait CodeChallenge: Send + Sync {
    /// Issue a code for `email`, replacing any pending one.
    fn send_code(&self, email: &Email)
    -> impl Future<Output = Result<CodeDelivery, AuthError>> + Send;

    /// Check `code` against the pending code for `email`.
    fn verify_code(
        &self,
        email: &Email,
        code: &str,
    ) -> impl Future<Output = Result<(), AuthError>> + Send;
}

#[derive(Debug, Serialize)]
struct SendCodeBody<'a> {
    email: &'a str,
}

#[derive(Debug, Serialize)]
struct VerifyCodeBody<'a> {
    email: &'a str,
    code: &'a str,
}

#[derive(Debug, Deserialize)]
struct SendCodeReply {
    #[serde(default)]
    code: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorReply {
    error: String,
}

/// [`CodeChallenge`] over the storefront's `/api/auth` endpoints.
#[derive(Debug, Clone)]
pub struct HttpCodeChallenge {
    client: reqwest::Client,
    send_url: Url,
    verify_url: Url,
}

impl HttpCodeChallenge {
    /// Challenge against the server at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns an error if the endpoint URLs cannot be built from `base_url`.
    pub fn new(base_url: &Url) -> Result<Self, url::ParseError> {
        Ok(Self {
            client: reqwest::Client::new(),
            send_url: base_url.join("/api/auth/send-code")?,
            verify_url: base_url.join("/api/auth/verify-code")?,
        })
    }

    async fn post<B: Serialize + Sync>(
        &self,
        url: &Url,
        body: &B,
    ) -> Result<(StatusCode, String), AuthError> {
        let response = self.client.post(url.clone()).json(body).send().await?;
        let status = response.status();
        let text = response.text().await?;
        Ok((status, text))
    }
}

/// Map a non-success reply onto the error the server reported.
fn reply_error(status: StatusCode, body: &str) -> AuthError {
    let message = serde_json::from_str::<ErrorReply>(body)
        .map_or_else(|_| body.chars().take(200).collect(), |reply| reply.error);

    match status {
        StatusCode::UNAUTHORIZED => AuthError::CodeMismatch,
        StatusCode::BAD_REQUEST => AuthError::Transport(format!("request rejected: {message}")),
        _ => {
            error!(status = %status, message = %message, "Code service returned non-success status");
            AuthError::Transport(format!("HTTP {status}: {message}"))
        }
    }
}

impl CodeChallenge for HttpCodeChallenge {
    #[instrument(skip(self), fields(email = %email))]
    async fn send_code(&self, email: &Email) -> Result<CodeDelivery, AuthError> {
        let body = SendCodeBody {
            email: email.as_str(),
        };
        let (status, text) = self.post(&self.send_url, &body).await?;
        if !status.is_success() {
            return Err(reply_error(status, &text));
        }

        let reply: SendCodeReply =
            serde_json::from_str(&text).map_err(|e| AuthError::Transport(e.to_string()))?;
        Ok(CodeDelivery {
            echoed_code: reply.code,
        })
    }

    #[instrument(skip(self, code), fields(email = %email))]
    async fn verify_code(&self, email: &Email, code: &str) -> Result<(), AuthError> {
        let body = VerifyCodeBody {
            email: email.as_str(),
            code,
        };
        let (status, text) = self.post(&self.verify_url, &body).await?;
        if status.is_success() {
            Ok(())
        } else {
            Err(reply_error(status, &text))
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_unauthorized_is_lookup_miss() {
        let err = reply_error(
            StatusCode::UNAUTHORIZED,
            r#"{"error":"Code is wrong or has expired"}"#,
        );
        assert!(err.is_lookup_miss());
    }

    #[test]
    fn test_other_statuses_are_transport() {
        let err = reply_error(StatusCode::BAD_REQUEST, r#"{"error":"Missing parameter: email"}"#);
        assert!(err.is_transport());
        assert!(err.to_string().contains("Missing parameter: email"));

        let err = reply_error(StatusCode::BAD_GATEWAY, "upstream down");
        assert!(err.to_string().contains("502"));
    }

    #[test]
    fn test_endpoint_urls() {
        let base = Url::parse("http://127.0.0.1:3000").unwrap();
        let challenge = HttpCodeChallenge::new(&base).unwrap();
        assert_eq!(
            challenge.verify_url.as_str(),
            "http://127.0.0.1:3000/api/auth/verify-code"
        );
    }
}
