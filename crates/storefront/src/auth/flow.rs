//! Two-step email/code login state machine.
//!
//! ```text
//! AwaitingEmail --submit_email--> AwaitingCode --submit_code--> Authenticated
//!       ^                            |    ^  |
//!       +------------back------------+    +--+ resend (after countdown)
//! ```

use std::sync::{Arc, LazyLock};

use regex::Regex;
use tokio::sync::watch;
use tracing::{info, warn};
use vitrine_core::{Email, Identity};

use super::challenge::{CodeChallenge, CodeDelivery};
use super::countdown::{Countdown, RESEND_COOLDOWN_SECS};
use super::directory::UserDirectory;
use super::AuthError;
use crate::session::SessionState;

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9_.+-]+@[a-zA-Z0-9-]+\.[a-zA-Z0-9.-]+$").expect("Invalid regex")
});

static CODE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{6}$").expect("Invalid regex"));

/// Where the login flow stands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginStep {
    AwaitingEmail,
    /// A code was sent to the matched user.
    AwaitingCode { user: Identity },
    /// Session logged in; the flow is closed.
    Authenticated { user: Identity },
}

/// Drives one login attempt against a user directory and a code challenge,
/// logging the session in on success.
pub struct LoginFlow<D, C> {
    directory: D,
    challenge: C,
    session: Arc<SessionState>,
    step: LoginStep,
    countdown: Option<Countdown>,
    cooldown_secs: u64,
}

impl<D: UserDirectory, C: CodeChallenge> LoginFlow<D, C> {
    #[must_use]
    pub const fn new(directory: D, challenge: C, session: Arc<SessionState>) -> Self {
        Self {
            directory,
            challenge,
            session,
            step: LoginStep::AwaitingEmail,
            countdown: None,
            cooldown_secs: RESEND_COOLDOWN_SECS,
        }
    }

    /// Override the resend cooldown.
    #[must_use]
    pub fn with_cooldown(mut self, secs: u64) -> Self {
        self.cooldown_secs = secs;
        self
    }

    #[must_use]
    pub const fn step(&self) -> &LoginStep {
        &self.step
    }

    /// Whether the flow has finished.
    #[must_use]
    pub const fn is_closed(&self) -> bool {
        matches!(self.step, LoginStep::Authenticated { .. })
    }

    /// Seconds until a resend is accepted, while awaiting a code.
    #[must_use]
    pub fn resend_in(&self) -> Option<u64> {
        self.countdown.as_ref().map(Countdown::remaining)
    }

    /// Countdown ticks, while awaiting a code.
    #[must_use]
    pub fn countdown(&self) -> Option<watch::Receiver<u64>> {
        self.countdown.as_ref().map(Countdown::subscribe)
    }

    /// Request a code for `email`.
    ///
    /// # Errors
    ///
    /// Returns a validation error for a malformed email,
    /// [`AuthError::UnknownEmail`] if no user has it, or a transport error if
    /// the directory or code service fails. The step is unchanged on error.
    pub async fn submit_email(&mut self, email: &str) -> Result<CodeDelivery, AuthError> {
        if self.step != LoginStep::AwaitingEmail {
            return Err(AuthError::WrongStep("submitting an email"));
        }

        let email = email.trim();
        if !EMAIL_RE.is_match(email) {
            return Err(AuthError::InvalidEmailFormat);
        }
        let email = Email::parse(email)?;

        let user = self
            .directory
            .find_by_email(email.as_str())
            .await?
            .ok_or_else(|| AuthError::UnknownEmail(email.to_string()))?;

        let delivery = self.challenge.send_code(&user.email).await?;
        info!(user_id = %user.id, "Login code requested");

        self.step = LoginStep::AwaitingCode { user };
        self.countdown = Some(Countdown::start(self.cooldown_secs));
        Ok(delivery)
    }

    /// Submit the received code. On success the session is logged in and the
    /// flow closes.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidCodeFormat`] unless `code` is six digits, a
    /// lookup miss for a wrong or expired code, or a transport error. The step
    /// is unchanged on error.
    pub async fn submit_code(&mut self, code: &str) -> Result<Identity, AuthError> {
        let LoginStep::AwaitingCode { user } = &self.step else {
            return Err(AuthError::WrongStep("submitting a code"));
        };

        let code = code.trim();
        if !CODE_RE.is_match(code) {
            return Err(AuthError::InvalidCodeFormat);
        }

        self.challenge.verify_code(&user.email, code).await?;

        let user = user.clone();
        if let Err(e) = self.session.login(user.clone()) {
            warn!(user_id = %user.id, error = %e, "Session active but not persisted");
        }

        self.countdown = None;
        self.step = LoginStep::Authenticated { user: user.clone() };
        Ok(user)
    }

    /// Issue a new code for the pending email and restart the countdown.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::ResendTooSoon`] while the countdown runs, or a
    /// transport error from the code service.
    pub async fn resend(&mut self) -> Result<CodeDelivery, AuthError> {
        let LoginStep::AwaitingCode { user } = &self.step else {
            return Err(AuthError::WrongStep("resending a code"));
        };

        if let Some(remaining_secs) = self.resend_in().filter(|secs| *secs > 0) {
            return Err(AuthError::ResendTooSoon { remaining_secs });
        }

        let delivery = self.challenge.send_code(&user.email).await?;
        info!(user_id = %user.id, "Login code resent");

        self.countdown = Some(Countdown::start(self.cooldown_secs));
        Ok(delivery)
    }

    /// Return to the email step, stopping the countdown.
    ///
    /// Returns `false` when not awaiting a code.
    pub fn back(&mut self) -> bool {
        if !matches!(self.step, LoginStep::AwaitingCode { .. }) {
            return false;
        }
        self.countdown = None;
        self.step = LoginStep::AwaitingEmail;
        true
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use vitrine_core::{MemoryStore, UserId};

    use super::*;
    use crate::auth::{CodeService, StaticDirectory};
    use crate::config::AuthConfig;

    fn flow() -> LoginFlow<StaticDirectory, CodeService> {
        let directory = StaticDirectory::new(vec![Identity {
            id: UserId::new(1),
            email: Email::parse("user@example.com").unwrap(),
            first_name: "Test".to_string(),
            last_name: "User".to_string(),
        }]);
        let codes = CodeService::new(&AuthConfig {
            code_ttl: Duration::from_secs(300),
            echo_codes: true,
        });
        let session = Arc::new(SessionState::restore(Arc::new(MemoryStore::new())));
        LoginFlow::new(directory, codes, session)
    }

    #[test]
    fn test_email_pattern() {
        assert!(EMAIL_RE.is_match("first.last+tag@mail-host.co.uk"));
        assert!(!EMAIL_RE.is_match("user@localhost"));
        assert!(!EMAIL_RE.is_match("user name@example.com"));
    }

    #[tokio::test]
    async fn test_malformed_email_stays_put() {
        let mut flow = flow();
        let err = flow.submit_email("not-an-email").await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidEmailFormat));
        assert_eq!(flow.step(), &LoginStep::AwaitingEmail);
    }

    #[tokio::test]
    async fn test_unknown_email_issues_no_code() {
        let mut flow = flow();
        let err = flow.submit_email("stranger@example.com").await.unwrap_err();
        assert!(err.is_lookup_miss());
        assert_eq!(flow.step(), &LoginStep::AwaitingEmail);
        assert!(flow.resend_in().is_none());
    }

    #[tokio::test]
    async fn test_wrong_code_then_right_code() {
        let mut flow = flow();
        let code = flow
            .submit_email("USER@example.com")
            .await
            .unwrap()
            .echoed_code
            .unwrap();
        assert!(matches!(flow.step(), LoginStep::AwaitingCode { .. }));

        let wrong = if code == "111111" { "222222" } else { "111111" };
        let err = flow.submit_code(wrong).await.unwrap_err();
        assert!(err.is_lookup_miss());
        assert!(matches!(flow.step(), LoginStep::AwaitingCode { .. }));

        let user = flow.submit_code(&code).await.unwrap();
        assert_eq!(user.id, UserId::new(1));
        assert!(flow.is_closed());
        assert_eq!(flow.session.user_id(), Some(UserId::new(1)));
        assert!(flow.resend_in().is_none());
    }

    #[tokio::test]
    async fn test_code_must_be_six_digits() {
        let mut flow = flow();
        flow.submit_email("user@example.com").await.unwrap();
        assert!(matches!(
            flow.submit_code("12345").await,
            Err(AuthError::InvalidCodeFormat)
        ));
        assert!(matches!(
            flow.submit_code("12a456").await,
            Err(AuthError::InvalidCodeFormat)
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_resend_waits_for_countdown() {
        let mut flow = flow();
        flow.submit_email("user@example.com").await.unwrap();
        assert_eq!(flow.resend_in(), Some(60));
        assert!(matches!(
            flow.resend().await,
            Err(AuthError::ResendTooSoon { remaining_secs: 60 })
        ));

        tokio::time::sleep(Duration::from_millis(60_500)).await;
        assert_eq!(flow.resend_in(), Some(0));
        let code = flow.resend().await.unwrap().echoed_code.unwrap();
        assert_eq!(flow.resend_in(), Some(60));

        flow.submit_code(&code).await.unwrap();
        assert!(flow.is_closed());
    }

    #[tokio::test(start_paused = true)]
    async fn test_code_outlives_resend_countdown() {
        let mut flow = flow();
        let code = flow
            .submit_email("user@example.com")
            .await
            .unwrap()
            .echoed_code
            .unwrap();

        tokio::time::sleep(Duration::from_secs(90)).await;
        assert_eq!(flow.resend_in(), Some(0));

        let user = flow.submit_code(&code).await.unwrap();
        assert_eq!(user.id, UserId::new(1));
        assert!(flow.is_closed());
    }

    #[tokio::test]
    async fn test_back_returns_to_email_step() {
        let mut flow = flow();
        assert!(!flow.back());
        flow.submit_email("user@example.com").await.unwrap();
        assert!(flow.back());
        assert_eq!(flow.step(), &LoginStep::AwaitingEmail);
        assert!(flow.resend_in().is_none());
        assert!(matches!(
            flow.submit_code("123456").await,
            Err(AuthError::WrongStep(_))
        ));
    }
}
