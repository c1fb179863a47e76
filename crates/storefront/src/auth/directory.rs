//! User lookup by email.

use std::future::Future;

use vitrine_core::Identity;

use super::AuthError;
use crate::catalog::CatalogClient;

/// Resolves an email to a known user, ignoring case.
pub trait UserDirectory: Send + Sync {
    fn find_by_email(
        &self,
        email: &str,
    ) -> impl Future<Output = Result<Option<Identity>, AuthError>> + Send;
}

impl UserDirectory for CatalogClient {
    async fn find_by_email(&self, email: &str) -> Result<Option<Identity>, AuthError> {
        Ok(self.find_user(email).await?)
    }
}

/// Fixed in-memory user list.
#[derive(Debug, Clone, Default)]
pub struct StaticDirectory {
    users: Vec<Identity>,
}

impl StaticDirectory {
    #[must_use]
    pub const fn new(users: Vec<Identity>) -> Self {
        Self { users }
    }
}

impl UserDirectory for StaticDirectory {
    async fn find_by_email(&self, email: &str) -> Result<Option<Identity>, AuthError> {
        Ok(self
            .users
            .iter()
            .find(|identity| identity.email.eq_ignore_case(email.trim()))
            .cloned())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use vitrine_core::{Email, UserId};

    use super::*;

    #[tokio::test]
    async fn test_static_lookup_ignores_case() {
        let directory = StaticDirectory::new(vec![Identity {
            id: UserId::new(1),
            email: Email::parse("emily.johnson@x.dummyjson.com").unwrap(),
            first_name: "Emily".to_string(),
            last_name: "Johnson".to_string(),
        }]);

        let found = directory
            .find_by_email("Emily.Johnson@X.dummyjson.com")
            .await
            .unwrap();
        assert_eq!(found.map(|i| i.id), Some(UserId::new(1)));
        assert!(
            directory
                .find_by_email("nobody@example.com")
                .await
                .unwrap()
                .is_none()
        );
    }
}
