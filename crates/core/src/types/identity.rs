//! Authenticated identity.

use serde::{Deserialize, Serialize};

use crate::{Email, UserId};

/// A user record from the remote directory, and the identity stored for the
/// active session once that user has logged in.
///
/// Serialized in camelCase so the persisted session entry matches the
/// directory's wire shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub id: UserId,
    pub email: Email,
    pub first_name: String,
    pub last_name: String,
}

impl Identity {
    /// "First Last", skipping empty parts.
    #[must_use]
    pub fn display_name(&self) -> String {
        [self.first_name.as_str(), self.last_name.as_str()]
            .into_iter()
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_camel_case_roundtrip() {
        let json = r#"{"id":1,"email":"emily.johnson@x.dummyjson.com","firstName":"Emily","lastName":"Johnson"}"#;
        let identity: Identity = serde_json::from_str(json).unwrap();
        assert_eq!(identity.display_name(), "Emily Johnson");
        assert_eq!(serde_json::to_string(&identity).unwrap(), json);
    }

    #[test]
    fn test_display_name_skips_empty() {
        let identity = Identity {
            id: UserId::new(2),
            email: Email::parse("solo@example.com").unwrap(),
            first_name: "Solo".to_string(),
            last_name: String::new(),
        };
        assert_eq!(identity.display_name(), "Solo");
    }
}
