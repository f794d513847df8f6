use crate::domain_model::{Session, UserId};
use crate::domain_port::{IdentityError, IdentityProvider};

const TOKEN_PREFIX: &str = "fake-session:";
const EMAIL_TOKEN_PREFIX: &str = "fake-email:";

#[derive(Debug, Default)]
pub struct FakeIdentityProvider;

impl FakeIdentityProvider {
    pub fn new() -> Self {
        Self
    }

    pub fn issue_token(uid: &UserId) -> String {
        format!("{TOKEN_PREFIX}{uid}")
    }

    /// Token that signs in by email; the uid is derived from the address.
    pub fn issue_email_token(email: &str) -> String {
        format!("{EMAIL_TOKEN_PREFIX}{}", email.trim())
    }

    /// Stable uid for an email address, the way the hosted provider would assign one.
    pub fn uid_for_email(email: &str) -> UserId {
        let normalized = email.trim().to_lowercase();
        UserId(
            uuid::Uuid::new_v5(&uuid::Uuid::NAMESPACE_OID, normalized.as_bytes())
                .simple()
                .to_string(),
        )
    }
}

// Minimal fake: any well-formed token is a live session.
#[async_trait::async_trait]
impl IdentityProvider for FakeIdentityProvider {
    async fn resolve_session(&self, token: &str) -> Result<Session, IdentityError> {
        let token = token.trim();
        if token.is_empty() {
            return Err(IdentityError::Unauthenticated);
        }
        if let Some(email) = token.strip_prefix(EMAIL_TOKEN_PREFIX) {
            if !email.contains('@') {
                return Err(IdentityError::TokenInvalid);
            }
            return Ok(Session {
                uid: Self::uid_for_email(email),
            });
        }
        let uid = token
            .strip_prefix(TOKEN_PREFIX)
            .ok_or(IdentityError::TokenInvalid)?
            .parse::<UserId>()
            .map_err(|_| IdentityError::TokenInvalid)?;
        Ok(Session { uid })
    }
}
