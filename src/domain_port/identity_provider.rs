use crate::domain_model::Session;

#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    #[error("no active session")]
    Unauthenticated,
    #[error("session token invalid")]
    TokenInvalid,
    #[error("identity provider unavailable: {0}")]
    Unavailable(String),
}

/// Hosted sign-in service. Only session resolution is needed here.
#[async_trait::async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn resolve_session(&self, token: &str) -> Result<Session, IdentityError>;
}
