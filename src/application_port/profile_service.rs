use crate::domain_model::*;
use crate::domain_port::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum ProfileError {
    #[error("invalid profile: {0}")]
    Validation(String),
    #[error("nickname is already taken")]
    NicknameTaken,
    #[error("profile already exists")]
    ProfileExists,
    #[error("profile not found")]
    NotFound,
    #[error("store unavailable: {0}")]
    StoreUnavailable(String),
    #[error("permission denied: {0}")]
    PermissionDenied(String),
}

impl From<StoreError> for ProfileError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::PermissionDenied(e) => ProfileError::PermissionDenied(e),
            StoreError::Unavailable(e) | StoreError::Malformed(e) => {
                ProfileError::StoreUnavailable(e)
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct ProfileInput {
    pub nickname: String,
    pub email: Option<String>,
}

#[async_trait::async_trait]
pub trait ProfileService: Send + Sync {
    async fn create_profile(&self, me: &UserId, input: ProfileInput)
    -> Result<Profile, ProfileError>;
    async fn update_profile(&self, me: &UserId, input: ProfileInput)
    -> Result<Profile, ProfileError>;
    async fn get_profile(&self, me: &UserId, uid: &UserId) -> Result<Profile, ProfileError>;
}
