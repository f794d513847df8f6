use crate::domain_model::*;
use crate::domain_port::StoreError;
use serde::Serialize;

#[derive(Debug, thiserror::Error)]
pub enum DirectoryError {
    #[error("store unavailable: {0}")]
    StoreUnavailable(String),
    #[error("permission denied: {0}")]
    PermissionDenied(String),
}

impl From<StoreError> for DirectoryError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::PermissionDenied(e) => DirectoryError::PermissionDenied(e),
            StoreError::Unavailable(e) | StoreError::Malformed(e) => {
                DirectoryError::StoreUnavailable(e)
            }
        }
    }
}

impl From<super::FriendshipError> for DirectoryError {
    fn from(err: super::FriendshipError) -> Self {
        if err.is_permission_denied() {
            DirectoryError::PermissionDenied(err.to_string())
        } else {
            DirectoryError::StoreUnavailable(err.to_string())
        }
    }
}

/// A user row annotated with the viewer's derived status and the actions it allows.
#[derive(Debug, Clone, Serialize)]
pub struct UserListing {
    pub uid: UserId,
    pub nickname: String,
    pub email: String,
    pub status: FriendStatus,
    pub actions: Vec<FriendAction>,
}

impl UserListing {
    pub fn new(profile: Profile, status: FriendStatus) -> Self {
        UserListing {
            nickname: profile.display_name().to_owned(),
            uid: profile.uid,
            email: profile.email,
            status,
            actions: FriendAction::available_for(status).to_vec(),
        }
    }
}

#[async_trait::async_trait]
pub trait DirectoryService: Send + Sync {
    async fn list_friends(&self, me: &UserId) -> Result<Vec<UserListing>, DirectoryError>;
    async fn list_incoming_requests(&self, me: &UserId)
    -> Result<Vec<UserListing>, DirectoryError>;
    /// Blank `term` lists every user.
    async fn search_users(&self, me: &UserId, term: &str)
    -> Result<Vec<UserListing>, DirectoryError>;
}
