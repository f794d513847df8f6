use crate::domain_model::*;
use crate::domain_port::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum LibraryError {
    #[error("invalid book: {0}")]
    Validation(String),
    #[error("not friends with {0}")]
    NotFriends(UserId),
    #[error("store unavailable: {0}")]
    StoreUnavailable(String),
    #[error("permission denied: {0}")]
    PermissionDenied(String),
}

impl From<StoreError> for LibraryError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::PermissionDenied(e) => LibraryError::PermissionDenied(e),
            StoreError::Unavailable(e) | StoreError::Malformed(e) => {
                LibraryError::StoreUnavailable(e)
            }
        }
    }
}

impl From<super::FriendshipError> for LibraryError {
    fn from(err: super::FriendshipError) -> Self {
        if err.is_permission_denied() {
            LibraryError::PermissionDenied(err.to_string())
        } else {
            LibraryError::StoreUnavailable(err.to_string())
        }
    }
}

#[async_trait::async_trait]
pub trait LibraryService: Send + Sync {
    async fn save_book(&self, me: &UserId, book: Book) -> Result<Book, LibraryError>;
    async fn remove_book(&self, me: &UserId, book: &BookId) -> Result<(), LibraryError>;
    /// Newest first.
    async fn list_books(&self, me: &UserId) -> Result<Vec<Book>, LibraryError>;
    async fn count_books(&self, me: &UserId) -> Result<usize, LibraryError>;
    async fn view_friend_library(
        &self,
        me: &UserId,
        friend: &UserId,
    ) -> Result<Vec<Book>, LibraryError>;
}
