use crate::domain_model::*;
use crate::domain_port::{Principal, StoreError};

#[async_trait::async_trait]
pub trait LibraryStore: Send + Sync {
    /// Merge write, so re-saving a book keeps fields the catalog no longer returns.
    async fn put_book(&self, caller: &Principal, owner: &UserId, book: &Book)
    -> Result<(), StoreError>;

    async fn delete_book(
        &self,
        caller: &Principal,
        owner: &UserId,
        book: &BookId,
    ) -> Result<(), StoreError>;

    async fn list_books(&self, caller: &Principal, owner: &UserId)
    -> Result<Vec<Book>, StoreError>;
}
