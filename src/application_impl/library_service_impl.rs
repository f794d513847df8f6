use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::*;
use chrono::Utc;
use std::sync::Arc;

pub struct RealLibraryService {
    library: Arc<dyn LibraryStore>,
    friendships: Arc<dyn FriendshipService>,
}

impl RealLibraryService {
    pub fn new(library: Arc<dyn LibraryStore>, friendships: Arc<dyn FriendshipService>) -> Self {
        Self {
            library,
            friendships,
        }
    }

    async fn sorted_books(
        &self,
        caller: &Principal,
        owner: &UserId,
    ) -> Result<Vec<Book>, LibraryError> {
        let mut books = self.library.list_books(caller, owner).await?;
        sort_newest_first(&mut books);
        Ok(books)
    }
}

#[async_trait::async_trait]
impl LibraryService for RealLibraryService {
    async fn save_book(&self, me: &UserId, mut book: Book) -> Result<Book, LibraryError> {
        let id = book.id.0.trim();
        if id.is_empty() || id.contains('/') {
            return Err(LibraryError::Validation(format!("bad book id: {:?}", book.id.0)));
        }
        book.id = BookId(id.to_owned());
        if book.title.trim().is_empty() {
            book.title = "Untitled".to_string();
        }
        book.saved_at = Some(Utc::now());

        self.library
            .put_book(&Principal::User(me.clone()), me, &book)
            .await?;
        tracing::info!(%me, book = %book.id, "book saved to library");
        Ok(book)
    }

    async fn remove_book(&self, me: &UserId, book: &BookId) -> Result<(), LibraryError> {
        self.library
            .delete_book(&Principal::User(me.clone()), me, book)
            .await?;
        tracing::info!(%me, %book, "book removed from library");
        Ok(())
    }

    async fn list_books(&self, me: &UserId) -> Result<Vec<Book>, LibraryError> {
        self.sorted_books(&Principal::User(me.clone()), me).await
    }

    async fn count_books(&self, me: &UserId) -> Result<usize, LibraryError> {
        let books = self
            .library
            .list_books(&Principal::User(me.clone()), me)
            .await?;
        Ok(books.len())
    }

    async fn view_friend_library(
        &self,
        me: &UserId,
        friend: &UserId,
    ) -> Result<Vec<Book>, LibraryError> {
        if self.friendships.derive_status(me, friend).await? != FriendStatus::Friend {
            return Err(LibraryError::NotFriends(friend.clone()));
        }
        let books = self.sorted_books(&Principal::User(me.clone()), friend).await?;
        tracing::debug!(%me, %friend, count = books.len(), "loaded friend library");
        Ok(books)
    }
}
