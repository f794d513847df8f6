use crate::domain_model::*;
use crate::domain_port::*;
use std::sync::Arc;

pub struct DocLibraryStore {
    store: Arc<dyn DocumentStore>,
}

impl DocLibraryStore {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        DocLibraryStore { store }
    }
}

#[async_trait::async_trait]
impl LibraryStore for DocLibraryStore {
    async fn put_book(
        &self,
        caller: &Principal,
        owner: &UserId,
        book: &Book,
    ) -> Result<(), StoreError> {
        let path = CollectionPath::library_of(owner).doc(book.id.0.as_str());
        self.store
            .set(caller, &path, encode(book)?, WriteMode::Merge)
            .await
    }

    async fn delete_book(
        &self,
        caller: &Principal,
        owner: &UserId,
        book: &BookId,
    ) -> Result<(), StoreError> {
        let path = CollectionPath::library_of(owner).doc(book.0.as_str());
        self.store.delete(caller, &path).await
    }

    async fn list_books(
        &self,
        caller: &Principal,
        owner: &UserId,
    ) -> Result<Vec<Book>, StoreError> {
        let collection = CollectionPath::library_of(owner);
        let docs = self.store.query(caller, &collection, &[]).await?;

        let mut books = Vec::with_capacity(docs.len());
        for (id, mut doc) in docs {
            // older documents were written without an `id` field
            doc.entry("id").or_insert_with(|| id.clone().into());
            match decode::<Book>(&collection.doc(id), doc) {
                Ok(book) => books.push(book),
                Err(e) => tracing::warn!("skipping library entry: {e}"),
            }
        }
        Ok(books)
    }
}
