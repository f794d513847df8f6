use crate::domain_model::*;
use crate::domain_port::*;
use std::sync::Arc;

pub struct DocRelationshipStore {
    store: Arc<dyn DocumentStore>,
}

impl DocRelationshipStore {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        DocRelationshipStore { store }
    }

    async fn query_records(
        &self,
        caller: &Principal,
        owner: &UserId,
        filters: &[FieldFilter],
    ) -> Result<Vec<RelationshipRecord>, StoreError> {
        let collection = CollectionPath::friends_of(owner);
        let docs = self.store.query(caller, &collection, filters).await?;

        let mut records = Vec::with_capacity(docs.len());
        for (id, doc) in docs {
            let path = collection.doc(id);
            match decode::<RelationshipRecord>(&path, doc) {
                Ok(record) => records.push(record),
                Err(e) => tracing::warn!("skipping relationship record: {e}"),
            }
        }
        Ok(records)
    }
}

#[async_trait::async_trait]
impl RelationshipStore for DocRelationshipStore {
    async fn get(
        &self,
        caller: &Principal,
        owner: &UserId,
        peer: &UserId,
    ) -> Result<Option<RelationshipRecord>, StoreError> {
        let path = DocPath::relationship(owner, peer);
        match self.store.get(caller, &path).await? {
            Some(doc) => Ok(Some(decode(&path, doc)?)),
            None => Ok(None),
        }
    }

    async fn put(
        &self,
        caller: &Principal,
        owner: &UserId,
        peer: &UserId,
        record: &RelationshipRecord,
        merge_existing: bool,
    ) -> Result<(), StoreError> {
        let path = DocPath::relationship(owner, peer);
        let mode = if merge_existing {
            WriteMode::Merge
        } else {
            WriteMode::Replace
        };
        self.store.set(caller, &path, encode(record)?, mode).await
    }

    async fn delete(
        &self,
        caller: &Principal,
        owner: &UserId,
        peer: &UserId,
    ) -> Result<(), StoreError> {
        self.store
            .delete(caller, &DocPath::relationship(owner, peer))
            .await
    }

    async fn list_by_status(
        &self,
        caller: &Principal,
        owner: &UserId,
        status: RelationshipStatus,
        requester_filter: Option<bool>,
    ) -> Result<Vec<RelationshipRecord>, StoreError> {
        let mut filters = vec![FieldFilter::eq("status", status.as_str())];
        if let Some(is_requester) = requester_filter {
            filters.push(FieldFilter::eq("isRequester", is_requester));
        }
        self.query_records(caller, owner, &filters).await
    }

    async fn list_all(
        &self,
        caller: &Principal,
        owner: &UserId,
    ) -> Result<Vec<RelationshipRecord>, StoreError> {
        self.query_records(caller, owner, &[]).await
    }
}
