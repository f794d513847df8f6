use crate::domain_port::*;
use dashmap::DashMap;

/// Process-local document store. Single documents are updated atomically;
/// like the hosted store, nothing spans two documents.
#[derive(Default)]
pub struct MemoryDocumentStore {
    docs: DashMap<DocPath, Document>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.docs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }
}

#[async_trait::async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn get(
        &self,
        _caller: &Principal,
        path: &DocPath,
    ) -> Result<Option<Document>, StoreError> {
        Ok(self.docs.get(path).map(|doc| doc.value().clone()))
    }

    async fn set(
        &self,
        _caller: &Principal,
        path: &DocPath,
        doc: Document,
        mode: WriteMode,
    ) -> Result<(), StoreError> {
        match mode {
            WriteMode::Replace => {
                self.docs.insert(path.clone(), doc);
            }
            WriteMode::Merge => {
                let mut existing = self.docs.entry(path.clone()).or_default();
                existing.extend(doc);
            }
        }
        Ok(())
    }

    async fn delete(&self, _caller: &Principal, path: &DocPath) -> Result<(), StoreError> {
        self.docs.remove(path);
        Ok(())
    }

    async fn query(
        &self,
        _caller: &Principal,
        collection: &CollectionPath,
        filters: &[FieldFilter],
    ) -> Result<Vec<(String, Document)>, StoreError> {
        let hits = self
            .docs
            .iter()
            .filter(|entry| &entry.key().collection == collection)
            .filter(|entry| filters.iter().all(|f| f.matches(entry.value())))
            .map(|entry| (entry.key().id.clone(), entry.value().clone()))
            .collect();
        Ok(hits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(value: serde_json::Value) -> Document {
        value.as_object().cloned().unwrap()
    }

    #[tokio::test]
    async fn merge_keeps_unspecified_fields_and_replace_drops_them() {
        let store = MemoryDocumentStore::new();
        let path = CollectionPath::users().doc("u1");
        let caller = Principal::Service;

        store
            .set(&caller, &path, doc(json!({ "a": 1, "b": 2 })), WriteMode::Replace)
            .await
            .unwrap();
        store
            .set(&caller, &path, doc(json!({ "b": 3 })), WriteMode::Merge)
            .await
            .unwrap();
        assert_eq!(
            store.get(&caller, &path).await.unwrap(),
            Some(doc(json!({ "a": 1, "b": 3 })))
        );

        store
            .set(&caller, &path, doc(json!({ "c": 4 })), WriteMode::Replace)
            .await
            .unwrap();
        assert_eq!(
            store.get(&caller, &path).await.unwrap(),
            Some(doc(json!({ "c": 4 })))
        );
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let store = MemoryDocumentStore::new();
        let path = CollectionPath::users().doc("ghost");
        store.delete(&Principal::Service, &path).await.unwrap();
        store.delete(&Principal::Service, &path).await.unwrap();
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn query_is_scoped_to_one_collection() {
        let store = MemoryDocumentStore::new();
        let caller = Principal::Service;
        let mine = CollectionPath::friends_of(&"a".into());
        let theirs = CollectionPath::friends_of(&"b".into());
        store
            .set(&caller, &mine.doc("x"), doc(json!({ "status": "pending" })), WriteMode::Replace)
            .await
            .unwrap();
        store
            .set(&caller, &theirs.doc("y"), doc(json!({ "status": "pending" })), WriteMode::Replace)
            .await
            .unwrap();

        let hits = store
            .query(&caller, &mine, &[FieldFilter::eq("status", "pending")])
            .await
            .unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].0, "x");
    }
}
