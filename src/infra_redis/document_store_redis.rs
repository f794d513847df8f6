use crate::domain_port::*;
use redis::AsyncCommands;
use redis::aio::ConnectionManager;
use std::collections::HashMap;

/// Hash field written alongside every document so empty documents still exist.
const PRESENCE_FIELD: &str = "__present";

/// Documents are hashes of JSON-encoded field values under
/// `{prefix}:doc:{path}`; each collection keeps a set of its document ids
/// under `{prefix}:col:{collection}` for queries.
pub struct RedisDocumentStore {
    conn: ConnectionManager,
    prefix: String,
}

impl RedisDocumentStore {
    pub fn new(conn: ConnectionManager, prefix: impl Into<String>) -> Self {
        RedisDocumentStore {
            conn,
            prefix: prefix.into(),
        }
    }

    fn doc_key(&self, path: &DocPath) -> String {
        format!("{}:doc:{}", self.prefix, path)
    }

    fn collection_key(&self, collection: &CollectionPath) -> String {
        format!("{}:col:{}", self.prefix, collection)
    }

    async fn load(&self, path: &DocPath) -> Result<Option<Document>, StoreError> {
        let mut conn = self.conn.clone();
        let fields: HashMap<String, String> = conn
            .hgetall(self.doc_key(path))
            .await
            .map_err(unavailable)?;
        if fields.is_empty() {
            return Ok(None);
        }

        let mut doc = Document::new();
        for (name, raw) in fields {
            if name == PRESENCE_FIELD {
                continue;
            }
            let value = serde_json::from_str(&raw)
                .map_err(|e| StoreError::Malformed(format!("{path}.{name}: {e}")))?;
            doc.insert(name, value);
        }
        Ok(Some(doc))
    }
}

fn unavailable(e: redis::RedisError) -> StoreError {
    StoreError::Unavailable(e.to_string())
}

fn encode_fields(doc: &Document) -> Vec<(String, String)> {
    let mut fields: Vec<(String, String)> = doc
        .iter()
        .map(|(name, value)| (name.clone(), value.to_string()))
        .collect();
    fields.push((PRESENCE_FIELD.to_owned(), "true".to_owned()));
    fields
}

#[async_trait::async_trait]
impl DocumentStore for RedisDocumentStore {
    async fn get(
        &self,
        _caller: &Principal,
        path: &DocPath,
    ) -> Result<Option<Document>, StoreError> {
        self.load(path).await
    }

    async fn set(
        &self,
        _caller: &Principal,
        path: &DocPath,
        doc: Document,
        mode: WriteMode,
    ) -> Result<(), StoreError> {
        let key = self.doc_key(path);
        let fields = encode_fields(&doc);
        let mut conn = self.conn.clone();

        let mut pipe = redis::pipe();
        pipe.atomic();
        if mode == WriteMode::Replace {
            pipe.del(&key).ignore();
        }
        pipe.hset_multiple(&key, &fields)
            .ignore()
            .sadd(self.collection_key(&path.collection), &path.id)
            .ignore();
        let _: () = pipe.query_async(&mut conn).await.map_err(unavailable)?;
        Ok(())
    }

    async fn delete(&self, _caller: &Principal, path: &DocPath) -> Result<(), StoreError> {
        let mut conn = self.conn.clone();
        let _: () = redis::pipe()
            .atomic()
            .del(self.doc_key(path))
            .ignore()
            .srem(self.collection_key(&path.collection), &path.id)
            .ignore()
            .query_async(&mut conn)
            .await
            .map_err(unavailable)?;
        Ok(())
    }

    async fn query(
        &self,
        _caller: &Principal,
        collection: &CollectionPath,
        filters: &[FieldFilter],
    ) -> Result<Vec<(String, Document)>, StoreError> {
        let mut conn = self.conn.clone();
        let ids: Vec<String> = conn
            .smembers(self.collection_key(collection))
            .await
            .map_err(unavailable)?;

        let mut hits = Vec::new();
        for id in ids {
            let path = collection.doc(id.as_str());
            // index entries can outlive a document removed by another writer
            let Some(doc) = self.load(&path).await? else {
                continue;
            };
            if filters.iter().all(|f| f.matches(&doc)) {
                hits.push((id, doc));
            }
        }
        Ok(hits)
    }
}
