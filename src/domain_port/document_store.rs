use crate::domain_model::UserId;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::cmp::Ordering;
use std::fmt;

/// A stored document: a flat JSON object of native field values.
pub type Document = serde_json::Map<String, Value>;

pub const USERS: &str = "users";
pub const FRIENDS: &str = "friends";
pub const LIBRARY: &str = "library";

/// Slash-separated collection path, e.g. `users/{uid}/friends`.
#[derive(Debug, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct CollectionPath(String);

impl CollectionPath {
    pub fn users() -> Self {
        CollectionPath(USERS.to_owned())
    }

    pub fn friends_of(owner: &UserId) -> Self {
        CollectionPath(format!("{USERS}/{owner}/{FRIENDS}"))
    }

    pub fn library_of(owner: &UserId) -> Self {
        CollectionPath(format!("{USERS}/{owner}/{LIBRARY}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn segments(&self) -> Vec<&str> {
        self.0.split('/').collect()
    }

    pub fn doc(&self, id: impl Into<String>) -> DocPath {
        DocPath {
            collection: self.clone(),
            id: id.into(),
        }
    }
}

impl fmt::Display for CollectionPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct DocPath {
    pub collection: CollectionPath,
    pub id: String,
}

impl DocPath {
    pub fn profile(uid: &UserId) -> Self {
        CollectionPath::users().doc(uid.as_str())
    }

    pub fn relationship(owner: &UserId, peer: &UserId) -> Self {
        CollectionPath::friends_of(owner).doc(peer.as_str())
    }
}

impl fmt::Display for DocPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.collection, self.id)
    }
}

/// Who is issuing a store call. Rule layers check `User`; `Service` is trusted.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Principal {
    User(UserId),
    Service,
}

impl Principal {
    pub fn user(&self) -> Option<&UserId> {
        match self {
            Principal::User(uid) => Some(uid),
            Principal::Service => None,
        }
    }
}

impl fmt::Display for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Principal::User(uid) => write!(f, "user:{uid}"),
            Principal::Service => f.write_str("service"),
        }
    }
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum WriteMode {
    /// Replace the whole document.
    Replace,
    /// Overwrite only the fields present in the written document.
    Merge,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum FilterOp {
    Eq,
    Gte,
    Lte,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldFilter {
    pub field: String,
    pub op: FilterOp,
    pub value: Value,
}

impl FieldFilter {
    pub fn eq(field: &str, value: impl Into<Value>) -> Self {
        FieldFilter {
            field: field.to_owned(),
            op: FilterOp::Eq,
            value: value.into(),
        }
    }

    pub fn gte(field: &str, value: impl Into<Value>) -> Self {
        FieldFilter {
            field: field.to_owned(),
            op: FilterOp::Gte,
            value: value.into(),
        }
    }

    pub fn lte(field: &str, value: impl Into<Value>) -> Self {
        FieldFilter {
            field: field.to_owned(),
            op: FilterOp::Lte,
            value: value.into(),
        }
    }

    /// Missing fields and values of a different type never match.
    pub fn matches(&self, doc: &Document) -> bool {
        let Some(actual) = doc.get(&self.field) else {
            return false;
        };
        match self.op {
            FilterOp::Eq => actual == &self.value,
            FilterOp::Gte => matches!(
                compare_scalars(actual, &self.value),
                Some(Ordering::Greater | Ordering::Equal)
            ),
            FilterOp::Lte => matches!(
                compare_scalars(actual, &self.value),
                Some(Ordering::Less | Ordering::Equal)
            ),
        }
    }
}

fn compare_scalars(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
        (Value::Number(a), Value::Number(b)) => a.as_f64()?.partial_cmp(&b.as_f64()?),
        _ => None,
    }
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error("permission denied: {0}")]
    PermissionDenied(String),
    #[error("malformed document: {0}")]
    Malformed(String),
}

/// Generic hosted document store. Each call is atomic for a single document;
/// there is no cross-document transaction.
#[async_trait::async_trait]
pub trait DocumentStore: Send + Sync {
    async fn get(&self, caller: &Principal, path: &DocPath) -> Result<Option<Document>, StoreError>;

    async fn set(
        &self,
        caller: &Principal,
        path: &DocPath,
        doc: Document,
        mode: WriteMode,
    ) -> Result<(), StoreError>;

    /// Deleting an absent document succeeds.
    async fn delete(&self, caller: &Principal, path: &DocPath) -> Result<(), StoreError>;

    /// Returns `(document id, document)` pairs in store-defined order.
    async fn query(
        &self,
        caller: &Principal,
        collection: &CollectionPath,
        filters: &[FieldFilter],
    ) -> Result<Vec<(String, Document)>, StoreError>;
}

pub fn encode<T: Serialize>(value: &T) -> Result<Document, StoreError> {
    match serde_json::to_value(value).map_err(|e| StoreError::Malformed(e.to_string()))? {
        Value::Object(map) => Ok(map),
        other => Err(StoreError::Malformed(format!(
            "expected an object, got {other}"
        ))),
    }
}

pub fn decode<T: DeserializeOwned>(path: &DocPath, doc: Document) -> Result<T, StoreError> {
    serde_json::from_value(Value::Object(doc))
        .map_err(|e| StoreError::Malformed(format!("{path}: {e}")))
}
