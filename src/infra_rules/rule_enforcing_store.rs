use crate::domain_model::{RelationshipStatus, UserId};
use crate::domain_port::*;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
enum Access {
    Read,
    Write,
    List,
}

/// Access-rule layer in front of a backend, mirroring the hosted store's
/// security rules:
///
/// - `users/{uid}`: any signed-in user reads, only `uid` writes.
/// - `users/{owner}/friends/{peer}`: `owner` and `peer` read and write;
///   only `owner` lists the collection.
/// - `users/{owner}/library/*`: `owner` writes; `owner` and accepted
///   friends of `owner` read and list.
///
/// [`Principal::Service`] bypasses every rule.
pub struct RuleEnforcingStore {
    inner: Arc<dyn DocumentStore>,
}

impl RuleEnforcingStore {
    pub fn new(inner: Arc<dyn DocumentStore>) -> Self {
        RuleEnforcingStore { inner }
    }

    async fn authorize(
        &self,
        caller: &Principal,
        collection: &CollectionPath,
        doc_id: Option<&str>,
        access: Access,
    ) -> Result<(), StoreError> {
        let Some(uid) = caller.user() else {
            return Ok(());
        };
        let allowed = match (collection.segments().as_slice(), access) {
            ([USERS], Access::Read | Access::List) => true,
            ([USERS], Access::Write) => doc_id == Some(uid.as_str()),
            ([USERS, owner, FRIENDS], Access::List) => *owner == uid.as_str(),
            ([USERS, owner, FRIENDS], Access::Read | Access::Write) => {
                *owner == uid.as_str() || doc_id == Some(uid.as_str())
            }
            ([USERS, owner, LIBRARY], Access::Write) => *owner == uid.as_str(),
            ([USERS, owner, LIBRARY], Access::Read | Access::List) => {
                *owner == uid.as_str() || self.is_accepted_friend(owner, uid).await?
            }
            _ => false,
        };

        if allowed {
            Ok(())
        } else {
            let target = match doc_id {
                Some(id) => collection.doc(id).to_string(),
                None => collection.to_string(),
            };
            tracing::debug!(%caller, %target, ?access, "rule layer denied access");
            Err(StoreError::PermissionDenied(format!(
                "{caller} may not {} {target}",
                match access {
                    Access::Read => "read",
                    Access::Write => "write",
                    Access::List => "list",
                }
            )))
        }
    }

    async fn is_accepted_friend(&self, owner: &str, viewer: &UserId) -> Result<bool, StoreError> {
        let path = DocPath::relationship(&UserId::from(owner), viewer);
        let status = self
            .inner
            .get(&Principal::Service, &path)
            .await?
            .and_then(|doc| doc.get("status").cloned());
        Ok(status.as_ref().and_then(|s| s.as_str()) == Some(RelationshipStatus::Accepted.as_str()))
    }
}

#[async_trait::async_trait]
impl DocumentStore for RuleEnforcingStore {
    async fn get(
        &self,
        caller: &Principal,
        path: &DocPath,
    ) -> Result<Option<Document>, StoreError> {
        self.authorize(caller, &path.collection, Some(&path.id), Access::Read)
            .await?;
        self.inner.get(caller, path).await
    }

    async fn set(
        &self,
        caller: &Principal,
        path: &DocPath,
        doc: Document,
        mode: WriteMode,
    ) -> Result<(), StoreError> {
        self.authorize(caller, &path.collection, Some(&path.id), Access::Write)
            .await?;
        self.inner.set(caller, path, doc, mode).await
    }

    async fn delete(&self, caller: &Principal, path: &DocPath) -> Result<(), StoreError> {
        self.authorize(caller, &path.collection, Some(&path.id), Access::Write)
            .await?;
        self.inner.delete(caller, path).await
    }

    async fn query(
        &self,
        caller: &Principal,
        collection: &CollectionPath,
        filters: &[FieldFilter],
    ) -> Result<Vec<(String, Document)>, StoreError> {
        self.authorize(caller, collection, None, Access::List).await?;
        self.inner.query(caller, collection, filters).await
    }
}
