use crate::domain_model::*;
use crate::domain_port::{Principal, StoreError};

/// Typed accessor over `users/{owner}/friends/{peer}`.
#[async_trait::async_trait]
pub trait RelationshipStore: Send + Sync {
    async fn get(
        &self,
        caller: &Principal,
        owner: &UserId,
        peer: &UserId,
    ) -> Result<Option<RelationshipRecord>, StoreError>;

    /// With `merge_existing`, fields the record leaves unset keep their stored values.
    async fn put(
        &self,
        caller: &Principal,
        owner: &UserId,
        peer: &UserId,
        record: &RelationshipRecord,
        merge_existing: bool,
    ) -> Result<(), StoreError>;

    /// Idempotent.
    async fn delete(&self, caller: &Principal, owner: &UserId, peer: &UserId)
    -> Result<(), StoreError>;

    /// Order is store-defined.
    async fn list_by_status(
        &self,
        caller: &Principal,
        owner: &UserId,
        status: RelationshipStatus,
        requester_filter: Option<bool>,
    ) -> Result<Vec<RelationshipRecord>, StoreError>;

    /// Every record under `owner`, whatever its status.
    async fn list_all(
        &self,
        caller: &Principal,
        owner: &UserId,
    ) -> Result<Vec<RelationshipRecord>, StoreError>;
}
