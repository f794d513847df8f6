use crate::domain_model::*;
use crate::domain_port::{Principal, StoreError};

/// Profile documents keyed by uid, searchable on `nicknameLower`.
#[async_trait::async_trait]
pub trait UserDirectory: Send + Sync {
    async fn get_profile(
        &self,
        caller: &Principal,
        uid: &UserId,
    ) -> Result<Option<Profile>, StoreError>;

    async fn put_profile(
        &self,
        caller: &Principal,
        profile: &Profile,
        merge_existing: bool,
    ) -> Result<(), StoreError>;

    async fn find_by_nickname(
        &self,
        caller: &Principal,
        nickname_lower: &str,
    ) -> Result<Vec<Profile>, StoreError>;

    /// `nicknameLower` within `[prefix, prefix + U+F8FF]`.
    async fn search_prefix(
        &self,
        caller: &Principal,
        prefix: &str,
    ) -> Result<Vec<Profile>, StoreError>;

    async fn list_all(&self, caller: &Principal) -> Result<Vec<Profile>, StoreError>;
}
