use crate::domain_model::*;
use crate::domain_port::*;
use std::sync::Arc;

pub struct DocUserDirectory {
    store: Arc<dyn DocumentStore>,
}

impl DocUserDirectory {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        DocUserDirectory { store }
    }

    async fn query_profiles(
        &self,
        caller: &Principal,
        filters: &[FieldFilter],
    ) -> Result<Vec<Profile>, StoreError> {
        let collection = CollectionPath::users();
        let docs = self.store.query(caller, &collection, filters).await?;

        let mut profiles = Vec::with_capacity(docs.len());
        for (id, doc) in docs {
            match decode::<Profile>(&collection.doc(id), doc) {
                Ok(profile) => profiles.push(profile),
                Err(e) => tracing::warn!("skipping profile: {e}"),
            }
        }
        Ok(profiles)
    }
}

#[async_trait::async_trait]
impl UserDirectory for DocUserDirectory {
    async fn get_profile(
        &self,
        caller: &Principal,
        uid: &UserId,
    ) -> Result<Option<Profile>, StoreError> {
        let path = DocPath::profile(uid);
        match self.store.get(caller, &path).await? {
            Some(doc) => Ok(Some(decode(&path, doc)?)),
            None => Ok(None),
        }
    }

    async fn put_profile(
        &self,
        caller: &Principal,
        profile: &Profile,
        merge_existing: bool,
    ) -> Result<(), StoreError> {
        let mode = if merge_existing {
            WriteMode::Merge
        } else {
            WriteMode::Replace
        };
        self.store
            .set(caller, &DocPath::profile(&profile.uid), encode(profile)?, mode)
            .await
    }

    async fn find_by_nickname(
        &self,
        caller: &Principal,
        nickname_lower: &str,
    ) -> Result<Vec<Profile>, StoreError> {
        self.query_profiles(caller, &[FieldFilter::eq("nicknameLower", nickname_lower)])
            .await
    }

    async fn search_prefix(
        &self,
        caller: &Principal,
        prefix: &str,
    ) -> Result<Vec<Profile>, StoreError> {
        let upper = format!("{prefix}{PREFIX_RANGE_SUFFIX}");
        self.query_profiles(
            caller,
            &[
                FieldFilter::gte("nicknameLower", prefix),
                FieldFilter::lte("nicknameLower", upper),
            ],
        )
        .await
    }

    async fn list_all(&self, caller: &Principal) -> Result<Vec<Profile>, StoreError> {
        self.query_profiles(caller, &[]).await
    }
}
