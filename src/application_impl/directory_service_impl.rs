use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::*;
use std::sync::Arc;

pub struct RealDirectoryService {
    directory: Arc<dyn UserDirectory>,
    friendships: Arc<dyn FriendshipService>,
}

impl RealDirectoryService {
    pub fn new(directory: Arc<dyn UserDirectory>, friendships: Arc<dyn FriendshipService>) -> Self {
        Self {
            directory,
            friendships,
        }
    }

    /// Joins relationship records with profiles; peers without a profile are dropped.
    async fn join_profiles(
        &self,
        me: &UserId,
        records: Vec<RelationshipRecord>,
    ) -> Result<Vec<UserListing>, DirectoryError> {
        let caller = Principal::User(me.clone());
        let mut listings = Vec::with_capacity(records.len());
        for record in records {
            let status = FriendStatus::derive(Some(&record));
            match self.directory.get_profile(&caller, &record.peer_id).await? {
                Some(profile) => listings.push(UserListing::new(profile, status)),
                None => tracing::debug!(peer = %record.peer_id, "no profile for peer, skipping"),
            }
        }
        sort_by_nickname(&mut listings);
        Ok(listings)
    }
}

fn sort_by_nickname(listings: &mut [UserListing]) {
    listings.sort_by_key(|l| normalize_nickname(&l.nickname));
}

#[async_trait::async_trait]
impl DirectoryService for RealDirectoryService {
    async fn list_friends(&self, me: &UserId) -> Result<Vec<UserListing>, DirectoryError> {
        let records = self.friendships.list_friends(me).await?;
        self.join_profiles(me, records).await
    }

    async fn list_incoming_requests(
        &self,
        me: &UserId,
    ) -> Result<Vec<UserListing>, DirectoryError> {
        let records = self.friendships.list_incoming_requests(me).await?;
        self.join_profiles(me, records).await
    }

    async fn search_users(
        &self,
        me: &UserId,
        term: &str,
    ) -> Result<Vec<UserListing>, DirectoryError> {
        let caller = Principal::User(me.clone());
        let term = normalize_nickname(term);
        let profiles = if term.is_empty() {
            self.directory.list_all(&caller).await?
        } else {
            self.directory.search_prefix(&caller, &term).await?
        };

        let mut listings = Vec::with_capacity(profiles.len());
        for profile in profiles.into_iter().filter(|p| &p.uid != me) {
            let status = match self.friendships.derive_status(me, &profile.uid).await {
                Ok(status) => status,
                Err(e) => {
                    tracing::warn!(peer = %profile.uid, "status lookup failed, showing none: {e}");
                    FriendStatus::None
                }
            };
            listings.push(UserListing::new(profile, status));
        }
        sort_by_nickname(&mut listings);

        tracing::debug!(%me, %term, hits = listings.len(), "user search");
        Ok(listings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application_impl::RealFriendshipService;
    use crate::infra_document::{DocRelationshipStore, DocUserDirectory};
    use crate::infra_memory::{FaultInjectingStore, MemoryDocumentStore, StoreOp};
    use chrono::Utc;

    struct Fixture {
        faults: Arc<FaultInjectingStore>,
        friendships: Arc<RealFriendshipService>,
        directory: RealDirectoryService,
    }

    async fn fixture(users: &[(&str, &str)]) -> Fixture {
        let faults = Arc::new(FaultInjectingStore::new(Arc::new(MemoryDocumentStore::new())));
        let users_dir = Arc::new(DocUserDirectory::new(faults.clone()));
        for (uid, nickname) in users {
            let nick = Nickname::parse(nickname).unwrap();
            users_dir
                .put_profile(
                    &Principal::Service,
                    &Profile::new((*uid).into(), &nick, String::new(), Utc::now()),
                    false,
                )
                .await
                .unwrap();
        }
        let friendships = Arc::new(RealFriendshipService::new(
            Arc::new(DocRelationshipStore::new(faults.clone())),
            FriendshipPolicy::default(),
        ));
        let directory = RealDirectoryService::new(users_dir, friendships.clone());
        Fixture {
            faults,
            friendships,
            directory,
        }
    }

    #[tokio::test]
    async fn search_excludes_viewer_and_annotates_status() {
        let fx = fixture(&[
            ("me", "Mereader"),
            ("u1", "Meg"),
            ("u2", "Melvin"),
            ("u3", "Zed"),
        ])
        .await;
        let me: UserId = "me".into();
        fx.friendships.send_request(&me, &"u1".into()).await.unwrap();

        let hits = fx.directory.search_users(&me, "  ME ").await.unwrap();
        let summary: Vec<_> = hits.iter().map(|h| (h.uid.as_str(), h.status)).collect();
        assert_eq!(
            summary,
            [("u1", FriendStatus::PendingSent), ("u2", FriendStatus::None)]
        );
        assert_eq!(hits[0].actions, [FriendAction::Cancel]);
    }

    #[tokio::test]
    async fn blank_term_lists_everyone_else() {
        let fx = fixture(&[("me", "Mereader"), ("u1", "Alpha"), ("u2", "Beta")]).await;
        let hits = fx.directory.search_users(&"me".into(), "").await.unwrap();
        assert_eq!(hits.len(), 2);
    }

    #[tokio::test]
    async fn status_lookup_failure_degrades_to_none() {
        let fx = fixture(&[("me", "Mereader"), ("u1", "Alpha")]).await;
        let me: UserId = "me".into();
        fx.friendships.send_request(&me, &"u1".into()).await.unwrap();
        fx.faults.fail_next(
            StoreOp::Get,
            DocPath::relationship(&me, &"u1".into()),
            StoreError::Unavailable("blip".into()),
        );

        let hits = fx.directory.search_users(&me, "alp").await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].status, FriendStatus::None);
    }

    #[tokio::test]
    async fn listings_skip_peers_without_profiles() {
        let fx = fixture(&[("me", "Mereader"), ("u1", "Alpha")]).await;
        let me: UserId = "me".into();
        fx.friendships.send_request(&"u1".into(), &me).await.unwrap();
        fx.friendships.send_request(&"ghost".into(), &me).await.unwrap();

        let requests = fx.directory.list_incoming_requests(&me).await.unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].nickname, "Alpha");
        assert_eq!(
            requests[0].actions,
            [FriendAction::Accept, FriendAction::Decline]
        );

        fx.friendships.accept_request(&me, &"u1".into()).await.unwrap();
        let friends = fx.directory.list_friends(&me).await.unwrap();
        assert_eq!(friends.len(), 1);
        assert_eq!(friends[0].status, FriendStatus::Friend);
    }
}
