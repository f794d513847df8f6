use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::*;
use chrono::Utc;
use std::sync::Arc;

pub struct RealFriendshipService {
    relationships: Arc<dyn RelationshipStore>,
    policy: FriendshipPolicy,
}

impl RealFriendshipService {
    pub fn new(relationships: Arc<dyn RelationshipStore>, policy: FriendshipPolicy) -> Self {
        Self {
            relationships,
            policy,
        }
    }

    fn validate(me: &UserId, target: &UserId) -> Result<(), FriendshipError> {
        me.check()
            .map_err(|e| FriendshipError::Validation(format!("current user: {e}")))?;
        target
            .check()
            .map_err(|e| FriendshipError::Validation(format!("target user: {e}")))?;
        if me == target {
            return Err(FriendshipError::Validation("cannot target yourself".to_string()));
        }
        Ok(())
    }

    async fn own_status(
        &self,
        me: &UserId,
        target: &UserId,
    ) -> Result<FriendStatus, FriendshipError> {
        let caller = Principal::User(me.clone());
        let own = self.relationships.get(&caller, me, target).await?;
        Ok(FriendStatus::derive(own.as_ref()))
    }

    /// Writes `mine` at (me, target), then `theirs` at (target, me).
    async fn write_pair(
        &self,
        operation: FriendAction,
        me: &UserId,
        target: &UserId,
        mine: &RelationshipRecord,
        theirs: &RelationshipRecord,
        merge_existing: bool,
    ) -> Result<(), FriendshipError> {
        let caller = Principal::User(me.clone());

        // nothing written yet, so a failure here leaves the pair as it was
        self.relationships
            .put(&caller, me, target, mine, merge_existing)
            .await?;

        if let Err(source) = self
            .relationships
            .put(&caller, target, me, theirs, merge_existing)
            .await
        {
            tracing::warn!(%operation, %me, %target, "torn relationship pair: {source}");
            return Err(FriendshipError::PartialWriteFailure {
                operation,
                written: DocPath::relationship(me, target),
                failed: DocPath::relationship(target, me),
                source,
            });
        }
        Ok(())
    }

    async fn delete_pair(
        &self,
        operation: FriendAction,
        me: &UserId,
        target: &UserId,
    ) -> Result<(), FriendshipError> {
        Self::validate(me, target)?;
        let caller = Principal::User(me.clone());

        self.relationships.delete(&caller, me, target).await?;

        if let Err(source) = self.relationships.delete(&caller, target, me).await {
            tracing::warn!(%operation, %me, %target, "torn relationship pair: {source}");
            return Err(FriendshipError::PartialWriteFailure {
                operation,
                written: DocPath::relationship(me, target),
                failed: DocPath::relationship(target, me),
                source,
            });
        }

        tracing::info!(%operation, %me, %target, "relationship removed");
        Ok(())
    }
}

#[async_trait::async_trait]
impl FriendshipService for RealFriendshipService {
    async fn send_request(&self, me: &UserId, target: &UserId) -> Result<(), FriendshipError> {
        Self::validate(me, target)?;

        if self.policy.send_policy == SendPolicy::Guarded {
            match self.own_status(me, target).await? {
                FriendStatus::Friend => return Err(FriendshipError::AlreadyFriends),
                FriendStatus::PendingReceived => {
                    return Err(FriendshipError::RequestAlreadyReceived);
                }
                // pending-sent is a retry; rewriting both halves converges
                FriendStatus::None | FriendStatus::PendingSent => {}
            }
        }

        let now = Utc::now();
        self.write_pair(
            FriendAction::Send,
            me,
            target,
            &RelationshipRecord::pending(target.clone(), true, now),
            &RelationshipRecord::pending(me.clone(), false, now),
            false,
        )
        .await?;

        tracing::info!(%me, %target, "friend request sent");
        Ok(())
    }

    async fn cancel_request(&self, me: &UserId, target: &UserId) -> Result<(), FriendshipError> {
        self.delete_pair(FriendAction::Cancel, me, target).await
    }

    async fn decline_request(
        &self,
        me: &UserId,
        target: &UserId,
    ) -> Result<(), FriendshipError> {
        self.delete_pair(FriendAction::Decline, me, target).await
    }

    async fn accept_request(&self, me: &UserId, target: &UserId) -> Result<(), FriendshipError> {
        Self::validate(me, target)?;

        if self.policy.accept_policy == AcceptPolicy::RequirePending {
            match self.own_status(me, target).await? {
                FriendStatus::PendingReceived | FriendStatus::Friend => {}
                FriendStatus::None | FriendStatus::PendingSent => {
                    return Err(FriendshipError::NoPendingRequest);
                }
            }
        }

        let now = Utc::now();
        self.write_pair(
            FriendAction::Accept,
            me,
            target,
            &RelationshipRecord::acceptance(target.clone(), false, now),
            &RelationshipRecord::acceptance(me.clone(), true, now),
            true,
        )
        .await?;

        tracing::info!(%me, %target, "friend request accepted");
        Ok(())
    }

    async fn remove_friend(&self, me: &UserId, target: &UserId) -> Result<(), FriendshipError> {
        self.delete_pair(FriendAction::Remove, me, target).await
    }

    async fn derive_status(
        &self,
        me: &UserId,
        target: &UserId,
    ) -> Result<FriendStatus, FriendshipError> {
        Self::validate(me, target)?;
        let status = self.own_status(me, target).await?;
        tracing::debug!(%me, %target, %status, "derived friend status");
        Ok(status)
    }

    async fn list_friends(&self, me: &UserId) -> Result<Vec<RelationshipRecord>, FriendshipError> {
        let caller = Principal::User(me.clone());
        Ok(self
            .relationships
            .list_by_status(&caller, me, RelationshipStatus::Accepted, None)
            .await?)
    }

    async fn list_incoming_requests(
        &self,
        me: &UserId,
    ) -> Result<Vec<RelationshipRecord>, FriendshipError> {
        let caller = Principal::User(me.clone());
        Ok(self
            .relationships
            .list_by_status(&caller, me, RelationshipStatus::Pending, Some(false))
            .await?)
    }
}
