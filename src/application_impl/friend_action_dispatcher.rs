use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::*;
use std::sync::Arc;

const RULES_HINT: &str = " Hint: verify the deployed access rules.";
const REMOVE_RULES_HINT: &str =
    " Hint: either party can delete the relationship; ensure rules are deployed.";
const RETRY_HINT: &str = " Please try again.";

/// Maps action identifiers to coordinator operations and turns every result
/// into a status message. Nothing here is fatal.
pub struct FriendActionDispatcher {
    friendships: Arc<dyn FriendshipService>,
    directory: Arc<dyn UserDirectory>,
}

impl FriendActionDispatcher {
    pub fn new(friendships: Arc<dyn FriendshipService>, directory: Arc<dyn UserDirectory>) -> Self {
        Self {
            friendships,
            directory,
        }
    }

    pub async fn dispatch_id(
        &self,
        me: &UserId,
        action_id: &str,
        target: &UserId,
    ) -> ActionOutcome {
        match action_id.parse::<FriendAction>() {
            Ok(action) => self.dispatch(me, action, target).await,
            Err(e) => ActionOutcome {
                action: None,
                target: target.clone(),
                message: StatusMessage::error(format!("Unknown action \"{action_id}\".")),
                error: Some(FriendshipError::Validation(e)),
            },
        }
    }

    pub async fn dispatch(
        &self,
        me: &UserId,
        action: FriendAction,
        target: &UserId,
    ) -> ActionOutcome {
        let result = match action {
            FriendAction::Send => self.friendships.send_request(me, target).await,
            FriendAction::Cancel => self.friendships.cancel_request(me, target).await,
            FriendAction::Accept => self.friendships.accept_request(me, target).await,
            FriendAction::Decline => self.friendships.decline_request(me, target).await,
            FriendAction::Remove => self.friendships.remove_friend(me, target).await,
        };

        let name = self.display_name(me, target).await;
        match result {
            Ok(()) => ActionOutcome {
                action: Some(action),
                target: target.clone(),
                message: StatusMessage::success(success_text(action, &name)),
                error: None,
            },
            Err(e) => {
                tracing::error!(%action, %me, %target, "friend action failed: {e}");
                ActionOutcome {
                    action: Some(action),
                    target: target.clone(),
                    message: StatusMessage::error(failure_text(action, &e)),
                    error: Some(e),
                }
            }
        }
    }

    async fn display_name(&self, me: &UserId, target: &UserId) -> String {
        match self
            .directory
            .get_profile(&Principal::User(me.clone()), target)
            .await
        {
            Ok(Some(profile)) => profile.display_name().to_owned(),
            Ok(None) => target.to_string(),
            Err(e) => {
                tracing::debug!(%target, "profile lookup for message failed: {e}");
                target.to_string()
            }
        }
    }
}

fn success_text(action: FriendAction, name: &str) -> String {
    match action {
        FriendAction::Send => format!("Friend request sent to {name}!"),
        FriendAction::Cancel => format!("Cancelled friend request to {name}."),
        FriendAction::Accept => format!("You are now friends with {name}!"),
        FriendAction::Decline => format!("Declined friend request from {name}."),
        FriendAction::Remove => format!("Removed {name} from friends."),
    }
}

fn failure_text(action: FriendAction, err: &FriendshipError) -> String {
    let lead = match action {
        FriendAction::Send => "Failed to send friend request.",
        FriendAction::Cancel => "Failed to cancel request.",
        FriendAction::Accept => "Failed to accept friend request.",
        FriendAction::Decline => "Failed to decline request.",
        FriendAction::Remove => "Failed to remove friend.",
    };
    let hint = if err.is_permission_denied() {
        match action {
            FriendAction::Remove => REMOVE_RULES_HINT,
            _ => RULES_HINT,
        }
    } else {
        match err {
            FriendshipError::StoreUnavailable(_) | FriendshipError::PartialWriteFailure { .. } => {
                RETRY_HINT
            }
            _ => "",
        }
    };
    format!("{lead} {err}.{hint}")
}
