use crate::domain_model::*;
use crate::domain_port::{DocPath, StoreError};
use serde::Deserialize;

#[derive(Debug, thiserror::Error)]
pub enum FriendshipError {
    #[error("invalid request: {0}")]
    Validation(String),
    #[error("store unavailable: {0}")]
    StoreUnavailable(String),
    #[error("permission denied: {0}")]
    PermissionDenied(String),
    #[error("corrupt relationship record: {0}")]
    CorruptRecord(String),
    /// The first half of a paired write landed and the second did not.
    #[error("{operation}: wrote {written} but failed on {failed}: {source}")]
    PartialWriteFailure {
        operation: FriendAction,
        written: DocPath,
        failed: DocPath,
        source: StoreError,
    },
    #[error("already friends")]
    AlreadyFriends,
    #[error("a request from this user is already waiting")]
    RequestAlreadyReceived,
    #[error("no pending request to accept")]
    NoPendingRequest,
}

impl From<StoreError> for FriendshipError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Unavailable(e) => FriendshipError::StoreUnavailable(e),
            StoreError::PermissionDenied(e) => FriendshipError::PermissionDenied(e),
            StoreError::Malformed(e) => FriendshipError::CorruptRecord(e),
        }
    }
}

impl FriendshipError {
    pub fn is_permission_denied(&self) -> bool {
        match self {
            FriendshipError::PermissionDenied(_) => true,
            FriendshipError::PartialWriteFailure { source, .. } => {
                matches!(source, StoreError::PermissionDenied(_))
            }
            _ => false,
        }
    }
}

/// What `send_request` does when the sender already holds a record for the target.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SendPolicy {
    /// Rewrite both halves unconditionally; an accepted pair falls back to pending.
    #[default]
    Overwrite,
    /// Refuse when the sender's copy reads `friend` or `pending-received`.
    Guarded,
}

/// What `accept_request` requires of the acceptor's own copy.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AcceptPolicy {
    /// Write both halves as accepted whatever was there before.
    #[default]
    Lenient,
    /// Only from `pending-received`, or `friend` so a retry after a torn accept converges.
    RequirePending,
}

#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Deserialize)]
pub struct FriendshipPolicy {
    #[serde(default)]
    pub send_policy: SendPolicy,
    #[serde(default)]
    pub accept_policy: AcceptPolicy,
}

/// Pairwise friendship state machine. Every transition touches the caller's
/// record first and the target's mirror second, without a transaction.
#[async_trait::async_trait]
pub trait FriendshipService: Send + Sync {
    async fn send_request(&self, me: &UserId, target: &UserId) -> Result<(), FriendshipError>;
    async fn cancel_request(&self, me: &UserId, target: &UserId) -> Result<(), FriendshipError>;
    async fn decline_request(&self, me: &UserId, target: &UserId)
    -> Result<(), FriendshipError>;
    async fn accept_request(&self, me: &UserId, target: &UserId) -> Result<(), FriendshipError>;
    async fn remove_friend(&self, me: &UserId, target: &UserId) -> Result<(), FriendshipError>;
    async fn derive_status(
        &self,
        me: &UserId,
        target: &UserId,
    ) -> Result<FriendStatus, FriendshipError>;
    async fn list_friends(&self, me: &UserId) -> Result<Vec<RelationshipRecord>, FriendshipError>;
    async fn list_incoming_requests(
        &self,
        me: &UserId,
    ) -> Result<Vec<RelationshipRecord>, FriendshipError>;
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    Success,
    Error,
}

/// Short user-facing line shown after an action.
#[derive(Debug, Clone, Eq, PartialEq, serde::Serialize)]
pub struct StatusMessage {
    pub kind: MessageKind,
    pub text: String,
}

impl StatusMessage {
    pub fn success(text: impl Into<String>) -> Self {
        StatusMessage {
            kind: MessageKind::Success,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        StatusMessage {
            kind: MessageKind::Error,
            text: text.into(),
        }
    }
}

/// Result of one dispatched friend action. Failures are carried, not raised.
#[derive(Debug)]
pub struct ActionOutcome {
    /// `None` when the action id did not parse.
    pub action: Option<FriendAction>,
    pub target: UserId,
    pub message: StatusMessage,
    pub error: Option<FriendshipError>,
}

impl ActionOutcome {
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}
