use crate::domain_model::UserId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RelationshipStatus {
    Pending,
    Accepted,
}

impl RelationshipStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RelationshipStatus::Pending => "pending",
            RelationshipStatus::Accepted => "accepted",
        }
    }
}

impl fmt::Display for RelationshipStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One user's half of a friendship or request, stored at `users/{owner}/friends/{peer}`.
///
/// The peer owns a mirror record with the same `status` and the opposite
/// `is_requester`. Nothing in storage ties the two together.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelationshipRecord {
    pub peer_id: UserId,
    pub status: RelationshipStatus,
    pub is_requester: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accepted_at: Option<DateTime<Utc>>,
}

impl RelationshipRecord {
    pub fn pending(peer_id: UserId, is_requester: bool, now: DateTime<Utc>) -> Self {
        RelationshipRecord {
            peer_id,
            status: RelationshipStatus::Pending,
            is_requester,
            created_at: Some(now),
            accepted_at: None,
        }
    }

    /// Fields merged into an existing record on acceptance. `created_at` is
    /// left unset so a merge write keeps the stored value.
    pub fn acceptance(peer_id: UserId, is_requester: bool, now: DateTime<Utc>) -> Self {
        RelationshipRecord {
            peer_id,
            status: RelationshipStatus::Accepted,
            is_requester,
            created_at: None,
            accepted_at: Some(now),
        }
    }

    /// True when `mirror` is the well-formed counterpart of `self`.
    pub fn mirrors(&self, mirror: &RelationshipRecord) -> bool {
        self.status == mirror.status && self.is_requester != mirror.is_requester
    }
}

/// Relationship as seen from one viewer towards one peer. Never stored.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FriendStatus {
    None,
    PendingSent,
    PendingReceived,
    Friend,
}

impl FriendStatus {
    /// Classifies the viewer's own copy only; the peer's copy is never consulted.
    pub fn derive(own: Option<&RelationshipRecord>) -> Self {
        match own {
            None => FriendStatus::None,
            Some(record) => match (record.status, record.is_requester) {
                (RelationshipStatus::Accepted, _) => FriendStatus::Friend,
                (RelationshipStatus::Pending, true) => FriendStatus::PendingSent,
                (RelationshipStatus::Pending, false) => FriendStatus::PendingReceived,
            },
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FriendStatus::None => "none",
            FriendStatus::PendingSent => "pending-sent",
            FriendStatus::PendingReceived => "pending-received",
            FriendStatus::Friend => "friend",
        }
    }
}

impl fmt::Display for FriendStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Action identifiers accepted by the friend action dispatcher.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FriendAction {
    Send,
    Cancel,
    Accept,
    Decline,
    Remove,
}

impl FriendAction {
    pub const ALL: [FriendAction; 5] = [
        FriendAction::Send,
        FriendAction::Cancel,
        FriendAction::Accept,
        FriendAction::Decline,
        FriendAction::Remove,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            FriendAction::Send => "send",
            FriendAction::Cancel => "cancel",
            FriendAction::Accept => "accept",
            FriendAction::Decline => "decline",
            FriendAction::Remove => "remove",
        }
    }

    /// Actions a viewer may take towards a peer in the given status.
    pub fn available_for(status: FriendStatus) -> &'static [FriendAction] {
        match status {
            FriendStatus::None => &[FriendAction::Send],
            FriendStatus::PendingSent => &[FriendAction::Cancel],
            FriendStatus::PendingReceived => &[FriendAction::Accept, FriendAction::Decline],
            FriendStatus::Friend => &[FriendAction::Remove],
        }
    }
}

impl fmt::Display for FriendAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl std::str::FromStr for FriendAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FriendAction::ALL
            .iter()
            .find(|action| action.id() == s)
            .copied()
            .ok_or_else(|| format!("unknown friend action: {s}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(status: RelationshipStatus, is_requester: bool) -> RelationshipRecord {
        RelationshipRecord {
            peer_id: "peer".into(),
            status,
            is_requester,
            created_at: None,
            accepted_at: None,
        }
    }

    #[test]
    fn derive_covers_every_record_shape() {
        assert_eq!(FriendStatus::derive(None), FriendStatus::None);
        assert_eq!(
            FriendStatus::derive(Some(&record(RelationshipStatus::Pending, true))),
            FriendStatus::PendingSent
        );
        assert_eq!(
            FriendStatus::derive(Some(&record(RelationshipStatus::Pending, false))),
            FriendStatus::PendingReceived
        );
        assert_eq!(
            FriendStatus::derive(Some(&record(RelationshipStatus::Accepted, true))),
            FriendStatus::Friend
        );
        assert_eq!(
            FriendStatus::derive(Some(&record(RelationshipStatus::Accepted, false))),
            FriendStatus::Friend
        );
    }

    #[test]
    fn record_uses_document_field_names() {
        let now = Utc::now();
        let json =
            serde_json::to_value(RelationshipRecord::pending("bob".into(), true, now)).unwrap();
        assert_eq!(json["peerId"], "bob");
        assert_eq!(json["status"], "pending");
        assert_eq!(json["isRequester"], true);
        assert!(json["createdAt"].is_string());
        assert!(json.get("acceptedAt").is_none());
    }

    #[test]
    fn acceptance_patch_leaves_created_at_out() {
        let json =
            serde_json::to_value(RelationshipRecord::acceptance("bob".into(), false, Utc::now()))
                .unwrap();
        assert!(json.get("createdAt").is_none());
        assert_eq!(json["status"], "accepted");
    }

    #[test]
    fn action_ids_round_trip_through_the_table() {
        for action in FriendAction::ALL {
            assert_eq!(action.id().parse::<FriendAction>().unwrap(), action);
        }
        assert!("block".parse::<FriendAction>().is_err());
    }
}
