use crate::domain_model::*;
use crate::domain_port::*;
use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TornKind {
    /// `owner` holds a record, `peer` holds none.
    MissingMirror,
    StatusMismatch,
    /// Both halves claim the same requester flag.
    RequesterConflict,
    /// `peer` holds a document for `owner` that does not decode.
    CorruptMirror,
}

#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct TornPair {
    pub owner: UserId,
    pub peer: UserId,
    pub kind: TornKind,
}

#[derive(Debug, Default, Serialize)]
pub struct SweepReport {
    pub users_scanned: usize,
    pub pairs_checked: usize,
    pub torn: Vec<TornPair>,
    /// Owners whose relationship collection could not be listed this pass.
    pub unreadable_owners: Vec<UserId>,
    /// Pairs whose mirror read failed for a reason other than a bad document.
    pub pairs_skipped: usize,
}

impl SweepReport {
    /// Nothing torn was found and nothing was left unchecked.
    pub fn is_clean(&self) -> bool {
        self.torn.is_empty() && self.unreadable_owners.is_empty() && self.pairs_skipped == 0
    }
}

/// Periodically scans every user's relationship records against their
/// mirrors and reports asymmetric pairs. Detection only; nothing is rewritten.
pub struct ReconciliationSweep {
    directory: Arc<dyn UserDirectory>,
    relationships: Arc<dyn RelationshipStore>,
    interval: Duration,
    cancellation_token: CancellationToken,
}

impl ReconciliationSweep {
    pub fn new(
        directory: Arc<dyn UserDirectory>,
        relationships: Arc<dyn RelationshipStore>,
        interval: Duration,
        cancellation_token: CancellationToken,
    ) -> Self {
        Self {
            directory,
            relationships,
            interval,
            cancellation_token,
        }
    }

    pub async fn sweep_once(&self) -> Result<SweepReport, StoreError> {
        let caller = Principal::Service;
        let users = self.directory.list_all(&caller).await?;
        let mut seen = HashSet::new();
        let mut report = SweepReport {
            users_scanned: users.len(),
            ..Default::default()
        };

        for user in &users {
            let owner = &user.uid;
            let records = match self.relationships.list_all(&caller, owner).await {
                Ok(records) => records,
                Err(e) => {
                    tracing::warn!(%owner, "cannot list relationships, skipping owner: {e}");
                    report.unreadable_owners.push(owner.clone());
                    continue;
                }
            };

            for record in records {
                let peer = record.peer_id.clone();
                if !seen.insert(UserPair::new(owner.clone(), peer.clone())) {
                    continue;
                }
                report.pairs_checked += 1;

                let kind = match self.relationships.get(&caller, &peer, owner).await {
                    Ok(None) => Some(TornKind::MissingMirror),
                    Ok(Some(m)) if m.status != record.status => Some(TornKind::StatusMismatch),
                    Ok(Some(m)) if m.is_requester == record.is_requester => {
                        Some(TornKind::RequesterConflict)
                    }
                    Ok(Some(_)) => None,
                    Err(StoreError::Malformed(e)) => {
                        tracing::debug!(%owner, %peer, "mirror does not decode: {e}");
                        Some(TornKind::CorruptMirror)
                    }
                    Err(e) => {
                        tracing::warn!(%owner, %peer, "mirror read failed, skipping pair: {e}");
                        report.pairs_skipped += 1;
                        None
                    }
                };
                if let Some(kind) = kind {
                    report.torn.push(TornPair {
                        owner: owner.clone(),
                        peer,
                        kind,
                    });
                }
            }
        }
        Ok(report)
    }

    pub async fn run(&self) -> anyhow::Result<()> {
        loop {
            tokio::select! {
                biased;
                _ = self.cancellation_token.cancelled() => {
                    tracing::info!("reconciliation sweep shutting down...");
                    break;
                }
                _ = tokio::time::sleep(self.interval) => {
                    match self.sweep_once().await {
                        Ok(report) => {
                            for torn in &report.torn {
                                tracing::warn!(
                                    owner = %torn.owner,
                                    peer = %torn.peer,
                                    kind = ?torn.kind,
                                    "torn relationship pair"
                                );
                            }
                            tracing::info!(
                                users = report.users_scanned,
                                pairs = report.pairs_checked,
                                torn = report.torn.len(),
                                unreadable_owners = report.unreadable_owners.len(),
                                skipped = report.pairs_skipped,
                                "reconciliation sweep finished"
                            );
                        }
                        Err(e) => tracing::error!("reconciliation sweep error: {e}"),
                    }
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra_document::{DocRelationshipStore, DocUserDirectory};
    use crate::infra_memory::{FaultInjectingStore, MemoryDocumentStore, StoreOp};
    use chrono::Utc;
    use serde_json::json;

    struct Fixture {
        docs: Arc<MemoryDocumentStore>,
        faults: Arc<FaultInjectingStore>,
        relationships: Arc<DocRelationshipStore>,
        sweep: ReconciliationSweep,
    }

    async fn fixture(users: &[&str]) -> Fixture {
        let docs = Arc::new(MemoryDocumentStore::new());
        let faults = Arc::new(FaultInjectingStore::new(docs.clone()));
        let directory = Arc::new(DocUserDirectory::new(faults.clone()));
        for uid in users {
            let nick = Nickname::parse(&format!("user-{uid}")).unwrap();
            directory
                .put_profile(
                    &Principal::Service,
                    &Profile::new((*uid).into(), &nick, String::new(), Utc::now()),
                    false,
                )
                .await
                .unwrap();
        }
        let relationships = Arc::new(DocRelationshipStore::new(faults.clone()));
        let sweep = ReconciliationSweep::new(
            directory,
            relationships.clone(),
            Duration::from_secs(60),
            CancellationToken::new(),
        );
        Fixture {
            docs,
            faults,
            relationships,
            sweep,
        }
    }

    async fn put(
        fx: &Fixture,
        owner: &str,
        peer: &str,
        status: RelationshipStatus,
        requester: bool,
    ) {
        let record = RelationshipRecord {
            peer_id: peer.into(),
            status,
            is_requester: requester,
            created_at: Some(Utc::now()),
            accepted_at: None,
        };
        fx.relationships
            .put(
                &Principal::Service,
                &owner.into(),
                &peer.into(),
                &record,
                false,
            )
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn symmetric_pairs_are_clean_and_counted_once() {
        let fx = fixture(&["a", "b"]).await;
        put(&fx, "a", "b", RelationshipStatus::Pending, true).await;
        put(&fx, "b", "a", RelationshipStatus::Pending, false).await;

        let report = fx.sweep.sweep_once().await.unwrap();
        assert!(report.is_clean());
        assert_eq!(report.users_scanned, 2);
        assert_eq!(report.pairs_checked, 1);
    }

    #[tokio::test]
    async fn classifies_each_torn_shape() {
        let fx = fixture(&["a", "b", "c", "d"]).await;
        put(&fx, "a", "b", RelationshipStatus::Pending, true).await;
        put(&fx, "a", "c", RelationshipStatus::Accepted, false).await;
        put(&fx, "c", "a", RelationshipStatus::Pending, true).await;
        put(&fx, "a", "d", RelationshipStatus::Accepted, true).await;
        put(&fx, "d", "a", RelationshipStatus::Accepted, true).await;

        let report = fx.sweep.sweep_once().await.unwrap();
        let mut kinds: Vec<_> = report
            .torn
            .iter()
            .map(|t| (UserPair::new(t.owner.clone(), t.peer.clone()), t.kind))
            .collect();
        kinds.sort_by(|x, y| x.0.cmp(&y.0));
        assert_eq!(
            kinds,
            vec![
                (UserPair::new("a".into(), "b".into()), TornKind::MissingMirror),
                (UserPair::new("a".into(), "c".into()), TornKind::StatusMismatch),
                (UserPair::new("a".into(), "d".into()), TornKind::RequesterConflict),
            ]
        );
    }

    #[tokio::test]
    async fn corrupt_mirror_is_reported_and_the_pass_continues() {
        let fx = fixture(&["a", "b", "c", "d"]).await;
        put(&fx, "a", "b", RelationshipStatus::Pending, true).await;
        let garbage = json!({ "status": "pending", "isRequester": "yes" });
        fx.docs
            .set(
                &Principal::Service,
                &DocPath::relationship(&"b".into(), &"a".into()),
                garbage.as_object().cloned().unwrap(),
                WriteMode::Replace,
            )
            .await
            .unwrap();
        put(&fx, "c", "d", RelationshipStatus::Pending, true).await;

        let report = fx.sweep.sweep_once().await.unwrap();
        let kinds: Vec<_> = report
            .torn
            .iter()
            .map(|t| (t.owner.as_str(), t.peer.as_str(), t.kind))
            .collect();
        assert!(kinds.contains(&("a", "b", TornKind::CorruptMirror)));
        assert!(kinds.contains(&("c", "d", TornKind::MissingMirror)));
        assert_eq!(report.pairs_skipped, 0);
    }

    #[tokio::test]
    async fn unreadable_owner_does_not_stop_the_pass() {
        let fx = fixture(&["a", "b", "c", "d"]).await;
        put(&fx, "a", "b", RelationshipStatus::Pending, true).await;
        put(&fx, "c", "d", RelationshipStatus::Pending, true).await;
        fx.faults.fail_next(
            StoreOp::Query,
            CollectionPath::friends_of(&"a".into()),
            StoreError::Unavailable("timeout".to_string()),
        );

        let report = fx.sweep.sweep_once().await.unwrap();
        assert_eq!(report.unreadable_owners, vec![UserId::from("a")]);
        assert!(!report.is_clean());
        // pairs under other owners are still checked
        assert!(
            report
                .torn
                .iter()
                .any(|t| t.owner.as_str() == "c" && t.kind == TornKind::MissingMirror)
        );
    }

    #[tokio::test]
    async fn run_stops_on_cancellation() {
        let fx = fixture(&[]).await;
        fx.sweep.cancellation_token.cancel();
        fx.sweep.run().await.unwrap();
    }
}
