use bookshelf::application_impl::FakeIdentityProvider;
use bookshelf::application_port::*;
use bookshelf::domain_model::*;
use bookshelf::domain_port::*;
use bookshelf::infra_document::DocRelationshipStore;
use bookshelf::infra_memory::{FaultInjectingStore, MemoryDocumentStore, StoreOp};
use bookshelf::server::{Server, TornKind};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

struct Harness {
    server: Server,
    faults: Arc<FaultInjectingStore>,
    records: DocRelationshipStore,
}

impl Harness {
    fn new(policy: FriendshipPolicy) -> Self {
        let memory: Arc<dyn DocumentStore> = Arc::new(MemoryDocumentStore::new());
        let faults = Arc::new(FaultInjectingStore::new(memory.clone()));
        let server = Server::with_store(
            faults.clone(),
            Arc::new(FakeIdentityProvider::new()),
            true,
            policy,
            CancellationToken::new(),
        );
        Harness {
            server,
            faults,
            records: DocRelationshipStore::new(memory),
        }
    }

    async fn record(&self, owner: &UserId, peer: &UserId) -> Option<RelationshipRecord> {
        self.records
            .get(&Principal::Service, owner, peer)
            .await
            .unwrap()
    }

    async fn status(&self, me: &UserId, peer: &UserId) -> FriendStatus {
        self.server
            .friendship_service
            .derive_status(me, peer)
            .await
            .unwrap()
    }

    async fn assert_symmetric(&self, a: &UserId, b: &UserId) {
        match (self.record(a, b).await, self.record(b, a).await) {
            (None, None) => {}
            (Some(ab), Some(ba)) => {
                assert_eq!(ab.status, ba.status);
                assert_eq!(ab.is_requester, !ba.is_requester);
            }
            (ab, ba) => panic!("asymmetric pair: {ab:?} / {ba:?}"),
        }
    }
}

fn alice_and_bob() -> (UserId, UserId) {
    ("alice".into(), "bob".into())
}

#[tokio::test]
async fn send_then_accept_makes_both_sides_friends() {
    let h = Harness::new(FriendshipPolicy::default());
    let (a, b) = alice_and_bob();
    let friendships = &h.server.friendship_service;

    friendships.send_request(&a, &b).await.unwrap();
    assert_eq!(h.status(&a, &b).await, FriendStatus::PendingSent);
    assert_eq!(h.status(&b, &a).await, FriendStatus::PendingReceived);
    h.assert_symmetric(&a, &b).await;

    friendships.accept_request(&b, &a).await.unwrap();
    assert_eq!(h.status(&a, &b).await, FriendStatus::Friend);
    assert_eq!(h.status(&b, &a).await, FriendStatus::Friend);

    let ab = h.record(&a, &b).await.unwrap();
    let ba = h.record(&b, &a).await.unwrap();
    assert!(ab.accepted_at.is_some());
    assert!(ba.accepted_at.is_some());
    assert!(ab.created_at.is_some(), "accept keeps createdAt from the request");
    h.assert_symmetric(&a, &b).await;
}

#[tokio::test]
async fn cancel_deletes_both_records() {
    let h = Harness::new(FriendshipPolicy::default());
    let (a, b) = alice_and_bob();

    h.server.friendship_service.send_request(&a, &b).await.unwrap();
    h.server.friendship_service.cancel_request(&a, &b).await.unwrap();

    assert_eq!(h.status(&a, &b).await, FriendStatus::None);
    assert!(h.record(&a, &b).await.is_none());
    assert!(h.record(&b, &a).await.is_none());
}

#[tokio::test]
async fn removed_friends_can_start_over_cleanly() {
    let h = Harness::new(FriendshipPolicy::default());
    let (a, b) = alice_and_bob();
    let friendships = &h.server.friendship_service;

    friendships.send_request(&a, &b).await.unwrap();
    friendships.accept_request(&b, &a).await.unwrap();
    friendships.remove_friend(&a, &b).await.unwrap();
    assert!(h.record(&a, &b).await.is_none());
    assert!(h.record(&b, &a).await.is_none());

    friendships.send_request(&a, &b).await.unwrap();
    assert_eq!(h.status(&a, &b).await, FriendStatus::PendingSent);
    assert_eq!(h.status(&b, &a).await, FriendStatus::PendingReceived);
    assert!(h.record(&a, &b).await.unwrap().accepted_at.is_none());
    assert!(h.record(&b, &a).await.unwrap().accepted_at.is_none());
}

#[tokio::test]
async fn teardown_twice_ends_in_the_same_state() {
    let h = Harness::new(FriendshipPolicy::default());
    let (a, b) = alice_and_bob();
    let friendships = &h.server.friendship_service;

    friendships.send_request(&a, &b).await.unwrap();
    friendships.cancel_request(&a, &b).await.unwrap();
    friendships.cancel_request(&a, &b).await.unwrap();

    friendships.send_request(&a, &b).await.unwrap();
    friendships.decline_request(&b, &a).await.unwrap();
    friendships.decline_request(&b, &a).await.unwrap();

    friendships.send_request(&a, &b).await.unwrap();
    friendships.accept_request(&b, &a).await.unwrap();
    friendships.remove_friend(&b, &a).await.unwrap();
    friendships.remove_friend(&b, &a).await.unwrap();

    assert!(h.record(&a, &b).await.is_none());
    assert!(h.record(&b, &a).await.is_none());
}

#[tokio::test]
async fn retrying_a_torn_send_converges() {
    let h = Harness::new(FriendshipPolicy::default());
    let (a, b) = alice_and_bob();

    h.faults.fail_next(
        StoreOp::Set,
        DocPath::relationship(&b, &a),
        StoreError::Unavailable("connection reset".to_string()),
    );
    let err = h
        .server
        .friendship_service
        .send_request(&a, &b)
        .await
        .unwrap_err();
    match err {
        FriendshipError::PartialWriteFailure {
            operation,
            written,
            failed,
            ..
        } => {
            assert_eq!(operation, FriendAction::Send);
            assert_eq!(written, DocPath::relationship(&a, &b));
            assert_eq!(failed, DocPath::relationship(&b, &a));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(h.status(&a, &b).await, FriendStatus::PendingSent);
    assert_eq!(h.status(&b, &a).await, FriendStatus::None);

    h.server.friendship_service.send_request(&a, &b).await.unwrap();
    h.assert_symmetric(&a, &b).await;
    assert_eq!(h.status(&b, &a).await, FriendStatus::PendingReceived);
}

#[tokio::test]
async fn retrying_a_torn_send_converges_under_the_guarded_policy() {
    let h = Harness::new(FriendshipPolicy {
        send_policy: SendPolicy::Guarded,
        accept_policy: AcceptPolicy::RequirePending,
    });
    let (a, b) = alice_and_bob();

    h.faults.fail_next(
        StoreOp::Set,
        DocPath::relationship(&b, &a),
        StoreError::Unavailable("timeout".to_string()),
    );
    assert!(h.server.friendship_service.send_request(&a, &b).await.is_err());

    h.server.friendship_service.send_request(&a, &b).await.unwrap();
    h.assert_symmetric(&a, &b).await;
}

#[tokio::test]
async fn dispatcher_reports_torn_writes_with_a_retry_hint() {
    let h = Harness::new(FriendshipPolicy::default());
    let (a, b) = alice_and_bob();

    h.faults.fail_next(
        StoreOp::Set,
        DocPath::relationship(&b, &a),
        StoreError::Unavailable("timeout".to_string()),
    );
    let outcome = h.server.dispatcher.dispatch_id(&a, "send", &b).await;
    assert!(!outcome.is_success());
    assert_eq!(outcome.message.kind, MessageKind::Error);
    assert!(outcome.message.text.contains("try again"));

    let outcome = h.server.dispatcher.dispatch_id(&a, "send", &b).await;
    assert!(outcome.is_success());
    assert_eq!(outcome.message.kind, MessageKind::Success);
}

#[tokio::test]
async fn sweep_finds_the_pair_a_torn_accept_left_behind() {
    let h = Harness::new(FriendshipPolicy::default());
    let (a, b) = alice_and_bob();
    for uid in [&a, &b] {
        h.server
            .profile_service
            .create_profile(
                uid,
                ProfileInput {
                    nickname: format!("{uid}-reader"),
                    email: None,
                },
            )
            .await
            .unwrap();
    }

    h.server.friendship_service.send_request(&a, &b).await.unwrap();
    h.faults.fail_next(
        StoreOp::Set,
        DocPath::relationship(&a, &b),
        StoreError::Unavailable("timeout".to_string()),
    );
    assert!(h.server.friendship_service.accept_request(&b, &a).await.is_err());

    let report = h
        .server
        .reconciliation_sweep(Duration::from_secs(60))
        .sweep_once()
        .await
        .unwrap();
    assert_eq!(report.users_scanned, 2);
    assert!(!report.is_clean());
    assert!(
        report
            .torn
            .iter()
            .any(|pair| pair.kind == TornKind::StatusMismatch)
    );

    h.server.friendship_service.accept_request(&b, &a).await.unwrap();
    let report = h
        .server
        .reconciliation_sweep(Duration::from_secs(60))
        .sweep_once()
        .await
        .unwrap();
    assert!(report.is_clean());
}

#[tokio::test]
async fn mixed_operations_leave_every_pair_symmetric() {
    let h = Harness::new(FriendshipPolicy::default());
    let users: Vec<UserId> = ["ann", "ben", "cat", "dan"]
        .into_iter()
        .map(UserId::from)
        .collect();
    let [ann, ben, cat, dan] = [&users[0], &users[1], &users[2], &users[3]];
    let friendships = &h.server.friendship_service;

    friendships.send_request(ann, ben).await.unwrap();
    friendships.send_request(ann, cat).await.unwrap();
    friendships.send_request(dan, ann).await.unwrap();
    friendships.accept_request(ben, ann).await.unwrap();
    friendships.send_request(cat, dan).await.unwrap();
    friendships.decline_request(ann, dan).await.unwrap();
    friendships.send_request(ben, cat).await.unwrap();
    friendships.cancel_request(ann, cat).await.unwrap();
    friendships.accept_request(cat, ben).await.unwrap();
    friendships.send_request(ben, dan).await.unwrap();
    // overwrite policy: a fresh request resets an accepted pair to pending
    friendships.send_request(cat, ben).await.unwrap();
    friendships.accept_request(dan, cat).await.unwrap();
    friendships.remove_friend(dan, cat).await.unwrap();
    friendships.send_request(dan, cat).await.unwrap();

    for (i, a) in users.iter().enumerate() {
        for b in &users[i + 1..] {
            h.assert_symmetric(a, b).await;
        }
    }

    assert_eq!(h.status(ann, ben).await, FriendStatus::Friend);
    assert_eq!(h.status(ann, cat).await, FriendStatus::None);
    assert_eq!(h.status(ann, dan).await, FriendStatus::None);
    assert_eq!(h.status(cat, ben).await, FriendStatus::PendingSent);
    assert_eq!(h.status(dan, ben).await, FriendStatus::PendingReceived);
    assert_eq!(h.status(cat, dan).await, FriendStatus::PendingReceived);
}
