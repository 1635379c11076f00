use chrono::{Duration, Utc};
use std::sync::Arc;
use organizen_backend::{
    models::active_session::SessionMetadata,
    repositories::{InMemorySessionStore, SessionStore},
    services::{RevokeOutcome, SessionManager},
    types::UserId,
};

mod support;

use support::seed_session;

fn manager_with_store() -> (SessionManager, Arc<InMemorySessionStore>) {
    let store = Arc::new(InMemorySessionStore::new());
    let dyn_store: Arc<dyn SessionStore> = store.clone();
    (SessionManager::new(dyn_store, Duration::hours(24)), store)
}

#[tokio::test]
async fn created_session_is_listed_for_its_user() {
    let (manager, _store) = manager_with_store();
    let user_id = UserId::new();

    let created = manager
        .create_session(
            user_id,
            SessionMetadata {
                device_label: Some("phone".into()),
                user_agent: Some("Mobile Safari".into()),
                ip_address: Some("10.1.2.3".into()),
            },
        )
        .await
        .expect("create session");

    let sessions = manager.get_user_sessions(user_id).await.expect("list sessions");
    assert_eq!(sessions.len(), 1);
    assert_eq!(sessions[0].session_token, created.session_token);
    assert_eq!(sessions[0].device_label.as_deref(), Some("phone"));

    let other = manager
        .get_user_sessions(UserId::new())
        .await
        .expect("list other user");
    assert!(other.is_empty());
}

#[tokio::test]
async fn removing_unknown_token_is_a_no_op() {
    let (manager, store) = manager_with_store();
    manager
        .create_session(UserId::new(), SessionMetadata::default())
        .await
        .expect("create session");

    manager
        .remove_session("does-not-exist")
        .await
        .expect("remove unknown token");
    assert_eq!(store.len().await, 1);
}

#[tokio::test]
async fn remove_session_is_idempotent() {
    let (manager, store) = manager_with_store();
    let user_id = UserId::new();
    let session = manager
        .create_session(user_id, SessionMetadata::default())
        .await
        .expect("create session");

    manager
        .remove_session(&session.session_token)
        .await
        .expect("first remove");
    manager
        .remove_session(&session.session_token)
        .await
        .expect("second remove");

    assert!(store.is_empty().await);
    assert!(manager
        .validate_session(&session.session_token)
        .await
        .expect("validate")
        .is_none());
}

#[tokio::test]
async fn cleanup_removes_only_expired_sessions() {
    let (manager, store) = manager_with_store();
    let user_id = UserId::new();
    let now = Utc::now();
    seed_session(&*store, user_id, "expired", now - Duration::hours(1)).await;
    seed_session(&*store, user_id, "valid", now + Duration::hours(1)).await;

    let deleted = manager
        .cleanup_expired_sessions()
        .await
        .expect("cleanup expired sessions");
    assert_eq!(deleted, 1);
    assert_eq!(store.len().await, 1);
    assert!(store
        .find_by_token("valid")
        .await
        .expect("find valid")
        .is_some());

    let deleted_again = manager.cleanup_expired_sessions().await.expect("second sweep");
    assert_eq!(deleted_again, 0);
}

#[tokio::test]
async fn expired_sessions_are_hidden_before_the_sweep() {
    let (manager, store) = manager_with_store();
    let user_id = UserId::new();
    seed_session(&*store, user_id, "stale", Utc::now() - Duration::minutes(5)).await;

    assert!(manager
        .get_user_sessions(user_id)
        .await
        .expect("list")
        .is_empty());
    assert!(manager
        .validate_session("stale")
        .await
        .expect("validate")
        .is_none());
    assert!(!manager.touch_session("stale").await.expect("touch"));
    assert_eq!(store.len().await, 1);
}

#[tokio::test]
async fn remove_other_sessions_keeps_current() {
    let (manager, store) = manager_with_store();
    let user_id = UserId::new();
    let current = manager
        .create_session(user_id, SessionMetadata::default())
        .await
        .expect("current");
    for _ in 0..2 {
        manager
            .create_session(user_id, SessionMetadata::default())
            .await
            .expect("other");
    }
    let bystander = manager
        .create_session(UserId::new(), SessionMetadata::default())
        .await
        .expect("other user");

    let outcome = manager
        .remove_other_sessions(user_id, Some(&current.session_token))
        .await
        .expect("revoke others");
    assert_eq!(outcome, RevokeOutcome { removed: 2, failed: 0 });

    let remaining = manager.get_user_sessions(user_id).await.expect("list");
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].id, current.id);
    assert!(store
        .find_by_id(bystander.id)
        .await
        .expect("find bystander")
        .is_some());
}

#[tokio::test]
async fn remove_other_sessions_without_current_token_revokes_all() {
    let (manager, store) = manager_with_store();
    let user_id = UserId::new();
    for _ in 0..3 {
        manager
            .create_session(user_id, SessionMetadata::default())
            .await
            .expect("create");
    }

    let outcome = manager
        .remove_other_sessions(user_id, None)
        .await
        .expect("revoke all");
    assert_eq!(outcome.removed, 3);
    assert!(store.is_empty().await);
}

#[tokio::test]
async fn concurrent_sweeps_and_removals_do_not_conflict() {
    let (manager, store) = manager_with_store();
    let user_id = UserId::new();
    let now = Utc::now();
    for i in 0..10 {
        seed_session(&*store, user_id, &format!("expired-{}", i), now - Duration::hours(1))
            .await;
    }

    let mut handles = Vec::new();
    for i in 0..10 {
        let manager = manager.clone();
        handles.push(tokio::spawn(async move {
            manager.cleanup_expired_sessions().await.expect("sweep");
            manager
                .remove_session(&format!("expired-{}", i))
                .await
                .expect("remove");
        }));
    }
    for handle in handles {
        handle.await.expect("join");
    }

    assert!(store.is_empty().await);
}

#[tokio::test]
async fn touch_refreshes_last_activity_and_slides_expiry() {
    let store = Arc::new(InMemorySessionStore::new());
    let dyn_store: Arc<dyn SessionStore> = store.clone();
    let manager = SessionManager::new(dyn_store, Duration::hours(1)).with_sliding_expiration(true);
    let user_id = UserId::new();
    let seeded = seed_session(&*store, user_id, "slide", Utc::now() + Duration::minutes(5)).await;

    assert!(manager.touch_session("slide").await.expect("touch"));

    let session = manager
        .validate_session("slide")
        .await
        .expect("validate")
        .expect("still active");
    assert!(session.last_activity > seeded.last_activity);
    assert!(session.expires_at > seeded.expires_at);
}
