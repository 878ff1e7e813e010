// tests/session_store.rs
// Stored-session round trip against a temp directory.

use fleet_uplink::store::{SessionStore, StoredSession};

fn full_session() -> StoredSession {
    StoredSession {
        token: Some("jwt-token".into()),
        user_id: Some(42),
        full_name: Some("Ana Pérez".into()),
        role: Some("CHOFER".into()),
        saved_at: Some(chrono::Utc::now()),
    }
}

#[tokio::test]
async fn save_then_load_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let store = SessionStore::new(dir.path().join("nested/session.json"));

    store.save(&full_session()).await.unwrap();
    let loaded = store.load().await;
    assert_eq!(loaded.token.as_deref(), Some("jwt-token"));
    assert_eq!(loaded.user_id, Some(42));

    let credentials = loaded.credentials().unwrap();
    assert_eq!(credentials.token, "jwt-token");
    assert_eq!(credentials.user_id, 42);
}

#[tokio::test]
async fn missing_or_corrupt_state_degrades_to_empty() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.json");
    let store = SessionStore::new(&path);

    assert!(store.load().await.credentials().is_none());

    tokio::fs::write(&path, b"not json at all").await.unwrap();
    assert!(store.load().await.credentials().is_none());
}

#[tokio::test]
async fn clear_forgets_the_identity_and_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let store = SessionStore::new(dir.path().join("session.json"));

    store.save(&full_session()).await.unwrap();
    store.clear().await.unwrap();
    assert!(store.load().await.credentials().is_none());

    // clearing an already-clean store is fine
    store.clear().await.unwrap();
}

#[tokio::test]
async fn partial_state_yields_no_credentials() {
    let partial = StoredSession {
        token: Some("jwt-token".into()),
        ..StoredSession::default()
    };
    assert!(partial.credentials().is_none());
}
