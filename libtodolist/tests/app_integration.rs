//! Integration tests for TodoApp
//!
//! Drives the session the way a presentation layer would: start, mutate,
//! sign in and out, refresh, shut down.

use std::sync::Arc;
use std::time::Duration;

use libtodolist::auth::{AuthBridge, MockAuthProvider};
use libtodolist::config::IdScheme;
use libtodolist::events::StoreEvent;
use libtodolist::storage::MemoryStore;
use libtodolist::{AuthError, Identity, TodoApp, TodoStore};

fn setup_app(provider: Arc<MockAuthProvider>) -> (TodoApp, Arc<MemoryStore>) {
    let memory = Arc::new(MemoryStore::new());
    let store = TodoStore::new(memory.clone(), "todos", IdScheme::Timestamp);
    (TodoApp::new(store, AuthBridge::new(provider)), memory)
}

#[tokio::test]
async fn test_rejected_sign_in_leaves_todos_untouched() {
    let provider = Arc::new(MockAuthProvider::rejecting(AuthError::Network(
        "unreachable".to_string(),
    )));
    let (app, memory) = setup_app(Arc::clone(&provider));
    app.start().await;
    app.store().add("keep me").await.unwrap();
    let before = app.store().todos().await;
    let writes = memory.write_count();

    assert_eq!(app.sign_in().await, None);

    assert_eq!(provider.sign_in_call_count(), 1);
    assert!(!app.is_signed_in());
    assert_eq!(app.store().todos().await, before);
    assert_eq!(memory.write_count(), writes);
}

#[tokio::test]
async fn test_cancelled_sign_in_returns_none() {
    let provider = Arc::new(MockAuthProvider::cancelled());
    let (app, _memory) = setup_app(provider);
    app.start().await;

    assert_eq!(app.sign_in().await, None);
    assert_eq!(app.current_identity(), None);
}

#[tokio::test]
async fn test_sign_in_and_out_update_identity() {
    let identity = Identity::new("uid-42", "google.com")
        .with_display_name("Grace")
        .with_email("grace@example.com");
    let provider = Arc::new(MockAuthProvider::success(identity.clone()));
    let (app, _memory) = setup_app(provider);
    app.start().await;

    assert_eq!(app.sign_in().await, Some(identity.clone()));
    assert_eq!(app.current_identity(), Some(identity));

    assert!(app.sign_out().await);
    assert_eq!(app.current_identity(), None);
}

#[tokio::test]
async fn test_failed_sign_out_keeps_identity() {
    let provider = Arc::new(MockAuthProvider::sign_out_failure(AuthError::Network(
        "offline".to_string(),
    )));
    let (app, _memory) = setup_app(provider);
    app.start().await;
    app.sign_in().await.unwrap();

    assert!(!app.sign_out().await);
    assert!(app.is_signed_in());
}

#[tokio::test]
async fn test_existing_session_seen_on_start() {
    let provider = Arc::new(MockAuthProvider::cancelled());
    provider.set_identity(Some(Identity::new("uid-restored", "google.com")));
    let (app, _memory) = setup_app(Arc::clone(&provider));

    app.start().await;

    assert_eq!(app.current_identity().unwrap().uid, "uid-restored");
}

#[tokio::test]
async fn test_start_loads_persisted_todos() {
    let memory = Arc::new(MemoryStore::new().with_value(
        "todos",
        r#"[{"id":"1","text":"a","completed":false},{"id":"2","text":"b","completed":true}]"#,
    ));
    let store = TodoStore::new(memory, "todos", IdScheme::Timestamp);
    let app = TodoApp::new(store, AuthBridge::new(Arc::new(MockAuthProvider::cancelled())));

    let todos = app.start().await;

    assert_eq!(todos.len(), 2);
    assert_eq!(todos[1].text, "b");
}

#[tokio::test]
async fn test_refresh_with_unreadable_storage_keeps_list() {
    let (app, memory) = setup_app(Arc::new(MockAuthProvider::cancelled()));
    app.start().await;
    let todo = app.store().add("survives").await.unwrap();
    let mut events = app.store().subscribe();

    memory.set_fail_reads(true);
    let todos = app.refresh().await;

    assert_eq!(todos, vec![todo]);
    assert!(matches!(
        events.recv().await.unwrap(),
        StoreEvent::LoadFailed { .. }
    ));
}

#[tokio::test]
async fn test_slow_provider_does_not_block_store() {
    let provider = Arc::new(MockAuthProvider::with_delay(
        Identity::new("uid-slow", "google.com"),
        Duration::from_millis(50),
    ));
    let (app, _memory) = setup_app(provider);
    let app = Arc::new(app);
    app.start().await;

    let signer = Arc::clone(&app);
    let sign_in = tokio::spawn(async move { signer.sign_in().await });

    app.store().add("while signing in").await.unwrap();

    let identity = sign_in.await.unwrap();
    assert_eq!(identity.unwrap().uid, "uid-slow");
    assert_eq!(app.store().len().await, 1);
}
