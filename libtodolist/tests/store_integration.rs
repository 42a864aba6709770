//! Integration tests for TodoStore
//!
//! Exercises the store against the real storage backends, including
//! persistence across store instances.

use std::sync::Arc;

use libtodolist::config::{Config, IdConfig, IdScheme, StorageBackend, StorageConfig};
use libtodolist::storage::{FileStore, KeyValueStore, SqliteStore};
use libtodolist::{Todo, TodoStore};
use tempfile::TempDir;

fn config_for(backend: StorageBackend, temp_dir: &TempDir) -> Config {
    let path = match backend {
        StorageBackend::File => temp_dir.path().join("data"),
        StorageBackend::Sqlite => temp_dir.path().join("todos.db"),
    };

    Config {
        storage: StorageConfig {
            backend,
            path: path.to_string_lossy().to_string(),
            key: "todos".to_string(),
        },
        ids: IdConfig {
            scheme: IdScheme::Timestamp,
        },
    }
}

fn sample_collection(n: usize) -> Vec<Todo> {
    (0..n)
        .map(|i| Todo {
            id: format!("{}", 1_700_000_000_000u64 + i as u64),
            text: format!("task {} with \"quotes\" and ünïcode", i),
            completed: i % 3 == 0,
        })
        .collect()
}

#[tokio::test]
async fn test_full_lifecycle_scenario() {
    let temp_dir = TempDir::new().unwrap();
    let store = TodoStore::from_config(&config_for(StorageBackend::File, &temp_dir))
        .await
        .unwrap();

    assert!(store.load().await.is_empty());

    let todo = store.add("buy milk").await.unwrap();
    let todos = store.todos().await;
    assert_eq!(todos.len(), 1);
    assert_eq!(todos[0].text, "buy milk");
    assert!(!todos[0].completed);

    assert_eq!(store.toggle(&todo.id).await, Some(true));
    assert!(store.get(&todo.id).await.unwrap().completed);

    store.remove(&todo.id).await.unwrap();
    assert!(store.todos().await.is_empty());

    // The removal was written through
    assert!(store.load().await.is_empty());
}

#[tokio::test]
async fn test_round_trip_file_backend() {
    let temp_dir = TempDir::new().unwrap();
    let config = config_for(StorageBackend::File, &temp_dir);

    for n in [0, 1, 5, 50] {
        let collection = sample_collection(n);
        let store = TodoStore::from_config(&config).await.unwrap();
        store.persist(&collection).await;

        let reopened = TodoStore::from_config(&config).await.unwrap();
        assert_eq!(reopened.load().await, collection, "round trip of {} todos", n);
    }
}

#[tokio::test]
async fn test_round_trip_sqlite_backend() {
    let temp_dir = TempDir::new().unwrap();
    let config = config_for(StorageBackend::Sqlite, &temp_dir);

    let collection = sample_collection(7);
    let store = TodoStore::from_config(&config).await.unwrap();
    store.try_persist(&collection).await.unwrap();

    assert_eq!(store.load().await, collection);
}

#[tokio::test]
async fn test_mutations_survive_reopen() {
    let temp_dir = TempDir::new().unwrap();
    let config = config_for(StorageBackend::Sqlite, &temp_dir);

    let (kept, dropped) = {
        let store = TodoStore::from_config(&config).await.unwrap();
        store.load().await;
        let kept = store.add("kept").await.unwrap();
        let dropped = store.add("dropped").await.unwrap();
        store.toggle(&kept.id).await;
        store.remove(&dropped.id).await;
        (kept, dropped)
    };

    let store = TodoStore::from_config(&config).await.unwrap();
    let todos = store.load().await;

    assert_eq!(todos.len(), 1);
    assert_eq!(todos[0].id, kept.id);
    assert!(todos[0].completed);
    assert!(todos.iter().all(|t| t.id != dropped.id));
}

#[tokio::test]
async fn test_persisted_layout_is_plain_json_array() {
    let temp_dir = TempDir::new().unwrap();
    let files = Arc::new(FileStore::new(temp_dir.path()));
    let store = TodoStore::new(files.clone(), "todos", IdScheme::Timestamp);

    let todo = store.add("walk dog").await.unwrap();

    let raw = files.get("todos").await.unwrap().unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(
        value,
        serde_json::json!([{ "id": todo.id, "text": "walk dog", "completed": false }])
    );
}

#[tokio::test]
async fn test_reads_collection_written_by_other_client() {
    let temp_dir = TempDir::new().unwrap();
    let db = Arc::new(SqliteStore::open(&temp_dir.path().join("todos.db")).await.unwrap());
    db.set(
        "todos",
        r#"[{"id":"1712000000000","text":"legacy","completed":true}]"#,
    )
    .await
    .unwrap();

    let store = TodoStore::new(db, "todos", IdScheme::Timestamp);
    let todos = store.load().await;

    assert_eq!(todos.len(), 1);
    assert_eq!(todos[0].text, "legacy");

    // New ids never collide with loaded ones
    let added = store.add("fresh").await.unwrap();
    assert_ne!(added.id, "1712000000000");
}

#[tokio::test]
async fn test_rapid_adds_get_unique_ids() {
    let temp_dir = TempDir::new().unwrap();
    let store = TodoStore::from_config(&config_for(StorageBackend::File, &temp_dir))
        .await
        .unwrap();

    for i in 0..100 {
        store.add(&format!("item {}", i)).await.unwrap();
    }

    let mut ids: Vec<_> = store.todos().await.into_iter().map(|t| t.id).collect();
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), 100);
}

#[tokio::test]
async fn test_uuid_scheme_store() {
    let temp_dir = TempDir::new().unwrap();
    let mut config = config_for(StorageBackend::File, &temp_dir);
    config.ids.scheme = IdScheme::Uuid;

    let store = TodoStore::from_config(&config).await.unwrap();
    let todo = store.add("with uuid").await.unwrap();

    assert!(uuid_like(&todo.id));
}

fn uuid_like(id: &str) -> bool {
    id.len() == 36 && id.chars().filter(|c| *c == '-').count() == 4
}
