//! Registry behaviour shared by every backend.
//!
//! Each scenario runs against the SQLite registry (in-memory database with
//! migrations applied) and against `MemoryRegistry`.
//!
//! Run:
//!   cargo test -p device-registry --test registry_tests

use std::sync::Arc;

use device_registry::{Database, DeviceRegistry, MemoryRegistry, RegistryError, SqliteRegistry};

async fn sqlite_registry() -> SqliteRegistry {
    let db = Database::connect_with_pool_size("sqlite::memory:", 1)
        .await
        .unwrap();
    db.migrate().await.unwrap();
    SqliteRegistry::new(db)
}

/// Run a scenario against both backends.
macro_rules! registry_test {
    ($name:ident, $scenario:ident) => {
        mod $name {
            use super::*;

            #[tokio::test]
            async fn sqlite() {
                $scenario(&sqlite_registry().await).await;
            }

            #[tokio::test]
            async fn memory() {
                $scenario(&MemoryRegistry::new()).await;
            }
        }
    };
}

// ============================================================================
// Scenarios
// ============================================================================

async fn lookup_after_upsert(registry: &dyn DeviceRegistry) {
    let stored = registry.upsert("switch-01", 100, 555, 777).await.unwrap();
    assert_eq!(stored.device_id, "switch-01");
    assert_eq!(stored.author_id, 100);

    let binding = registry.lookup("switch-01", 100).await.unwrap();
    assert_eq!(binding, stored);
    assert_eq!(binding.message_id, 555);
    assert_eq!(binding.channel_id, 777);
}

async fn upsert_is_idempotent(registry: &dyn DeviceRegistry) {
    registry.upsert("switch-01", 100, 555, 777).await.unwrap();
    registry.upsert("switch-01", 100, 555, 777).await.unwrap();

    let bindings = registry.list_by_device("switch-01").await.unwrap();
    assert_eq!(bindings.len(), 1);
    assert_eq!((bindings[0].message_id, bindings[0].channel_id), (555, 777));
    assert_eq!(registry.count().await.unwrap(), 1);
}

async fn upsert_overwrites_provenance(registry: &dyn DeviceRegistry) {
    registry.upsert("switch-01", 100, 1, 10).await.unwrap();
    registry.upsert("switch-01", 100, 2, 20).await.unwrap();

    let binding = registry.lookup("switch-01", 100).await.unwrap();
    assert_eq!((binding.message_id, binding.channel_id), (2, 20));

    // The old message no longer resolves to the binding.
    let result = registry.lookup_by_message(1).await;
    assert!(matches!(result, Err(RegistryError::MessageNotFound { message_id: 1 })));
}

async fn device_bound_to_many_authors(registry: &dyn DeviceRegistry) {
    registry.upsert("switch-01", 200, 556, 777).await.unwrap();
    registry.upsert("switch-01", 100, 555, 777).await.unwrap();

    let bindings = registry.list_by_device("switch-01").await.unwrap();
    let authors: Vec<i64> = bindings.iter().map(|b| b.author_id).collect();
    assert_eq!(authors, vec![100, 200]);
}

async fn author_bound_to_many_devices(registry: &dyn DeviceRegistry) {
    registry.upsert("switch-02", 100, 556, 777).await.unwrap();
    registry.upsert("switch-01", 100, 555, 777).await.unwrap();
    registry.upsert("switch-03", 200, 557, 777).await.unwrap();

    let bindings = registry.list_by_author(100).await.unwrap();
    let devices: Vec<&str> = bindings.iter().map(|b| b.device_id.as_str()).collect();
    assert_eq!(devices, vec!["switch-01", "switch-02"]);

    assert!(registry.list_by_author(300).await.unwrap().is_empty());
}

async fn remove_then_lookup(registry: &dyn DeviceRegistry) {
    registry.upsert("switch-01", 100, 555, 777).await.unwrap();

    assert!(registry.remove("switch-01", 100).await.unwrap());

    let result = registry.lookup("switch-01", 100).await;
    assert!(matches!(result, Err(ref e) if e.is_not_found()));

    // Absent keys are not an error.
    assert!(!registry.remove("switch-01", 100).await.unwrap());
    assert!(!registry.remove("never-registered", 42).await.unwrap());
}

async fn register_list_remove_walkthrough(registry: &dyn DeviceRegistry) {
    registry.upsert("switch-01", 100, 555, 777).await.unwrap();
    let binding = registry.lookup("switch-01", 100).await.unwrap();
    assert_eq!((binding.message_id, binding.channel_id), (555, 777));

    registry.upsert("switch-01", 200, 556, 777).await.unwrap();
    let bindings = registry.list_by_device("switch-01").await.unwrap();
    let authors: Vec<i64> = bindings.iter().map(|b| b.author_id).collect();
    assert_eq!(authors, vec![100, 200]);

    registry.remove("switch-01", 100).await.unwrap();
    let bindings = registry.list_by_device("switch-01").await.unwrap();
    let authors: Vec<i64> = bindings.iter().map(|b| b.author_id).collect();
    assert_eq!(authors, vec![200]);
}

async fn authorization(registry: &dyn DeviceRegistry) {
    registry.upsert("switch-01", 100, 555, 777).await.unwrap();

    assert!(registry.is_authorized("switch-01", 100).await.unwrap());
    assert!(!registry.is_authorized("switch-01", 200).await.unwrap());
    assert!(!registry.is_authorized("switch-02", 100).await.unwrap());
}

async fn message_cleanup(registry: &dyn DeviceRegistry) {
    registry.upsert("switch-01", 100, 555, 777).await.unwrap();
    registry.upsert("switch-02", 100, 556, 777).await.unwrap();

    let binding = registry.lookup_by_message(555).await.unwrap();
    assert_eq!(binding.key(), ("switch-01", 100));

    assert_eq!(registry.remove_by_message(555).await.unwrap(), 1);
    assert_eq!(registry.remove_by_message(555).await.unwrap(), 0);

    let remaining = registry.list_all().await.unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].device_id, "switch-02");
}

async fn device_reset(registry: &dyn DeviceRegistry) {
    registry.upsert("switch-01", 100, 555, 777).await.unwrap();
    registry.upsert("switch-01", 200, 556, 777).await.unwrap();
    registry.upsert("switch-02", 100, 557, 777).await.unwrap();

    assert_eq!(registry.remove_device("switch-01").await.unwrap(), 2);
    assert_eq!(registry.remove_device("switch-01").await.unwrap(), 0);

    assert!(registry.list_by_device("switch-01").await.unwrap().is_empty());
    assert_eq!(registry.count().await.unwrap(), 1);
}

async fn list_all_is_ordered(registry: &dyn DeviceRegistry) {
    registry.upsert("switch-02", 100, 1, 1).await.unwrap();
    registry.upsert("switch-01", 200, 2, 1).await.unwrap();
    registry.upsert("switch-01", 100, 3, 1).await.unwrap();

    let all = registry.list_all().await.unwrap();
    let keys: Vec<(&str, i64)> = all.iter().map(|b| b.key()).collect();
    assert_eq!(
        keys,
        vec![("switch-01", 100), ("switch-01", 200), ("switch-02", 100)]
    );
}

async fn device_ids_round_trip_verbatim(registry: &dyn DeviceRegistry) {
    let ids = ["bf3a.sub1", "dev:01", "éclairage", "switch 01", " padded", "padded "];

    for (i, id) in ids.iter().enumerate() {
        let stored = registry.upsert(id, 100, i as i64, 777).await.unwrap();
        assert_eq!(stored.device_id, *id);
    }

    for (i, id) in ids.iter().enumerate() {
        let binding = registry.lookup(id, 100).await.unwrap();
        assert_eq!(binding.device_id, *id);
        assert_eq!(binding.message_id, i as i64);
    }

    // Whitespace is significant: " padded" and "padded " stay distinct.
    assert_eq!(registry.count().await.unwrap(), ids.len() as i64);
    let result = registry.lookup("padded", 100).await;
    assert!(matches!(result, Err(ref e) if e.is_not_found()));
}

async fn empty_id_and_negative_snowflakes_are_rejected(registry: &dyn DeviceRegistry) {
    let result = registry.upsert("", 100, 555, 777).await;
    assert!(matches!(result, Err(RegistryError::Invalid(_))));

    let result = registry.upsert("switch-01", 100, 555, -777).await;
    assert!(matches!(result, Err(RegistryError::Invalid(_))));

    let result = registry.remove("", 100).await;
    assert!(matches!(result, Err(RegistryError::Invalid(_))));

    assert_eq!(registry.count().await.unwrap(), 0);
}

registry_test!(lookup_after_upsert_tests, lookup_after_upsert);
registry_test!(upsert_is_idempotent_tests, upsert_is_idempotent);
registry_test!(upsert_overwrites_provenance_tests, upsert_overwrites_provenance);
registry_test!(device_bound_to_many_authors_tests, device_bound_to_many_authors);
registry_test!(author_bound_to_many_devices_tests, author_bound_to_many_devices);
registry_test!(remove_then_lookup_tests, remove_then_lookup);
registry_test!(register_list_remove_walkthrough_tests, register_list_remove_walkthrough);
registry_test!(authorization_tests, authorization);
registry_test!(message_cleanup_tests, message_cleanup);
registry_test!(device_reset_tests, device_reset);
registry_test!(list_all_is_ordered_tests, list_all_is_ordered);
registry_test!(device_ids_round_trip_verbatim_tests, device_ids_round_trip_verbatim);
registry_test!(
    empty_id_and_negative_snowflakes_are_rejected_tests,
    empty_id_and_negative_snowflakes_are_rejected
);

// ============================================================================
// File-backed database
// ============================================================================

fn temp_database_url(tag: &str) -> (std::path::PathBuf, String) {
    let path = std::env::temp_dir().join(format!(
        "device-registry-{}-{}.db",
        std::process::id(),
        tag
    ));
    let _ = std::fs::remove_file(&path);
    let url = format!("sqlite:{}?mode=rwc", path.display());
    (path, url)
}

#[tokio::test]
async fn bindings_survive_reconnect() {
    let (path, url) = temp_database_url("reconnect");

    {
        let db = Database::connect(&url).await.unwrap();
        db.migrate().await.unwrap();
        let registry = SqliteRegistry::new(db.clone());
        registry.upsert("switch-01", 100, 555, 777).await.unwrap();
        db.close().await;
    }

    let db = Database::connect(&url).await.unwrap();
    db.migrate().await.unwrap();
    let registry = SqliteRegistry::new(db.clone());
    let binding = registry.lookup("switch-01", 100).await.unwrap();
    assert_eq!((binding.message_id, binding.channel_id), (555, 777));
    db.close().await;

    let _ = std::fs::remove_file(&path);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_upserts_keep_keys_unique() {
    let (path, url) = temp_database_url("concurrent");

    let db = Database::connect(&url).await.unwrap();
    db.migrate().await.unwrap();
    let registry = Arc::new(SqliteRegistry::new(db.clone()));

    // 64 writers over 8 authors: every author is upserted 8 times at once.
    let handles: Vec<_> = (0..64i64)
        .map(|i| {
            let registry = Arc::clone(&registry);
            tokio::spawn(async move {
                registry
                    .upsert("switch-01", 100 + i % 8, 1000 + i, 777)
                    .await
            })
        })
        .collect();

    let mut errors = 0;
    for handle in handles {
        if handle.await.unwrap().is_err() {
            errors += 1;
        }
    }
    assert_eq!(errors, 0);

    let bindings = registry.list_by_device("switch-01").await.unwrap();
    let authors: Vec<i64> = bindings.iter().map(|b| b.author_id).collect();
    assert_eq!(authors, (100..108).collect::<Vec<i64>>());
    assert_eq!(registry.count().await.unwrap(), 8);

    // Each surviving row carries provenance from one of its own writers.
    for binding in &bindings {
        assert_eq!((binding.message_id - 1000) % 8, binding.author_id - 100);
    }

    db.close().await;
    let _ = std::fs::remove_file(&path);
}
