//! Live MySQL integration tests.
//!
//! Ignored by default; point them at a disposable database and run with
//! `cargo test -- --ignored`:
//!
//! ```sh
//! export HOMESTEAD_TEST_MYSQL_HOST=127.0.0.1
//! export HOMESTEAD_TEST_MYSQL_DATABASE=homestead_test
//! export HOMESTEAD_TEST_MYSQL_USERNAME=root
//! export HOMESTEAD_TEST_MYSQL_PASSWORD=secret
//! ```

use std::sync::Arc;

use uuid::Uuid;

use homestead_core::{Home, MysqlConfig};
use homestead_storage::{AllWorlds, HomeBackend, MysqlBackend};

fn config_from_env() -> MysqlConfig {
    let mut config = MysqlConfig::default();
    if let Ok(host) = std::env::var("HOMESTEAD_TEST_MYSQL_HOST") {
        config.host = host;
    }
    if let Ok(database) = std::env::var("HOMESTEAD_TEST_MYSQL_DATABASE") {
        config.database = database;
    }
    if let Ok(username) = std::env::var("HOMESTEAD_TEST_MYSQL_USERNAME") {
        config.username = username;
    }
    if let Ok(password) = std::env::var("HOMESTEAD_TEST_MYSQL_PASSWORD") {
        config.password = password;
    }
    config
}

#[tokio::test]
#[ignore = "needs a live MySQL instance"]
async fn save_load_delete_roundtrip() {
    let backend = MysqlBackend::connect(&config_from_env(), Arc::new(AllWorlds))
        .await
        .expect("connect to test database");
    let owner = Uuid::new_v4();

    let home = Home::new("spawn", "world", 10.5, 64.0, -10.5, 90.0, -5.0).unwrap();
    backend.save_one(owner, &home).await;

    let loaded = backend.load_all(owner).await;
    assert_eq!(loaded.get("spawn"), Some(&home));

    backend.delete_one(owner, "spawn").await;
    assert!(backend.load_all(owner).await.is_empty());

    backend.close().await;
}

#[tokio::test]
#[ignore = "needs a live MySQL instance"]
async fn upsert_preserves_created_at_column() {
    let backend = MysqlBackend::connect(&config_from_env(), Arc::new(AllWorlds))
        .await
        .expect("connect to test database");
    let owner = Uuid::new_v4();

    let original = Home::from_parts("base", "world", 1.0, 2.0, 3.0, 0.0, 0.0, 1_000);
    backend.save_one(owner, &original).await;

    // second write carries a different creation stamp; the row keeps the first
    let replacement = Home::from_parts("base", "world", 7.0, 8.0, 9.0, 45.0, 0.0, 2_000);
    backend.save_one(owner, &replacement).await;

    let loaded = backend.load_all(owner).await;
    let stored = loaded.get("base").unwrap();
    assert_eq!(stored.x, 7.0);
    assert_eq!(stored.created_at_ms, 1_000);

    backend.delete_all(owner).await;
    backend.close().await;
}

#[tokio::test]
#[ignore = "needs a live MySQL instance"]
async fn identity_and_statistics_rows() {
    let backend = MysqlBackend::connect(&config_from_env(), Arc::new(AllWorlds))
        .await
        .expect("connect to test database");
    let owner = Uuid::new_v4();

    backend.touch_owner(owner, "Steve").await;
    backend.record_visit(owner, "Spawn").await;
    backend.record_visit(owner, "spawn").await;

    assert_eq!(backend.visit_count(owner).await.unwrap(), 2);
    assert!(backend.total_homes().await.unwrap() >= 0);

    backend.close().await;
}
