use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use crate::model::{role::Role, user::NewUser};
use crate::store::{SqliteStore, Store};

pub(crate) fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")))
        .with_test_writer()
        .try_init();
}

/// Fresh in-memory store with the schema applied.
pub(crate) async fn setup_store() -> SqliteStore {
    init_test_tracing();
    let store = SqliteStore::in_memory().await.expect("in-memory sqlite");
    store.init_schema().await.expect("schema");
    store
}

pub(crate) async fn setup_shared_store() -> (SqliteStore, Arc<dyn Store>) {
    let store = setup_store().await;
    let shared: Arc<dyn Store> = Arc::new(store.clone());
    (store, shared)
}

/// Inserts a user with a throwaway (unverifiable) hash.
pub(crate) async fn insert_user(store: &dyn Store, username: &str, role: Role) -> i64 {
    store
        .create_user(&NewUser {
            name: format!("{username} name"),
            email: Some(format!("{username}@example.com")),
            username: username.to_string(),
            password_hash: "not-a-hash".to_string(),
            role,
            subject: None,
        })
        .await
        .expect("insert user")
}

pub(crate) async fn insert_teacher(store: &dyn Store, username: &str) -> i64 {
    insert_user(store, username, Role::Teacher).await
}

pub(crate) async fn insert_student(
    store: &dyn Store,
    teacher_id: i64,
    name: &str,
    class_level: i32,
) -> i64 {
    store
        .create_student(teacher_id, name, class_level)
        .await
        .expect("insert student")
}
