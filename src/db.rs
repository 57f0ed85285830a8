use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

use crate::auth::password::hash_password;
use crate::config::{Config, StorageBackend};
use crate::model::{role::Role, user::NewUser};
use crate::store::{MySqlStore, SqliteStore, Store};

/// Connects the configured backend, ensures the schema and seeds the first admin.
pub async fn init_store(config: &Config) -> Result<Arc<dyn Store>> {
    let store: Arc<dyn Store> = match config.storage_backend {
        StorageBackend::Sqlite => {
            if config.database_url.contains(":memory:") {
                Arc::new(SqliteStore::in_memory().await?)
            } else {
                ensure_sqlite_dir(&config.database_url)?;
                Arc::new(
                    SqliteStore::connect(&config.database_url)
                        .await
                        .context("Failed to open SQLite database")?,
                )
            }
        }
        StorageBackend::MySql => Arc::new(
            MySqlStore::connect(&config.database_url)
                .await
                .context("Failed to connect to MySQL")?,
        ),
    };

    store.init_schema().await.context("Failed to create schema")?;
    seed_admin(store.as_ref(), &config.admin_username, &config.admin_password).await?;

    info!(backend = %config.storage_backend, "Store ready");
    Ok(store)
}

/// Creates the default administrator when the store has none.
pub async fn seed_admin(store: &dyn Store, username: &str, password: &str) -> Result<bool> {
    if store.count_users_with_role(Role::Admin).await? > 0 {
        return Ok(false);
    }

    let password_hash = hash_password(password)
        .map_err(|e| anyhow::anyhow!("Failed to hash admin password: {e}"))?;
    store
        .create_user(&NewUser {
            name: "Administrator".to_string(),
            email: Some("admin@example.com".to_string()),
            username: username.to_string(),
            password_hash,
            role: Role::Admin,
            subject: None,
        })
        .await
        .context("Failed to seed admin user")?;

    info!(username, "Seeded default admin account");
    Ok(true)
}

/// SQLite creates the file but not its directory.
fn ensure_sqlite_dir(database_url: &str) -> Result<()> {
    let path = database_url
        .trim_start_matches("sqlite://")
        .trim_start_matches("sqlite:");
    let path = path.split('?').next().unwrap_or(path);
    if let Some(parent) = Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::test_utils::setup_store;

    #[actix_web::test]
    async fn admin_is_seeded_once() {
        let store = setup_store().await;
        assert!(seed_admin(&store, "admin", "admin123").await.unwrap());
        assert!(!seed_admin(&store, "admin", "admin123").await.unwrap());
        assert_eq!(store.count_users_with_role(Role::Admin).await.unwrap(), 1);

        let admin = store.find_user_by_username("admin").await.unwrap().unwrap();
        assert_eq!(admin.role, Role::Admin);
        assert!(admin.active);
        assert!(crate::auth::password::verify_password("admin123", &admin.password_hash));
    }
}
