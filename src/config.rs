use std::env;
use std::str::FromStr;

use anyhow::{Context, Result, bail};
use dotenvy::dotenv;

/// Which storage implementation serves the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::EnumString, strum_macros::Display)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum StorageBackend {
    Sqlite,
    #[strum(serialize = "mysql")]
    MySql,
}

impl StorageBackend {
    fn from_url(database_url: &str) -> Option<Self> {
        if database_url.starts_with("sqlite:") {
            Some(StorageBackend::Sqlite)
        } else if database_url.starts_with("mysql:") || database_url.starts_with("mariadb:") {
            Some(StorageBackend::MySql)
        } else {
            None
        }
    }
}

#[derive(Clone)]
pub struct Config {
    pub server_addr: String,
    pub storage_backend: StorageBackend,
    pub database_url: String,
    pub jwt_secret: String,
    pub access_token_ttl: usize,

    // Rate limiting
    pub rate_login_per_min: u32,
    pub rate_protected_per_min: u32,

    pub api_prefix: String,

    // Seeded when no admin exists yet
    pub admin_username: String,
    pub admin_password: String,

    pub log_dir: String,
}

const DEFAULT_SQLITE_URL: &str = "sqlite://data/absensi.db";

fn var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_var<T: FromStr>(key: &str, default: &str) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    let raw = var_or(key, default);
    raw.parse::<T>()
        .map_err(|e| anyhow::anyhow!("{key} has invalid value {raw:?}: {e}"))
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        let database_url = var_or("DATABASE_URL", DEFAULT_SQLITE_URL);
        let storage_backend = match env::var("STORAGE_BACKEND") {
            Ok(value) => StorageBackend::from_str(&value)
                .with_context(|| format!("STORAGE_BACKEND must be sqlite or mysql, got {value:?}"))?,
            Err(_) => StorageBackend::from_url(&database_url).unwrap_or(StorageBackend::Sqlite),
        };
        if let Some(from_url) = StorageBackend::from_url(&database_url) {
            if from_url != storage_backend {
                bail!("STORAGE_BACKEND={storage_backend} does not match DATABASE_URL scheme");
            }
        }

        Ok(Self {
            server_addr: var_or("SERVER_ADDR", "0.0.0.0:3000"),
            storage_backend,
            database_url,
            jwt_secret: env::var("JWT_SECRET").context("JWT_SECRET must be set")?,
            access_token_ttl: parse_var("ACCESS_TOKEN_TTL", "28800")?, // default 8 hours

            rate_login_per_min: parse_var("RATE_LOGIN_PER_MIN", "60")?,
            rate_protected_per_min: parse_var("RATE_PROTECTED_PER_MIN", "1000")?,

            api_prefix: var_or("API_PREFIX", "/api"),

            admin_username: var_or("ADMIN_USERNAME", "admin"),
            admin_password: var_or("ADMIN_PASSWORD", "admin123"),

            log_dir: var_or("LOG_DIR", "logs"),
        })
    }

    #[cfg(test)]
    pub fn for_tests() -> Self {
        Self {
            server_addr: "127.0.0.1:0".to_string(),
            storage_backend: StorageBackend::Sqlite,
            database_url: "sqlite::memory:".to_string(),
            jwt_secret: "test-secret".to_string(),
            access_token_ttl: 3600,
            rate_login_per_min: 1000,
            rate_protected_per_min: 1000,
            api_prefix: "/api".to_string(),
            admin_username: "admin".to_string(),
            admin_password: "admin123".to_string(),
            log_dir: "logs".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_inferred_from_url_scheme() {
        assert_eq!(
            StorageBackend::from_url("sqlite://data/absensi.db"),
            Some(StorageBackend::Sqlite)
        );
        assert_eq!(
            StorageBackend::from_url("mysql://root@localhost/absensi"),
            Some(StorageBackend::MySql)
        );
        assert_eq!(StorageBackend::from_url("postgres://x"), None);
    }

    #[test]
    fn backend_names_parse_case_insensitively() {
        assert_eq!(StorageBackend::from_str("MySQL").unwrap(), StorageBackend::MySql);
        assert_eq!(StorageBackend::from_str("sqlite").unwrap(), StorageBackend::Sqlite);
        assert!(StorageBackend::from_str("postgres").is_err());
    }
}
