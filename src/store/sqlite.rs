use std::str::FromStr;

use sqlx::{
    SqliteConnection, SqlitePool,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteQueryResult},
};

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS users (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        email TEXT,
        username TEXT NOT NULL UNIQUE,
        password_hash TEXT NOT NULL,
        role TEXT NOT NULL CHECK (role IN ('ADMIN', 'GURU')),
        subject TEXT,
        active BOOLEAN NOT NULL DEFAULT 1
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS students (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        class_level INTEGER NOT NULL CHECK (class_level IN (7, 8, 9)),
        active BOOLEAN NOT NULL DEFAULT 1,
        teacher_id INTEGER NOT NULL REFERENCES users (id)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS attendance (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        student_id INTEGER NOT NULL REFERENCES students (id),
        teacher_id INTEGER NOT NULL REFERENCES users (id),
        date DATE NOT NULL,
        status TEXT NOT NULL CHECK (status IN ('PRESENT', 'SICK', 'EXCUSED')),
        sick_date DATE,
        excused_start_date DATE,
        excused_days INTEGER,
        excused_reason TEXT,
        created_at DATETIME NOT NULL,
        UNIQUE (student_id, teacher_id, date)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS teacher_daily_status (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        teacher_id INTEGER NOT NULL REFERENCES users (id),
        date DATE NOT NULL,
        status TEXT NOT NULL CHECK (status IN ('DONE', 'NOT_DONE')),
        reason TEXT,
        UNIQUE (teacher_id, date)
    )
    "#,
];

/// Single-file store for deployments without a database server.
#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Opens (creating if needed) the database at `database_url`.
    pub async fn connect(database_url: &str) -> Result<Self, sqlx::Error> {
        let options = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;
        Ok(Self { pool })
    }

    /// Private in-memory database. The pool keeps exactly one connection alive
    /// since every new connection would see an empty database.
    pub async fn in_memory() -> Result<Self, sqlx::Error> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;
        Ok(Self { pool })
    }

    #[cfg(test)]
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

crate::store::impl_sql_store!(
    SqliteStore,
    SqliteConnection,
    SCHEMA,
    |r: &SqliteQueryResult| r.last_insert_rowid()
);
