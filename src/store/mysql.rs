use sqlx::{
    MySqlConnection, MySqlPool,
    mysql::{MySqlPoolOptions, MySqlQueryResult},
};

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS users (
        id BIGINT NOT NULL AUTO_INCREMENT PRIMARY KEY,
        name VARCHAR(255) NOT NULL,
        email VARCHAR(255) NULL,
        username VARCHAR(100) NOT NULL,
        password_hash VARCHAR(255) NOT NULL,
        role VARCHAR(16) NOT NULL,
        subject VARCHAR(255) NULL,
        active BOOLEAN NOT NULL DEFAULT TRUE,
        UNIQUE KEY uq_users_username (username),
        CHECK (role IN ('ADMIN', 'GURU'))
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS students (
        id BIGINT NOT NULL AUTO_INCREMENT PRIMARY KEY,
        name VARCHAR(255) NOT NULL,
        class_level INT NOT NULL,
        active BOOLEAN NOT NULL DEFAULT TRUE,
        teacher_id BIGINT NOT NULL,
        CHECK (class_level IN (7, 8, 9)),
        CONSTRAINT fk_students_teacher FOREIGN KEY (teacher_id) REFERENCES users (id)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS attendance (
        id BIGINT NOT NULL AUTO_INCREMENT PRIMARY KEY,
        student_id BIGINT NOT NULL,
        teacher_id BIGINT NOT NULL,
        date DATE NOT NULL,
        status VARCHAR(16) NOT NULL,
        sick_date DATE NULL,
        excused_start_date DATE NULL,
        excused_days INT NULL,
        excused_reason TEXT NULL,
        created_at DATETIME NOT NULL,
        UNIQUE KEY uq_attendance_student_teacher_date (student_id, teacher_id, date),
        CHECK (status IN ('PRESENT', 'SICK', 'EXCUSED')),
        CONSTRAINT fk_attendance_student FOREIGN KEY (student_id) REFERENCES students (id),
        CONSTRAINT fk_attendance_teacher FOREIGN KEY (teacher_id) REFERENCES users (id)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS teacher_daily_status (
        id BIGINT NOT NULL AUTO_INCREMENT PRIMARY KEY,
        teacher_id BIGINT NOT NULL,
        date DATE NOT NULL,
        status VARCHAR(16) NOT NULL,
        reason TEXT NULL,
        UNIQUE KEY uq_daily_status_teacher_date (teacher_id, date),
        CHECK (status IN ('DONE', 'NOT_DONE')),
        CONSTRAINT fk_daily_status_teacher FOREIGN KEY (teacher_id) REFERENCES users (id)
    )
    "#,
];

/// Store backed by a MySQL server.
#[derive(Clone)]
pub struct MySqlStore {
    pool: MySqlPool,
}

impl MySqlStore {
    pub async fn connect(database_url: &str) -> Result<Self, sqlx::Error> {
        let pool = MySqlPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await?;
        Ok(Self { pool })
    }
}

crate::store::impl_sql_store!(
    MySqlStore,
    MySqlConnection,
    SCHEMA,
    |r: &MySqlQueryResult| r.last_insert_id() as i64
);
