//! Persistent record store.
//!
//! Handlers only see [`Store`]. The SQLite (local file) and MySQL (networked)
//! backends run the same parameterized SQL; they differ in DDL, connection
//! setup and how the id of an inserted row is read back.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::model::{
    attendance::{AttendanceEntry, AttendanceRecord, BatchOutcome},
    daily_status::{DailyStatus, TeacherDailyStatus},
    report::{ExportFilter, ExportRow, TeacherStatusRow},
    role::Role,
    student::{Student, StudentFilter},
    user::{NewUser, TeacherUpdate, User},
};

pub type StoreResult<T> = Result<T, sqlx::Error>;

#[async_trait]
pub trait Store: Send + Sync {
    /// Creates missing tables. Safe to run on every start.
    async fn init_schema(&self) -> StoreResult<()>;

    async fn find_user_by_username(&self, username: &str) -> StoreResult<Option<User>>;
    async fn get_user(&self, id: i64) -> StoreResult<Option<User>>;
    async fn count_users_with_role(&self, role: Role) -> StoreResult<i64>;
    async fn list_teachers(&self) -> StoreResult<Vec<User>>;
    async fn create_user(&self, user: &NewUser) -> StoreResult<i64>;
    /// Returns false when no teacher has this id.
    async fn update_teacher(&self, id: i64, update: &TeacherUpdate) -> StoreResult<bool>;
    /// Flips the active flag of a user with the given role and returns the new value.
    async fn toggle_user_active(&self, id: i64, role: Role) -> StoreResult<Option<bool>>;

    /// Students owned by `teacher_id`, ordered by name.
    async fn list_students(&self, teacher_id: i64, filter: StudentFilter)
    -> StoreResult<Vec<Student>>;
    async fn create_student(&self, teacher_id: i64, name: &str, class_level: i32)
    -> StoreResult<i64>;
    /// Flips the active flag of a student owned by `teacher_id`.
    async fn toggle_student_active(&self, teacher_id: i64, student_id: i64)
    -> StoreResult<Option<bool>>;

    async fn list_attendance(
        &self,
        teacher_id: i64,
        date: NaiveDate,
    ) -> StoreResult<Vec<AttendanceRecord>>;

    /// Upserts one record per active student of `teacher_id` that has an entry,
    /// then marks the teacher's day as done. Runs in a single transaction.
    async fn record_attendance_batch(
        &self,
        teacher_id: i64,
        date: NaiveDate,
        entries: &BTreeMap<i64, AttendanceEntry>,
    ) -> StoreResult<BatchOutcome>;

    async fn get_daily_status(
        &self,
        teacher_id: i64,
        date: NaiveDate,
    ) -> StoreResult<Option<TeacherDailyStatus>>;

    /// Upserts the (teacher, date) status. `reason` is written as given.
    async fn set_daily_status(
        &self,
        teacher_id: i64,
        date: NaiveDate,
        status: DailyStatus,
        reason: Option<&str>,
    ) -> StoreResult<()>;

    /// Every active teacher with their status for `date` (if reported).
    async fn teacher_statuses(&self, date: NaiveDate) -> StoreResult<Vec<TeacherStatusRow>>;

    async fn export_rows(&self, filter: &ExportFilter) -> StoreResult<Vec<ExportRow>>;
}

/// Implements [`Store`] for a pool-backed struct.
///
/// `$conn` is the driver's connection type and `$last_id` reads the new row id
/// out of the driver's query result.
macro_rules! impl_sql_store {
    ($store:ty, $conn:ty, $schema:expr, $last_id:expr) => {
        use std::collections::BTreeMap;

        use async_trait::async_trait;
        use chrono::{NaiveDate, Utc};
        use tracing::{debug, instrument, warn};

        use crate::model::{
            attendance::{AttendanceEntry, AttendanceRecord, BatchOutcome},
            daily_status::{DailyStatus, TeacherDailyStatus},
            report::{ExportFilter, ExportRow, TeacherStatusRow},
            role::Role,
            student::{Student, StudentFilter},
            user::{NewUser, TeacherUpdate, User},
        };
        use crate::store::{Store, StoreResult};

        const USER_COLUMNS: &str =
            "id, name, email, username, password_hash, role, subject, active";

        async fn upsert_daily_status(
            conn: &mut $conn,
            teacher_id: i64,
            date: NaiveDate,
            status: DailyStatus,
            reason: Option<&str>,
        ) -> StoreResult<()> {
            let existing: Option<(i64,)> = sqlx::query_as(
                "SELECT id FROM teacher_daily_status WHERE teacher_id = ? AND date = ?",
            )
            .bind(teacher_id)
            .bind(date)
            .fetch_optional(&mut *conn)
            .await?;

            match existing {
                Some((id,)) => {
                    sqlx::query("UPDATE teacher_daily_status SET status = ?, reason = ? WHERE id = ?")
                        .bind(status)
                        .bind(reason)
                        .bind(id)
                        .execute(&mut *conn)
                        .await?;
                }
                None => {
                    sqlx::query(
                        "INSERT INTO teacher_daily_status (teacher_id, date, status, reason) VALUES (?, ?, ?, ?)",
                    )
                    .bind(teacher_id)
                    .bind(date)
                    .bind(status)
                    .bind(reason)
                    .execute(&mut *conn)
                    .await?;
                }
            }
            Ok(())
        }

        async fn write_batch(
            conn: &mut $conn,
            teacher_id: i64,
            date: NaiveDate,
            entries: &BTreeMap<i64, AttendanceEntry>,
        ) -> StoreResult<BatchOutcome> {
            let students: Vec<(i64,)> = sqlx::query_as(
                "SELECT id FROM students WHERE teacher_id = ? AND active = ? ORDER BY id",
            )
            .bind(teacher_id)
            .bind(true)
            .fetch_all(&mut *conn)
            .await?;

            let now = Utc::now().naive_utc();
            let mut outcome = BatchOutcome::default();

            for (student_id,) in students {
                let Some(entry) = entries.get(&student_id) else {
                    outcome.skipped += 1;
                    continue;
                };

                let existing: Option<(i64,)> = sqlx::query_as(
                    "SELECT id FROM attendance WHERE student_id = ? AND teacher_id = ? AND date = ?",
                )
                .bind(student_id)
                .bind(teacher_id)
                .bind(date)
                .fetch_optional(&mut *conn)
                .await?;

                match existing {
                    Some((id,)) => {
                        sqlx::query(
                            r#"
                            UPDATE attendance
                            SET status = ?, sick_date = ?, excused_start_date = ?,
                                excused_days = ?, excused_reason = ?
                            WHERE id = ?
                            "#,
                        )
                        .bind(entry.status)
                        .bind(entry.sick_date)
                        .bind(entry.excused_start_date)
                        .bind(entry.excused_days)
                        .bind(entry.excused_reason.as_deref())
                        .bind(id)
                        .execute(&mut *conn)
                        .await?;
                        outcome.updated += 1;
                    }
                    None => {
                        sqlx::query(
                            r#"
                            INSERT INTO attendance
                                (student_id, teacher_id, date, status, sick_date,
                                 excused_start_date, excused_days, excused_reason, created_at)
                            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
                            "#,
                        )
                        .bind(student_id)
                        .bind(teacher_id)
                        .bind(date)
                        .bind(entry.status)
                        .bind(entry.sick_date)
                        .bind(entry.excused_start_date)
                        .bind(entry.excused_days)
                        .bind(entry.excused_reason.as_deref())
                        .bind(now)
                        .execute(&mut *conn)
                        .await?;
                        outcome.inserted += 1;
                    }
                }
            }

            upsert_daily_status(conn, teacher_id, date, DailyStatus::Done, None).await?;

            Ok(outcome)
        }

        #[async_trait]
        impl Store for $store {
            async fn init_schema(&self) -> StoreResult<()> {
                for ddl in $schema {
                    sqlx::query(*ddl).execute(&self.pool).await?;
                }
                debug!("Schema ensured");
                Ok(())
            }

            async fn find_user_by_username(&self, username: &str) -> StoreResult<Option<User>> {
                sqlx::query_as::<_, User>(&format!(
                    "SELECT {USER_COLUMNS} FROM users WHERE username = ?"
                ))
                .bind(username)
                .fetch_optional(&self.pool)
                .await
            }

            async fn get_user(&self, id: i64) -> StoreResult<Option<User>> {
                sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?"))
                    .bind(id)
                    .fetch_optional(&self.pool)
                    .await
            }

            async fn count_users_with_role(&self, role: Role) -> StoreResult<i64> {
                sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users WHERE role = ?")
                    .bind(role)
                    .fetch_one(&self.pool)
                    .await
            }

            async fn list_teachers(&self) -> StoreResult<Vec<User>> {
                sqlx::query_as::<_, User>(&format!(
                    "SELECT {USER_COLUMNS} FROM users WHERE role = ? ORDER BY name, id"
                ))
                .bind(Role::Teacher)
                .fetch_all(&self.pool)
                .await
            }

            async fn create_user(&self, user: &NewUser) -> StoreResult<i64> {
                let result = sqlx::query(
                    r#"
                    INSERT INTO users (name, email, username, password_hash, role, subject, active)
                    VALUES (?, ?, ?, ?, ?, ?, ?)
                    "#,
                )
                .bind(&user.name)
                .bind(user.email.as_deref())
                .bind(&user.username)
                .bind(&user.password_hash)
                .bind(user.role)
                .bind(user.subject.as_deref())
                .bind(true)
                .execute(&self.pool)
                .await?;
                Ok(($last_id)(&result))
            }

            async fn update_teacher(&self, id: i64, update: &TeacherUpdate) -> StoreResult<bool> {
                let mut tx = self.pool.begin().await?;

                let exists: Option<(i64,)> =
                    sqlx::query_as("SELECT id FROM users WHERE id = ? AND role = ?")
                        .bind(id)
                        .bind(Role::Teacher)
                        .fetch_optional(&mut *tx)
                        .await?;
                if exists.is_none() {
                    tx.rollback().await?;
                    return Ok(false);
                }

                sqlx::query(
                    "UPDATE users SET name = ?, email = ?, username = ?, subject = ? WHERE id = ?",
                )
                .bind(&update.name)
                .bind(update.email.as_deref())
                .bind(&update.username)
                .bind(update.subject.as_deref())
                .bind(id)
                .execute(&mut *tx)
                .await?;

                if let Some(hash) = &update.password_hash {
                    sqlx::query("UPDATE users SET password_hash = ? WHERE id = ?")
                        .bind(hash)
                        .bind(id)
                        .execute(&mut *tx)
                        .await?;
                }

                tx.commit().await?;
                Ok(true)
            }

            async fn toggle_user_active(&self, id: i64, role: Role) -> StoreResult<Option<bool>> {
                let mut tx = self.pool.begin().await?;
                let updated = sqlx::query("UPDATE users SET active = NOT active WHERE id = ? AND role = ?")
                    .bind(id)
                    .bind(role)
                    .execute(&mut *tx)
                    .await?;
                if updated.rows_affected() == 0 {
                    tx.rollback().await?;
                    return Ok(None);
                }
                let active = sqlx::query_scalar::<_, bool>("SELECT active FROM users WHERE id = ?")
                    .bind(id)
                    .fetch_one(&mut *tx)
                    .await?;
                tx.commit().await?;
                Ok(Some(active))
            }

            async fn list_students(
                &self,
                teacher_id: i64,
                filter: StudentFilter,
            ) -> StoreResult<Vec<Student>> {
                let mut sql = String::from(
                    "SELECT id, name, class_level, active, teacher_id FROM students WHERE teacher_id = ?",
                );
                if filter.class_level.is_some() {
                    sql.push_str(" AND class_level = ?");
                }
                if filter.active_only {
                    sql.push_str(" AND active = ?");
                }
                sql.push_str(" ORDER BY name, id");

                let mut query = sqlx::query_as::<_, Student>(&sql).bind(teacher_id);
                if let Some(level) = filter.class_level {
                    query = query.bind(level);
                }
                if filter.active_only {
                    query = query.bind(true);
                }
                query.fetch_all(&self.pool).await
            }

            async fn create_student(
                &self,
                teacher_id: i64,
                name: &str,
                class_level: i32,
            ) -> StoreResult<i64> {
                let result = sqlx::query(
                    "INSERT INTO students (name, class_level, active, teacher_id) VALUES (?, ?, ?, ?)",
                )
                .bind(name)
                .bind(class_level)
                .bind(true)
                .bind(teacher_id)
                .execute(&self.pool)
                .await?;
                Ok(($last_id)(&result))
            }

            async fn toggle_student_active(
                &self,
                teacher_id: i64,
                student_id: i64,
            ) -> StoreResult<Option<bool>> {
                let mut tx = self.pool.begin().await?;
                let updated = sqlx::query(
                    "UPDATE students SET active = NOT active WHERE id = ? AND teacher_id = ?",
                )
                .bind(student_id)
                .bind(teacher_id)
                .execute(&mut *tx)
                .await?;
                if updated.rows_affected() == 0 {
                    tx.rollback().await?;
                    return Ok(None);
                }
                let active = sqlx::query_scalar::<_, bool>("SELECT active FROM students WHERE id = ?")
                    .bind(student_id)
                    .fetch_one(&mut *tx)
                    .await?;
                tx.commit().await?;
                Ok(Some(active))
            }

            async fn list_attendance(
                &self,
                teacher_id: i64,
                date: NaiveDate,
            ) -> StoreResult<Vec<AttendanceRecord>> {
                sqlx::query_as::<_, AttendanceRecord>(
                    r#"
                    SELECT id, student_id, teacher_id, date, status, sick_date,
                           excused_start_date, excused_days, excused_reason, created_at
                    FROM attendance
                    WHERE teacher_id = ? AND date = ?
                    ORDER BY student_id
                    "#,
                )
                .bind(teacher_id)
                .bind(date)
                .fetch_all(&self.pool)
                .await
            }

            #[instrument(skip(self, entries), fields(entries = entries.len()))]
            async fn record_attendance_batch(
                &self,
                teacher_id: i64,
                date: NaiveDate,
                entries: &BTreeMap<i64, AttendanceEntry>,
            ) -> StoreResult<BatchOutcome> {
                let mut tx = self.pool.begin().await?;

                match write_batch(&mut *tx, teacher_id, date, entries).await {
                    Ok(outcome) => {
                        tx.commit().await?;
                        debug!(?outcome, "Attendance batch committed");
                        Ok(outcome)
                    }
                    Err(e) => {
                        if let Err(rollback_err) = tx.rollback().await {
                            warn!(error = %rollback_err, "Rollback of attendance batch failed");
                        }
                        Err(e)
                    }
                }
            }

            async fn get_daily_status(
                &self,
                teacher_id: i64,
                date: NaiveDate,
            ) -> StoreResult<Option<TeacherDailyStatus>> {
                sqlx::query_as::<_, TeacherDailyStatus>(
                    "SELECT teacher_id, date, status, reason FROM teacher_daily_status WHERE teacher_id = ? AND date = ?",
                )
                .bind(teacher_id)
                .bind(date)
                .fetch_optional(&self.pool)
                .await
            }

            async fn set_daily_status(
                &self,
                teacher_id: i64,
                date: NaiveDate,
                status: DailyStatus,
                reason: Option<&str>,
            ) -> StoreResult<()> {
                let mut tx = self.pool.begin().await?;
                upsert_daily_status(&mut *tx, teacher_id, date, status, reason).await?;
                tx.commit().await
            }

            async fn teacher_statuses(&self, date: NaiveDate) -> StoreResult<Vec<TeacherStatusRow>> {
                sqlx::query_as::<_, TeacherStatusRow>(
                    r#"
                    SELECT u.id AS teacher_id, u.name AS teacher_name, u.subject,
                           t.status, t.reason
                    FROM users u
                    LEFT JOIN teacher_daily_status t ON t.teacher_id = u.id AND t.date = ?
                    WHERE u.role = ? AND u.active = ?
                    ORDER BY u.name, u.id
                    "#,
                )
                .bind(date)
                .bind(Role::Teacher)
                .bind(true)
                .fetch_all(&self.pool)
                .await
            }

            async fn export_rows(&self, filter: &ExportFilter) -> StoreResult<Vec<ExportRow>> {
                let mut sql = String::from(
                    r#"
                    SELECT a.date, a.teacher_id, u.name AS teacher_name,
                           a.student_id, s.name AS student_name, s.class_level,
                           a.status, a.sick_date, a.excused_start_date,
                           a.excused_days, a.excused_reason, a.created_at
                    FROM attendance a
                    JOIN users u ON u.id = a.teacher_id
                    JOIN students s ON s.id = a.student_id
                    WHERE a.date >= ? AND a.date <= ?
                    "#,
                );
                if filter.class_level.is_some() {
                    sql.push_str(" AND s.class_level = ?");
                }
                if filter.teacher_id.is_some() {
                    sql.push_str(" AND a.teacher_id = ?");
                }
                sql.push_str(" ORDER BY a.date, u.name, s.class_level, s.name, s.id");

                let mut query = sqlx::query_as::<_, ExportRow>(&sql)
                    .bind(filter.from)
                    .bind(filter.to);
                if let Some(level) = filter.class_level {
                    query = query.bind(level);
                }
                if let Some(teacher_id) = filter.teacher_id {
                    query = query.bind(teacher_id);
                }
                query.fetch_all(&self.pool).await
            }
        }
    };
}

pub(crate) use impl_sql_store;

pub mod mysql;
pub mod sqlite;

pub use mysql::MySqlStore;
pub use sqlite::SqliteStore;

#[cfg(test)]
pub(crate) mod test_utils;

#[cfg(test)]
mod tests;
