use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;
use utoipa::ToSchema;

use super::{attendance::AttendanceStatus, daily_status::DailyStatus};

/// A teacher and what they reported for one day, if anything.
#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
pub struct TeacherStatusRow {
    pub teacher_id: i64,
    pub teacher_name: String,
    pub subject: Option<String>,
    pub status: Option<DailyStatus>,
    pub reason: Option<String>,
}

/// Attendance record joined with teacher and student names.
#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
pub struct ExportRow {
    #[schema(example = "2024-03-01", format = "date", value_type = String)]
    pub date: NaiveDate,
    pub teacher_id: i64,
    pub teacher_name: String,
    pub student_id: i64,
    pub student_name: String,
    pub class_level: i32,
    pub status: AttendanceStatus,
    #[schema(format = "date", value_type = Option<String>)]
    pub sick_date: Option<NaiveDate>,
    #[schema(format = "date", value_type = Option<String>)]
    pub excused_start_date: Option<NaiveDate>,
    pub excused_days: Option<i32>,
    pub excused_reason: Option<String>,
    #[schema(format = "date-time", value_type = String)]
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, Copy)]
pub struct ExportFilter {
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub class_level: Option<i32>,
    pub teacher_id: Option<i64>,
}
