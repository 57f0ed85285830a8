use std::collections::HashMap;

use actix_web::{HttpResponse, web};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    api::{attendance::today, students::check_class_level},
    auth::auth::AuthUser,
    error::AppResult,
    model::{
        attendance::AttendanceStatus,
        daily_status::DailyStatus,
        report::{ExportFilter, ExportRow},
    },
    store::Store,
};

#[derive(Debug, Deserialize)]
pub struct MonitorQuery {
    pub date: Option<NaiveDate>,
    pub class_level: Option<i32>,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct StatusCounts {
    pub present: u32,
    pub sick: u32,
    pub excused: u32,
}

impl StatusCounts {
    fn add(&mut self, status: AttendanceStatus) {
        match status {
            AttendanceStatus::Present => self.present += 1,
            AttendanceStatus::Sick => self.sick += 1,
            AttendanceStatus::Excused => self.excused += 1,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TeacherMonitorRow {
    pub teacher_id: i64,
    pub teacher_name: String,
    pub subject: Option<String>,
    /// Missing when the teacher reported nothing for the day
    pub status: Option<DailyStatus>,
    pub reason: Option<String>,
    pub counts: StatusCounts,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MonitorReport {
    #[schema(value_type = String, format = "date")]
    pub date: NaiveDate,
    pub class_level: Option<i32>,
    pub teachers: Vec<TeacherMonitorRow>,
    pub totals: StatusCounts,
    pub records: Vec<ExportRow>,
}

/// Cross-class overview for one day
#[utoipa::path(
    get,
    path = "/api/monitor",
    params(
        ("date", Query, description = "Day (YYYY-MM-DD), defaults to today"),
        ("class_level", Query, description = "Only count students of this class")
    ),
    responses(
        (status = 200, description = "Daily status and counts per teacher", body = MonitorReport),
        (status = 400, description = "Invalid class level"),
        (status = 403, description = "Admin only")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Monitoring"
)]
pub async fn monitor(
    auth: AuthUser,
    store: web::Data<dyn Store>,
    query: web::Query<MonitorQuery>,
) -> AppResult<HttpResponse> {
    auth.require_admin()?;
    let date = query.date.unwrap_or_else(today);
    let class_level = query.class_level.map(check_class_level).transpose()?;

    let statuses = store.teacher_statuses(date).await?;
    let records = store
        .export_rows(&ExportFilter {
            from: date,
            to: date,
            class_level,
            teacher_id: None,
        })
        .await?;

    let mut totals = StatusCounts::default();
    let mut per_teacher: HashMap<i64, StatusCounts> = HashMap::new();
    for record in &records {
        totals.add(record.status);
        per_teacher.entry(record.teacher_id).or_default().add(record.status);
    }

    let teachers = statuses
        .into_iter()
        .map(|s| TeacherMonitorRow {
            counts: per_teacher.get(&s.teacher_id).copied().unwrap_or_default(),
            teacher_id: s.teacher_id,
            teacher_name: s.teacher_name,
            subject: s.subject,
            status: s.status,
            reason: s.reason,
        })
        .collect();

    Ok(HttpResponse::Ok().json(MonitorReport {
        date,
        class_level,
        teachers,
        totals,
        records,
    }))
}
