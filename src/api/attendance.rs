use std::collections::{BTreeMap, HashMap};

use actix_web::{HttpResponse, web};
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{error, info};
use utoipa::ToSchema;

use crate::{
    auth::auth::AuthUser,
    error::AppResult,
    model::{
        attendance::{AttendanceEntry, AttendanceRecord, BatchOutcome, StudentSubmission},
        daily_status::TeacherDailyStatus,
        student::{Student, StudentFilter},
    },
    store::Store,
};

pub(crate) fn today() -> NaiveDate {
    Local::now().date_naive()
}

#[derive(Debug, Deserialize)]
pub struct DateQuery {
    pub date: Option<NaiveDate>,
}

/// One batch of attendance for a single day.
#[derive(Debug, Deserialize, ToSchema)]
#[schema(example = json!({
    "date": "2024-03-01",
    "entries": {
        "5": { "status": "SICK", "sick_date": "2024-03-01" },
        "6": { "status": "PRESENT" },
        "7": { "status": "EXCUSED", "excused_days": "2", "excused_reason": "family event" }
    }
}))]
pub struct AttendanceSubmission {
    /// Defaults to today
    #[schema(value_type = Option<String>, format = "date")]
    pub date: Option<NaiveDate>,
    /// Keyed by student id
    #[serde(default)]
    pub entries: HashMap<i64, StudentSubmission>,
}

#[derive(Serialize, ToSchema)]
pub struct RosterEntry {
    pub student: Student,
    pub record: Option<AttendanceRecord>,
}

#[derive(Serialize, ToSchema)]
pub struct AttendanceSheet {
    #[schema(value_type = String, format = "date")]
    pub date: NaiveDate,
    pub daily_status: Option<TeacherDailyStatus>,
    pub students: Vec<RosterEntry>,
}

/// Attendance sheet for a day
#[utoipa::path(
    get,
    path = "/api/attendance",
    params(
        ("date", Query, description = "Day to show (YYYY-MM-DD), defaults to today")
    ),
    responses(
        (status = 200, description = "Active roster with recorded attendance", body = AttendanceSheet),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Teacher only")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn attendance_sheet(
    auth: AuthUser,
    store: web::Data<dyn Store>,
    query: web::Query<DateQuery>,
) -> AppResult<HttpResponse> {
    auth.require_teacher()?;
    let date = query.date.unwrap_or_else(today);

    let students = store
        .list_students(
            auth.user_id,
            StudentFilter {
                class_level: None,
                active_only: true,
            },
        )
        .await?;
    let mut records: HashMap<i64, AttendanceRecord> = store
        .list_attendance(auth.user_id, date)
        .await?
        .into_iter()
        .map(|r| (r.student_id, r))
        .collect();
    let daily_status = store.get_daily_status(auth.user_id, date).await?;

    let students = students
        .into_iter()
        .map(|student| RosterEntry {
            record: records.remove(&student.id),
            student,
        })
        .collect();

    Ok(HttpResponse::Ok().json(AttendanceSheet {
        date,
        daily_status,
        students,
    }))
}

/// Record a day's attendance
#[utoipa::path(
    post,
    path = "/api/attendance",
    request_body = AttendanceSubmission,
    responses(
        (status = 200, description = "Batch written and day marked DONE", body = Object, example = json!({
            "message": "Attendance saved",
            "date": "2024-03-01",
            "result": { "inserted": 2, "updated": 1, "skipped": 0 }
        })),
        (status = 400, description = "Invalid submission, nothing written"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Teacher only"),
        (status = 500, description = "Batch rolled back")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn submit_attendance(
    auth: AuthUser,
    store: web::Data<dyn Store>,
    payload: web::Json<AttendanceSubmission>,
) -> AppResult<HttpResponse> {
    auth.require_teacher()?;
    let payload = payload.into_inner();
    let date = payload.date.unwrap_or_else(today);

    // Everything is validated before the transaction starts.
    let mut entries = BTreeMap::new();
    for (student_id, submission) in &payload.entries {
        if let Some(entry) = AttendanceEntry::from_submission(submission, date)? {
            entries.insert(*student_id, entry);
        }
    }

    let outcome: BatchOutcome = store
        .record_attendance_batch(auth.user_id, date, &entries)
        .await
        .map_err(|e| {
            error!(error = %e, teacher_id = auth.user_id, %date, "Attendance batch rolled back");
            e
        })?;

    info!(
        teacher_id = auth.user_id,
        %date,
        inserted = outcome.inserted,
        updated = outcome.updated,
        "Attendance saved"
    );

    Ok(HttpResponse::Ok().json(json!({
        "message": "Attendance saved",
        "date": date,
        "result": outcome
    })))
}
