use actix_web::{HttpResponse, web};
use chrono::NaiveDate;
use serde::Deserialize;
use tracing::info;
use utoipa::ToSchema;

use crate::{
    api::attendance::{DateQuery, today},
    auth::auth::AuthUser,
    error::{AppError, AppResult},
    model::daily_status::{DailyStatus, TeacherDailyStatus},
    store::Store,
};

#[derive(Debug, Deserialize, ToSchema)]
#[schema(example = json!({
    "date": "2024-03-01",
    "status": "NOT_DONE",
    "reason": "Accompanying students to a competition"
}))]
pub struct SetDailyStatus {
    /// Defaults to today
    #[schema(value_type = Option<String>, format = "date")]
    pub date: Option<NaiveDate>,
    pub status: DailyStatus,
    /// Only kept for NOT_DONE
    pub reason: Option<String>,
}

/// Get own daily status
#[utoipa::path(
    get,
    path = "/api/daily-status",
    params(
        ("date", Query, description = "Day (YYYY-MM-DD), defaults to today")
    ),
    responses(
        (status = 200, description = "Status for the day", body = TeacherDailyStatus),
        (status = 404, description = "Nothing reported for that day"),
        (status = 403, description = "Teacher only")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn get_daily_status(
    auth: AuthUser,
    store: web::Data<dyn Store>,
    query: web::Query<DateQuery>,
) -> AppResult<HttpResponse> {
    auth.require_teacher()?;
    let date = query.date.unwrap_or_else(today);

    let status = store
        .get_daily_status(auth.user_id, date)
        .await?
        .ok_or_else(|| AppError::not_found(format!("No status reported for {date}")))?;

    Ok(HttpResponse::Ok().json(status))
}

/// Set own daily status
#[utoipa::path(
    put,
    path = "/api/daily-status",
    request_body = SetDailyStatus,
    responses(
        (status = 200, description = "Status stored", body = TeacherDailyStatus),
        (status = 400, description = "Invalid payload"),
        (status = 403, description = "Teacher only")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn set_daily_status(
    auth: AuthUser,
    store: web::Data<dyn Store>,
    payload: web::Json<SetDailyStatus>,
) -> AppResult<HttpResponse> {
    auth.require_teacher()?;
    let date = payload.date.unwrap_or_else(today);
    let reason = payload.status.normalize_reason(payload.reason.as_deref());

    store
        .set_daily_status(auth.user_id, date, payload.status, reason.as_deref())
        .await?;

    info!(teacher_id = auth.user_id, %date, status = %payload.status, "Daily status set");

    Ok(HttpResponse::Ok().json(TeacherDailyStatus {
        teacher_id: auth.user_id,
        date,
        status: payload.status,
        reason,
    }))
}
