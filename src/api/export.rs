use actix_web::{HttpResponse, http::header, web};
use chrono::NaiveDate;
use serde::Deserialize;
use tracing::info;

use crate::{
    api::{attendance::today, students::check_class_level},
    auth::auth::AuthUser,
    error::{AppError, AppResult},
    model::report::ExportFilter,
    store::Store,
    utils::csv::export_csv,
};

#[derive(Debug, Deserialize)]
pub struct ExportQuery {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub class_level: Option<i32>,
    pub teacher_id: Option<i64>,
}

impl ExportQuery {
    fn into_filter(self) -> AppResult<ExportFilter> {
        let to = self.to.unwrap_or_else(today);
        let from = self.from.unwrap_or(to);
        if from > to {
            return Err(AppError::validation("`from` must not be after `to`"));
        }
        Ok(ExportFilter {
            from,
            to,
            class_level: self.class_level.map(check_class_level).transpose()?,
            teacher_id: self.teacher_id,
        })
    }
}

/// Export attendance as CSV
#[utoipa::path(
    get,
    path = "/api/export",
    params(
        ("from", Query, description = "First day (YYYY-MM-DD), defaults to `to`"),
        ("to", Query, description = "Last day (YYYY-MM-DD), defaults to today"),
        ("class_level", Query, description = "Only this class"),
        ("teacher_id", Query, description = "Only this teacher")
    ),
    responses(
        (status = 200, description = "CSV file", content_type = "text/csv", body = String),
        (status = 400, description = "Invalid range or class level"),
        (status = 403, description = "Admin only")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Monitoring"
)]
pub async fn export_attendance(
    auth: AuthUser,
    store: web::Data<dyn Store>,
    query: web::Query<ExportQuery>,
) -> AppResult<HttpResponse> {
    auth.require_admin()?;
    let filter = query.into_inner().into_filter()?;

    let rows = store.export_rows(&filter).await?;
    info!(admin_id = auth.user_id, from = %filter.from, to = %filter.to, rows = rows.len(), "Attendance exported");

    Ok(HttpResponse::Ok()
        .content_type("text/csv; charset=utf-8")
        .insert_header((
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"absensi_{}_{}.csv\"", filter.from, filter.to),
        ))
        .body(export_csv(&rows)))
}
