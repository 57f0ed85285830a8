use actix_web::{HttpResponse, web};
use serde::Deserialize;
use serde_json::json;
use tracing::info;
use utoipa::ToSchema;

use crate::{
    auth::auth::AuthUser,
    error::{AppError, AppResult},
    model::student::{Student, StudentFilter, is_valid_class_level},
    store::Store,
};

#[derive(Debug, Deserialize)]
pub struct StudentQuery {
    pub class_level: Option<i32>,
    #[serde(default)]
    pub include_inactive: bool,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateStudent {
    #[serde(default)]
    #[schema(example = "Budi Santoso")]
    pub name: String,
    #[schema(example = 8)]
    pub class_level: i32,
}

pub(crate) fn check_class_level(level: i32) -> AppResult<i32> {
    if is_valid_class_level(level) {
        Ok(level)
    } else {
        Err(AppError::validation("Class level must be 7, 8 or 9"))
    }
}

/// List own students
#[utoipa::path(
    get,
    path = "/api/students",
    params(
        ("class_level", Query, description = "Only this class (7, 8 or 9)"),
        ("include_inactive", Query, description = "Also list deactivated students")
    ),
    responses(
        (status = 200, description = "Students ordered by name", body = [Student]),
        (status = 400, description = "Invalid class level"),
        (status = 403, description = "Teacher only")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Students"
)]
pub async fn list_students(
    auth: AuthUser,
    store: web::Data<dyn Store>,
    query: web::Query<StudentQuery>,
) -> AppResult<HttpResponse> {
    auth.require_teacher()?;
    let class_level = query.class_level.map(check_class_level).transpose()?;

    let students = store
        .list_students(
            auth.user_id,
            StudentFilter {
                class_level,
                active_only: !query.include_inactive,
            },
        )
        .await?;

    Ok(HttpResponse::Ok().json(students))
}

/// Add a student to own roster
#[utoipa::path(
    post,
    path = "/api/students",
    request_body = CreateStudent,
    responses(
        (status = 201, description = "Student created", body = Object, example = json!({
            "message": "Student created",
            "id": 5
        })),
        (status = 400, description = "Missing name or invalid class level"),
        (status = 403, description = "Teacher only")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Students"
)]
pub async fn create_student(
    auth: AuthUser,
    store: web::Data<dyn Store>,
    payload: web::Json<CreateStudent>,
) -> AppResult<HttpResponse> {
    auth.require_teacher()?;

    let name = payload.name.trim();
    if name.is_empty() {
        return Err(AppError::validation("Student name is required"));
    }
    let class_level = check_class_level(payload.class_level)?;

    let id = store.create_student(auth.user_id, name, class_level).await?;
    info!(teacher_id = auth.user_id, student_id = id, class_level, "Student created");

    Ok(HttpResponse::Created().json(json!({
        "message": "Student created",
        "id": id
    })))
}

/// Activate/deactivate own student
#[utoipa::path(
    post,
    path = "/api/students/{student_id}/toggle",
    params(
        ("student_id", Path, description = "Student ID")
    ),
    responses(
        (status = 200, description = "New active flag", body = Object, example = json!({
            "id": 5,
            "active": false
        })),
        (status = 404, description = "Not one of your students"),
        (status = 403, description = "Teacher only")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Students"
)]
pub async fn toggle_student(
    auth: AuthUser,
    store: web::Data<dyn Store>,
    path: web::Path<i64>,
) -> AppResult<HttpResponse> {
    auth.require_teacher()?;
    let student_id = path.into_inner();

    let active = store
        .toggle_student_active(auth.user_id, student_id)
        .await?
        .ok_or_else(|| AppError::not_found("Student not found"))?;

    Ok(HttpResponse::Ok().json(json!({
        "id": student_id,
        "active": active
    })))
}
