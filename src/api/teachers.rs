use actix_web::{HttpResponse, web};
use serde::Deserialize;
use serde_json::json;
use tracing::{error, info};
use utoipa::ToSchema;

use crate::{
    auth::{auth::AuthUser, password::hash_password},
    error::{AppError, AppResult},
    model::{
        role::Role,
        user::{NewUser, TeacherUpdate, UserResponse},
    },
    store::Store,
};

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateTeacher {
    #[serde(default)]
    #[schema(example = "Siti Rahma")]
    pub name: String,
    #[schema(example = "siti@example.com")]
    pub email: Option<String>,
    #[serde(default)]
    #[schema(example = "siti")]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[schema(example = "Matematika")]
    pub subject: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateTeacher {
    #[serde(default)]
    pub name: String,
    pub email: Option<String>,
    #[serde(default)]
    pub username: String,
    pub subject: Option<String>,
    /// Replaces the password when present and non-empty
    pub password: Option<String>,
}

fn optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn required_text<'a>(value: &'a str, what: &str) -> AppResult<&'a str> {
    let value = value.trim();
    if value.is_empty() {
        Err(AppError::validation(format!("{what} is required")))
    } else {
        Ok(value)
    }
}

fn hash(password: &str) -> AppResult<String> {
    hash_password(password).map_err(|e| {
        error!(error = %e, "Password hashing failed");
        AppError::Internal("Password hashing failed".into())
    })
}

/// List teacher accounts
#[utoipa::path(
    get,
    path = "/api/teachers",
    responses(
        (status = 200, description = "Teachers ordered by name", body = [UserResponse]),
        (status = 403, description = "Admin only")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Teachers"
)]
pub async fn list_teachers(auth: AuthUser, store: web::Data<dyn Store>) -> AppResult<HttpResponse> {
    auth.require_admin()?;

    let teachers: Vec<UserResponse> = store
        .list_teachers()
        .await?
        .into_iter()
        .map(UserResponse::from)
        .collect();

    Ok(HttpResponse::Ok().json(teachers))
}

/// Create a teacher account
#[utoipa::path(
    post,
    path = "/api/teachers",
    request_body = CreateTeacher,
    responses(
        (status = 201, description = "Teacher created", body = Object, example = json!({
            "message": "Teacher created",
            "id": 2
        })),
        (status = 400, description = "Missing name, username or password"),
        (status = 409, description = "Username already taken"),
        (status = 403, description = "Admin only")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Teachers"
)]
pub async fn create_teacher(
    auth: AuthUser,
    store: web::Data<dyn Store>,
    payload: web::Json<CreateTeacher>,
) -> AppResult<HttpResponse> {
    auth.require_admin()?;

    let name = required_text(&payload.name, "Name")?;
    let username = required_text(&payload.username, "Username")?;
    if payload.password.is_empty() {
        return Err(AppError::validation("Password is required"));
    }

    let user = NewUser {
        name: name.to_string(),
        email: optional_text(payload.email.as_deref()),
        username: username.to_string(),
        password_hash: hash(&payload.password)?,
        role: Role::Teacher,
        subject: optional_text(payload.subject.as_deref()),
    };

    let id = store
        .create_user(&user)
        .await
        .map_err(|e| AppError::from_write(e, "Username already taken"))?;

    info!(admin_id = auth.user_id, teacher_id = id, username, "Teacher created");

    Ok(HttpResponse::Created().json(json!({
        "message": "Teacher created",
        "id": id
    })))
}

/// Edit a teacher account
#[utoipa::path(
    put,
    path = "/api/teachers/{teacher_id}",
    params(
        ("teacher_id", Path, description = "Teacher ID")
    ),
    request_body = UpdateTeacher,
    responses(
        (status = 200, description = "Teacher updated", body = UserResponse),
        (status = 400, description = "Missing name or username"),
        (status = 404, description = "Teacher not found"),
        (status = 409, description = "Username already taken"),
        (status = 403, description = "Admin only")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Teachers"
)]
pub async fn update_teacher(
    auth: AuthUser,
    store: web::Data<dyn Store>,
    path: web::Path<i64>,
    payload: web::Json<UpdateTeacher>,
) -> AppResult<HttpResponse> {
    auth.require_admin()?;
    let teacher_id = path.into_inner();

    let password_hash = match payload.password.as_deref().filter(|p| !p.is_empty()) {
        Some(password) => Some(hash(password)?),
        None => None,
    };

    let update = TeacherUpdate {
        name: required_text(&payload.name, "Name")?.to_string(),
        email: optional_text(payload.email.as_deref()),
        username: required_text(&payload.username, "Username")?.to_string(),
        subject: optional_text(payload.subject.as_deref()),
        password_hash,
    };

    let found = store
        .update_teacher(teacher_id, &update)
        .await
        .map_err(|e| AppError::from_write(e, "Username already taken"))?;
    if !found {
        return Err(AppError::not_found("Teacher not found"));
    }

    let teacher = store
        .get_user(teacher_id)
        .await?
        .ok_or_else(|| AppError::not_found("Teacher not found"))?;

    info!(admin_id = auth.user_id, teacher_id, "Teacher updated");
    Ok(HttpResponse::Ok().json(UserResponse::from(teacher)))
}

/// Activate/deactivate a teacher account
#[utoipa::path(
    post,
    path = "/api/teachers/{teacher_id}/toggle",
    params(
        ("teacher_id", Path, description = "Teacher ID")
    ),
    responses(
        (status = 200, description = "New active flag", body = Object, example = json!({
            "id": 2,
            "active": false
        })),
        (status = 404, description = "Teacher not found"),
        (status = 403, description = "Admin only")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Teachers"
)]
pub async fn toggle_teacher(
    auth: AuthUser,
    store: web::Data<dyn Store>,
    path: web::Path<i64>,
) -> AppResult<HttpResponse> {
    auth.require_admin()?;
    let teacher_id = path.into_inner();

    let active = store
        .toggle_user_active(teacher_id, Role::Teacher)
        .await?
        .ok_or_else(|| AppError::not_found("Teacher not found"))?;

    info!(admin_id = auth.user_id, teacher_id, active, "Teacher toggled");
    Ok(HttpResponse::Ok().json(json!({
        "id": teacher_id,
        "active": active
    })))
}
