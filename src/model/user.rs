use serde::Serialize;
use utoipa::ToSchema;

use super::role::Role;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: Option<String>,
    pub username: String,
    pub password_hash: String,
    pub role: Role,
    pub subject: Option<String>,
    pub active: bool,
}

/// User as exposed over the API (no password hash).
#[derive(Debug, Serialize, ToSchema)]
#[schema(example = json!({
    "id": 2,
    "name": "Siti Rahma",
    "email": "siti@example.com",
    "username": "siti",
    "role": "GURU",
    "subject": "Matematika",
    "active": true
}))]
pub struct UserResponse {
    pub id: i64,
    pub name: String,
    pub email: Option<String>,
    pub username: String,
    pub role: Role,
    pub subject: Option<String>,
    pub active: bool,
}

impl From<User> for UserResponse {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            name: u.name,
            email: u.email,
            username: u.username,
            role: u.role,
            subject: u.subject,
            active: u.active,
        }
    }
}

/// Row written when an account is created.
#[derive(Debug)]
pub struct NewUser {
    pub name: String,
    pub email: Option<String>,
    pub username: String,
    pub password_hash: String,
    pub role: Role,
    pub subject: Option<String>,
}

/// Admin edit of a teacher account. `password_hash` is only replaced when set.
#[derive(Debug)]
pub struct TeacherUpdate {
    pub name: String,
    pub email: Option<String>,
    pub username: String,
    pub subject: Option<String>,
    pub password_hash: Option<String>,
}
